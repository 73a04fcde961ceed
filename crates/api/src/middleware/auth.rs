//! Authentication middleware.
//!
//! Provides middleware for requiring project API key authentication on the
//! machine-facing notification routes.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ProjectAuth;

/// Middleware that requires project API key authentication.
///
/// Validates the `X-API-Key` header, resolves it to a project and stores the
/// authenticated project in request extensions for downstream handlers.
/// Rejects with a generic 401 otherwise.
pub async fn require_project_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let api_key = req.headers().get("X-API-Key").and_then(|v| v.to_str().ok());

    let api_key = match api_key {
        Some(key) => key.to_string(),
        None => {
            return ApiError::Unauthorized("Invalid or missing API key".to_string())
                .into_response();
        }
    };

    match ProjectAuth::validate(&state.pool, &api_key).await {
        Ok(auth) => {
            tracing::debug!(
                project_id = %auth.project_id,
                key_prefix = %auth.key_prefix,
                "Project authenticated"
            );
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}
