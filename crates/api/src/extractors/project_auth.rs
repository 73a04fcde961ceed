//! Project API key authentication extractor.
//!
//! Machine-originated notification requests authenticate with the project
//! API key in the `X-API-Key` header. The key is resolved to a project by a
//! single hash lookup; all failure modes produce the same generic 401 so a
//! caller cannot probe which part of the credential was wrong.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use sqlx::PgPool;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use domain::services::store::ProjectStore;
use persistence::repositories::ProjectRepository;
use shared::crypto::{extract_key_prefix, sha256_hex};

/// Authenticated project information.
#[derive(Debug, Clone)]
pub struct ProjectAuth {
    /// Public id of the authenticated project.
    pub project_id: Uuid,
    /// Display prefix of the key used, for log correlation.
    pub key_prefix: String,
}

impl ProjectAuth {
    /// Validates an API key and returns the authenticated project.
    ///
    /// This is the core authentication logic, extracted for testability.
    pub async fn validate(pool: &PgPool, api_key: &str) -> Result<Self, ApiError> {
        // Reject malformed keys before touching the database
        if extract_key_prefix(api_key).is_none() {
            return Err(ApiError::Unauthorized(
                "Invalid or missing API key".to_string(),
            ));
        }

        let key_hash = sha256_hex(api_key);

        let repo = ProjectRepository::new(pool.clone());
        let project = repo
            .find_by_key_hash(&key_hash)
            .await
            .map_err(|e| {
                tracing::error!("Database error during API key lookup: {}", e);
                ApiError::Internal("Authentication service unavailable".to_string())
            })?
            .ok_or_else(|| ApiError::Unauthorized("Invalid or missing API key".to_string()))?;

        Ok(ProjectAuth {
            project_id: project.id,
            key_prefix: project.api_key_prefix,
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for ProjectAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Inserted by the require_project_auth middleware
        parts
            .extensions
            .get::<ProjectAuth>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Invalid or missing API key".to_string()))
    }
}
