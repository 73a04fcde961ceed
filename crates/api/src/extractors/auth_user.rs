//! Resolved-user extractor for human-originated requests.
//!
//! Session handling lives in the fronting identity layer, which resolves the
//! bearer token and forwards the user id in the `X-User-Id` header. This
//! extractor only parses that header; it never sees raw credentials.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Header carrying the upstream-resolved user id.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// The authenticated user on owner-scoped routes.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<Uuid>().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing user identity".to_string()))?;

        Ok(AuthUser { user_id })
    }
}
