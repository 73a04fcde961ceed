//! Custom Axum extractors.

pub mod auth_user;
pub mod project_auth;

pub use auth_user::AuthUser;
pub use project_auth::ProjectAuth;
