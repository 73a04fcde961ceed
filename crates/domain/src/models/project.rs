//! Project domain model.
//!
//! A project is a tenant of the platform. Each project holds exactly one
//! API key credential, stored as a SHA-256 hash with a short plaintext
//! prefix retained for display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A tenant of the notification platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Project {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub name: String,
    /// SHA-256 hex hash of the current API key. Never serialized to clients.
    #[serde(skip_serializing)]
    pub api_key_hash: String,
    /// First 8 characters of the key after the `nh_` prefix, for display.
    pub api_key_prefix: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub owner_user_id: Uuid,
    pub name: String,
    pub api_key_hash: String,
    pub api_key_prefix: String,
}

/// Request payload for creating a project.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

/// Response for a single project (key never echoed, only the prefix).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ProjectResponse {
    pub project_id: Uuid,
    pub name: String,
    pub api_key_prefix: String,
    pub created_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(p: Project) -> Self {
        Self {
            project_id: p.id,
            name: p.name,
            api_key_prefix: p.api_key_prefix,
            created_at: p.created_at,
        }
    }
}

/// Response when creating a project (includes the full key, shown only once).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateProjectResponse {
    pub project_id: Uuid,
    pub name: String,
    /// The full API key (shown ONCE, store securely).
    pub api_key: String,
    pub api_key_prefix: String,
    pub created_at: DateTime<Utc>,
}

/// Response when rotating a project's API key.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RotateApiKeyResponse {
    pub project_id: Uuid,
    /// The replacement API key (shown ONCE). The previous key is already invalid.
    pub api_key: String,
    pub api_key_prefix: String,
}

/// Response for listing the caller's projects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListProjectsResponse {
    pub projects: Vec<ProjectResponse>,
    pub total: i64,
}
