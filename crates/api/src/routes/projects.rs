//! Project endpoint handlers.
//!
//! Owner-scoped tenant management: create a project (issuing its API key),
//! list projects, rotate the key, delete the project. The full key appears
//! in exactly two responses - creation and rotation - and is never
//! retrievable afterwards.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use domain::models::project::{
    CreateProjectRequest, CreateProjectResponse, ListProjectsResponse, ProjectResponse,
    RotateApiKeyResponse,
};
use domain::models::NewProject;
use domain::services::store::ProjectStore;
use persistence::repositories::ProjectRepository;
use shared::crypto::{extract_key_prefix, generate_api_key, sha256_hex};

/// Create a new project with a freshly generated API key.
///
/// POST /api/v1/projects
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<CreateProjectResponse>), ApiError> {
    request.validate()?;

    let api_key = generate_api_key();
    let prefix = extract_key_prefix(&api_key)
        .ok_or_else(|| ApiError::Internal("Generated key has invalid shape".to_string()))?;

    let repo = ProjectRepository::new(state.pool.clone());
    let project = repo
        .insert(NewProject {
            owner_user_id: auth.user_id,
            name: request.name,
            api_key_hash: sha256_hex(&api_key),
            api_key_prefix: prefix.to_string(),
        })
        .await?;

    info!(
        project_id = %project.id,
        owner_user_id = %auth.user_id,
        name = %project.name,
        "Project created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateProjectResponse {
            project_id: project.id,
            name: project.name,
            api_key,
            api_key_prefix: project.api_key_prefix,
            created_at: project.created_at,
        }),
    ))
}

/// List the caller's projects.
///
/// GET /api/v1/projects
pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ListProjectsResponse>, ApiError> {
    let repo = ProjectRepository::new(state.pool.clone());
    let projects = repo.list_by_owner(auth.user_id).await?;

    let projects: Vec<ProjectResponse> = projects.into_iter().map(Into::into).collect();
    let total = projects.len() as i64;

    Ok(Json(ListProjectsResponse { projects, total }))
}

/// Rotate a project's API key.
///
/// POST /api/v1/projects/:project_id/rotate-key
///
/// The swap is a single statement: the old key stops authenticating the
/// moment the new one starts.
pub async fn rotate_api_key(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
) -> Result<Json<RotateApiKeyResponse>, ApiError> {
    let repo = ProjectRepository::new(state.pool.clone());
    let project = find_owned_project(&repo, project_id, auth.user_id).await?;

    let api_key = generate_api_key();
    let prefix = extract_key_prefix(&api_key)
        .ok_or_else(|| ApiError::Internal("Generated key has invalid shape".to_string()))?
        .to_string();

    let rotated = repo
        .rotate_key(project.id, &sha256_hex(&api_key), &prefix)
        .await?;
    if !rotated {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    info!(project_id = %project.id, "Project API key rotated");

    Ok(Json(RotateApiKeyResponse {
        project_id: project.id,
        api_key,
        api_key_prefix: prefix.to_string(),
    }))
}

/// Delete a project, cascading to its notification definitions.
///
/// DELETE /api/v1/projects/:project_id
pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = ProjectRepository::new(state.pool.clone());
    let project = find_owned_project(&repo, project_id, auth.user_id).await?;

    let deleted = ProjectStore::delete(&repo, project.id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    info!(project_id = %project.id, "Project deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Resolves a project and checks ownership. A foreign project is reported
/// as not found rather than forbidden, so project ids are not probeable.
async fn find_owned_project(
    repo: &ProjectRepository,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<domain::models::Project, ApiError> {
    repo.find_by_id(project_id)
        .await?
        .filter(|p| p.owner_user_id == user_id)
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))
}
