//! Template endpoint handlers.
//!
//! Owner-scoped CRUD for reusable message templates. Deleting a template
//! clears any notification definition references to it; the definitions
//! themselves are untouched.

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
use domain::models::template::{
    CreateTemplateRequest, ListTemplatesResponse, TemplateResponse, UpdateTemplateRequest,
};
use domain::models::{NewTemplate, Template};
use domain::services::store::TemplateStore;
use persistence::repositories::TemplateRepository;

/// Create a new template.
///
/// POST /api/v1/templates
pub async fn create_template(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<TemplateResponse>), ApiError> {
    request.validate()?;

    let repo = TemplateRepository::new(state.pool.clone());
    let template = repo
        .insert(NewTemplate {
            owner_user_id: auth.user_id,
            title: request.title,
            subject: request.subject,
            body: request.body,
            channel: request.channel,
        })
        .await?;

    info!(
        template_id = %template.id,
        owner_user_id = %auth.user_id,
        channel = %template.channel,
        "Template created"
    );

    Ok((StatusCode::CREATED, Json(template.into())))
}

/// List the caller's templates.
///
/// GET /api/v1/templates
pub async fn list_templates(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ListTemplatesResponse>, ApiError> {
    let repo = TemplateRepository::new(state.pool.clone());
    let templates = repo.list_by_owner(auth.user_id).await?;

    let templates: Vec<TemplateResponse> = templates.into_iter().map(Into::into).collect();
    let total = templates.len() as i64;

    Ok(Json(ListTemplatesResponse { templates, total }))
}

/// Get a single template.
///
/// GET /api/v1/templates/:template_id
pub async fn get_template(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(template_id): Path<Uuid>,
) -> Result<Json<TemplateResponse>, ApiError> {
    let repo = TemplateRepository::new(state.pool.clone());
    let template = find_owned_template(&repo, template_id, auth.user_id).await?;

    Ok(Json(template.into()))
}

/// Update a template (partial update).
///
/// PATCH /api/v1/templates/:template_id
pub async fn update_template(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(template_id): Path<Uuid>,
    Json(request): Json<UpdateTemplateRequest>,
) -> Result<Json<TemplateResponse>, ApiError> {
    request.validate()?;

    let repo = TemplateRepository::new(state.pool.clone());
    find_owned_template(&repo, template_id, auth.user_id).await?;

    let template = repo
        .update(template_id, request.into())
        .await?
        .ok_or_else(|| ApiError::NotFound("Template not found".to_string()))?;

    info!(template_id = %template.id, "Template updated");

    Ok(Json(template.into()))
}

/// Delete a template. Definition references are cleared, not cascaded.
///
/// DELETE /api/v1/templates/:template_id
pub async fn delete_template(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(template_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = TemplateRepository::new(state.pool.clone());
    find_owned_template(&repo, template_id, auth.user_id).await?;

    let deleted = TemplateStore::delete(&repo, template_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Template not found".to_string()));
    }

    info!(template_id = %template_id, "Template deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Resolves a template and checks ownership; foreign templates read as 404.
async fn find_owned_template(
    repo: &TemplateRepository,
    template_id: Uuid,
    user_id: Uuid,
) -> Result<Template, ApiError> {
    repo.find_by_id(template_id)
        .await?
        .filter(|t| t.owner_user_id == user_id)
        .ok_or_else(|| ApiError::NotFound("Template not found".to_string()))
}
