//! Notification endpoint handlers.
//!
//! The machine-facing side of the platform: submit a notification definition
//! (idempotent per external id), bind a template, dispatch through a channel
//! adapter and query the delivery audit trail. All routes here require
//! project API key authentication.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ProjectAuth;
use crate::middleware::metrics::{record_dispatch_outcome, record_submission};
use domain::models::delivery::{
    DeliveryAttemptResponse, DeliveryHistoryResponse, DispatchRequest, DispatchResponse,
};
use domain::models::notification::{
    BindTemplateRequest, DefinitionResponse, ListDefinitionsResponse, SubmitNotificationRequest,
    SubmitNotificationResponse,
};
use domain::models::NotificationDefinition;
use domain::services::store::{DefinitionStore, DeliveryStore, TemplateStore};
use persistence::repositories::{
    DeliveryAttemptRepository, NotificationDefinitionRepository, TemplateRepository,
};
use shared::pagination::{decode_cursor, encode_cursor};

/// Submit a notification definition.
///
/// POST /api/v1/notifications
///
/// Idempotent on (project, external_id): the first submission creates the
/// definition (201), any later one returns the original unchanged (200).
pub async fn submit_notification(
    State(state): State<AppState>,
    auth: ProjectAuth,
    Json(request): Json<SubmitNotificationRequest>,
) -> Result<(StatusCode, Json<SubmitNotificationResponse>), ApiError> {
    request.validate()?;

    let repo = NotificationDefinitionRepository::new(state.pool.clone());
    let (definition, is_new) = repo
        .submit_or_get(auth.project_id, &request.title, &request.external_id)
        .await?;

    record_submission(is_new);
    info!(
        project_id = %auth.project_id,
        definition_id = %definition.id,
        external_id = %definition.external_id,
        is_new = is_new,
        "Notification submitted"
    );

    let status = if is_new {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(SubmitNotificationResponse {
            definition_id: definition.id,
            is_new,
        }),
    ))
}

/// Bind a template to a definition.
///
/// POST /api/v1/notifications/:definition_id/template
///
/// Channel compatibility is deliberately not checked here; a mismatch
/// surfaces as a configuration error at dispatch time.
pub async fn bind_template(
    State(state): State<AppState>,
    auth: ProjectAuth,
    Path(definition_id): Path<Uuid>,
    Json(request): Json<BindTemplateRequest>,
) -> Result<StatusCode, ApiError> {
    let definitions = NotificationDefinitionRepository::new(state.pool.clone());
    let definition = find_project_definition(&definitions, definition_id, auth.project_id).await?;

    let templates = TemplateRepository::new(state.pool.clone());
    templates
        .find_by_id(request.template_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Template not found".to_string()))?;

    let bound = definitions
        .bind_template(definition.id, request.template_id)
        .await?;
    if !bound {
        return Err(ApiError::NotFound(
            "Notification definition not found".to_string(),
        ));
    }

    info!(
        definition_id = %definition.id,
        template_id = %request.template_id,
        "Template bound to definition"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Dispatch a notification through a channel adapter.
///
/// POST /api/v1/notifications/:definition_id/dispatch
///
/// Exactly one delivery attempt row exists after this call whenever the
/// transport was invoked, success or failure. Transport failures come back
/// as 502 with the attempt id in the body.
pub async fn dispatch_notification(
    State(state): State<AppState>,
    auth: ProjectAuth,
    Path(definition_id): Path<Uuid>,
    Json(request): Json<DispatchRequest>,
) -> Result<Json<DispatchResponse>, ApiError> {
    request.validate()?;

    let result = state
        .dispatch
        .dispatch(
            auth.project_id,
            definition_id,
            request.channel,
            &request.recipient,
            &request.variables,
        )
        .await;

    match result {
        Ok(attempt) => {
            record_dispatch_outcome(attempt.outcome.as_str());
            Ok(Json(DispatchResponse {
                delivery_attempt_id: attempt.id,
                outcome: attempt.outcome,
                recipient: attempt.recipient,
                channel: attempt.channel,
            }))
        }
        Err(err) => {
            if let domain::services::dispatch::DispatchError::Delivery { outcome, .. } = &err {
                record_dispatch_outcome(outcome.as_str());
            }
            Err(err.into())
        }
    }
}

/// List the project's definitions in creation order.
///
/// GET /api/v1/notifications
pub async fn list_definitions(
    State(state): State<AppState>,
    auth: ProjectAuth,
) -> Result<Json<ListDefinitionsResponse>, ApiError> {
    let repo = NotificationDefinitionRepository::new(state.pool.clone());
    let definitions = repo.list_by_project(auth.project_id).await?;

    let definitions: Vec<DefinitionResponse> = definitions.into_iter().map(Into::into).collect();
    let total = definitions.len() as i64;

    Ok(Json(ListDefinitionsResponse { definitions, total }))
}

/// Query parameters for delivery history.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HistoryQuery {
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

/// Delivery history for a definition, newest first.
///
/// GET /api/v1/notifications/:definition_id/deliveries
pub async fn delivery_history(
    State(state): State<AppState>,
    auth: ProjectAuth,
    Path(definition_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<DeliveryHistoryResponse>, ApiError> {
    let definitions = NotificationDefinitionRepository::new(state.pool.clone());
    let definition = find_project_definition(&definitions, definition_id, auth.project_id).await?;

    let page_size = query
        .limit
        .unwrap_or(state.config.dispatch.history_page_size)
        .clamp(1, 200);

    let before = match &query.cursor {
        Some(cursor) => Some(
            decode_cursor(cursor)
                .map_err(|e| ApiError::Validation(format!("cursor: {}", e)))?,
        ),
        None => None,
    };

    let deliveries = DeliveryAttemptRepository::new(state.pool.clone());
    // Fetch one extra row to learn whether an older page exists
    let mut attempts = deliveries
        .history(definition.id, page_size + 1, before)
        .await?;

    let next_cursor = if attempts.len() as i64 > page_size {
        attempts.truncate(page_size as usize);
        attempts
            .last()
            .map(|a| encode_cursor(a.created_at, a.id))
    } else {
        None
    };

    let attempts: Vec<DeliveryAttemptResponse> = attempts.into_iter().map(Into::into).collect();

    Ok(Json(DeliveryHistoryResponse {
        attempts,
        next_cursor,
    }))
}

/// Query parameters for the last-outcome lookup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LastOutcomeQuery {
    pub recipient: String,
}

/// Most recent attempt for a (definition, recipient) pair.
///
/// GET /api/v1/notifications/:definition_id/deliveries/last?recipient=...
///
/// Lets callers implement their own cool-down policy without scanning the
/// full history.
pub async fn last_delivery(
    State(state): State<AppState>,
    auth: ProjectAuth,
    Path(definition_id): Path<Uuid>,
    Query(query): Query<LastOutcomeQuery>,
) -> Result<Json<DeliveryAttemptResponse>, ApiError> {
    let definitions = NotificationDefinitionRepository::new(state.pool.clone());
    let definition = find_project_definition(&definitions, definition_id, auth.project_id).await?;

    let deliveries = DeliveryAttemptRepository::new(state.pool.clone());
    let attempt = deliveries
        .last_outcome(definition.id, &query.recipient)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("No delivery attempts for this recipient".to_string())
        })?;

    Ok(Json(attempt.into()))
}

/// Resolves a definition and checks that it belongs to the authenticated
/// project; foreign definitions read as 404.
async fn find_project_definition(
    repo: &NotificationDefinitionRepository,
    definition_id: Uuid,
    project_id: Uuid,
) -> Result<NotificationDefinition, ApiError> {
    repo.find_by_id(definition_id)
        .await?
        .filter(|d| d.project_id == project_id)
        .ok_or_else(|| ApiError::NotFound("Notification definition not found".to_string()))
}
