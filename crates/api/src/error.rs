use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use domain::models::{ChannelType, DeliveryOutcome};
use domain::services::dispatch::DispatchError;
use domain::services::store::StorageError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Caller/setup bug (unbound or mismatched template). Not retryable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Requested channel has no transport adapter. Not retryable.
    #[error("Channel {0} is not supported yet")]
    UnsupportedChannel(ChannelType),

    /// Transport failure. The attempt is recorded; the caller may retry,
    /// and the response body carries the attempt id so no second query is
    /// needed to decide.
    #[error("Delivery failed: {detail}")]
    Delivery {
        attempt_id: Uuid,
        outcome: DeliveryOutcome,
        detail: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    delivery_attempt_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<DeliveryOutcome>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut delivery_attempt_id = None;
        let mut outcome = None;

        let (status, error_code, message) = match &self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            ApiError::Configuration(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "configuration_error",
                msg.clone(),
            ),
            ApiError::UnsupportedChannel(channel) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "unsupported_channel",
                format!("Channel {} has no transport adapter", channel),
            ),
            ApiError::Delivery {
                attempt_id,
                outcome: attempt_outcome,
                detail,
            } => {
                delivery_attempt_id = Some(*attempt_id);
                outcome = Some(*attempt_outcome);
                (StatusCode::BAD_GATEWAY, "delivery_failed", detail.clone())
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                )
            }
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
            delivery_attempt_id,
            outcome,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            sqlx::Error::Database(db_err) => {
                if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        "23505" => ApiError::Conflict("Resource already exists".into()),
                        "23503" => ApiError::NotFound("Referenced resource not found".into()),
                        _ => ApiError::Internal(format!("Database error: {}", db_err)),
                    }
                } else {
                    ApiError::Internal(format!("Database error: {}", db_err))
                }
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::NotFound(msg) => ApiError::NotFound(msg),
            DispatchError::Configuration(msg) => ApiError::Configuration(msg),
            DispatchError::UnsupportedChannel(channel) => ApiError::UnsupportedChannel(channel),
            DispatchError::Delivery {
                attempt_id,
                outcome,
                detail,
            } => ApiError::Delivery {
                attempt_id,
                outcome,
                detail,
            },
            DispatchError::Storage(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    format!(
                        "{}: {}",
                        field,
                        e.message.clone().unwrap_or_else(|| "invalid".into())
                    )
                })
            })
            .collect();

        ApiError::Validation(messages.join(", "))
    }
}
