//! Delivery attempt domain model.
//!
//! One row per dispatch attempt, written after the transport call completes
//! and never mutated afterwards. Retries create new rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::models::template::ChannelType;
use shared::validation::{validate_recipient, validate_variables};

/// Terminal outcome of a dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOutcome {
    Sent,
    Failed,
}

impl DeliveryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryOutcome::Sent => "sent",
            DeliveryOutcome::Failed => "failed",
        }
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(DeliveryOutcome::Sent),
            "failed" => Ok(DeliveryOutcome::Failed),
            other => Err(format!("unknown delivery outcome: {}", other)),
        }
    }
}

/// Immutable record of one dispatch attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DeliveryAttempt {
    pub id: Uuid,
    pub definition_id: Uuid,
    pub project_id: Uuid,
    pub recipient: String,
    /// Subject exactly as rendered, for reproducibility.
    pub subject: String,
    /// Body exactly as rendered, for reproducibility.
    pub body: String,
    pub channel: ChannelType,
    pub outcome: DeliveryOutcome,
    /// Transport error message when the outcome is `failed`.
    pub error_detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a dispatch attempt.
#[derive(Debug, Clone)]
pub struct NewDeliveryAttempt {
    pub definition_id: Uuid,
    pub project_id: Uuid,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub channel: ChannelType,
    pub outcome: DeliveryOutcome,
    pub error_detail: Option<String>,
}

/// Request payload for dispatching a notification.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct DispatchRequest {
    pub channel: ChannelType,

    #[validate(custom(function = "validate_recipient"))]
    pub recipient: String,

    #[serde(default)]
    #[validate(custom(function = "validate_variables"))]
    pub variables: HashMap<String, String>,
}

/// Response for a successful dispatch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DispatchResponse {
    pub delivery_attempt_id: Uuid,
    pub outcome: DeliveryOutcome,
    pub recipient: String,
    pub channel: ChannelType,
}

/// Response payload for a single delivery attempt in history listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DeliveryAttemptResponse {
    pub delivery_attempt_id: Uuid,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub channel: ChannelType,
    pub outcome: DeliveryOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DeliveryAttempt> for DeliveryAttemptResponse {
    fn from(a: DeliveryAttempt) -> Self {
        Self {
            delivery_attempt_id: a.id,
            recipient: a.recipient,
            subject: a.subject,
            body: a.body,
            channel: a.channel,
            outcome: a.outcome,
            error_detail: a.error_detail,
            created_at: a.created_at,
        }
    }
}

/// Response for listing delivery history, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DeliveryHistoryResponse {
    pub attempts: Vec<DeliveryAttemptResponse>,
    /// Cursor for the next (older) page; absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_round_trip() {
        for outcome in [DeliveryOutcome::Sent, DeliveryOutcome::Failed] {
            let parsed: DeliveryOutcome = outcome.as_str().parse().unwrap();
            assert_eq!(parsed, outcome);
        }
    }

    #[test]
    fn test_outcome_parse_unknown() {
        assert!("pending".parse::<DeliveryOutcome>().is_err());
        assert!("SENT".parse::<DeliveryOutcome>().is_err());
    }

    #[test]
    fn test_dispatch_request_deserialization() {
        let json = r#"{
            "channel": "email",
            "recipient": "a@b.com",
            "variables": {"name": "Ana"}
        }"#;
        let request: DispatchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.channel, ChannelType::Email);
        assert_eq!(request.variables.get("name"), Some(&"Ana".to_string()));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_dispatch_request_variables_default_empty() {
        let json = r#"{"channel": "email", "recipient": "a@b.com"}"#;
        let request: DispatchRequest = serde_json::from_str(json).unwrap();
        assert!(request.variables.is_empty());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_dispatch_request_empty_recipient_rejected() {
        let request = DispatchRequest {
            channel: ChannelType::Email,
            recipient: "  ".to_string(),
            variables: HashMap::new(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_dispatch_response_serialization() {
        let response = DispatchResponse {
            delivery_attempt_id: Uuid::nil(),
            outcome: DeliveryOutcome::Sent,
            recipient: "a@b.com".to_string(),
            channel: ChannelType::Email,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"outcome\":\"sent\""));
        assert!(json.contains("\"channel\":\"email\""));
    }

    #[test]
    fn test_attempt_response_omits_null_error_detail() {
        let attempt = DeliveryAttempt {
            id: Uuid::new_v4(),
            definition_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            recipient: "a@b.com".to_string(),
            subject: "Hi".to_string(),
            body: "Hello Ana".to_string(),
            channel: ChannelType::Email,
            outcome: DeliveryOutcome::Sent,
            error_detail: None,
            created_at: Utc::now(),
        };
        let response: DeliveryAttemptResponse = attempt.into();
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("error_detail"));
    }

    #[test]
    fn test_attempt_response_includes_error_detail_on_failure() {
        let attempt = DeliveryAttempt {
            id: Uuid::new_v4(),
            definition_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            recipient: "a@b.com".to_string(),
            subject: "Hi".to_string(),
            body: "Hello".to_string(),
            channel: ChannelType::Email,
            outcome: DeliveryOutcome::Failed,
            error_detail: Some("connection refused".to_string()),
            created_at: Utc::now(),
        };
        let response: DeliveryAttemptResponse = attempt.into();
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"error_detail\":\"connection refused\""));
        assert!(json.contains("\"outcome\":\"failed\""));
    }
}
