//! Notification definition domain model.
//!
//! A definition is a named event type scoped to one project, identified by a
//! caller-supplied external id. The (project_id, external_id) pair is unique;
//! resubmitting it returns the existing definition unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::validation::validate_external_id;

/// A named, idempotent notification event type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NotificationDefinition {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    /// Caller-supplied idempotency/correlation key, unique per project.
    pub external_id: String,
    /// Non-owning reference; nulled out when the template is deleted.
    pub template_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for submitting a notification definition.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct SubmitNotificationRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(custom(function = "validate_external_id"))]
    pub external_id: String,
}

/// Response for a submission: the definition id plus whether it was created
/// by this call or already existed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SubmitNotificationResponse {
    pub definition_id: Uuid,
    pub is_new: bool,
}

/// Request payload for binding a template to a definition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BindTemplateRequest {
    pub template_id: Uuid,
}

/// Response payload for a single definition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DefinitionResponse {
    pub definition_id: Uuid,
    pub title: String,
    pub external_id: String,
    pub template_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationDefinition> for DefinitionResponse {
    fn from(d: NotificationDefinition) -> Self {
        Self {
            definition_id: d.id,
            title: d.title,
            external_id: d.external_id,
            template_id: d.template_id,
            created_at: d.created_at,
        }
    }
}

/// Response for listing a project's definitions, in creation order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListDefinitionsResponse {
    pub definitions: Vec<DefinitionResponse>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_request_deserialization() {
        let json = r#"{"title": "Welcome", "external_id": "user-42"}"#;
        let request: SubmitNotificationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.title, "Welcome");
        assert_eq!(request.external_id, "user-42");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_submit_request_empty_title() {
        let request = SubmitNotificationRequest {
            title: "".to_string(),
            external_id: "user-42".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_submit_request_bad_external_id() {
        let request = SubmitNotificationRequest {
            title: "Welcome".to_string(),
            external_id: "user 42".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_submit_response_serialization() {
        let response = SubmitNotificationResponse {
            definition_id: Uuid::nil(),
            is_new: true,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"is_new\":true"));
        assert!(json.contains("\"definition_id\":"));
    }

    #[test]
    fn test_definition_response_from_definition() {
        let definition = NotificationDefinition {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            title: "Password reset".to_string(),
            external_id: "pwreset".to_string(),
            template_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let id = definition.id;
        let response: DefinitionResponse = definition.into();
        assert_eq!(response.definition_id, id);
        assert!(response.template_id.is_none());
    }

    #[test]
    fn test_bind_template_request_deserialization() {
        let json = r#"{"template_id": "550e8400-e29b-41d4-a716-446655440000"}"#;
        let request: BindTemplateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            request.template_id.to_string(),
            "550e8400-e29b-41d4-a716-446655440000"
        );
    }
}
