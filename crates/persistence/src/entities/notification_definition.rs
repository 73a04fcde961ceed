//! Notification definition entity definitions.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::NotificationDefinition;

/// Database entity for the notification_definitions table.
///
/// (project_id, external_id) carries a unique index; the creation path
/// relies on it for idempotent submission.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationDefinitionEntity {
    pub id: i64,
    pub definition_id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub external_id: String,
    pub template_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<NotificationDefinitionEntity> for NotificationDefinition {
    fn from(e: NotificationDefinitionEntity) -> Self {
        Self {
            id: e.definition_id,
            project_id: e.project_id,
            title: e.title,
            external_id: e.external_id,
            template_id: e.template_id,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}
