//! Delivery attempt entity definitions.
//!
//! Maps to the delivery_attempts table. Rows are append-only: no code path
//! updates or deletes them, and the table carries no foreign keys so the
//! audit trail outlives the project or definition it refers to.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{DeliveryAttempt, DeliveryOutcome};

use crate::entities::template::ChannelTypeDb;

/// Database enum for the delivery_outcome Postgres type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "delivery_outcome", rename_all = "lowercase")]
pub enum DeliveryOutcomeDb {
    Sent,
    Failed,
}

impl From<DeliveryOutcomeDb> for DeliveryOutcome {
    fn from(o: DeliveryOutcomeDb) -> Self {
        match o {
            DeliveryOutcomeDb::Sent => DeliveryOutcome::Sent,
            DeliveryOutcomeDb::Failed => DeliveryOutcome::Failed,
        }
    }
}

impl From<DeliveryOutcome> for DeliveryOutcomeDb {
    fn from(o: DeliveryOutcome) -> Self {
        match o {
            DeliveryOutcome::Sent => DeliveryOutcomeDb::Sent,
            DeliveryOutcome::Failed => DeliveryOutcomeDb::Failed,
        }
    }
}

/// Database entity for the delivery_attempts table.
#[derive(Debug, Clone, FromRow)]
pub struct DeliveryAttemptEntity {
    pub id: i64,
    pub attempt_id: Uuid,
    pub definition_id: Uuid,
    pub project_id: Uuid,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub channel: ChannelTypeDb,
    pub outcome: DeliveryOutcomeDb,
    pub error_detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DeliveryAttemptEntity> for DeliveryAttempt {
    fn from(e: DeliveryAttemptEntity) -> Self {
        Self {
            id: e.attempt_id,
            definition_id: e.definition_id,
            project_id: e.project_id,
            recipient: e.recipient,
            subject: e.subject,
            body: e.body,
            channel: e.channel.into(),
            outcome: e.outcome.into(),
            error_detail: e.error_detail,
            created_at: e.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::ChannelType;

    #[test]
    fn test_outcome_db_round_trip() {
        for outcome in [DeliveryOutcome::Sent, DeliveryOutcome::Failed] {
            let db: DeliveryOutcomeDb = outcome.into();
            let back: DeliveryOutcome = db.into();
            assert_eq!(back, outcome);
        }
    }

    #[test]
    fn test_entity_to_domain_conversion() {
        let entity = DeliveryAttemptEntity {
            id: 11,
            attempt_id: Uuid::new_v4(),
            definition_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            recipient: "a@b.com".to_string(),
            subject: "Welcome Ana".to_string(),
            body: "Hello Ana".to_string(),
            channel: ChannelTypeDb::Email,
            outcome: DeliveryOutcomeDb::Failed,
            error_detail: Some("connection refused".to_string()),
            created_at: Utc::now(),
        };

        let expected_id = entity.attempt_id;
        let attempt: DeliveryAttempt = entity.into();
        assert_eq!(attempt.id, expected_id);
        assert_eq!(attempt.channel, ChannelType::Email);
        assert_eq!(attempt.outcome, DeliveryOutcome::Failed);
        assert_eq!(attempt.error_detail.as_deref(), Some("connection refused"));
    }
}
