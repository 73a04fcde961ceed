//! Repository for delivery attempt database operations.
//!
//! Inserts only. Attempts are the audit trail of the dispatch pipeline and
//! are never updated or deleted here; retention is an operational concern
//! handled outside the application.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::{DeliveryAttempt, NewDeliveryAttempt};
use domain::services::store::{DeliveryStore, StorageError};

use crate::entities::{ChannelTypeDb, DeliveryAttemptEntity, DeliveryOutcomeDb};

/// Repository for delivery attempt operations.
#[derive(Clone)]
pub struct DeliveryAttemptRepository {
    pool: PgPool,
}

impl DeliveryAttemptRepository {
    /// Creates a new delivery attempt repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeliveryStore for DeliveryAttemptRepository {
    async fn record(&self, attempt: NewDeliveryAttempt) -> Result<DeliveryAttempt, StorageError> {
        let entity = sqlx::query_as::<_, DeliveryAttemptEntity>(
            r#"
            INSERT INTO delivery_attempts
                (definition_id, project_id, recipient, subject, body, channel, outcome, error_detail)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, attempt_id, definition_id, project_id, recipient, subject, body,
                      channel, outcome, error_detail, created_at
            "#,
        )
        .bind(attempt.definition_id)
        .bind(attempt.project_id)
        .bind(&attempt.recipient)
        .bind(&attempt.subject)
        .bind(&attempt.body)
        .bind(ChannelTypeDb::from(attempt.channel))
        .bind(DeliveryOutcomeDb::from(attempt.outcome))
        .bind(attempt.error_detail.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    async fn history(
        &self,
        definition_id: Uuid,
        limit: i64,
        before: Option<(DateTime<Utc>, Uuid)>,
    ) -> Result<Vec<DeliveryAttempt>, StorageError> {
        let (cursor_ts, cursor_id) = match before {
            Some((ts, id)) => (Some(ts), Some(id)),
            None => (None, None),
        };

        let entities = sqlx::query_as::<_, DeliveryAttemptEntity>(
            r#"
            SELECT id, attempt_id, definition_id, project_id, recipient, subject, body,
                   channel, outcome, error_detail, created_at
            FROM delivery_attempts
            WHERE definition_id = $1
              AND ($2::timestamptz IS NULL OR (created_at, attempt_id) < ($2::timestamptz, $3::uuid))
            ORDER BY created_at DESC, attempt_id DESC
            LIMIT $4
            "#,
        )
        .bind(definition_id)
        .bind(cursor_ts)
        .bind(cursor_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    async fn last_outcome(
        &self,
        definition_id: Uuid,
        recipient: &str,
    ) -> Result<Option<DeliveryAttempt>, StorageError> {
        let entity = sqlx::query_as::<_, DeliveryAttemptEntity>(
            r#"
            SELECT id, attempt_id, definition_id, project_id, recipient, subject, body,
                   channel, outcome, error_detail, created_at
            FROM delivery_attempts
            WHERE definition_id = $1 AND recipient = $2
            ORDER BY created_at DESC, attempt_id DESC
            LIMIT 1
            "#,
        )
        .bind(definition_id)
        .bind(recipient)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }
}
