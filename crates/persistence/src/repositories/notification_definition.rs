//! Repository for notification definition database operations.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::NotificationDefinition;
use domain::services::store::{DefinitionStore, StorageError};

use crate::entities::NotificationDefinitionEntity;

/// Repository for notification definition operations.
#[derive(Clone)]
pub struct NotificationDefinitionRepository {
    pool: PgPool,
}

impl NotificationDefinitionRepository {
    /// Creates a new notification definition repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DefinitionStore for NotificationDefinitionRepository {
    async fn submit_or_get(
        &self,
        project_id: Uuid,
        title: &str,
        external_id: &str,
    ) -> Result<(NotificationDefinition, bool), StorageError> {
        // The unique index on (project_id, external_id) makes this race-safe:
        // a concurrent duplicate insert hits the conflict arm and falls
        // through to the fetch below instead of erroring.
        let inserted = sqlx::query_as::<_, NotificationDefinitionEntity>(
            r#"
            INSERT INTO notification_definitions (project_id, title, external_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (project_id, external_id) DO NOTHING
            RETURNING id, definition_id, project_id, title, external_id, template_id,
                      created_at, updated_at
            "#,
        )
        .bind(project_id)
        .bind(title)
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(entity) = inserted {
            return Ok((entity.into(), true));
        }

        let existing = sqlx::query_as::<_, NotificationDefinitionEntity>(
            r#"
            SELECT id, definition_id, project_id, title, external_id, template_id,
                   created_at, updated_at
            FROM notification_definitions
            WHERE project_id = $1 AND external_id = $2
            "#,
        )
        .bind(project_id)
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            StorageError::new("definition vanished between conflicting insert and fetch")
        })?;

        Ok((existing.into(), false))
    }

    async fn find_by_id(
        &self,
        definition_id: Uuid,
    ) -> Result<Option<NotificationDefinition>, StorageError> {
        let entity = sqlx::query_as::<_, NotificationDefinitionEntity>(
            r#"
            SELECT id, definition_id, project_id, title, external_id, template_id,
                   created_at, updated_at
            FROM notification_definitions
            WHERE definition_id = $1
            "#,
        )
        .bind(definition_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    async fn bind_template(
        &self,
        definition_id: Uuid,
        template_id: Uuid,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE notification_definitions
            SET template_id = $2,
                updated_at = NOW()
            WHERE definition_id = $1
            "#,
        )
        .bind(definition_id)
        .bind(template_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_project(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<NotificationDefinition>, StorageError> {
        let entities = sqlx::query_as::<_, NotificationDefinitionEntity>(
            r#"
            SELECT id, definition_id, project_id, title, external_id, template_id,
                   created_at, updated_at
            FROM notification_definitions
            WHERE project_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, definition_id: Uuid) -> Result<bool, StorageError> {
        let result = sqlx::query(
            r#"
            DELETE FROM notification_definitions
            WHERE definition_id = $1
            "#,
        )
        .bind(definition_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
