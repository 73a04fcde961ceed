//! Repository for template database operations.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::{NewTemplate, Template, TemplateUpdate};
use domain::services::store::{StorageError, TemplateStore};

use crate::entities::{ChannelTypeDb, TemplateEntity};

/// Repository for template operations.
#[derive(Clone)]
pub struct TemplateRepository {
    pool: PgPool,
}

impl TemplateRepository {
    /// Creates a new template repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateStore for TemplateRepository {
    async fn insert(&self, template: NewTemplate) -> Result<Template, StorageError> {
        let entity = sqlx::query_as::<_, TemplateEntity>(
            r#"
            INSERT INTO templates (owner_user_id, title, subject, body, channel)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, template_id, owner_user_id, title, subject, body, channel,
                      created_at, updated_at
            "#,
        )
        .bind(template.owner_user_id)
        .bind(&template.title)
        .bind(&template.subject)
        .bind(&template.body)
        .bind(ChannelTypeDb::from(template.channel))
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    async fn find_by_id(&self, template_id: Uuid) -> Result<Option<Template>, StorageError> {
        let entity = sqlx::query_as::<_, TemplateEntity>(
            r#"
            SELECT id, template_id, owner_user_id, title, subject, body, channel,
                   created_at, updated_at
            FROM templates
            WHERE template_id = $1
            "#,
        )
        .bind(template_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    async fn list_by_owner(&self, owner_user_id: Uuid) -> Result<Vec<Template>, StorageError> {
        let entities = sqlx::query_as::<_, TemplateEntity>(
            r#"
            SELECT id, template_id, owner_user_id, title, subject, body, channel,
                   created_at, updated_at
            FROM templates
            WHERE owner_user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(owner_user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    async fn update(
        &self,
        template_id: Uuid,
        update: TemplateUpdate,
    ) -> Result<Option<Template>, StorageError> {
        let entity = sqlx::query_as::<_, TemplateEntity>(
            r#"
            UPDATE templates
            SET title = COALESCE($2, title),
                subject = COALESCE($3, subject),
                body = COALESCE($4, body),
                channel = COALESCE($5, channel),
                updated_at = NOW()
            WHERE template_id = $1
            RETURNING id, template_id, owner_user_id, title, subject, body, channel,
                      created_at, updated_at
            "#,
        )
        .bind(template_id)
        .bind(update.title)
        .bind(update.subject)
        .bind(update.body)
        .bind(update.channel.map(ChannelTypeDb::from))
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    async fn delete(&self, template_id: Uuid) -> Result<bool, StorageError> {
        // Definition references are nulled out by ON DELETE SET NULL;
        // the definitions themselves survive.
        let result = sqlx::query(
            r#"
            DELETE FROM templates
            WHERE template_id = $1
            "#,
        )
        .bind(template_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
