//! Repository for project database operations.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::{NewProject, Project};
use domain::services::store::{ProjectStore, StorageError};

use crate::entities::ProjectEntity;

/// Repository for project operations.
#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    /// Creates a new project repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for ProjectRepository {
    async fn insert(&self, project: NewProject) -> Result<Project, StorageError> {
        let entity = sqlx::query_as::<_, ProjectEntity>(
            r#"
            INSERT INTO projects (owner_user_id, name, api_key_hash, api_key_prefix)
            VALUES ($1, $2, $3, $4)
            RETURNING id, project_id, owner_user_id, name, api_key_hash, api_key_prefix,
                      created_at, updated_at
            "#,
        )
        .bind(project.owner_user_id)
        .bind(&project.name)
        .bind(&project.api_key_hash)
        .bind(&project.api_key_prefix)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    async fn find_by_id(&self, project_id: Uuid) -> Result<Option<Project>, StorageError> {
        let entity = sqlx::query_as::<_, ProjectEntity>(
            r#"
            SELECT id, project_id, owner_user_id, name, api_key_hash, api_key_prefix,
                   created_at, updated_at
            FROM projects
            WHERE project_id = $1
            "#,
        )
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    async fn find_by_key_hash(&self, key_hash: &str) -> Result<Option<Project>, StorageError> {
        let entity = sqlx::query_as::<_, ProjectEntity>(
            r#"
            SELECT id, project_id, owner_user_id, name, api_key_hash, api_key_prefix,
                   created_at, updated_at
            FROM projects
            WHERE api_key_hash = $1
            "#,
        )
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    async fn list_by_owner(&self, owner_user_id: Uuid) -> Result<Vec<Project>, StorageError> {
        let entities = sqlx::query_as::<_, ProjectEntity>(
            r#"
            SELECT id, project_id, owner_user_id, name, api_key_hash, api_key_prefix,
                   created_at, updated_at
            FROM projects
            WHERE owner_user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(owner_user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    async fn rotate_key(
        &self,
        project_id: Uuid,
        new_hash: &str,
        new_prefix: &str,
    ) -> Result<bool, StorageError> {
        // Single statement: the old hash stops matching the instant the new
        // one starts, so no window exists where both keys authenticate.
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET api_key_hash = $2,
                api_key_prefix = $3,
                updated_at = NOW()
            WHERE project_id = $1
            "#,
        )
        .bind(project_id)
        .bind(new_hash)
        .bind(new_prefix)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, project_id: Uuid) -> Result<bool, StorageError> {
        // Owned definitions go with the project (ON DELETE CASCADE)
        let result = sqlx::query(
            r#"
            DELETE FROM projects
            WHERE project_id = $1
            "#,
        )
        .bind(project_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
