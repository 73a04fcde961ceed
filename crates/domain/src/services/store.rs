//! Storage capability traits.
//!
//! Each store is injected explicitly into the components that need it, so
//! the uniqueness and idempotency invariants can be exercised against the
//! in-memory implementation without a database. The PostgreSQL
//! implementations live in the persistence crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    DeliveryAttempt, NewDeliveryAttempt, NewProject, NewTemplate, NotificationDefinition, Project,
    Template, TemplateUpdate,
};

/// Opaque storage failure.
///
/// Stores never swallow backend errors; they surface here and propagate to
/// the caller, since a partially applied write would corrupt the
/// idempotency invariants.
#[derive(Debug, Error)]
#[error("storage error: {message}")]
pub struct StorageError {
    message: String,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// Store for tenant projects and their API key credentials.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn insert(&self, project: NewProject) -> Result<Project, StorageError>;

    async fn find_by_id(&self, project_id: Uuid) -> Result<Option<Project>, StorageError>;

    /// Point lookup by API key hash. Returns `None` on miss so callers can
    /// produce a generic 401 without leaking which part failed.
    async fn find_by_key_hash(&self, key_hash: &str) -> Result<Option<Project>, StorageError>;

    async fn list_by_owner(&self, owner_user_id: Uuid) -> Result<Vec<Project>, StorageError>;

    /// Replaces the key hash and prefix in a single statement, so there is
    /// no window where both the old and the new key authenticate.
    /// Returns `false` if the project does not exist.
    async fn rotate_key(
        &self,
        project_id: Uuid,
        new_hash: &str,
        new_prefix: &str,
    ) -> Result<bool, StorageError>;

    /// Deletes the project and cascades to its notification definitions.
    /// Returns `false` if the project does not exist.
    async fn delete(&self, project_id: Uuid) -> Result<bool, StorageError>;
}

/// Store for reusable message templates.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn insert(&self, template: NewTemplate) -> Result<Template, StorageError>;

    async fn find_by_id(&self, template_id: Uuid) -> Result<Option<Template>, StorageError>;

    async fn list_by_owner(&self, owner_user_id: Uuid) -> Result<Vec<Template>, StorageError>;

    /// Applies a partial update. Returns `None` if the template does not exist.
    async fn update(
        &self,
        template_id: Uuid,
        update: TemplateUpdate,
    ) -> Result<Option<Template>, StorageError>;

    /// Deletes the template and nulls out references from notification
    /// definitions (the definitions themselves survive).
    /// Returns `false` if the template does not exist.
    async fn delete(&self, template_id: Uuid) -> Result<bool, StorageError>;
}

/// Store for notification definitions.
#[async_trait]
pub trait DefinitionStore: Send + Sync {
    /// Idempotency boundary for duplicate submissions: if a definition with
    /// (project_id, external_id) already exists it is returned unchanged
    /// with `false`; otherwise one is created and returned with `true`.
    /// First write wins; the stored title is never updated by this call.
    async fn submit_or_get(
        &self,
        project_id: Uuid,
        title: &str,
        external_id: &str,
    ) -> Result<(NotificationDefinition, bool), StorageError>;

    async fn find_by_id(
        &self,
        definition_id: Uuid,
    ) -> Result<Option<NotificationDefinition>, StorageError>;

    /// Binds a template reference. Template existence is the caller's check;
    /// returns `false` if the definition does not exist.
    async fn bind_template(
        &self,
        definition_id: Uuid,
        template_id: Uuid,
    ) -> Result<bool, StorageError>;

    /// Lists a project's definitions ordered by creation time.
    async fn list_by_project(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<NotificationDefinition>, StorageError>;

    async fn delete(&self, definition_id: Uuid) -> Result<bool, StorageError>;
}

/// Append-only store for delivery attempts.
#[async_trait]
pub trait DeliveryStore: Send + Sync {
    /// Pure insert; attempts are never updated or deleted.
    async fn record(&self, attempt: NewDeliveryAttempt) -> Result<DeliveryAttempt, StorageError>;

    /// Attempts for a definition, newest first. `before` is an exclusive
    /// (created_at, id) cursor for paging into older history.
    async fn history(
        &self,
        definition_id: Uuid,
        limit: i64,
        before: Option<(DateTime<Utc>, Uuid)>,
    ) -> Result<Vec<DeliveryAttempt>, StorageError>;

    /// Most recent attempt for a (definition, recipient) pair, if any.
    async fn last_outcome(
        &self,
        definition_id: Uuid,
        recipient: &str,
    ) -> Result<Option<DeliveryAttempt>, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::new("connection refused");
        assert_eq!(err.to_string(), "storage error: connection refused");
    }

    #[test]
    fn test_storage_error_from_sqlx() {
        let err: StorageError = sqlx::Error::RowNotFound.into();
        assert!(err.to_string().contains("no rows returned"));
    }
}
