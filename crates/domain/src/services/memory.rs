//! In-memory store implementation.
//!
//! Backs the dispatch-service unit tests and local experimentation. A single
//! mutex serializes all access, which also makes `submit_or_get` atomic the
//! same way the database unique index does.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::{
    DeliveryAttempt, NewDeliveryAttempt, NewProject, NewTemplate, NotificationDefinition, Project,
    Template, TemplateUpdate,
};
use crate::services::store::{
    DefinitionStore, DeliveryStore, ProjectStore, StorageError, TemplateStore,
};

#[derive(Default)]
struct Inner {
    projects: Vec<Project>,
    templates: Vec<Template>,
    definitions: Vec<NotificationDefinition>,
    attempts: Vec<DeliveryAttempt>,
}

/// In-memory implementation of all storage traits.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store lock poisoned")
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn insert(&self, project: NewProject) -> Result<Project, StorageError> {
        let now = Utc::now();
        let row = Project {
            id: Uuid::new_v4(),
            owner_user_id: project.owner_user_id,
            name: project.name,
            api_key_hash: project.api_key_hash,
            api_key_prefix: project.api_key_prefix,
            created_at: now,
            updated_at: now,
        };
        let mut inner = self.lock();
        if inner.projects.iter().any(|p| p.api_key_hash == row.api_key_hash) {
            return Err(StorageError::new("duplicate api key hash"));
        }
        inner.projects.push(row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, project_id: Uuid) -> Result<Option<Project>, StorageError> {
        Ok(self.lock().projects.iter().find(|p| p.id == project_id).cloned())
    }

    async fn find_by_key_hash(&self, key_hash: &str) -> Result<Option<Project>, StorageError> {
        Ok(self
            .lock()
            .projects
            .iter()
            .find(|p| p.api_key_hash == key_hash)
            .cloned())
    }

    async fn list_by_owner(&self, owner_user_id: Uuid) -> Result<Vec<Project>, StorageError> {
        Ok(self
            .lock()
            .projects
            .iter()
            .filter(|p| p.owner_user_id == owner_user_id)
            .cloned()
            .collect())
    }

    async fn rotate_key(
        &self,
        project_id: Uuid,
        new_hash: &str,
        new_prefix: &str,
    ) -> Result<bool, StorageError> {
        let mut inner = self.lock();
        match inner.projects.iter_mut().find(|p| p.id == project_id) {
            Some(p) => {
                p.api_key_hash = new_hash.to_string();
                p.api_key_prefix = new_prefix.to_string();
                p.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, project_id: Uuid) -> Result<bool, StorageError> {
        let mut inner = self.lock();
        let before = inner.projects.len();
        inner.projects.retain(|p| p.id != project_id);
        let deleted = inner.projects.len() < before;
        if deleted {
            // Cascade to owned definitions
            inner.definitions.retain(|d| d.project_id != project_id);
        }
        Ok(deleted)
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn insert(&self, template: NewTemplate) -> Result<Template, StorageError> {
        let now = Utc::now();
        let row = Template {
            id: Uuid::new_v4(),
            owner_user_id: template.owner_user_id,
            title: template.title,
            subject: template.subject,
            body: template.body,
            channel: template.channel,
            created_at: now,
            updated_at: now,
        };
        self.lock().templates.push(row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, template_id: Uuid) -> Result<Option<Template>, StorageError> {
        Ok(self
            .lock()
            .templates
            .iter()
            .find(|t| t.id == template_id)
            .cloned())
    }

    async fn list_by_owner(&self, owner_user_id: Uuid) -> Result<Vec<Template>, StorageError> {
        Ok(self
            .lock()
            .templates
            .iter()
            .filter(|t| t.owner_user_id == owner_user_id)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        template_id: Uuid,
        update: TemplateUpdate,
    ) -> Result<Option<Template>, StorageError> {
        let mut inner = self.lock();
        match inner.templates.iter_mut().find(|t| t.id == template_id) {
            Some(t) => {
                if let Some(title) = update.title {
                    t.title = title;
                }
                if let Some(subject) = update.subject {
                    t.subject = subject;
                }
                if let Some(body) = update.body {
                    t.body = body;
                }
                if let Some(channel) = update.channel {
                    t.channel = channel;
                }
                t.updated_at = Utc::now();
                Ok(Some(t.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, template_id: Uuid) -> Result<bool, StorageError> {
        let mut inner = self.lock();
        let before = inner.templates.len();
        inner.templates.retain(|t| t.id != template_id);
        let deleted = inner.templates.len() < before;
        if deleted {
            // Null out references; definitions survive template deletion
            for d in inner
                .definitions
                .iter_mut()
                .filter(|d| d.template_id == Some(template_id))
            {
                d.template_id = None;
                d.updated_at = Utc::now();
            }
        }
        Ok(deleted)
    }
}

#[async_trait]
impl DefinitionStore for MemoryStore {
    async fn submit_or_get(
        &self,
        project_id: Uuid,
        title: &str,
        external_id: &str,
    ) -> Result<(NotificationDefinition, bool), StorageError> {
        let mut inner = self.lock();
        if let Some(existing) = inner
            .definitions
            .iter()
            .find(|d| d.project_id == project_id && d.external_id == external_id)
        {
            return Ok((existing.clone(), false));
        }

        let now = Utc::now();
        let row = NotificationDefinition {
            id: Uuid::new_v4(),
            project_id,
            title: title.to_string(),
            external_id: external_id.to_string(),
            template_id: None,
            created_at: now,
            updated_at: now,
        };
        inner.definitions.push(row.clone());
        Ok((row, true))
    }

    async fn find_by_id(
        &self,
        definition_id: Uuid,
    ) -> Result<Option<NotificationDefinition>, StorageError> {
        Ok(self
            .lock()
            .definitions
            .iter()
            .find(|d| d.id == definition_id)
            .cloned())
    }

    async fn bind_template(
        &self,
        definition_id: Uuid,
        template_id: Uuid,
    ) -> Result<bool, StorageError> {
        let mut inner = self.lock();
        match inner.definitions.iter_mut().find(|d| d.id == definition_id) {
            Some(d) => {
                d.template_id = Some(template_id);
                d.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_by_project(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<NotificationDefinition>, StorageError> {
        // Insertion order is creation order
        Ok(self
            .lock()
            .definitions
            .iter()
            .filter(|d| d.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, definition_id: Uuid) -> Result<bool, StorageError> {
        let mut inner = self.lock();
        let before = inner.definitions.len();
        inner.definitions.retain(|d| d.id != definition_id);
        Ok(inner.definitions.len() < before)
    }
}

#[async_trait]
impl DeliveryStore for MemoryStore {
    async fn record(&self, attempt: NewDeliveryAttempt) -> Result<DeliveryAttempt, StorageError> {
        let row = DeliveryAttempt {
            id: Uuid::new_v4(),
            definition_id: attempt.definition_id,
            project_id: attempt.project_id,
            recipient: attempt.recipient,
            subject: attempt.subject,
            body: attempt.body,
            channel: attempt.channel,
            outcome: attempt.outcome,
            error_detail: attempt.error_detail,
            created_at: Utc::now(),
        };
        self.lock().attempts.push(row.clone());
        Ok(row)
    }

    async fn history(
        &self,
        definition_id: Uuid,
        limit: i64,
        before: Option<(DateTime<Utc>, Uuid)>,
    ) -> Result<Vec<DeliveryAttempt>, StorageError> {
        let inner = self.lock();
        let attempts = inner
            .attempts
            .iter()
            .rev()
            .filter(|a| a.definition_id == definition_id)
            .filter(|a| match before {
                Some((ts, id)) => a.created_at < ts || (a.created_at == ts && a.id < id),
                None => true,
            })
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok(attempts)
    }

    async fn last_outcome(
        &self,
        definition_id: Uuid,
        recipient: &str,
    ) -> Result<Option<DeliveryAttempt>, StorageError> {
        Ok(self
            .lock()
            .attempts
            .iter()
            .rev()
            .find(|a| a.definition_id == definition_id && a.recipient == recipient)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChannelType, DeliveryOutcome};

    fn new_project(name: &str) -> NewProject {
        NewProject {
            owner_user_id: Uuid::new_v4(),
            name: name.to_string(),
            api_key_hash: format!("hash-{}", name),
            api_key_prefix: "abcdefgh".to_string(),
        }
    }

    #[tokio::test]
    async fn test_project_insert_and_key_lookup() {
        let store = MemoryStore::new();
        let project = ProjectStore::insert(&store, new_project("p1")).await.unwrap();

        let found = store.find_by_key_hash("hash-p1").await.unwrap();
        assert_eq!(found.unwrap().id, project.id);

        let miss = store.find_by_key_hash("hash-other").await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_rotate_key_swaps_hash() {
        let store = MemoryStore::new();
        let project = ProjectStore::insert(&store, new_project("p1")).await.unwrap();

        let rotated = store
            .rotate_key(project.id, "new-hash", "newprefx")
            .await
            .unwrap();
        assert!(rotated);

        assert!(store.find_by_key_hash("hash-p1").await.unwrap().is_none());
        assert!(store.find_by_key_hash("new-hash").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_rotate_key_missing_project() {
        let store = MemoryStore::new();
        let rotated = store
            .rotate_key(Uuid::new_v4(), "h", "p")
            .await
            .unwrap();
        assert!(!rotated);
    }

    #[tokio::test]
    async fn test_submit_or_get_idempotent_first_write_wins() {
        let store = MemoryStore::new();
        let project_id = Uuid::new_v4();

        let (first, is_new) = store
            .submit_or_get(project_id, "title1", "ext-1")
            .await
            .unwrap();
        assert!(is_new);

        let (second, is_new) = store
            .submit_or_get(project_id, "title2", "ext-1")
            .await
            .unwrap();
        assert!(!is_new);
        assert_eq!(second.id, first.id);
        assert_eq!(second.title, "title1");
    }

    #[tokio::test]
    async fn test_submit_or_get_scoped_per_project() {
        let store = MemoryStore::new();
        let (a, _) = store
            .submit_or_get(Uuid::new_v4(), "t", "ext-1")
            .await
            .unwrap();
        let (b, is_new) = store
            .submit_or_get(Uuid::new_v4(), "t", "ext-1")
            .await
            .unwrap();
        assert!(is_new);
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_project_delete_cascades_definitions() {
        let store = MemoryStore::new();
        let project = ProjectStore::insert(&store, new_project("p1")).await.unwrap();
        let (definition, _) = store
            .submit_or_get(project.id, "t", "ext-1")
            .await
            .unwrap();

        assert!(ProjectStore::delete(&store, project.id).await.unwrap());
        assert!(DefinitionStore::find_by_id(&store, definition.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_template_delete_nulls_definition_reference() {
        let store = MemoryStore::new();
        let template = TemplateStore::insert(
            &store,
            NewTemplate {
                owner_user_id: Uuid::new_v4(),
                title: "welcome".to_string(),
                subject: "Hi".to_string(),
                body: "Hello {{name}}".to_string(),
                channel: ChannelType::Email,
            },
        )
        .await
        .unwrap();

        let project_id = Uuid::new_v4();
        let (definition, _) = store
            .submit_or_get(project_id, "t", "ext-1")
            .await
            .unwrap();
        assert!(store
            .bind_template(definition.id, template.id)
            .await
            .unwrap());

        assert!(TemplateStore::delete(&store, template.id).await.unwrap());

        let definition = DefinitionStore::find_by_id(&store, definition.id)
            .await
            .unwrap()
            .unwrap();
        assert!(definition.template_id.is_none());
    }

    #[tokio::test]
    async fn test_list_by_project_creation_order() {
        let store = MemoryStore::new();
        let project_id = Uuid::new_v4();
        store.submit_or_get(project_id, "a", "ext-a").await.unwrap();
        store.submit_or_get(project_id, "b", "ext-b").await.unwrap();
        store.submit_or_get(project_id, "c", "ext-c").await.unwrap();

        let list = store.list_by_project(project_id).await.unwrap();
        let titles: Vec<_> = list.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    fn attempt(definition_id: Uuid, recipient: &str, outcome: DeliveryOutcome) -> NewDeliveryAttempt {
        NewDeliveryAttempt {
            definition_id,
            project_id: Uuid::new_v4(),
            recipient: recipient.to_string(),
            subject: "s".to_string(),
            body: "b".to_string(),
            channel: ChannelType::Email,
            outcome,
            error_detail: None,
        }
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let store = MemoryStore::new();
        let definition_id = Uuid::new_v4();

        let first = store
            .record(attempt(definition_id, "a@b.com", DeliveryOutcome::Sent))
            .await
            .unwrap();
        let second = store
            .record(attempt(definition_id, "a@b.com", DeliveryOutcome::Failed))
            .await
            .unwrap();

        let history = store.history(definition_id, 10, None).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second.id);
        assert_eq!(history[1].id, first.id);
    }

    #[tokio::test]
    async fn test_history_respects_limit() {
        let store = MemoryStore::new();
        let definition_id = Uuid::new_v4();
        for _ in 0..5 {
            store
                .record(attempt(definition_id, "a@b.com", DeliveryOutcome::Sent))
                .await
                .unwrap();
        }
        let history = store.history(definition_id, 3, None).await.unwrap();
        assert_eq!(history.len(), 3);
    }

    #[tokio::test]
    async fn test_last_outcome_per_recipient() {
        let store = MemoryStore::new();
        let definition_id = Uuid::new_v4();

        store
            .record(attempt(definition_id, "a@b.com", DeliveryOutcome::Failed))
            .await
            .unwrap();
        let latest_a = store
            .record(attempt(definition_id, "a@b.com", DeliveryOutcome::Sent))
            .await
            .unwrap();
        store
            .record(attempt(definition_id, "c@d.com", DeliveryOutcome::Failed))
            .await
            .unwrap();

        let last = store
            .last_outcome(definition_id, "a@b.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(last.id, latest_a.id);
        assert_eq!(last.outcome, DeliveryOutcome::Sent);

        let none = store
            .last_outcome(definition_id, "nobody@x.com")
            .await
            .unwrap();
        assert!(none.is_none());
    }
}
