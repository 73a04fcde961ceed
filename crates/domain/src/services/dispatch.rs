//! Channel dispatch service.
//!
//! Maps one dispatch request to one transport invocation and one recorded
//! delivery attempt. Each call runs `PENDING -> SENT` or `PENDING -> FAILED`;
//! no retry state is held here — a retry is a fresh call producing its own
//! attempt row.
//!
//! Ordering guarantee: the transport call completes (success, failure or
//! timeout) strictly before the attempt row is written, so the record always
//! reflects the true outcome. Precondition failures (no template bound,
//! channel mismatch, unknown channel) happen before the transport call and
//! produce no attempt row at all.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{
    ChannelType, DeliveryAttempt, DeliveryOutcome, NewDeliveryAttempt,
};
use crate::services::channel::ChannelAdapter;
use crate::services::renderer::render;
use crate::services::store::{DefinitionStore, DeliveryStore, StorageError, TemplateStore};

/// Default bound on a single transport call.
pub const DEFAULT_TRANSPORT_TIMEOUT_SECS: u64 = 10;

/// Errors surfaced by [`DispatchService::dispatch`].
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Referenced definition or template does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Setup bug: no template bound, or the template's channel does not
    /// match the requested channel. Retrying without fixing the binding
    /// fails identically.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The requested channel has no transport adapter yet.
    #[error("channel {0} has no transport adapter")]
    UnsupportedChannel(ChannelType),

    /// The transport adapter failed. The attempt is already recorded; this
    /// is the only retryable category, and each retry produces a fresh
    /// attempt row.
    #[error("delivery failed: {detail}")]
    Delivery {
        attempt_id: Uuid,
        outcome: DeliveryOutcome,
        detail: String,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The dispatch pipeline: resolve binding, render, deliver, record.
pub struct DispatchService {
    definitions: Arc<dyn DefinitionStore>,
    templates: Arc<dyn TemplateStore>,
    deliveries: Arc<dyn DeliveryStore>,
    adapters: HashMap<ChannelType, Arc<dyn ChannelAdapter>>,
    transport_timeout: Duration,
}

impl DispatchService {
    pub fn new(
        definitions: Arc<dyn DefinitionStore>,
        templates: Arc<dyn TemplateStore>,
        deliveries: Arc<dyn DeliveryStore>,
    ) -> Self {
        Self {
            definitions,
            templates,
            deliveries,
            adapters: HashMap::new(),
            transport_timeout: Duration::from_secs(DEFAULT_TRANSPORT_TIMEOUT_SECS),
        }
    }

    /// Registers the transport adapter for its channel, replacing any
    /// previous registration.
    pub fn register_adapter(mut self, adapter: Arc<dyn ChannelAdapter>) -> Self {
        self.adapters.insert(adapter.channel(), adapter);
        self
    }

    /// Overrides the bound applied to each transport call.
    pub fn with_transport_timeout(mut self, timeout: Duration) -> Self {
        self.transport_timeout = timeout;
        self
    }

    /// Dispatches one notification for `definition_id` owned by `project_id`.
    ///
    /// Exactly one delivery attempt row is written per transport invocation,
    /// whether it succeeds, fails or times out. On transport failure the
    /// attempt is recorded first and a [`DispatchError::Delivery`] carrying
    /// the attempt id is returned, so the caller can decide about retrying
    /// without a second query.
    pub async fn dispatch(
        &self,
        project_id: Uuid,
        definition_id: Uuid,
        channel: ChannelType,
        recipient: &str,
        variables: &HashMap<String, String>,
    ) -> Result<DeliveryAttempt, DispatchError> {
        let definition = self
            .definitions
            .find_by_id(definition_id)
            .await?
            .filter(|d| d.project_id == project_id)
            .ok_or_else(|| DispatchError::NotFound("Notification definition not found".into()))?;

        let template_id = definition.template_id.ok_or_else(|| {
            DispatchError::Configuration("Definition has no bound template".into())
        })?;

        let template = self
            .templates
            .find_by_id(template_id)
            .await?
            .ok_or_else(|| DispatchError::NotFound("Bound template no longer exists".into()))?;

        if template.channel != channel {
            return Err(DispatchError::Configuration(format!(
                "Template is typed for channel {} but {} was requested",
                template.channel, channel
            )));
        }

        let rendered = render(&template.subject, &template.body, variables);

        let adapter = self
            .adapters
            .get(&channel)
            .ok_or(DispatchError::UnsupportedChannel(channel))?;

        // Transport call, bounded; completes before the attempt is persisted
        let transport_result = tokio::time::timeout(
            self.transport_timeout,
            adapter.send(recipient, &rendered.subject, &rendered.body),
        )
        .await;

        let (outcome, error_detail) = match &transport_result {
            Ok(Ok(())) => (DeliveryOutcome::Sent, None),
            Ok(Err(err)) => (DeliveryOutcome::Failed, Some(err.to_string())),
            Err(_) => (
                DeliveryOutcome::Failed,
                Some(format!(
                    "transport timed out after {}s",
                    self.transport_timeout.as_secs()
                )),
            ),
        };

        let attempt = self
            .deliveries
            .record(NewDeliveryAttempt {
                definition_id: definition.id,
                project_id: definition.project_id,
                recipient: recipient.to_string(),
                subject: rendered.subject,
                body: rendered.body,
                channel,
                outcome,
                error_detail: error_detail.clone(),
            })
            .await?;

        match error_detail {
            None => {
                info!(
                    definition_id = %definition.id,
                    attempt_id = %attempt.id,
                    channel = %channel,
                    recipient = %recipient,
                    "Notification dispatched"
                );
                Ok(attempt)
            }
            Some(detail) => {
                warn!(
                    definition_id = %definition.id,
                    attempt_id = %attempt.id,
                    channel = %channel,
                    recipient = %recipient,
                    error = %detail,
                    "Notification delivery failed"
                );
                Err(DispatchError::Delivery {
                    attempt_id: attempt.id,
                    outcome,
                    detail,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTemplate, NotificationDefinition};
    use crate::services::channel::MockChannelAdapter;
    use crate::services::memory::MemoryStore;

    struct Fixture {
        store: Arc<MemoryStore>,
        definition: NotificationDefinition,
    }

    /// Creates a store holding one definition bound to an email template
    /// with body "Hello {{name}}".
    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());

        let template = TemplateStore::insert(
            store.as_ref(),
            NewTemplate {
                owner_user_id: Uuid::new_v4(),
                title: "welcome-email".to_string(),
                subject: "Welcome {{name}}".to_string(),
                body: "Hello {{name}}".to_string(),
                channel: ChannelType::Email,
            },
        )
        .await
        .unwrap();

        let project_id = Uuid::new_v4();
        let (definition, is_new) = store
            .submit_or_get(project_id, "Welcome", "user-42")
            .await
            .unwrap();
        assert!(is_new);
        store
            .bind_template(definition.id, template.id)
            .await
            .unwrap();

        let definition = DefinitionStore::find_by_id(store.as_ref(), definition.id)
            .await
            .unwrap()
            .unwrap();

        Fixture { store, definition }
    }

    fn service(store: &Arc<MemoryStore>) -> DispatchService {
        DispatchService::new(store.clone(), store.clone(), store.clone())
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_dispatch_success_end_to_end() {
        let f = fixture().await;
        let adapter = Arc::new(MockChannelAdapter::new(ChannelType::Email));
        let service = service(&f.store).register_adapter(adapter.clone());

        let attempt = service
            .dispatch(
                f.definition.project_id,
                f.definition.id,
                ChannelType::Email,
                "a@b.com",
                &vars(&[("name", "Ana")]),
            )
            .await
            .unwrap();

        assert_eq!(attempt.outcome, DeliveryOutcome::Sent);
        assert_eq!(attempt.body, "Hello Ana");
        assert_eq!(attempt.subject, "Welcome Ana");
        assert!(attempt.error_detail.is_none());

        let captured = adapter.captured();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].body, "Hello Ana");

        let history = f.store.history(f.definition.id, 10, None).await.unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_adapter_failure_records_then_raises() {
        let f = fixture().await;
        let adapter = Arc::new(MockChannelAdapter::failing(
            ChannelType::Email,
            "mailbox full",
        ));
        let service = service(&f.store).register_adapter(adapter);

        let err = service
            .dispatch(
                f.definition.project_id,
                f.definition.id,
                ChannelType::Email,
                "a@b.com",
                &vars(&[("name", "Ana")]),
            )
            .await
            .unwrap_err();

        let history = f.store.history(f.definition.id, 10, None).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].outcome, DeliveryOutcome::Failed);
        assert!(history[0]
            .error_detail
            .as_deref()
            .unwrap()
            .contains("mailbox full"));

        match err {
            DispatchError::Delivery {
                attempt_id,
                outcome,
                detail,
            } => {
                assert_eq!(attempt_id, history[0].id);
                assert_eq!(outcome, DeliveryOutcome::Failed);
                assert!(detail.contains("mailbox full"));
            }
            other => panic!("expected Delivery error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_timeout_records_failed_attempt() {
        let f = fixture().await;
        let adapter = Arc::new(MockChannelAdapter::stalled(
            ChannelType::Email,
            Duration::from_secs(30),
        ));
        let service = service(&f.store)
            .register_adapter(adapter)
            .with_transport_timeout(Duration::from_millis(50));

        let err = service
            .dispatch(
                f.definition.project_id,
                f.definition.id,
                ChannelType::Email,
                "a@b.com",
                &HashMap::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Delivery { .. }));

        let history = f.store.history(f.definition.id, 10, None).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].outcome, DeliveryOutcome::Failed);
        assert!(history[0]
            .error_detail
            .as_deref()
            .unwrap()
            .contains("timed out"));
    }

    #[tokio::test]
    async fn test_dispatch_no_bound_template_is_configuration_error() {
        let store = Arc::new(MemoryStore::new());
        let project_id = Uuid::new_v4();
        let (definition, _) = store
            .submit_or_get(project_id, "Welcome", "user-1")
            .await
            .unwrap();

        let service = service(&store)
            .register_adapter(Arc::new(MockChannelAdapter::new(ChannelType::Email)));

        let err = service
            .dispatch(
                project_id,
                definition.id,
                ChannelType::Email,
                "a@b.com",
                &HashMap::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Configuration(_)));
        // Precondition failure: no attempt row
        let history = store.history(definition.id, 10, None).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_channel_mismatch_no_attempt_row() {
        let store = Arc::new(MemoryStore::new());

        let template = TemplateStore::insert(
            store.as_ref(),
            NewTemplate {
                owner_user_id: Uuid::new_v4(),
                title: "otp-sms".to_string(),
                subject: String::new(),
                body: "Code: {{code}}".to_string(),
                channel: ChannelType::Sms,
            },
        )
        .await
        .unwrap();

        let project_id = Uuid::new_v4();
        let (definition, _) = store
            .submit_or_get(project_id, "OTP", "otp-1")
            .await
            .unwrap();
        store
            .bind_template(definition.id, template.id)
            .await
            .unwrap();

        let service = service(&store)
            .register_adapter(Arc::new(MockChannelAdapter::new(ChannelType::Email)));

        let err = service
            .dispatch(
                project_id,
                definition.id,
                ChannelType::Email,
                "a@b.com",
                &HashMap::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Configuration(_)));
        let history = store.history(definition.id, 10, None).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_unsupported_channel() {
        let store = Arc::new(MemoryStore::new());

        let template = TemplateStore::insert(
            store.as_ref(),
            NewTemplate {
                owner_user_id: Uuid::new_v4(),
                title: "otp-sms".to_string(),
                subject: String::new(),
                body: "Code: {{code}}".to_string(),
                channel: ChannelType::Sms,
            },
        )
        .await
        .unwrap();

        let project_id = Uuid::new_v4();
        let (definition, _) = store
            .submit_or_get(project_id, "OTP", "otp-1")
            .await
            .unwrap();
        store
            .bind_template(definition.id, template.id)
            .await
            .unwrap();

        // Only the email adapter is registered
        let service = service(&store)
            .register_adapter(Arc::new(MockChannelAdapter::new(ChannelType::Email)));

        let err = service
            .dispatch(
                project_id,
                definition.id,
                ChannelType::Sms,
                "+420123456789",
                &HashMap::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DispatchError::UnsupportedChannel(ChannelType::Sms)
        ));
        let history = store.history(definition.id, 10, None).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_unknown_definition() {
        let store = Arc::new(MemoryStore::new());
        let service = service(&store)
            .register_adapter(Arc::new(MockChannelAdapter::new(ChannelType::Email)));

        let err = service
            .dispatch(
                Uuid::new_v4(),
                Uuid::new_v4(),
                ChannelType::Email,
                "a@b.com",
                &HashMap::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_dispatch_wrong_project_is_not_found() {
        let f = fixture().await;
        let service = service(&f.store)
            .register_adapter(Arc::new(MockChannelAdapter::new(ChannelType::Email)));

        // Valid definition id, but a different tenant
        let err = service
            .dispatch(
                Uuid::new_v4(),
                f.definition.id,
                ChannelType::Email,
                "a@b.com",
                &HashMap::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_each_retry_appends_a_fresh_attempt() {
        let f = fixture().await;
        let adapter = Arc::new(MockChannelAdapter::failing(ChannelType::Email, "boom"));
        let service = service(&f.store).register_adapter(adapter);

        for _ in 0..3 {
            let _ = service
                .dispatch(
                    f.definition.project_id,
                    f.definition.id,
                    ChannelType::Email,
                    "a@b.com",
                    &HashMap::new(),
                )
                .await;
        }

        let history = f.store.history(f.definition.id, 10, None).await.unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.iter().all(|a| a.outcome == DeliveryOutcome::Failed));
    }

    #[tokio::test]
    async fn test_missing_variables_render_verbatim_in_attempt() {
        let f = fixture().await;
        let adapter = Arc::new(MockChannelAdapter::new(ChannelType::Email));
        let service = service(&f.store).register_adapter(adapter);

        let attempt = service
            .dispatch(
                f.definition.project_id,
                f.definition.id,
                ChannelType::Email,
                "a@b.com",
                &HashMap::new(),
            )
            .await
            .unwrap();

        assert_eq!(attempt.body, "Hello {{name}}");
        assert_eq!(attempt.outcome, DeliveryOutcome::Sent);
    }
}
