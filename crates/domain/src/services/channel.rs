//! Channel adapter abstraction.
//!
//! One adapter per delivery medium, selected by the dispatch service via a
//! lookup keyed on channel type. Adapters only move bytes; outcome
//! classification and audit recording stay in the dispatch service.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use crate::models::ChannelType;

/// Transport-level failure reported by a channel adapter.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("provider rejected the message: {0}")]
    Rejected(String),

    #[error("provider unreachable: {0}")]
    Unreachable(String),

    #[error("adapter not configured: {0}")]
    NotConfigured(String),
}

/// Transport adapter for one delivery medium.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// The channel this adapter serves.
    fn channel(&self) -> ChannelType;

    /// Delivers one rendered message. The dispatch service wraps this call
    /// in a bounded timeout and records the outcome either way.
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), AdapterError>;
}

/// A message captured by [`MockChannelAdapter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Mock adapter for tests.
///
/// Captures sent messages for assertions and can simulate provider failures
/// or a stalled transport.
pub struct MockChannelAdapter {
    channel: ChannelType,
    fail_with: Option<String>,
    delay: Option<Duration>,
    captured: Mutex<Vec<CapturedMessage>>,
}

impl MockChannelAdapter {
    pub fn new(channel: ChannelType) -> Self {
        Self {
            channel,
            fail_with: None,
            delay: None,
            captured: Mutex::new(Vec::new()),
        }
    }

    /// Adapter that fails every send with the given provider message.
    pub fn failing(channel: ChannelType, detail: &str) -> Self {
        Self {
            fail_with: Some(detail.to_string()),
            ..Self::new(channel)
        }
    }

    /// Adapter that sleeps before completing, for timeout tests.
    pub fn stalled(channel: ChannelType, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(channel)
        }
    }

    /// Messages successfully accepted by this adapter, in send order.
    pub fn captured(&self) -> Vec<CapturedMessage> {
        self.captured.lock().expect("mock adapter lock poisoned").clone()
    }
}

#[async_trait]
impl ChannelAdapter for MockChannelAdapter {
    fn channel(&self) -> ChannelType {
        self.channel
    }

    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), AdapterError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(detail) = &self.fail_with {
            tracing::warn!(
                recipient = %recipient,
                channel = %self.channel,
                "Mock adapter simulating provider failure"
            );
            return Err(AdapterError::Rejected(detail.clone()));
        }

        self.captured
            .lock()
            .expect("mock adapter lock poisoned")
            .push(CapturedMessage {
                recipient: recipient.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });

        Ok(())
    }
}
