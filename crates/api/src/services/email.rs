//! Email channel adapter.
//!
//! Implements the email leg of the dispatch pipeline. Supported providers:
//! - `console`: Logs emails instead of sending them (development)
//! - `smtp`: Declared but pending a full SMTP client integration; fails
//!   loudly instead of pretending to deliver
//! - `sendgrid`: Sends via the SendGrid HTTP API

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::EmailConfig;
use domain::models::ChannelType;
use domain::services::channel::{AdapterError, ChannelAdapter};

/// Transport adapter for the email channel.
#[derive(Clone)]
pub struct EmailAdapter {
    config: Arc<EmailConfig>,
    client: reqwest::Client,
}

impl EmailAdapter {
    /// Creates a new EmailAdapter with the given configuration.
    ///
    /// The HTTP client carries no timeout of its own; the dispatch service
    /// bounds every send call.
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config: Arc::new(config),
            client: reqwest::Client::new(),
        }
    }

    /// Console provider - logs the email instead of sending (development).
    fn send_console(&self, recipient: &str, subject: &str, body: &str) -> Result<(), AdapterError> {
        info!(
            to = %recipient,
            subject = %subject,
            from = %self.config.sender_email,
            from_name = %self.config.sender_name,
            "Email (console provider)"
        );
        info!(body = %body, "Email body");
        Ok(())
    }

    /// SendGrid provider - sends via the SendGrid HTTP API.
    async fn send_sendgrid(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), AdapterError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(AdapterError::NotConfigured(
                "sendgrid api key is not set".to_string(),
            ));
        }

        let payload = serde_json::json!({
            "personalizations": [{
                "to": [{ "email": recipient }]
            }],
            "from": {
                "email": self.config.sender_email,
                "name": self.config.sender_name
            },
            "subject": subject,
            "content": [{
                "type": "text/plain",
                "value": body
            }]
        });

        let response = self
            .client
            .post("https://api.sendgrid.com/v3/mail/send")
            .header(
                "Authorization",
                format!("Bearer {}", self.config.sendgrid_api_key),
            )
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| AdapterError::Unreachable(format!("SendGrid request failed: {}", e)))?;

        if response.status().is_success() {
            info!(to = %recipient, subject = %subject, "Email sent via SendGrid");
            Ok(())
        } else {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, error = %error_body, "SendGrid API error");
            Err(AdapterError::Rejected(format!(
                "SendGrid returned {}: {}",
                status, error_body
            )))
        }
    }
}

#[async_trait]
impl ChannelAdapter for EmailAdapter {
    fn channel(&self) -> ChannelType {
        ChannelType::Email
    }

    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), AdapterError> {
        match self.config.provider.as_str() {
            "console" => self.send_console(recipient, subject, body),
            // TODO: wire up lettre for real SMTP delivery; until then the
            // provider must fail rather than drop mail on the floor
            "smtp" => Err(AdapterError::NotConfigured(
                "smtp provider is not implemented yet".to_string(),
            )),
            "sendgrid" => self.send_sendgrid(recipient, subject, body).await,
            provider => {
                error!(provider = %provider, "Unknown email provider");
                Err(AdapterError::NotConfigured(format!(
                    "unknown email provider: {}",
                    provider
                )))
            }
        }
    }
}
