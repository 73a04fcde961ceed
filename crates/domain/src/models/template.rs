//! Template domain model.
//!
//! Templates hold reusable subject/body content with `{{variable}}`
//! placeholders. The text is opaque until rendered at dispatch time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Delivery medium for a template or dispatch request.
///
/// Only email has a transport adapter today; sms and push are declared so
/// that dispatching to them fails loudly instead of silently no-oping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    Email,
    Sms,
    Push,
}

impl ChannelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelType::Email => "email",
            ChannelType::Sms => "sms",
            ChannelType::Push => "push",
        }
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(ChannelType::Email),
            "sms" => Ok(ChannelType::Sms),
            "push" => Ok(ChannelType::Push),
            other => Err(format!("unknown channel type: {}", other)),
        }
    }
}

/// Reusable message content owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Template {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub title: String,
    /// Channel-agnostic short text; may be empty for non-email channels.
    pub subject: String,
    /// Body text, may contain `{{variable}}` placeholders.
    pub body: String,
    pub channel: ChannelType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a template.
#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub owner_user_id: Uuid,
    pub title: String,
    pub subject: String,
    pub body: String,
    pub channel: ChannelType,
}

/// Partial update of a template; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct TemplateUpdate {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub channel: Option<ChannelType>,
}

/// Request payload for creating a template.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateTemplateRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    /// Subject line; may be empty for templates targeting non-email channels.
    #[serde(default)]
    #[validate(length(max = 255, message = "Subject must be at most 255 characters"))]
    pub subject: String,

    #[validate(length(min = 1, max = 65536, message = "Body must be 1-65536 characters"))]
    pub body: String,

    pub channel: ChannelType,
}

/// Request payload for updating a template (partial update).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateTemplateRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 255, message = "Subject must be at most 255 characters"))]
    pub subject: Option<String>,

    #[validate(length(min = 1, max = 65536, message = "Body must be 1-65536 characters"))]
    pub body: Option<String>,

    pub channel: Option<ChannelType>,
}

impl From<UpdateTemplateRequest> for TemplateUpdate {
    fn from(r: UpdateTemplateRequest) -> Self {
        Self {
            title: r.title,
            subject: r.subject,
            body: r.body,
            channel: r.channel,
        }
    }
}

/// Response payload for template operations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TemplateResponse {
    pub template_id: Uuid,
    pub title: String,
    pub subject: String,
    pub body: String,
    pub channel: ChannelType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Template> for TemplateResponse {
    fn from(t: Template) -> Self {
        Self {
            template_id: t.id,
            title: t.title,
            subject: t.subject,
            body: t.body,
            channel: t.channel,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Response for listing templates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListTemplatesResponse {
    pub templates: Vec<TemplateResponse>,
    pub total: i64,
}
