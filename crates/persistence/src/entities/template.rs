//! Template entity definitions.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{ChannelType, Template};

/// Database enum for the channel_type Postgres type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "channel_type", rename_all = "lowercase")]
pub enum ChannelTypeDb {
    Email,
    Sms,
    Push,
}

impl From<ChannelTypeDb> for ChannelType {
    fn from(c: ChannelTypeDb) -> Self {
        match c {
            ChannelTypeDb::Email => ChannelType::Email,
            ChannelTypeDb::Sms => ChannelType::Sms,
            ChannelTypeDb::Push => ChannelType::Push,
        }
    }
}

impl From<ChannelType> for ChannelTypeDb {
    fn from(c: ChannelType) -> Self {
        match c {
            ChannelType::Email => ChannelTypeDb::Email,
            ChannelType::Sms => ChannelTypeDb::Sms,
            ChannelType::Push => ChannelTypeDb::Push,
        }
    }
}

/// Database entity for the templates table.
#[derive(Debug, Clone, FromRow)]
pub struct TemplateEntity {
    pub id: i64,
    pub template_id: Uuid,
    pub owner_user_id: Uuid,
    pub title: String,
    pub subject: String,
    pub body: String,
    pub channel: ChannelTypeDb,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TemplateEntity> for Template {
    fn from(e: TemplateEntity) -> Self {
        Self {
            id: e.template_id,
            owner_user_id: e.owner_user_id,
            title: e.title,
            subject: e.subject,
            body: e.body,
            channel: e.channel.into(),
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_type_db_round_trip() {
        for channel in [ChannelType::Email, ChannelType::Sms, ChannelType::Push] {
            let db: ChannelTypeDb = channel.into();
            let back: ChannelType = db.into();
            assert_eq!(back, channel);
        }
    }

    #[test]
    fn test_entity_to_domain_conversion() {
        let entity = TemplateEntity {
            id: 1,
            template_id: Uuid::new_v4(),
            owner_user_id: Uuid::new_v4(),
            title: "welcome-email".to_string(),
            subject: "Welcome".to_string(),
            body: "Hello {{name}}".to_string(),
            channel: ChannelTypeDb::Email,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let expected_id = entity.template_id;
        let template: Template = entity.into();
        assert_eq!(template.id, expected_id);
        assert_eq!(template.channel, ChannelType::Email);
        assert_eq!(template.body, "Hello {{name}}");
    }
}
