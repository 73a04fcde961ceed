//! Database entity definitions.

pub mod delivery_attempt;
pub mod notification_definition;
pub mod project;
pub mod template;

pub use delivery_attempt::{DeliveryAttemptEntity, DeliveryOutcomeDb};
pub use notification_definition::NotificationDefinitionEntity;
pub use project::ProjectEntity;
pub use template::{ChannelTypeDb, TemplateEntity};
