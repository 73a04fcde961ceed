//! Domain model types.

pub mod delivery;
pub mod notification;
pub mod project;
pub mod template;

pub use delivery::{DeliveryAttempt, DeliveryOutcome, NewDeliveryAttempt};
pub use notification::NotificationDefinition;
pub use project::{NewProject, Project};
pub use template::{ChannelType, NewTemplate, Template, TemplateUpdate};
