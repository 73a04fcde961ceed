//! Repository implementations of the domain storage traits.

pub mod delivery_attempt;
pub mod notification_definition;
pub mod project;
pub mod template;

pub use delivery_attempt::DeliveryAttemptRepository;
pub use notification_definition::NotificationDefinitionRepository;
pub use project::ProjectRepository;
pub use template::TemplateRepository;
