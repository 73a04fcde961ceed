//! Domain services.

pub mod channel;
pub mod dispatch;
pub mod memory;
pub mod renderer;
pub mod store;

pub use channel::{AdapterError, ChannelAdapter};
pub use dispatch::{DispatchError, DispatchService};
pub use store::{DefinitionStore, DeliveryStore, ProjectStore, StorageError, TemplateStore};
