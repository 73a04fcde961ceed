//! HTTP middleware components.

pub mod auth;
pub mod logging;
pub mod metrics;

pub use auth::require_project_auth;
pub use metrics::{init_metrics, metrics_handler, metrics_middleware};
