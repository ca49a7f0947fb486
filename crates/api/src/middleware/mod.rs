//! HTTP middleware and process-wide observability setup.

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::{install_recorder, metrics_handler, metrics_middleware};
