//! Telemetry: logging setup and counter primitives.

mod logging;
mod metrics;

pub use logging::{init_logging, LogConfig};
pub use metrics::Counter;
