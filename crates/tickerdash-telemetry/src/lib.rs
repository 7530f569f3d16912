//! Prometheus metrics and structured logging for tickerdash.
//!
//! - Structured logging with tracing (pretty in development, JSON in production)
//! - Prometheus counters for REST calls, push events, and layout saves

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
