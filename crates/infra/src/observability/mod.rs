//! Observability for the gateway's infrastructure
//!
//! - [`HttpMetrics`]: lock-free counters and phase timings for outbound calls
//! - [`init_tracing`]: process-wide `tracing` subscriber setup

pub mod logging;
pub mod metrics;

pub use logging::init_tracing;
pub use metrics::{HttpMetrics, HttpMetricsSnapshot};
