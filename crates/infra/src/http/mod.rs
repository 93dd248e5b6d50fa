//! Outbound HTTP: client construction, phase timing and the traced executor

pub mod client;
pub mod executor;
pub mod timing;
pub mod tls;

pub use client::{HttpClient, HttpClientBuilder};
pub use executor::TracedHttpExecutor;
pub use timing::RequestTiming;
