//! # CarrierLink Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - SQLite persistence for subscriptions and transactions
//! - The traced reqwest executor and the upstream login clients
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `carrierlink-core`
//! - Contains all "impure" code (network, disk, environment)

pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use auth::{CarrierLoginClient, GatewayLoginClient};
pub use database::{DbManager, SqliteSubscriptionRepository, SqliteTransactionRepository};
pub use errors::InfraError;
pub use http::{HttpClient, RequestTiming, TracedHttpExecutor};
pub use observability::{init_tracing, HttpMetrics, HttpMetricsSnapshot};
