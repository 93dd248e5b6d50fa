//! # CarrierLink API
//!
//! Application layer - wiring and entry points.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - Entry points for partner commands and carrier notifications
//! - Health reporting and command logging helpers
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture
//! - The partner-facing HTTP routing layer lives outside this workspace and
//!   calls into [`AppContext`]

pub mod context;
pub mod utils;

pub use context::AppContext;
pub use utils::health::{ComponentHealth, HealthStatus};
