//! # CarrierLink Domain
//!
//! Business domain types for the CarrierLink provisioning gateway.
//!
//! This crate contains:
//! - Provisioning commands, upstream envelopes and inbound notifications
//! - Subscription and transaction records
//! - Domain error types and Result definitions
//! - Configuration structures and wire constants
//!
//! ## Architecture
//! - No dependencies on other CarrierLink crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
