//! Shared runtime utilities for CarrierLink crates.
//!
//! - [`time`]: clock abstraction with a hand-driven mock for tests
//! - [`cache`]: TTL cache and its background sweeper
//! - [`error`]: lifecycle errors for background tasks

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod cache;
pub mod error;
pub mod time;

pub use cache::{CacheStats, CacheSweeper, Expiring, TtlCache};
pub use error::{CommonError, CommonResult};
pub use time::{Clock, MockClock, SystemClock};
