//! Time utilities and abstractions
//!
//! - **[`clock`]**: real and mock clocks used by expiring caches and header
//!   timestamps

pub mod clock;

pub use clock::{Clock, MockClock, SystemClock};
