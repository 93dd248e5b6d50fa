//! Helpers shared by the application layer

pub mod health;
pub mod logging;
