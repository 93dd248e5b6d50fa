//! Upstream identity providers

pub mod login;

pub use login::{CarrierLoginClient, GatewayLoginClient};
