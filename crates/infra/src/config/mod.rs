//! Configuration loading
//!
//! The configuration types live in `carrierlink-domain`; this module finds
//! and parses them.

pub mod loader;

pub use loader::{load, load_from_env, load_from_file, parse_config, probe_config_paths};
