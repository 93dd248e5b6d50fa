//! Configuration loader
//!
//! Loads gateway configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Read a `.env` file into the environment if one exists
//! 2. Attempt to load from `CARRIERLINK_*` environment variables
//! 3. If incomplete, fall back to a JSON or TOML file probed in standard
//!    locations
//! 4. Validate the result
//!
//! ## Environment Variables
//! Required:
//! - `CARRIERLINK_UPSTREAM_BASE_URL`, `CARRIERLINK_CP_ID`,
//!   `CARRIERLINK_API_KEY`
//! - `CARRIERLINK_SUBSCRIPTION_NOTIFICATION_URL`,
//!   `CARRIERLINK_CHARGE_NOTIFICATION_URL`
//! - `CARRIERLINK_CARRIER_AUTH_URL`, `CARRIERLINK_CARRIER_AUTH_USERNAME`,
//!   `CARRIERLINK_CARRIER_AUTH_PASSWORD`
//! - `CARRIERLINK_GATEWAY_AUTH_URL`, `CARRIERLINK_GATEWAY_AUTH_USERNAME`,
//!   `CARRIERLINK_GATEWAY_AUTH_PASSWORD`
//!
//! Optional:
//! - `CARRIERLINK_ACCEPT_INVALID_CERTS` (true/false, default false)
//! - `CARRIERLINK_HTTP_TIMEOUT` (seconds, default unset)
//! - `CARRIERLINK_USER_AGENT`
//! - `CARRIERLINK_CREDENTIAL_TTL` (seconds, default 3000)
//! - `CARRIERLINK_SWEEP_INTERVAL` (seconds, default 60)
//! - `CARRIERLINK_DB_PATH`, `CARRIERLINK_DB_POOL_SIZE`
//! - `CARRIERLINK_LOG_LEVEL`, `CARRIERLINK_LOG_JSON`
//!
//! ## File Locations
//! `config.{json,toml}` and `carrierlink.{json,toml}` in the working
//! directory, its two parents, and the executable's directory.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use carrierlink_domain::{
    Config, CredentialCacheConfig, DatabaseConfig, GatewayError, HttpConfig, LoggingConfig,
    LoginConfig, Result, UpstreamConfig,
};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["config.json", "config.toml", "carrierlink.json", "carrierlink.toml"];

/// Load and validate configuration with automatic fallback.
///
/// # Errors
/// Returns `GatewayError::Config` if neither source yields a configuration
/// or the result fails validation.
pub fn load() -> Result<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from `CARRIERLINK_*` environment variables.
///
/// # Errors
/// Returns `GatewayError::Config` if a required variable is missing or a
/// numeric value does not parse.
pub fn load_from_env() -> Result<Config> {
    let defaults = Config::default();

    let upstream = UpstreamConfig {
        base_url: env_var("CARRIERLINK_UPSTREAM_BASE_URL")?,
        cp_id: env_var("CARRIERLINK_CP_ID")?,
        api_key: env_var("CARRIERLINK_API_KEY")?,
        subscription_notification_url: env_var("CARRIERLINK_SUBSCRIPTION_NOTIFICATION_URL")?,
        charge_notification_url: env_var("CARRIERLINK_CHARGE_NOTIFICATION_URL")?,
    };

    let carrier_auth = login_from_env("CARRIERLINK_CARRIER_AUTH")?;
    let gateway_auth = login_from_env("CARRIERLINK_GATEWAY_AUTH")?;

    let http = HttpConfig {
        accept_invalid_certs: env_bool("CARRIERLINK_ACCEPT_INVALID_CERTS", false),
        timeout_seconds: env_parse_opt("CARRIERLINK_HTTP_TIMEOUT")?,
        user_agent: std::env::var("CARRIERLINK_USER_AGENT").ok(),
    };

    let credentials = CredentialCacheConfig {
        ttl_seconds: env_parse_opt("CARRIERLINK_CREDENTIAL_TTL")?
            .unwrap_or(defaults.credentials.ttl_seconds),
        sweep_interval_seconds: env_parse_opt("CARRIERLINK_SWEEP_INTERVAL")?
            .unwrap_or(defaults.credentials.sweep_interval_seconds),
    };

    let database = DatabaseConfig {
        path: std::env::var("CARRIERLINK_DB_PATH").unwrap_or(defaults.database.path),
        pool_size: env_parse_opt("CARRIERLINK_DB_POOL_SIZE")?
            .unwrap_or(defaults.database.pool_size),
    };

    let logging = LoggingConfig {
        level: std::env::var("CARRIERLINK_LOG_LEVEL").unwrap_or(defaults.logging.level),
        json: env_bool("CARRIERLINK_LOG_JSON", defaults.logging.json),
    };

    Ok(Config { upstream, carrier_auth, gateway_auth, http, credentials, database, logging })
}

fn login_from_env(prefix: &str) -> Result<LoginConfig> {
    Ok(LoginConfig {
        url: env_var(&format!("{prefix}_URL"))?,
        username: env_var(&format!("{prefix}_USERNAME"))?,
        password: env_var(&format!("{prefix}_PASSWORD"))?,
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Format is chosen by
/// extension.
///
/// # Errors
/// Returns `GatewayError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(GatewayError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            GatewayError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| GatewayError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration text; `.toml` is TOML, anything else must be `.json`.
///
/// # Errors
/// Returns `GatewayError::Config` if the format is unsupported or invalid.
pub fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| GatewayError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| GatewayError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(GatewayError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// First existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        GatewayError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse an optional numeric environment variable
fn env_parse_opt<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| GatewayError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
