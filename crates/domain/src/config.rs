//! Configuration structures
//!
//! Loaded by `carrierlink-infra::config`; every section has defaults so that
//! partial JSON/TOML files deserialize.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    DEFAULT_CREDENTIAL_TTL_SECS, DEFAULT_DB_POOL_SIZE, DEFAULT_SWEEP_INTERVAL_SECS,
};
use crate::{GatewayError, Result};

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub carrier_auth: LoginConfig,
    #[serde(default)]
    pub gateway_auth: LoginConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub credentials: CredentialCacheConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Carrier provisioning API settings
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL; endpoints are `{base_url}/api/v1/{operation}`
    pub base_url: String,
    /// Content provider id sent as `CpId`
    pub cp_id: String,
    /// Value of the `X-Api-Key` header
    pub api_key: String,
    /// Where the carrier posts activation/deactivation results
    pub subscription_notification_url: String,
    /// Where the carrier posts charge results
    pub charge_notification_url: String,
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("cp_id", &self.cp_id)
            .field("api_key", &"[REDACTED]")
            .field("subscription_notification_url", &self.subscription_notification_url)
            .field("charge_notification_url", &self.charge_notification_url)
            .finish()
    }
}

/// Login endpoint and account for one upstream identity provider
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    pub url: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Outbound transport settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Skip TLS certificate validation for upstream calls. Off unless the
    /// deployment explicitly opts in.
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Whole-request timeout; `None` leaves the transport default in place.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Credential cache tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialCacheConfig {
    /// TTL applied to freshly obtained tokens
    #[serde(default = "default_credential_ttl")]
    pub ttl_seconds: u64,
    /// Interval of the background expiry sweep
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl Default for CredentialCacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_CREDENTIAL_TTL_SECS,
            sweep_interval_seconds: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

/// SQLite settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: default_database_path(), pool_size: DEFAULT_DB_POOL_SIZE }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG` when set
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), json: false }
    }
}

fn default_credential_ttl() -> u64 {
    DEFAULT_CREDENTIAL_TTL_SECS
}

fn default_sweep_interval() -> u64 {
    DEFAULT_SWEEP_INTERVAL_SECS
}

fn default_database_path() -> String {
    "carrierlink.db".to_string()
}

fn default_pool_size() -> u32 {
    DEFAULT_DB_POOL_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Check that the values the core depends on are present and well formed.
    ///
    /// # Errors
    /// Returns `GatewayError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        require_url("upstream.base_url", &self.upstream.base_url)?;
        require_url(
            "upstream.subscription_notification_url",
            &self.upstream.subscription_notification_url,
        )?;
        require_url("upstream.charge_notification_url", &self.upstream.charge_notification_url)?;
        require_value("upstream.cp_id", &self.upstream.cp_id)?;
        require_value("upstream.api_key", &self.upstream.api_key)?;

        for (name, login) in [("carrier_auth", &self.carrier_auth), ("gateway_auth", &self.gateway_auth)]
        {
            require_url(&format!("{name}.url"), &login.url)?;
            require_value(&format!("{name}.username"), &login.username)?;
            require_value(&format!("{name}.password"), &login.password)?;
        }

        if self.credentials.ttl_seconds == 0 {
            return Err(GatewayError::Config("credentials.ttl_seconds must be positive".into()));
        }
        if self.credentials.sweep_interval_seconds == 0 {
            return Err(GatewayError::Config(
                "credentials.sweep_interval_seconds must be positive".into(),
            ));
        }
        require_value("database.path", &self.database.path)?;

        Ok(())
    }
}

fn require_value(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GatewayError::Config(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_url(field: &str, value: &str) -> Result<()> {
    require_value(field, value)?;
    let url = Url::parse(value)
        .map_err(|e| GatewayError::Config(format!("{field} is not a valid URL ({e}): {value}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(GatewayError::Config(format!("{field} is not an http(s) URL: {value}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let login = LoginConfig {
            url: "https://auth.example.com/token".into(),
            username: "user".into(),
            password: "secret".into(),
        };
        Config {
            upstream: UpstreamConfig {
                base_url: "https://carrier.example.com".into(),
                cp_id: "CP01".into(),
                api_key: "key".into(),
                subscription_notification_url: "https://gw.example.com/notify/subscription".into(),
                charge_notification_url: "https://gw.example.com/notify/charge".into(),
            },
            carrier_auth: login.clone(),
            gateway_auth: login,
            ..Config::default()
        }
    }

    #[test]
    fn defaults_match_token_lifetimes() {
        let config = Config::default();
        assert_eq!(config.credentials.ttl_seconds, 50 * 60);
        assert_eq!(config.credentials.sweep_interval_seconds, 60);
        assert!(!config.http.accept_invalid_certs);
        assert!(config.http.timeout_seconds.is_none());
    }

    #[test]
    fn validate_accepts_complete_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_password() {
        let mut config = valid_config();
        config.gateway_auth.password.clear();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, GatewayError::Config(msg) if msg.contains("gateway_auth.password")));
    }

    #[test]
    fn validate_rejects_non_http_base_url() {
        let mut config = valid_config();
        config.upstream.base_url = "ftp://carrier".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unparseable_notification_url() {
        let mut config = valid_config();
        config.upstream.charge_notification_url = "https://".into();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, GatewayError::Config(msg) if msg.contains("charge_notification_url")));
    }

    #[test]
    fn partial_sections_deserialize_with_defaults() {
        let config: Config = serde_json::from_str(
            r#"{
                "upstream": {"base_url": "https://carrier.example.com"},
                "carrier_auth": {"username": "user"},
                "database": {"pool_size": 2}
            }"#,
        )
        .unwrap();

        assert_eq!(config.upstream.base_url, "https://carrier.example.com");
        assert!(config.upstream.api_key.is_empty());
        assert_eq!(config.carrier_auth.username, "user");
        assert!(config.carrier_auth.url.is_empty());
        assert_eq!(config.database.path, "carrierlink.db");
        assert_eq!(config.database.pool_size, 2);
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = valid_config();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
