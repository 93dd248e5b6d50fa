//! Cached upstream credentials
//!
//! Each upstream identity provider gets one [`CachedCredential`]. A token is
//! served from the shared cache until its TTL elapses; the next caller then
//! logs in again. Concurrent misses on the same credential wait for a single
//! login instead of each issuing their own.

use std::sync::Arc;
use std::time::Duration;

use carrierlink_common::cache::TtlCache;
use carrierlink_common::time::Clock;
use carrierlink_domain::{GatewayError, Result};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::ports::LoginClient;

/// Clock shared by every component that reads time
pub type SharedClock = Arc<dyn Clock>;

/// Token store shared by all credentials
pub type CredentialCache = TtlCache<String, String, SharedClock>;

/// One upstream token, refreshed through its login client on miss
pub struct CachedCredential {
    key: String,
    cache: Arc<CredentialCache>,
    login: Arc<dyn LoginClient>,
    ttl: Duration,
    refresh: Mutex<()>,
}

impl CachedCredential {
    pub fn new(
        key: impl Into<String>,
        cache: Arc<CredentialCache>,
        login: Arc<dyn LoginClient>,
        ttl: Duration,
    ) -> Self {
        Self { key: key.into(), cache, login, ttl, refresh: Mutex::new(()) }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Return a live token, logging in if the cache has none.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::CredentialUnavailable` if the login fails or
    /// yields an empty token. Nothing is cached in that case.
    #[instrument(skip(self), fields(credential = %self.key))]
    pub async fn token(&self) -> Result<String> {
        if let Some(token) = self.cache.get(&self.key) {
            return Ok(token);
        }

        let _refresh = self.refresh.lock().await;

        // Another task may have refreshed while we waited.
        if let Some(token) = self.cache.get(&self.key) {
            debug!("Credential refreshed by concurrent caller");
            return Ok(token);
        }

        let token = self.login.login().await.map_err(|err| {
            warn!(provider = self.login.name(), error = %err, "Upstream login failed");
            match err {
                GatewayError::CredentialUnavailable(_) => err,
                other => GatewayError::CredentialUnavailable(format!(
                    "{} login failed: {other}",
                    self.login.name()
                )),
            }
        })?;

        if token.trim().is_empty() {
            warn!(provider = self.login.name(), "Upstream login returned an empty token");
            return Err(GatewayError::CredentialUnavailable(format!(
                "{} login returned an empty token",
                self.login.name()
            )));
        }

        self.cache.set(self.key.clone(), token.clone(), self.ttl);
        info!(provider = self.login.name(), ttl_secs = self.ttl.as_secs(), "Cached fresh credential");
        Ok(token)
    }

    /// Forget the cached token so the next call logs in again
    pub fn invalidate(&self) {
        self.cache.remove(&self.key);
    }
}

impl std::fmt::Debug for CachedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedCredential")
            .field("key", &self.key)
            .field("provider", &self.login.name())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
