//! Application context - dependency injection container

use std::sync::Arc;
use std::time::{Duration, Instant};

use carrierlink_common::cache::{CacheSweeper, Expiring};
use carrierlink_common::time::SystemClock;
use carrierlink_core::{
    CachedCredential, CredentialCache, HeaderBuilder, NotificationKind, NotificationOutcome,
    PayloadBuilder, ProvisioningService, ResponseReconciler, SharedClock,
};
use carrierlink_domain::constants::{CARRIER_TOKEN_KEY, GATEWAY_TOKEN_KEY};
use carrierlink_domain::{
    CommandKind, CommandRequest, Config, GatewayError, ProvisioningCommand, Result,
    UpstreamResponse,
};
use carrierlink_infra::{
    CarrierLoginClient, DbManager, GatewayLoginClient, HttpClient, HttpMetricsSnapshot,
    SqliteSubscriptionRepository, SqliteTransactionRepository, TracedHttpExecutor,
};
use tracing::{info, instrument, warn};

use crate::utils::health::{ComponentHealth, HealthStatus};
use crate::utils::logging::log_command_execution;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub credentials: Arc<CredentialCache>,
    pub service: Arc<ProvisioningService>,

    executor: Arc<TracedHttpExecutor>,
    sweeper: CacheSweeper,
}

impl AppContext {
    /// Build the gateway from `config` using the system clock.
    ///
    /// Opens and migrates the database and starts the credential sweeper, so
    /// this must run inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Config` for invalid configuration, a database
    /// error if the store cannot be opened, or `Internal` if the sweeper fails
    /// to start.
    pub async fn new(config: Config) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock)).await
    }

    /// Build the gateway with an explicit clock for credential expiry and
    /// header timestamps.
    ///
    /// # Errors
    ///
    /// See [`AppContext::new`].
    #[instrument(skip_all, fields(db_path = %config.database.path))]
    pub async fn with_clock(config: Config, clock: SharedClock) -> Result<Self> {
        config.validate()?;

        let db_config = config.database.clone();
        let db = tokio::task::spawn_blocking(move || -> Result<DbManager> {
            let db = DbManager::from_config(&db_config)?;
            db.run_migrations()?;
            Ok(db)
        })
        .await
        .map_err(|e| GatewayError::Internal(format!("database setup task failed: {e}")))??;
        let db = Arc::new(db);

        let credentials = Arc::new(CredentialCache::with_clock(Arc::clone(&clock)));
        let sweeper = CacheSweeper::new(
            Arc::clone(&credentials) as Arc<dyn Expiring>,
            Duration::from_secs(config.credentials.sweep_interval_seconds),
        );
        sweeper
            .start()
            .map_err(|e| GatewayError::Internal(format!("failed to start credential sweeper: {e}")))?;

        // Logins bypass the executor, which logs request bodies.
        let login_http = HttpClient::from_config(&config.http)?;
        let ttl = Duration::from_secs(config.credentials.ttl_seconds);
        let carrier = Arc::new(CachedCredential::new(
            CARRIER_TOKEN_KEY,
            Arc::clone(&credentials),
            Arc::new(CarrierLoginClient::new(login_http.clone(), config.carrier_auth.clone())),
            ttl,
        ));
        let gateway = Arc::new(CachedCredential::new(
            GATEWAY_TOKEN_KEY,
            Arc::clone(&credentials),
            Arc::new(GatewayLoginClient::new(login_http, config.gateway_auth.clone())),
            ttl,
        ));

        let headers =
            HeaderBuilder::new(carrier, gateway, config.upstream.api_key.clone(), clock);
        let payloads = PayloadBuilder::new(&config.upstream);
        let executor = Arc::new(TracedHttpExecutor::from_config(&config.http)?);

        let reconciler = ResponseReconciler::new(
            Arc::new(SqliteSubscriptionRepository::new(Arc::clone(&db))),
            Arc::new(SqliteTransactionRepository::new(Arc::clone(&db))),
            Arc::clone(&executor) as _,
        );
        let service = Arc::new(ProvisioningService::new(
            headers,
            payloads,
            Arc::clone(&executor) as _,
            reconciler,
        ));

        info!(upstream = %config.upstream.base_url, "CarrierLink context ready");

        Ok(Self { config, db, credentials, service, executor, sweeper })
    }

    /// Validate a request of `kind` from the authenticated partner
    /// `partner_id` and run it against the carrier.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a malformed request, otherwise whatever
    /// [`AppContext::handle_command`] returns.
    pub async fn handle_request(
        &self,
        partner_id: &str,
        kind: CommandKind,
        request: CommandRequest,
    ) -> Result<UpstreamResponse> {
        let command = ProvisioningCommand::from_request(kind, request)?;
        self.handle_command(partner_id, command).await
    }

    /// Run one provisioning command for `partner_id` and return the carrier's
    /// envelope. The partner identity is resolved by the caller and only
    /// travels in logs.
    ///
    /// # Errors
    ///
    /// Any `GatewayError` raised while authenticating, calling the carrier or
    /// persisting the reply.
    #[instrument(
        skip_all,
        fields(partner_id = %partner_id, external_id = %command.external_id, kind = %command.kind)
    )]
    pub async fn handle_command(
        &self,
        partner_id: &str,
        command: ProvisioningCommand,
    ) -> Result<UpstreamResponse> {
        let started = Instant::now();
        let label = command.kind.to_string();
        let external_id = command.external_id.clone();

        let result = self.service.execute(command).await;
        log_command_execution(
            &label,
            partner_id,
            &external_id,
            started.elapsed(),
            result.as_ref().map(|_| ()),
        );
        result
    }

    /// Apply an activation/deactivation notification. Failures are logged and
    /// yield `None`.
    pub async fn handle_subscription_notification(
        &self,
        raw: &str,
    ) -> Option<NotificationOutcome> {
        self.service.handle_notification(NotificationKind::Subscription, raw).await
    }

    /// Apply a charge notification. Failures are logged and yield `None`.
    pub async fn handle_charge_notification(&self, raw: &str) -> Option<NotificationOutcome> {
        self.service.handle_notification(NotificationKind::Charge, raw).await
    }

    /// Outbound HTTP counters and average phase timings.
    pub fn metrics(&self) -> HttpMetricsSnapshot {
        self.executor.metrics().snapshot()
    }

    /// Check the database, the credential sweeper and the token cache.
    pub async fn health_check(&self) -> HealthStatus {
        let db = Arc::clone(&self.db);
        let database = match tokio::task::spawn_blocking(move || db.health_check()).await {
            Ok(Ok(())) => ComponentHealth::healthy("database"),
            Ok(Err(err)) => ComponentHealth::unhealthy("database", err.to_string()),
            Err(err) => ComponentHealth::unhealthy("database", format!("health task failed: {err}")),
        };

        let sweeper = if self.sweeper.is_running() {
            ComponentHealth::healthy("credential_sweeper")
        } else {
            ComponentHealth::unhealthy("credential_sweeper", "not running")
        };

        let stats = self.credentials.stats();
        let mut cache_detail = format!("{} entries, {} expired", stats.entries, stats.expired);
        if let Some(ratio) = stats.hit_ratio() {
            cache_detail.push_str(&format!(", hit ratio {ratio:.2}"));
        }
        let cache = ComponentHealth::healthy("credential_cache").with_detail(cache_detail);

        HealthStatus::from_components(vec![database, sweeper, cache])
    }

    /// Stop background work. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the sweeper task panicked or did not stop in time.
    pub async fn shutdown(&self) -> Result<()> {
        info!("shutdown called on AppContext");

        if !self.sweeper.is_running() {
            warn!("credential sweeper already stopped");
            return Ok(());
        }

        self.sweeper
            .stop()
            .await
            .map_err(|e| GatewayError::Internal(format!("failed to stop credential sweeper: {e}")))
    }
}
