//! Shared test helpers for `carrierlink-core` integration tests.
//!
//! In-memory ports and a scripted executor so the flow tests can focus on
//! behaviour instead of wiring.

#![allow(dead_code)]

pub mod http;
pub mod repositories;

use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use carrierlink_common::time::MockClock;
use carrierlink_core::{
    CachedCredential, CredentialCache, HeaderBuilder, PayloadBuilder, ProvisioningService,
    ResponseReconciler, SharedClock,
};
use carrierlink_domain::{CommandKind, ProvisioningCommand, UpstreamConfig};

pub use self::http::{FakeLogin, ScriptedExecutor};
pub use self::repositories::InMemoryStore;

pub const BASE_URL: &str = "https://carrier.test";
pub const SUBSCRIPTION_CALLBACK: &str = "https://gateway.test/notify/subscription";
pub const CHARGE_CALLBACK: &str = "https://gateway.test/notify/charge";
pub const PARTNER_CALLBACK: &str = "https://partner.test/callback";

pub fn upstream_config() -> UpstreamConfig {
    UpstreamConfig {
        base_url: BASE_URL.into(),
        cp_id: "CP01".into(),
        api_key: "api-key".into(),
        subscription_notification_url: SUBSCRIPTION_CALLBACK.into(),
        charge_notification_url: CHARGE_CALLBACK.into(),
    }
}

pub fn command(kind: CommandKind, external_id: &str) -> ProvisioningCommand {
    ProvisioningCommand {
        external_id: external_id.into(),
        msisdn: "254700000001".into(),
        offer_code: "P1".into(),
        callback_url: PARTNER_CALLBACK.into(),
        charge_amount: kind.is_charge().then(|| "10".to_string()),
        kind,
    }
}

/// Carrier reply envelope with the given body status and description
pub fn envelope(status: &str, description: &str) -> String {
    serde_json::json!({
        "header": {
            "requestRefId": "ref-1",
            "responseCode": 200,
            "responseMessage": "OK",
            "customerMessage": "",
            "timestamp": "2024-01-01T00:00:00"
        },
        "body": {"status": status, "description": description, "statusCode": "0", "data": []}
    })
    .to_string()
}

/// Everything a flow test needs, wired the way the application does it
pub struct Harness {
    pub service: ProvisioningService,
    pub store: Arc<InMemoryStore>,
    pub executor: Arc<ScriptedExecutor>,
    pub carrier_login: Arc<FakeLogin>,
    pub gateway_login: Arc<FakeLogin>,
    pub clock: MockClock,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_logins(FakeLogin::ok("carrier", "c-tok"), FakeLogin::ok("gateway", "g-tok"))
    }

    pub fn with_logins(carrier_login: Arc<FakeLogin>, gateway_login: Arc<FakeLogin>) -> Self {
        let clock = MockClock::with_wall_clock(UNIX_EPOCH + Duration::from_secs(1_700_000_000));
        let shared: SharedClock = Arc::new(clock.clone());
        let cache = Arc::new(CredentialCache::with_clock(shared.clone()));
        let ttl = Duration::from_secs(50 * 60);

        let headers = HeaderBuilder::new(
            Arc::new(CachedCredential::new("carrier-token", cache.clone(), carrier_login.clone(), ttl)),
            Arc::new(CachedCredential::new("gateway-token", cache, gateway_login.clone(), ttl)),
            "api-key",
            shared,
        );

        let store = Arc::new(InMemoryStore::default());
        let executor = Arc::new(ScriptedExecutor::default());
        let reconciler = ResponseReconciler::new(store.clone(), store.clone(), executor.clone());
        let service = ProvisioningService::new(
            headers,
            PayloadBuilder::new(&upstream_config()),
            executor.clone(),
            reconciler,
        );

        Self { service, store, executor, carrier_login, gateway_login, clock }
    }
}
