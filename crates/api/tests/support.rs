#![allow(dead_code)]

use std::sync::Arc;

use carrierlink_api::AppContext;
use carrierlink_common::time::MockClock;
use carrierlink_domain::{
    CommandKind, Config, CredentialCacheConfig, DatabaseConfig, LoginConfig, ProvisioningCommand,
    UpstreamConfig,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CARRIER_TOKEN: &str = "carrier-abc";
pub const GATEWAY_TOKEN: &str = "gw-xyz";
pub const SUBSCRIPTION_NOTIFY_URL: &str = "https://gateway.test/notify/subscription";
pub const CHARGE_NOTIFY_URL: &str = "https://gateway.test/notify/charge";
pub const PARTNER_ID: &str = "partner-42";

/// Gateway wired against mock carrier and partner servers with a temporary
/// database. Everything is torn down when the value drops.
pub struct Harness {
    pub ctx: AppContext,
    pub carrier: MockServer,
    pub partner: MockServer,
    pub clock: MockClock,
    _temp_dir: TempDir,
}

pub fn gateway_config(carrier_uri: &str, temp_dir: &TempDir) -> Config {
    let login = |route: &str| LoginConfig {
        url: format!("{carrier_uri}{route}"),
        username: "gateway".into(),
        password: "secret".into(),
    };

    Config {
        upstream: UpstreamConfig {
            base_url: carrier_uri.to_string(),
            cp_id: "CP01".into(),
            api_key: "api-key".into(),
            subscription_notification_url: SUBSCRIPTION_NOTIFY_URL.into(),
            charge_notification_url: CHARGE_NOTIFY_URL.into(),
        },
        carrier_auth: login("/oauth/token"),
        gateway_auth: login("/auth/login"),
        credentials: CredentialCacheConfig { ttl_seconds: 3000, sweep_interval_seconds: 60 },
        database: DatabaseConfig {
            path: temp_dir.path().join("carrierlink.db").to_string_lossy().into_owned(),
            pool_size: 4,
        },
        ..Config::default()
    }
}

impl Harness {
    pub async fn start() -> Self {
        let carrier = MockServer::start().await;
        let partner = MockServer::start().await;
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let clock = MockClock::new();

        let ctx = AppContext::with_clock(gateway_config(&carrier.uri(), &temp_dir), Arc::new(clock.clone()))
            .await
            .expect("context should build");

        Self { ctx, carrier, partner, clock, _temp_dir: temp_dir }
    }

    /// Mount both login endpoints, each expected to be hit `times` times.
    pub async fn mount_logins(&self, times: u64) {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": CARRIER_TOKEN})))
            .expect(times)
            .mount(&self.carrier)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": GATEWAY_TOKEN})))
            .expect(times)
            .mount(&self.carrier)
            .await;
    }

    pub fn partner_url(&self, route: &str) -> String {
        format!("{}{route}", self.partner.uri())
    }

    pub fn count(&self, table: &str) -> i64 {
        let conn = self.ctx.db.get_connection().expect("connection should be available");
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .expect("count query should succeed")
    }

    pub fn status_of(&self, table: &str, external_id: &str) -> (String, String) {
        let conn = self.ctx.db.get_connection().expect("connection should be available");
        conn.query_row(
            &format!("SELECT status, status_description FROM {table} WHERE external_id = ?1"),
            [external_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("row should exist")
    }
}

/// Carrier reply envelope with the given body status and description.
pub fn envelope(status: &str, description: &str) -> Value {
    json!({
        "header": {
            "requestRefId": "ref-1",
            "responseCode": 200,
            "responseMessage": "Success",
            "customerMessage": "",
            "timestamp": "2024-01-01T00:00:00Z"
        },
        "body": {"status": status, "description": description, "statusCode": "0", "data": []}
    })
}

pub fn command(kind: CommandKind, external_id: &str, callback_url: &str) -> ProvisioningCommand {
    ProvisioningCommand {
        external_id: external_id.into(),
        msisdn: "254700000001".into(),
        offer_code: "P1".into(),
        callback_url: callback_url.into(),
        charge_amount: kind.is_charge().then(|| "10".to_string()),
        kind,
    }
}
