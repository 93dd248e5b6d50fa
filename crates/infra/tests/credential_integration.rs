//! Login clients feeding the credential cache and header builder.

use std::sync::Arc;
use std::time::Duration;

use carrierlink_common::time::{Clock, MockClock};
use carrierlink_core::{CachedCredential, CredentialCache, HeaderBuilder, SharedClock};
use carrierlink_domain::{GatewayError, LoginConfig};
use carrierlink_infra::{CarrierLoginClient, GatewayLoginClient, HttpClient};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TTL: Duration = Duration::from_secs(50 * 60);

struct Fixture {
    builder: HeaderBuilder,
    carrier: Arc<CachedCredential>,
    clock: MockClock,
}

fn fixture(server: &MockServer) -> Fixture {
    let clock = MockClock::new();
    let shared: SharedClock = Arc::new(clock.clone());
    let cache = Arc::new(CredentialCache::with_clock(Arc::clone(&shared)));
    let client = HttpClient::builder().build().expect("http client");

    let login = |route: &str| LoginConfig {
        url: format!("{}{route}", server.uri()),
        username: "user".into(),
        password: "pass".into(),
    };

    let carrier = Arc::new(CachedCredential::new(
        "carrier-token",
        Arc::clone(&cache),
        Arc::new(CarrierLoginClient::new(client.clone(), login("/oauth/token"))),
        TTL,
    ));
    let gateway = Arc::new(CachedCredential::new(
        "gateway-token",
        cache,
        Arc::new(GatewayLoginClient::new(client, login("/auth/login"))),
        TTL,
    ));

    let builder = HeaderBuilder::new(Arc::clone(&carrier), gateway, "api-key", shared);
    Fixture { builder, carrier, clock }
}

async fn mount_logins(server: &MockServer, logins: u64) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "carrier-abc"})))
        .expect(logins)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "gw-xyz"})))
        .expect(logins)
        .mount(server)
        .await;
}

#[tokio::test]
async fn headers_carry_both_tokens_and_reuse_the_cache() {
    let server = MockServer::start().await;
    mount_logins(&server, 1).await;
    let fixture = fixture(&server);

    let first = fixture.builder.build_headers("ext-1").await.unwrap();
    let second = fixture.builder.build_headers("ext-2").await.unwrap();

    assert_eq!(first.get("Authorization"), Some("Bearer carrier-abc"));
    assert_eq!(first.get("X-api-auth-token"), Some("Bearer gw-xyz"));
    assert_eq!(second.get("X-MessageID"), Some("ext-2"));
    assert_eq!(
        second.get("X-Source-Timestamp"),
        Some(fixture.clock.unix_seconds().to_string().as_str())
    );
}

#[tokio::test]
async fn expired_tokens_trigger_one_new_login_each() {
    let server = MockServer::start().await;
    mount_logins(&server, 2).await;
    let fixture = fixture(&server);

    fixture.builder.build_headers("ext-1").await.unwrap();
    fixture.clock.advance(TTL + Duration::from_secs(1));
    fixture.builder.build_headers("ext-2").await.unwrap();
    fixture.builder.build_headers("ext-3").await.unwrap();
    assert_eq!(fixture.carrier.token().await.unwrap(), "carrier-abc");
}

#[tokio::test]
async fn failed_login_surfaces_as_credential_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("auth down"))
        .mount(&server)
        .await;
    let fixture = fixture(&server);

    let err = fixture.builder.build_headers("ext-1").await.unwrap_err();
    assert!(matches!(err, GatewayError::CredentialUnavailable(_)));
}
