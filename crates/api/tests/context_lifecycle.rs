mod support;

use carrierlink_api::AppContext;
use carrierlink_domain::{Config, GatewayError};
use support::{gateway_config, Harness};
use tempfile::TempDir;

#[tokio::test(flavor = "multi_thread")]
async fn context_starts_healthy_with_migrated_schema() {
    let harness = Harness::start().await;

    let health = harness.ctx.health_check().await;
    assert!(health.is_healthy, "fresh context should be healthy: {health:?}");
    assert_eq!(health.components.len(), 3);
    assert!(health.component("credential_cache").is_some());

    assert_eq!(harness.count("subscriptions"), 0);
    assert_eq!(harness.count("transactions"), 0);

    harness.ctx.shutdown().await.expect("shutdown should succeed");
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_stops_sweeper_and_is_repeatable() {
    let harness = Harness::start().await;

    harness.ctx.shutdown().await.expect("first shutdown should succeed");
    harness.ctx.shutdown().await.expect("second shutdown should be a no-op");

    let health = harness.ctx.health_check().await;
    assert!(!health.is_healthy);
    let sweeper =
        health.component("credential_sweeper").expect("sweeper component should be reported");
    assert!(!sweeper.is_healthy);
}

#[tokio::test(flavor = "multi_thread")]
async fn incomplete_config_is_rejected_before_anything_starts() {
    let temp_dir = TempDir::new().expect("temp dir should be created");
    let mut config = gateway_config("https://carrier.test", &temp_dir);
    config.upstream.api_key.clear();

    let err = AppContext::new(config).await.err().expect("context should not build");
    assert!(matches!(err, GatewayError::Config(ref msg) if msg.contains("api_key")));
    assert!(!temp_dir.path().join("carrierlink.db").exists());

    let err = AppContext::new(Config::default()).await.err().expect("defaults are incomplete");
    assert!(matches!(err, GatewayError::Config(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn metrics_start_at_zero() {
    let harness = Harness::start().await;

    let metrics = harness.ctx.metrics();
    assert_eq!(metrics.requests, 0);
    assert_eq!(metrics.successes, 0);

    harness.ctx.shutdown().await.expect("shutdown should succeed");
}
