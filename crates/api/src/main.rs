//! CarrierLink gateway process
//!
//! Loads configuration, installs tracing, builds the [`AppContext`] and keeps
//! it alive until interrupted.

use anyhow::Context as _;
use carrierlink_api::AppContext;
use carrierlink_infra::{config, init_tracing};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::load().context("failed to load configuration")?;
    init_tracing(&config.logging).context("failed to install tracing subscriber")?;

    info!("CarrierLink starting...");
    let ctx = AppContext::new(config).await.context("failed to initialise gateway")?;

    let health = ctx.health_check().await;
    info!(healthy = health.is_healthy, score = health.score, "CarrierLink initialized");

    tokio::signal::ctrl_c().await.context("failed to listen for shutdown signal")?;

    let metrics = ctx.metrics();
    info!(?metrics, "Shutting down");
    ctx.shutdown().await?;
    Ok(())
}
