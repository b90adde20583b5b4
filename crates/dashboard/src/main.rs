//! RoadWise Demo - Main Entry Point

use anyhow::Context;
use dashboard::{init_logging, shutdown_on, Dashboard, DashboardConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = DashboardConfig::load().context("failed to load configuration")?;
    init_logging(config.log_format, &config.log_level)?;

    info!("=== RoadWise Demo v{} ===", env!("CARGO_PKG_VERSION"));
    info!(policy = ?config.policy.kind, summaries = config.summary_interval_ms.is_some(), "Starting live detection dashboard...");

    let dashboard = Dashboard::from_config(&config).context("failed to build dashboard")?;
    let report = dashboard
        .run(shutdown_on(tokio::signal::ctrl_c()))
        .await?;

    info!("Final report: {}", serde_json::to_string(&report)?);
    Ok(())
}
