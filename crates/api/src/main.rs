//! Climate Observation API - Main Entry Point

use anyhow::Context;
use climate_api::{init_logging, metrics::install_metrics, run_server, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load configuration")?;
    init_logging(&settings.logging)?;

    info!("=== Climate API v{} ===", env!("CARGO_PKG_VERSION"));

    let metrics = if settings.metrics.enabled {
        Some(install_metrics().context("failed to install metrics recorder")?)
    } else {
        None
    };

    run_server(settings, metrics).await
}
