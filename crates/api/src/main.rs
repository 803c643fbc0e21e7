//! Bike-share Station History - Main Entry Point
//!
//! Usage: `bikeshare [CONFIG_PATH]` (defaults to `config/bikeshare`).

use api::settings::{AppConfig, DEFAULT_CONFIG_PATH};
use api::{init_logging, run_server};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load_from(&path)?;

    init_logging(&config.logging)?;

    info!("=== Bikeshare History v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from {} and environment", path);

    run_server(config).await
}
