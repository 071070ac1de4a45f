//! Spool API - Main entry point.

use anyhow::Result;
use spool_common::logging::init_logging;
use spool_common::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("Spool API v{}", env!("CARGO_PKG_VERSION"));

    // Start the HTTP server
    spool_api::start_server(&config).await
}
