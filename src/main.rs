//! stockdash server entry point

use anyhow::Context;
use std::sync::Arc;
use stockdash::config::AppConfig;
use stockdash::server::ApiServer;
use stockdash::state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockdash=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting stockdash...");

    let config = AppConfig::from_env().context("loading configuration")?;
    let state = Arc::new(AppState::new(config).context("initializing application state")?);

    let mut server = ApiServer::new();
    server
        .start(state)
        .await
        .context("starting the API server")?;

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    tracing::info!("Shutdown signal received");
    server.stop();

    Ok(())
}
