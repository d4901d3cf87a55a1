//! Outbreak session host.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod host;
mod protocol;
mod server;
mod writer;

use config::ServerConfig;
use server::ServerState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let catalog = config.load_catalog()?;

    info!(
        "Starting Outbreak server with {} cases and {} missions...",
        catalog.cases().count(),
        catalog.missions().count()
    );

    let (save_tx, save_rx) = mpsc::unbounded_channel();
    tokio::spawn(writer::run_writer(save_rx));

    let state = Arc::new(ServerState::new(config, catalog, save_tx));

    server::run_server(state).await
}
