// Server entry point for SQLi Sentinel
// Uses clap for configuration and axum for the JSON API

use anyhow::Context;
use sqli_sentinel::config::{self, Config};
use sqli_sentinel::server::{create_router, AppState};
use sqli_sentinel::{MemoryStorage, PayloadCatalog, ProbeEngine, ScanOrchestrator};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_matches(&config::command().get_matches());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting SQLi Sentinel {}", env!("CARGO_PKG_VERSION"));

    let mut catalog = PayloadCatalog::builtin();
    if let Some(dir) = &config.payload_dir {
        let added = catalog
            .load_dir(dir)
            .map_err(anyhow::Error::msg)
            .context("loading payload catalog")?;
        tracing::info!("Loaded {} extra payloads from {:?}", added, dir);
    }
    tracing::info!("Payload catalog holds {} payloads", catalog.len());

    let engine = ProbeEngine::with_timeout(config.probe_timeout).context("building probe client")?;
    let orchestrator = Arc::new(ScanOrchestrator::new(
        Arc::new(MemoryStorage::new()),
        engine,
        catalog,
    ));

    let app = create_router(AppState::new(orchestrator.clone()));

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    tracing::info!("Listening on {}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    orchestrator.shutdown().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
