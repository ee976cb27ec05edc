mod audio;
mod config;
mod error;
mod io;
mod recorder;
mod state;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::RecorderConfig;
use state::AppState;

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = RecorderConfig::parse();

    if let Err(e) = run(config) {
        error!("Application error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(config: RecorderConfig) -> Result<()> {
    info!("Starting Opus recorder with config {:#?}", config);

    let (state, worker) = AppState::new(&config)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    rt.block_on(serve(&config, state))?;

    // The router and its queue handles are gone; let the worker finish what
    // was already accepted.
    info!("Waiting for queued recordings to finish");
    if worker.join().is_err() {
        anyhow::bail!("Recorder worker thread panicked");
    }

    info!("Shut down cleanly");
    Ok(())
}

async fn serve(config: &RecorderConfig, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .context(format!("Failed to bind {}", config.listen))?;
    info!("Listening on http://{}", listener.local_addr()?);

    let app = io::router(state, config.max_body_bytes);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
