use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use subway_server::config::ServerConfig;
use subway_server::directory::{LineDirectory, SnapshotStore};
use subway_server::web::{AppState, create_router};

const DEFAULT_FILTER: &str = "subway_server=info,tower_http=info";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    // Load the directory, from disk if a snapshot path is configured
    let directory = match &config.snapshot_path {
        Some(path) => LineDirectory::open(SnapshotStore::new(path))?,
        None => {
            info!("no snapshot configured, keeping lines in memory");
            LineDirectory::in_memory()
        }
    };

    let app = create_router(AppState::new(directory));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "subway line directory listening");
    info!("  GET    /lines                          - List lines");
    info!("  POST   /lines/:id/sections             - Add a section");
    info!("  DELETE /lines/:id/stations/:station_id - Remove a station");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
