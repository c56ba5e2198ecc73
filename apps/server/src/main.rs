//! # Madang Server
//!
//! ```text
//! madang-server [--config madang.toml] [--port 8080]
//!
//!   1. load config (file → environment → validate)
//!   2. open SQLite pool, run migrations
//!   3. start the session sweeper
//!   4. serve /api/* until Ctrl+C / SIGTERM
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use madang_db::Database;
use madang_server::config::ServerConfig;
use madang_server::session::spawn_sweeper;
use madang_server::{build_router, AppState};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "madang-server", version, about = "Madang bookstore HTTP API")]
struct Args {
    /// TOML configuration file; defaults apply when it does not exist
    #[arg(long, env = "MADANG_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides `server.port`
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let args = Args::parse();

    let mut config = ServerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    info!(
        bind = %config.bind_address(),
        db = %config.database.path.display(),
        "Configuration loaded"
    );

    let db = Database::new(config.db_config())
        .await
        .context("Failed to open database")?;

    let state = AppState::new(db, config.clone());
    let sweeper = spawn_sweeper(state.sessions.clone(), config.sweep_interval());
    let state = Arc::new(state);
    let app = build_router(state.clone());

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;
    info!(addr = %config.bind_address(), "Madang server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    sweeper.abort();
    state.db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
