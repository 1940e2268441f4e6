//! moneyflow-auth - Credential and session-token service for the MoneyFlow API
//!
//! This is the main entry point for the moneyflow-auth application.

use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use moneyflow_auth::auth::{AuthConfig, AuthService, TokenIssuer};
use moneyflow_auth::config::Config;
use moneyflow_auth::database::SqliteDatabase;
use moneyflow_auth::logging::init_tracing;
use moneyflow_auth::server::{AppState, Server};

/// moneyflow-auth - Credential and session-token service for the MoneyFlow API
#[derive(Parser, Debug)]
#[command(name = "moneyflow-auth")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "MONEYFLOW_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load and validate configuration
    let config = load_config(&args)?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    // Initialize tracing/logging
    init_tracing(&config.logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting moneyflow-auth"
    );

    // Initialize database
    let database = SqliteDatabase::new(&config.database.path).await?;
    let database = Arc::new(database);
    info!(path = %config.database.path, "Database initialized");

    // Initialize token issuer; validate() guarantees a non-empty secret
    let secret = config.auth.jwt_secret.as_deref().unwrap_or_default();
    let issuer = Arc::new(TokenIssuer::new(secret)?);

    // Initialize authentication service
    let auth_config = AuthConfig {
        store_timeout: config.auth.store_timeout(),
    };
    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&database),
        Arc::clone(&database),
        issuer,
        auth_config,
    ));
    info!(
        store_timeout_secs = config.auth.store_timeout_secs,
        "Authentication service initialized"
    );

    // Create and start the HTTP server
    let state = AppState::new(auth_service);
    let server = Server::new(config.server.clone(), state);

    info!(
        host = %config.server.host,
        port = %config.server.port,
        "Starting HTTP server"
    );

    let result = server.run(shutdown_signal()).await;

    info!("moneyflow-auth shutdown complete");

    result.map_err(Into::into)
}

/// Load configuration from file or environment
fn load_config(args: &Args) -> anyhow::Result<Config> {
    match &args.config {
        Some(path) => {
            // Use eprintln! since tracing is not yet initialized
            eprintln!("Loading configuration from file: {}", path);
            Config::from_file(path).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
        }
        None => {
            // Use eprintln! since tracing is not yet initialized
            eprintln!("Loading configuration from environment variables");
            Config::from_env().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
        }
    }
}

/// Create a future that resolves when a shutdown signal is received
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
