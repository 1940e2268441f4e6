//! HTTP surface of the account API
//!
//! Serves `/register`, `/login`, `/logout` and the bearer-protected `/me`
//! over one listener until the shutdown future resolves.

pub mod middleware;
pub mod router;

pub use middleware::{auth_middleware, logging_middleware, AuthenticatedUser, ErrorResponse};
pub use router::{build_router, AppState, HealthResponse};

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::database::Database;

/// Listener for the account routes, backed by one shared store
pub struct Server<D: Database + 'static> {
    config: ServerConfig,
    state: AppState<D>,
}

impl<D: Database + 'static> Server<D> {
    /// Pair a listen address with the auth state
    pub fn new(config: ServerConfig, state: AppState<D>) -> Self {
        Self { config, state }
    }

    /// Parse `host:port` from the config; the host must be an IP literal
    pub fn bind_addr(&self) -> Result<SocketAddr, ServerError> {
        let ip = self
            .config
            .host
            .parse()
            .map_err(|_| ServerError::Config(format!("Invalid host: {}", self.config.host)))?;
        Ok(SocketAddr::new(ip, self.config.port))
    }

    /// Serve auth requests until `shutdown` resolves
    ///
    /// In-flight requests finish before this returns.
    pub async fn run(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let addr = self.bind_addr()?;
        let app = build_router(self.state).layer(tower_http::trace::TraceLayer::new_for_http());

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(e.to_string()))?;

        tracing::info!(addr = %addr, "Auth API listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        tracing::info!("Auth API stopped");
        Ok(())
    }
}

/// Failures starting or running the listener
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Cannot listen on address: {0}")]
    Bind(String),

    #[error("Listener failed: {0}")]
    Serve(String),

    /// Bad `server` section
    #[error("Invalid server config: {0}")]
    Config(String),
}
