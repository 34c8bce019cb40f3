//! # Biblio Server
//!
//! The HTTP face of the book catalogue, built on `axum`.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use biblio_server::Server;
//! # fn library() -> biblio_core::application::Library { unimplemented!() }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .library(Arc::new(library()))
//!         .port(8069)
//!         .build()?
//!         .run()
//!         .await
//! }
//! ```

mod auth;
pub mod dto;
pub mod error;
mod routes;
pub mod state;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::{net::TcpListener, signal};
use tracing::{error, info};

use biblio_core::application::Library;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Where and how the server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    /// Bearer token for the JSON-RPC and REST endpoints.
    pub api_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8069,
            api_token: None,
        }
    }
}

/// A fluent builder for configuring the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Default)]
pub struct ServerBuilder {
    cfg: ServerConfig,
    library: Option<Arc<Library>>,
}

impl ServerBuilder {
    pub fn config(mut self, cfg: ServerConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.port = port;
        self
    }

    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.cfg.api_token = Some(token.into());
        self
    }

    /// The library every handler works on. Required.
    pub fn library(mut self, library: Arc<Library>) -> Self {
        self.library = Some(library);
        self
    }

    /// Consumes the builder.
    ///
    /// # Errors
    /// Fails when no library was supplied.
    pub fn build(self) -> Result<Server> {
        let library = self
            .library
            .context("Server needs a library; call .library() before .build()")?;
        let state = AppState::new(library, self.cfg.api_token.clone());
        Ok(Server {
            address: SocketAddr::new(self.cfg.address, self.cfg.port),
            state,
        })
    }
}

/// A configured server ready to run.
#[must_use = "call .run().await to start the server"]
pub struct Server {
    address: SocketAddr,
    state: AppState,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    pub const fn address(&self) -> SocketAddr {
        self.address
    }

    /// The router with all endpoints, for embedding or testing.
    pub fn router(&self) -> Router {
        routes::router(self.state.clone())
    }

    /// Serve until Ctrl+C or SIGTERM, then finish in-flight requests.
    ///
    /// # Errors
    /// Returns an error if the address cannot be bound.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.address)
            .await
            .with_context(|| format!("Failed to bind {}", self.address))?;

        info!(
            address = %self.address,
            auth = self.state.api_token.is_some(),
            "Starting HTTP server"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async {
                match shutdown_signal().await {
                    Ok(()) => info!("Shutdown signal received, starting graceful shutdown..."),
                    Err(e) => {
                        error!("Error while waiting for shutdown signal: {e}");
                        std::future::pending::<()>().await;
                    }
                }
            })
            .await
            .context("HTTP server failed")?;

        info!("Server shutdown complete");
        Ok(())
    }
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => res?,
        res = terminate => res?,
    }

    Ok(())
}
