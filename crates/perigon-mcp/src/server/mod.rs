//! Server transports.
//!
//! - stdio: newline-delimited JSON-RPC for desktop MCP clients, using the
//!   configured API key.
//! - HTTP: MCP (streamable and legacy SSE), the direct tool endpoint and the
//!   chat endpoint; every caller brings their own API key.

pub mod api;
pub mod auth;
pub mod protocol;
pub mod rate_limit;
pub mod session;
pub mod stdio;
pub mod transport;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;

use crate::client::PerigonClient;
use crate::config::Config;
use crate::tools::{ToolContext, ToolRegistry};
use session::McpConnection;
use transport::AppState;

/// MCP server for the Perigon API.
pub struct McpServer {
    config: Config,
    registry: ToolRegistry,
}

impl McpServer {
    /// Create a new server.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config, registry: ToolRegistry::new() }
    }

    /// Run the server in stdio mode.
    ///
    /// # Errors
    ///
    /// Returns error if no API key is configured or on I/O failure.
    pub async fn run_stdio(self) -> anyhow::Result<()> {
        let Some(api_key) = self.config.api_key.clone() else {
            anyhow::bail!("stdio transport needs an API key (--api-key or PERIGON_API_KEY)");
        };

        tracing::info!("Starting MCP server in stdio mode");
        let client = PerigonClient::new(&self.config)?.with_api_key(api_key);
        let connection = McpConnection::new(ToolContext::new(client));

        stdio::run_stdio(&self.registry, &connection).await
    }

    /// Build the HTTP router.
    ///
    /// # Errors
    ///
    /// Returns error if an HTTP client cannot be built.
    pub fn router(&self, base_url: String) -> anyhow::Result<Router> {
        let state = AppState::new(&self.config, base_url)?;
        state.sessions.start_cleanup_task();
        Ok(transport::create_router(Arc::new(state)))
    }

    /// Run the server in HTTP mode.
    ///
    /// # Errors
    ///
    /// Returns error on server failure.
    pub async fn run_http(self, port: u16, base_url: Option<String>) -> anyhow::Result<()> {
        tracing::info!(port, tools = self.registry.list().len(), "Starting MCP server in HTTP mode");

        let base_url = base_url.unwrap_or_else(|| format!("http://localhost:{port}"));
        let router = self.router(base_url)?;
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP server listening on http://{}", addr);

        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer").field("tools", &self.registry.list().len()).finish()
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
