//! HTTP server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::http::monitoring;
use crate::http::routes::create_router;
use crate::state::AppState;

/// Bind address of the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from(&livecam_config::ServerConfig::default())
    }
}

impl From<&livecam_config::ServerConfig> for ServerConfig {
    fn from(config: &livecam_config::ServerConfig) -> Self {
        Self::new(config.host.clone(), config.port)
    }
}

/// The livecam HTTP server.
pub struct ApiServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the server address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Serve until `shutdown` resolves.
    pub async fn run<F>(&self, shutdown: F) -> Result<(), Box<dyn std::error::Error>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        monitoring::init_start_time();
        let app = create_router(self.state.clone());

        let addr: SocketAddr = self.addr().parse()?;
        let listener = TcpListener::bind(addr).await?;

        info!("livecam server listening on {}", addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Server stopped");
        Ok(())
    }
}
