//! Server builder and run_server function

use crate::config::Config;
use crate::server::server::HttpServer;
use crate::utils::error::{GatewayError, Result};
use std::path::Path;
use tracing::info;

/// Server builder for easier configuration
#[derive(Default)]
pub struct ServerBuilder {
    config: Option<Config>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the HTTP server
    pub async fn build(self) -> Result<HttpServer> {
        let config = self
            .config
            .ok_or_else(|| GatewayError::Config("Configuration is required".to_string()))?;

        HttpServer::new(&config).await
    }
}

/// Load configuration (file, then environment overrides) and serve
pub async fn run_server(config_path: impl AsRef<Path>) -> Result<()> {
    let config_path = config_path.as_ref();
    info!("Loading configuration from {}", config_path.display());

    let config = Config::load_with_precedence(Some(config_path)).await?;
    let server = ServerBuilder::new().with_config(config).build().await?;

    info!("API endpoints:");
    info!("   GET  /health, /health/detailed, /version");
    info!("   POST /v1/keys/verify");
    info!("   GET  /v1/usage");
    info!("   *    /admin/... (admin plan)");

    server.start().await
}
