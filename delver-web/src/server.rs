//! Delver Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use delver_core::DelverConfig;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main Delver web server
pub struct DelverServer {
    config: WebConfig,
    state: AppState,
}

impl DelverServer {
    /// Create a new server from web and agent configuration
    pub async fn new(config: WebConfig, delver_config: DelverConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone(), delver_config).await?;
        Ok(Self { config, state })
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("Starting Delver web server");
        info!("Server address: http://{}", address);
        info!("Development mode: {}", self.config.dev_mode);

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);

        if let Err(e) = serve(listener, app).await {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}
