//! Application state shared across handlers

use crate::{WebConfig, WebResult};
use delver_agent::DeepResearchAgent;
use delver_core::DelverConfig;
use std::sync::Arc;
use tracing::info;

/// Shared state behind every request handler
#[derive(Clone)]
pub struct AppState {
    /// Web server configuration
    pub config: WebConfig,
    /// Research defaults from the agent configuration
    pub research_defaults: delver_core::ResearchSettings,
    /// The research agent, shared across concurrent requests
    pub agent: Arc<DeepResearchAgent>,
}

impl AppState {
    /// Build the state, wiring up the agent from configuration
    pub async fn new(config: WebConfig, delver_config: DelverConfig) -> WebResult<Self> {
        let research_defaults = delver_config.research.clone();
        let agent = Arc::new(DeepResearchAgent::from_config(delver_config).await?);

        info!(
            backend = %agent.config().search.backend,
            provider = %agent.config().llm.provider,
            "Application state initialized"
        );

        Ok(Self {
            config,
            research_defaults,
            agent,
        })
    }
}
