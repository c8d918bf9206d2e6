//! LLM client integration using siumai
//!
//! Provides the production implementation of the [`CompletionPort`] through
//! the siumai framework, with provider selection driven by configuration.

use crate::{AgentError, AgentResult};
use delver_core::{async_trait, CompletionPort, DelverError, DelverResult, LlmSettings};
use siumai::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

/// Unified LLM client that supports multiple providers
pub struct SiumaiClient {
    client: Box<dyn LlmClient>,
    settings: LlmSettings,
}

impl SiumaiClient {
    /// Create a new LLM client
    pub async fn new(settings: LlmSettings) -> AgentResult<Self> {
        let client = Self::build_client(&settings).await?;

        info!(
            "Created LLM client for provider: {} with model: {}",
            settings.provider, settings.model
        );

        Ok(Self { client, settings })
    }

    /// Build the appropriate siumai client based on configuration
    async fn build_client(settings: &LlmSettings) -> AgentResult<Box<dyn LlmClient>> {
        match settings.provider.as_str() {
            "openai" => {
                let api_key = settings
                    .api_key
                    .clone()
                    .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                    .ok_or_else(|| {
                        AgentError::Core(DelverError::config("OpenAI API key not found"))
                    })?;

                let mut builder = LlmBuilder::new()
                    .openai()
                    .api_key(&api_key)
                    .model(&settings.model)
                    .temperature(settings.temperature);

                if let Some(max_tokens) = settings.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                if let Some(base_url) = &settings.base_url {
                    builder = builder.base_url(base_url);
                }

                let client = builder.build().await.map_err(|e| {
                    AgentError::Core(DelverError::llm(format!(
                        "Failed to build OpenAI client: {}",
                        e
                    )))
                })?;

                Ok(Box::new(client))
            }
            "anthropic" => {
                let api_key = settings
                    .api_key
                    .clone()
                    .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
                    .ok_or_else(|| {
                        AgentError::Core(DelverError::config("Anthropic API key not found"))
                    })?;

                let mut builder = LlmBuilder::new()
                    .anthropic()
                    .api_key(&api_key)
                    .model(&settings.model)
                    .temperature(settings.temperature);

                if let Some(max_tokens) = settings.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder.build().await.map_err(|e| {
                    AgentError::Core(DelverError::llm(format!(
                        "Failed to build Anthropic client: {}",
                        e
                    )))
                })?;

                Ok(Box::new(client))
            }
            "ollama" => {
                let base_url = settings
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "http://localhost:11434".to_string());

                let mut builder = LlmBuilder::new()
                    .ollama()
                    .model(&settings.model)
                    .base_url(&base_url)
                    .temperature(settings.temperature);

                if let Some(max_tokens) = settings.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder.build().await.map_err(|e| {
                    AgentError::Core(DelverError::llm(format!(
                        "Failed to build Ollama client: {}",
                        e
                    )))
                })?;

                Ok(Box::new(client))
            }
            "groq" => {
                let api_key = settings
                    .api_key
                    .clone()
                    .or_else(|| std::env::var("GROQ_API_KEY").ok())
                    .ok_or_else(|| {
                        AgentError::Core(DelverError::config("Groq API key not found"))
                    })?;

                let mut builder = LlmBuilder::new()
                    .groq()
                    .api_key(&api_key)
                    .model(&settings.model)
                    .temperature(settings.temperature);

                if let Some(max_tokens) = settings.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder.build().await.map_err(|e| {
                    AgentError::Core(DelverError::llm(format!(
                        "Failed to build Groq client: {}",
                        e
                    )))
                })?;

                Ok(Box::new(client))
            }
            provider => Err(AgentError::Core(DelverError::config(format!(
                "Unsupported LLM provider: {}",
                provider
            )))),
        }
    }

    /// Get the current settings
    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }
}

#[async_trait]
impl CompletionPort for SiumaiClient {
    async fn complete(&self, system: &str, prompt: &str) -> DelverResult<String> {
        let start_time = Instant::now();

        let messages = if system.is_empty() {
            vec![user!(prompt)]
        } else {
            vec![system!(system), user!(prompt)]
        };

        let response = self.client.chat(messages).await.map_err(|e| DelverError::Llm {
            message: format!("LLM generation failed: {}", e),
            provider: Some(self.settings.provider.clone()),
        })?;

        match response.content_text() {
            Some(content) if !content.trim().is_empty() => {
                debug!(
                    "Generated response in {:?} ({} chars)",
                    start_time.elapsed(),
                    content.len()
                );
                Ok(content.to_string())
            }
            _ => Err(DelverError::EmptyResponse),
        }
    }
}
