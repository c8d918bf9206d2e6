//! Configuration management

use crate::error::{DelverError, DelverResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// LLM provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Provider name (openai, anthropic, ollama, groq)
    pub provider: String,
    /// Model name
    pub model: String,
    /// API key (falls back to provider-specific env vars)
    pub api_key: Option<String>,
    /// Custom base URL for OpenAI-compatible endpoints
    pub base_url: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens per completion
    pub max_tokens: Option<u32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: Some(4000),
        }
    }
}

/// Search backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Backend name (searxng, firecrawl)
    pub backend: String,
    /// Backend base URL
    pub base_url: String,
    /// HTTP timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            backend: "searxng".to_string(),
            base_url: "http://localhost:8888".to_string(),
            timeout_ms: 120_000,
        }
    }
}

/// Research run defaults and limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchSettings {
    /// Default number of parallel queries at the top level
    pub default_breadth: usize,
    /// Default number of recursion levels
    pub default_depth: usize,
    /// Process-wide cap on concurrent in-flight research branches
    pub concurrency_limit: usize,
    /// Maximum search results consumed per query
    pub search_limit: usize,
    /// Timeout per LLM call in milliseconds
    pub llm_timeout_ms: u64,
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            default_breadth: 4,
            default_depth: 2,
            concurrency_limit: 50,
            search_limit: 5,
            llm_timeout_ms: 600_000,
        }
    }
}

/// Top-level Delver configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DelverConfig {
    pub llm: LlmSettings,
    pub search: SearchSettings,
    pub research: ResearchSettings,
}

impl DelverConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> DelverResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| DelverError::Config {
            message: format!("Failed to parse config file: {}", e),
        })
    }

    /// Build configuration from defaults plus environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Apply environment variable overrides in place.
    ///
    /// Env names follow the deployment convention: `CHAT_MODEL_*` for the LLM,
    /// `SEARXNG_SERVE_URL`/`FIRECRAWL_BASE_URL` for search backends, and
    /// `FIRECRAWL_CONCURRENCY` for the branch gate.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(model) = std::env::var("CHAT_MODEL_NAME") {
            self.llm.model = model;
        }
        if let Ok(key) = std::env::var("CHAT_MODEL_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Ok(base) = std::env::var("CHAT_MODEL_BASE_URL") {
            self.llm.base_url = Some(base);
        }
        if let Ok(provider) = std::env::var("CHAT_MODEL_PROVIDER") {
            self.llm.provider = provider;
        }
        if let Ok(url) = std::env::var("SEARXNG_SERVE_URL") {
            self.search.backend = "searxng".to_string();
            self.search.base_url = url;
        }
        if let Ok(url) = std::env::var("FIRECRAWL_BASE_URL") {
            self.search.backend = "firecrawl".to_string();
            self.search.base_url = url;
        }
        if let Ok(limit) = std::env::var("FIRECRAWL_CONCURRENCY") {
            if let Ok(limit) = limit.parse() {
                self.research.concurrency_limit = limit;
            }
        }
    }
}
