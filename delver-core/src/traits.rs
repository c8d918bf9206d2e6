//! Core trait definitions
//!
//! The agent talks to the outside world through two narrow ports: a search
//! provider and an LLM completion client. Implementations are interchangeable
//! at these seams, which is also where tests plug in mocks.

use crate::error::DelverResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single search hit returned by a search backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchItem {
    /// Result title
    pub title: String,
    /// Snippet or scraped page description
    pub description: String,
    /// Result URL
    pub url: String,
}

/// Search/retrieval port
///
/// Implementations may be a meta-search proxy, a scraping service, or a plain
/// search API; the engine only depends on this interface.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run a query and return at most `limit` results
    async fn search(&self, query: &str, limit: usize) -> DelverResult<Vec<SearchItem>>;
}

/// LLM completion port
///
/// Must support concurrent invocation; transport failures surface as
/// recoverable errors so the caller's retry policy can act on them.
#[async_trait]
pub trait CompletionPort: Send + Sync {
    /// Send a system instruction plus user prompt, return the response text
    async fn complete(&self, system: &str, prompt: &str) -> DelverResult<String>;
}
