//! Firecrawl-compatible search backend
//!
//! Uses the `/v1/search` endpoint of a self-hosted Firecrawl deployment, with
//! markdown scraping enabled so descriptions carry page content rather than
//! bare snippets.

use crate::USER_AGENT;
use delver_core::{async_trait, DelverError, DelverResult, SearchItem, SearchProvider};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Firecrawl search client
pub struct FirecrawlClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct FirecrawlResponse {
    #[serde(default)]
    data: Vec<FirecrawlResult>,
}

#[derive(Debug, Deserialize)]
struct FirecrawlResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    /// Scraped markdown body, preferred over the short description when present
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    url: String,
}

impl FirecrawlClient {
    /// Create a new client for the given Firecrawl base URL
    pub fn new(base_url: &str, timeout_ms: u64) -> DelverResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| DelverError::network_with_source("Failed to build HTTP client", Box::new(e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn parse_response(body: &str, limit: usize) -> DelverResult<Vec<SearchItem>> {
        let response: FirecrawlResponse = serde_json::from_str(body).map_err(|e| {
            DelverError::search(format!("Failed to parse Firecrawl response: {}", e))
        })?;

        Ok(response
            .data
            .into_iter()
            .filter(|r| !r.url.is_empty())
            .take(limit)
            .map(|r| {
                let description = match r.markdown {
                    Some(markdown) if !markdown.trim().is_empty() => markdown,
                    _ => r.description,
                };
                SearchItem {
                    title: r.title,
                    description,
                    url: r.url,
                }
            })
            .collect())
    }
}

#[async_trait]
impl SearchProvider for FirecrawlClient {
    async fn search(&self, query: &str, limit: usize) -> DelverResult<Vec<SearchItem>> {
        let payload = json!({
            "query": query,
            "limit": limit,
            "scrapeOptions": { "formats": ["markdown"] },
        });

        let response = self
            .client
            .post(format!("{}/v1/search", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| DelverError::network_with_source("Firecrawl request failed", Box::new(e)))?;

        if !response.status().is_success() {
            return Err(DelverError::search(format!(
                "Firecrawl returned status {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DelverError::network_with_source("Failed to read Firecrawl body", Box::new(e)))?;

        let items = Self::parse_response(&body, limit)?;
        debug!(query = query, results = items.len(), "Firecrawl search completed");
        Ok(items)
    }
}
