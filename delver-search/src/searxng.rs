//! SearxNG meta-search backend
//!
//! Talks to a self-hosted SearxNG instance through its JSON API
//! (`GET {base}/search?format=json`).

use crate::USER_AGENT;
use delver_core::{async_trait, DelverError, DelverResult, SearchItem, SearchProvider};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// SearxNG search client
pub struct SearxngClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearxngResponse {
    #[serde(default)]
    results: Vec<SearxngResult>,
}

#[derive(Debug, Deserialize)]
struct SearxngResult {
    #[serde(default)]
    title: String,
    /// SearxNG calls the snippet "content"
    #[serde(default)]
    content: String,
    #[serde(default)]
    url: String,
}

impl SearxngClient {
    /// Create a new client for the given SearxNG base URL
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
        let response: SearxngResponse = serde_json::from_str(body).map_err(|e| {
            DelverError::search(format!("Failed to parse SearxNG response: {}", e))
        })?;

        Ok(response
            .results
            .into_iter()
            .filter(|r| !r.url.is_empty())
            .take(limit)
            .map(|r| SearchItem {
                title: r.title,
                description: r.content,
                url: r.url,
            })
            .collect())
    }
}

#[async_trait]
impl SearchProvider for SearxngClient {
    async fn search(&self, query: &str, limit: usize) -> DelverResult<Vec<SearchItem>> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("q", query),
                ("categories", "general"),
                ("safesearch", "0"),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| DelverError::network_with_source("SearxNG request failed", Box::new(e)))?;

        if !response.status().is_success() {
            return Err(DelverError::search(format!(
                "SearxNG returned status {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DelverError::network_with_source("Failed to read SearxNG body", Box::new(e)))?;

        let items = Self::parse_response(&body, limit)?;
        debug!(query = query, results = items.len(), "SearxNG search completed");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_results_and_applies_limit() {
        let body = r#"{
            "results": [
                {"title": "A", "content": "first snippet", "url": "https://a.example/"},
                {"title": "B", "content": "second snippet", "url": "https://b.example/"},
                {"title": "C", "content": "third snippet", "url": "https://c.example/"}
            ]
        }"#;

        let items = SearxngClient::parse_response(body, 2).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "A");
        assert_eq!(items[0].description, "first snippet");
        assert_eq!(items[1].url, "https://b.example/");
    }

    #[test]
    fn skips_results_without_url() {
        let body = r#"{
            "results": [
                {"title": "no url", "content": "x", "url": ""},
                {"title": "ok", "content": "y", "url": "https://ok.example/"}
            ]
        }"#;

        let items = SearxngClient::parse_response(body, 10).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "ok");
    }

    #[test]
    fn tolerates_missing_results_field() {
        let items = SearxngClient::parse_response("{}", 5).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn rejects_non_json_body() {
        assert!(SearxngClient::parse_response("<html>rate limited</html>", 5).is_err());
    }
}
