//! Delver Search - Search/retrieval backends
//!
//! Implementations of the [`SearchProvider`] port. Backends are
//! interchangeable: a SearxNG meta-search instance or a Firecrawl-compatible
//! search/scrape service. Response parsing is kept separate from transport so
//! it can be tested with canned payloads.

pub mod firecrawl;
pub mod searxng;

pub use firecrawl::FirecrawlClient;
pub use searxng::SearxngClient;

use delver_core::{DelverError, DelverResult, SearchProvider, SearchSettings};
use std::sync::Arc;

/// Supported search backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBackend {
    Searxng,
    Firecrawl,
}

impl std::str::FromStr for SearchBackend {
    type Err = DelverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "searxng" => Ok(SearchBackend::Searxng),
            "firecrawl" => Ok(SearchBackend::Firecrawl),
            other => Err(DelverError::config(format!(
                "Unsupported search backend: {}",
                other
            ))),
        }
    }
}

/// Build a search provider from settings
pub fn create_search_provider(settings: &SearchSettings) -> DelverResult<Arc<dyn SearchProvider>> {
    let backend: SearchBackend = settings.backend.parse()?;
    match backend {
        SearchBackend::Searxng => Ok(Arc::new(SearxngClient::new(
            &settings.base_url,
            settings.timeout_ms,
        )?)),
        SearchBackend::Firecrawl => Ok(Arc::new(FirecrawlClient::new(
            &settings.base_url,
            settings.timeout_ms,
        )?)),
    }
}

/// Browser-like User-Agent; some meta-search deployments reject the default
/// reqwest agent.
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";
