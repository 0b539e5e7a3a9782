//! Search Module
//!
//! Web search collaborators for the web agent. Every backend produces the
//! same `(title, snippet, url)` records:
//!
//! - **Static table**: keyword-matched water-quality entries, no network
//! - **Wikipedia**: public MediaWiki search API
//! - **SerpAPI**: paid Google web search
//!
//! Live backends are wrapped in [`TieredSearch`], which falls back to the
//! static table on any failure, so callers always receive a non-empty list.

pub mod serpapi;
pub mod static_table;
pub mod tiered;
pub mod wikipedia;

pub use serpapi::SerpApiClient;
pub use static_table::StaticSearch;
pub use tiered::{LiveSearch, TieredSearch};
pub use wikipedia::WikipediaClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{SearchBackend, SearchConfig};
use crate::types::{AppError, AppResult};

/// Errors that can occur inside a live search backend
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("SerpAPI key not configured")]
    NoApiKey,

    #[error("Search request failed: {0}")]
    RequestFailed(String),

    #[error("Search API returned status {0}")]
    Status(u16),

    #[error("Failed to parse search results: {0}")]
    ParseError(String),

    #[error("No results found for query")]
    NoResults,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebResult {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

impl WebResult {
    pub fn new(title: impl Into<String>, snippet: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
            url: url.into(),
        }
    }
}

/// Search collaborator seen by the web agent. Implementations never fail
/// and never return an empty list.
#[async_trait]
pub trait WebSearchTool: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Vec<WebResult>;
}

/// Build the configured backend, wrapped with the static fallback
pub fn build_search_tool(config: &SearchConfig) -> AppResult<Arc<dyn WebSearchTool>> {
    let tool: Arc<dyn WebSearchTool> = match config.backend {
        SearchBackend::Static => Arc::new(StaticSearch::new()),
        SearchBackend::Wikipedia => Arc::new(TieredSearch::new(
            WikipediaClient::new(&config.wikipedia_base)
                .map_err(|e| AppError::Config(format!("Failed to build Wikipedia client: {}", e)))?,
            StaticSearch::new(),
        )),
        SearchBackend::SerpApi => {
            let client = SerpApiClient::from_config(config).ok_or_else(|| {
                AppError::Config("SERPAPI_API_KEY is required for the serpapi search backend".to_string())
            })?;
            Arc::new(TieredSearch::new(client, StaticSearch::new()))
        }
    };
    Ok(tool)
}
