// MediaWiki full-text search client

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info};

use super::{LiveSearch, SearchError, WebResult};

pub const WIKIPEDIA_API: &str = "https://en.wikipedia.org/w/api.php";
const ARTICLE_BASE: &str = "https://en.wikipedia.org/wiki/";
const USER_AGENT: &str = concat!("aqualens/", env!("CARGO_PKG_VERSION"), " (water quality assistant)");

pub struct WikipediaClient {
    client: Client,
    api_base: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<QueryBlock>,
}

#[derive(Deserialize)]
struct QueryBlock {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
    #[serde(default)]
    snippet: String,
}

impl WikipediaClient {
    pub fn new(api_base: &str) -> Result<Self, SearchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SearchError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            api_base: api_base.to_string(),
        })
    }
}

fn tag_pattern() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"))
}

/// Remove search-highlight markup and decode the few entities MediaWiki emits
fn clean_snippet(snippet: &str) -> String {
    let stripped = tag_pattern().replace_all(snippet, "");
    stripped
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn article_url(title: &str) -> String {
    format!("{}{}", ARTICLE_BASE, title.replace(' ', "_"))
}

#[async_trait]
impl LiveSearch for WikipediaClient {
    fn name(&self) -> &'static str {
        "wikipedia"
    }

    async fn search_live(&self, query: &str, max_results: usize) -> Result<Vec<WebResult>, SearchError> {
        info!(query = %query, "Searching Wikipedia");
        let limit = max_results.max(1).to_string();

        let response = self
            .client
            .get(&self.api_base)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("format", "json"),
                ("srlimit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SearchError::Status(response.status().as_u16()));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))?;

        let results: Vec<WebResult> = parsed
            .query
            .map(|q| q.search)
            .unwrap_or_default()
            .into_iter()
            .take(max_results.max(1))
            .map(|hit| WebResult {
                url: article_url(&hit.title),
                snippet: clean_snippet(&hit.snippet),
                title: hit.title,
            })
            .collect();

        debug!(count = results.len(), "Wikipedia search completed");
        if results.is_empty() {
            return Err(SearchError::NoResults);
        }
        Ok(results)
    }
}
