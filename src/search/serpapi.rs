//! SerpAPI Client
//!
//! Google web search through SerpAPI. Results are mapped from the
//! `organic_results` array onto [`WebResult`] records.

use async_trait::async_trait;
use serde_json::Value;
use serpapi_search_rust::serp_api_search::SerpApiSearch;
use std::collections::HashMap;
use tracing::{debug, info};

use super::{LiveSearch, SearchError, WebResult};

pub struct SerpApiClient {
    api_key: String,
    country: String,
    max_results: usize,
}

impl SerpApiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            country: "ca".to_string(),
            max_results: 3,
        }
    }

    /// `None` when no API key is configured
    pub fn from_config(config: &crate::config::SearchConfig) -> Option<Self> {
        if config.serpapi_key.is_empty() {
            return None;
        }

        Some(Self {
            max_results: config.max_results,
            ..Self::new(config.serpapi_key.clone())
        })
    }

    fn params(&self, query: &str, max_results: usize) -> HashMap<String, String> {
        let mut params = HashMap::<String, String>::new();
        params.insert("engine".to_string(), "google".to_string());
        params.insert("q".to_string(), query.to_string());
        params.insert("hl".to_string(), "en".to_string());
        params.insert("gl".to_string(), self.country.clone());
        params.insert("num".to_string(), max_results.to_string());
        params
    }
}

/// Map a SerpAPI `organic_results` value onto web results
fn parse_organic_results(organic: Option<&Value>, max_results: usize) -> Result<Vec<WebResult>, SearchError> {
    let organic = organic.ok_or(SearchError::NoResults)?;
    let results_array = organic
        .as_array()
        .ok_or_else(|| SearchError::ParseError("Expected array of results".to_string()))?;

    let results: Vec<WebResult> = results_array
        .iter()
        .take(max_results)
        .map(|result| {
            let field = |name: &str| result.get(name).and_then(|v| v.as_str()).unwrap_or("").to_string();
            let title = match field("title") {
                t if t.is_empty() => "No title".to_string(),
                t => t,
            };
            WebResult {
                title,
                snippet: field("snippet"),
                url: field("link"),
            }
        })
        .collect();

    if results.is_empty() {
        return Err(SearchError::NoResults);
    }
    Ok(results)
}

#[async_trait]
impl LiveSearch for SerpApiClient {
    fn name(&self) -> &'static str {
        "serpapi"
    }

    async fn search_live(&self, query: &str, max_results: usize) -> Result<Vec<WebResult>, SearchError> {
        if self.api_key.is_empty() {
            return Err(SearchError::NoApiKey);
        }
        let max_results = max_results.min(self.max_results.max(1));

        info!(query = %query, "Searching Google via SerpAPI");
        let search = SerpApiSearch::google(self.params(query, max_results), self.api_key.clone());
        let results = search
            .json()
            .await
            .map_err(|e| SearchError::RequestFailed(e.to_string()))?;
        debug!("Raw SerpAPI response received");

        let parsed = parse_organic_results(results.get("organic_results"), max_results)?;
        info!(count = parsed.len(), "SerpAPI search completed");
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_maps_title_snippet_link() {
        let body = json!([
            {"title": "Nitrate in drinking water", "snippet": "Health Canada sets 45 mg/L.", "link": "https://canada.ca/nitrate"},
            {"snippet": "No title here", "link": "https://example.org"},
            {"title": "Third", "snippet": "", "link": ""}
        ]);

        let results = parse_organic_results(Some(&body), 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0],
            WebResult::new("Nitrate in drinking water", "Health Canada sets 45 mg/L.", "https://canada.ca/nitrate")
        );
        assert_eq!(results[1].title, "No title");
    }

    #[test]
    fn test_parse_missing_or_empty_is_no_results() {
        assert!(matches!(parse_organic_results(None, 3), Err(SearchError::NoResults)));
        assert!(matches!(parse_organic_results(Some(&json!([])), 3), Err(SearchError::NoResults)));
        assert!(matches!(
            parse_organic_results(Some(&json!({"oops": 1})), 3),
            Err(SearchError::ParseError(_))
        ));
    }

    #[test]
    fn test_params_target_google_web_search() {
        let client = SerpApiClient::new("key".to_string());
        let params = client.params("lead pipes", 3);
        assert_eq!(params.get("engine").map(String::as_str), Some("google"));
        assert_eq!(params.get("gl").map(String::as_str), Some("ca"));
        assert_eq!(params.get("num").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_from_config_needs_key_and_keeps_limit() {
        let mut config = crate::config::SearchConfig {
            backend: crate::config::SearchBackend::SerpApi,
            serpapi_key: String::new(),
            wikipedia_base: String::new(),
            max_results: 5,
        };
        assert!(SerpApiClient::from_config(&config).is_none());

        config.serpapi_key = "key".to_string();
        let client = SerpApiClient::from_config(&config).unwrap();
        assert_eq!(client.max_results, 5);
        assert_eq!(client.params("arsenic", 2).get("gl").map(String::as_str), Some("ca"));
    }

    #[tokio::test]
    async fn test_missing_key_is_reported() {
        let err = SerpApiClient::new(String::new()).search_live("pfas", 3).await.unwrap_err();
        assert!(matches!(err, SearchError::NoApiKey));
    }
}
