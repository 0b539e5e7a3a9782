// Live backend with static fallback

use async_trait::async_trait;
use tracing::warn;

use super::{SearchError, StaticSearch, WebResult, WebSearchTool};

/// A network backend that may fail
#[async_trait]
pub trait LiveSearch: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search_live(&self, query: &str, max_results: usize) -> Result<Vec<WebResult>, SearchError>;
}

pub struct TieredSearch<L> {
    live: L,
    fallback: StaticSearch,
}

impl<L: LiveSearch> TieredSearch<L> {
    pub fn new(live: L, fallback: StaticSearch) -> Self {
        Self { live, fallback }
    }
}

#[async_trait]
impl<L: LiveSearch> WebSearchTool for TieredSearch<L> {
    async fn search(&self, query: &str, max_results: usize) -> Vec<WebResult> {
        match self.live.search_live(query, max_results).await {
            Ok(results) if !results.is_empty() => results,
            Ok(_) => {
                warn!(backend = self.live.name(), "Live search returned nothing, using static table");
                self.fallback.lookup(query, max_results)
            }
            Err(e) => {
                warn!(backend = self.live.name(), error = %e, "Live search failed, using static table");
                self.fallback.lookup(query, max_results)
            }
        }
    }
}
