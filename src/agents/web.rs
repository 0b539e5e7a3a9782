//! Web Search Agent
//!
//! Runs the configured [`WebSearchTool`] and renders the results into a
//! numbered plain-text summary for the downstream prompts.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::search::{WebResult, WebSearchTool};

pub const AGENT_NAME: &str = "web_search";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchOutput {
    pub agent: String,
    pub query: String,
    pub results: Vec<WebResult>,
    pub summary: String,
}

#[derive(Clone)]
pub struct WebSearchAgent {
    tool: Arc<dyn WebSearchTool>,
    max_results: usize,
}

impl WebSearchAgent {
    pub fn new(tool: Arc<dyn WebSearchTool>, max_results: usize) -> Self {
        Self { tool, max_results }
    }

    pub async fn run(&self, query: &str) -> WebSearchOutput {
        let results = self.tool.search(query, self.max_results).await;
        info!(count = results.len(), "Web search agent collected results");

        WebSearchOutput {
            agent: AGENT_NAME.to_string(),
            query: query.to_string(),
            summary: render_summary(query, &results),
            results,
        }
    }
}

fn render_results(results: &[WebResult]) -> Vec<String> {
    results
        .iter()
        .enumerate()
        .map(|(idx, r)| format!("{}. {} — {} (source: {})", idx + 1, r.title, r.snippet, r.url))
        .collect()
}

pub fn render_summary(query: &str, results: &[WebResult]) -> String {
    let mut lines = vec![format!("Web search results for: '{}'", query)];
    lines.extend(render_results(results));
    lines.join("\n")
}

/// Web evidence as downstream agents see it. A structured web output, raw
/// text, and absence are all reduced to one string by [`WebContext::as_text`].
#[derive(Debug, Clone, Copy)]
pub enum WebContext<'a> {
    Structured(&'a WebSearchOutput),
    Text(&'a str),
    Empty,
}

impl<'a> WebContext<'a> {
    pub fn as_text(&self) -> String {
        match self {
            WebContext::Structured(output) if !output.summary.is_empty() => output.summary.clone(),
            WebContext::Structured(output) => render_results(&output.results).join("\n"),
            WebContext::Text(text) => text.to_string(),
            WebContext::Empty => String::new(),
        }
    }
}

impl<'a> From<&'a WebSearchOutput> for WebContext<'a> {
    fn from(output: &'a WebSearchOutput) -> Self {
        WebContext::Structured(output)
    }
}

impl<'a> From<Option<&'a WebSearchOutput>> for WebContext<'a> {
    fn from(output: Option<&'a WebSearchOutput>) -> Self {
        output.map(WebContext::Structured).unwrap_or(WebContext::Empty)
    }
}
