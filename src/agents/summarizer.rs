//! Summarizer Agent
//!
//! Merges the in-house answer, the web evidence and the coordinator's
//! reasoning into one structured answer. A model failure never escapes:
//! the agent returns a deterministic fallback that echoes the raw context.
//!
//! If the user asks for "N lines" the model output is cut to the first N
//! sentences after generation.

use regex::Regex;
use std::sync::OnceLock;
use tracing::{info, warn};

use super::web::WebContext;
use crate::llm::LLM;
use crate::types::{LLMRequest, StepOutput};

const SYSTEM_PROMPT: &str = "You are a Water Pollution & Quality Summarization Agent.
Your job is to:
- merge internal water-quality documents and web content,
- check consistency between internal and web evidence,
- and produce a structured answer with this structure:
  1) Background
  2) Key water-quality data
  3) Risk analysis
  4) Recommendations
Be concise but informative, suitable for a research analyst.";

pub struct SummaryInput<'a> {
    pub query: &'a str,
    pub rag_output: &'a str,
    pub web: WebContext<'a>,
    pub reasoning: &'a str,
}

#[derive(Clone)]
pub struct SummarizerAgent {
    llm: LLM,
    model: String,
    bilingual: bool,
}

impl SummarizerAgent {
    pub fn new(llm: LLM, model: &str, bilingual: bool) -> Self {
        Self {
            llm,
            model: model.to_string(),
            bilingual,
        }
    }

    pub async fn summarize(&self, input: SummaryInput<'_>) -> StepOutput {
        let requested_lines = detect_requested_lines(input.query);
        let web_content = input.web.as_text();

        let request = LLMRequest::prompt(&self.model, self.user_prompt(&input, &web_content))
            .with_system(SYSTEM_PROMPT);

        match self.llm.create_chat_completion(&request).await {
            Ok(response) => {
                let text = match requested_lines {
                    Some(n) => enforce_line_limit(&response.content, n),
                    None => response.content,
                };
                info!(chars = text.len(), requested_lines = ?requested_lines, "Generated summary");
                StepOutput::generated(text)
            }
            Err(e) => {
                warn!(error = %e, "Summarizer model call failed, returning combined context");
                StepOutput::fallback(fallback_text(&e.to_string(), input.rag_output, &web_content), e.to_string())
            }
        }
    }

    fn user_prompt(&self, input: &SummaryInput<'_>, web_content: &str) -> String {
        let language = if self.bilingual {
            "English and Chinese (Simplified)"
        } else {
            "English"
        };

        format!(
            "USER QUESTION:\n{query}\n\n\
             COORDINATOR REASONING:\n{reasoning}\n\n\
             INTERNAL DOCUMENTS (in-house corpus):\n{rag}\n\n\
             WEB CONTENT (if any):\n{web}\n\n\
             TASK:\n\
             - Merge the above information.\n\
             - Resolve or explain any conflicts between internal and web data.\n\
             - Follow the required structure.\n\
             - Output {language}",
            query = input.query,
            reasoning = input.reasoning,
            rag = input.rag_output,
            web = web_content,
            language = language,
        )
    }
}

fn fallback_text(reason: &str, rag: &str, web: &str) -> String {
    let or_none = |s: &str| if s.is_empty() { "(none)".to_string() } else { s.to_string() };
    [
        "Summary unavailable from model; showing combined context instead.".to_string(),
        format!("Reason: {}", reason),
        String::new(),
        "Context from internal docs:".to_string(),
        or_none(rag),
        String::new(),
        "Context from web search:".to_string(),
        or_none(web),
    ]
    .join("\n")
}

fn line_request_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b(\d+)\s*line").expect("valid regex"))
}

fn sentence_break_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[.!?]\s+").expect("valid regex"))
}

/// `Some(n)` when the query asks for an explicit "N line" answer
pub fn detect_requested_lines(query: &str) -> Option<usize> {
    let lowered = query.to_lowercase();
    line_request_pattern()
        .captures(&lowered)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<usize>().ok())
        .filter(|n| *n > 0)
}

/// First `max_lines` sentences joined by single spaces. Sentences end at
/// `.`, `!` or `?` followed by whitespace; the terminator stays attached.
pub fn enforce_line_limit(text: &str, max_lines: usize) -> String {
    if max_lines == 0 {
        return text.to_string();
    }

    let trimmed = text.trim();
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in sentence_break_pattern().find_iter(trimmed) {
        // Terminators are ASCII, so m.start() + 1 is a char boundary
        sentences.push(&trimmed[start..m.start() + 1]);
        start = m.end();
    }
    sentences.push(&trimmed[start..]);

    let result = sentences
        .into_iter()
        .take(max_lines)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();

    if result.is_empty() {
        text.to_string()
    } else {
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::ScriptedLLM;

    const FIVE_SENTENCES: &str = "One is first. Two follows!  Three asks?\nFour states. Five ends.";

    fn input<'a>(query: &'a str, web: WebContext<'a>) -> SummaryInput<'a> {
        SummaryInput {
            query,
            rag_output: "internal answer",
            web,
            reasoning: "reasoning text",
        }
    }

    #[test]
    fn test_detect_requested_lines() {
        assert_eq!(detect_requested_lines("Give me a 2 line summary"), Some(2));
        assert_eq!(detect_requested_lines("in 3 LINES please"), Some(3));
        assert_eq!(detect_requested_lines("a 4line answer"), Some(4));
        assert_eq!(detect_requested_lines("0 line"), None);
        assert_eq!(detect_requested_lines("pipeline status"), None);
        assert_eq!(detect_requested_lines("explain nitrate"), None);
    }

    #[test]
    fn test_enforce_line_limit() {
        assert_eq!(enforce_line_limit(FIVE_SENTENCES, 3), "One is first. Two follows! Three asks?");
        assert_eq!(enforce_line_limit(FIVE_SENTENCES, 10), "One is first. Two follows! Three asks? Four states. Five ends.");
        assert_eq!(enforce_line_limit("No terminator here", 1), "No terminator here");
        assert_eq!(enforce_line_limit("   ", 2), "   ");
        assert_eq!(enforce_line_limit(FIVE_SENTENCES, 0), FIVE_SENTENCES);
    }

    #[tokio::test]
    async fn test_three_line_request_truncates_model_output() {
        let llm = ScriptedLLM::new(vec![Ok(FIVE_SENTENCES.to_string())]);
        let agent = SummarizerAgent::new(llm.handle(), "mistral-small-latest", false);

        let output = agent.summarize(input("Answer in 3 line form", WebContext::Empty)).await;
        assert_eq!(output, StepOutput::generated("One is first. Two follows! Three asks?"));
    }

    #[tokio::test]
    async fn test_prompt_structure_and_language() {
        let llm = ScriptedLLM::new(vec![Ok("ok".to_string()), Ok("ok".to_string())]);

        SummarizerAgent::new(llm.handle(), "m", false)
            .summarize(input("q", WebContext::Text("web text")))
            .await;
        SummarizerAgent::new(llm.handle(), "m", true)
            .summarize(input("q", WebContext::Text("web text")))
            .await;

        let requests = llm.requests();
        let system = requests[0].system_instruction.as_deref().unwrap();
        assert!(system.contains("1) Background"));
        assert!(system.contains("4) Recommendations"));

        let prompts = llm.prompts();
        assert!(prompts[0].contains("WEB CONTENT (if any):\nweb text"));
        assert!(prompts[0].ends_with("- Output English"));
        assert!(prompts[1].ends_with("- Output English and Chinese (Simplified)"));
    }

    #[tokio::test]
    async fn test_model_failure_returns_exact_fallback() {
        let llm = ScriptedLLM::new(vec![Err("rate limited".to_string())]);
        let agent = SummarizerAgent::new(llm.handle(), "m", false);

        let output = agent.summarize(input("q", WebContext::Empty)).await;
        assert!(output.is_fallback());
        assert_eq!(
            output.text(),
            "Summary unavailable from model; showing combined context instead.\n\
             Reason: LLM API error: rate limited\n\
             \n\
             Context from internal docs:\n\
             internal answer\n\
             \n\
             Context from web search:\n\
             (none)"
        );
    }
}
