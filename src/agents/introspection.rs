//! Introspection Agent
//!
//! Turns user feedback on a finished turn into a self-reflection. The model
//! is asked for a JSON object `{"reflection": ..., "score": 1-10}`.
//!
//! Two paths use it:
//! - the coordinator keeps the raw model text via [`IntrospectionAgent::generate_reflection`]
//! - the standalone [`IntrospectionAgent::run`] generates, parses and persists,
//!   and any failure along the way leaves the store untouched

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::web::WebContext;
use crate::db::ReflectionStore;
use crate::llm::LLM;
use crate::models::NewReflection;
use crate::types::{AppError, AppResult};

pub struct ReflectionInput<'a> {
    pub query: &'a str,
    pub rag_output: &'a str,
    pub web: WebContext<'a>,
    pub reasoning: &'a str,
    pub feedback: &'a str,
    /// Final answer shown to the user; the in-house output stands in when absent
    pub answer: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedReflection {
    pub reflection: String,
    pub score: i64,
}

#[derive(Deserialize)]
struct RawReflection {
    reflection: String,
    score: Value,
}

#[derive(Clone)]
pub struct IntrospectionAgent {
    llm: LLM,
    model: String,
    store: ReflectionStore,
}

impl IntrospectionAgent {
    pub fn new(llm: LLM, model: &str, store: ReflectionStore) -> Self {
        Self {
            llm,
            model: model.to_string(),
            store,
        }
    }

    /// Raw model text; not parsed
    pub async fn generate_reflection(&self, input: ReflectionInput<'_>) -> AppResult<String> {
        let answer = input.answer.filter(|a| !a.is_empty()).unwrap_or(input.rag_output);
        let prompt = build_prompt(input.query, answer, &input.web.as_text(), input.reasoning, input.feedback);

        let text = self.llm.complete(&self.model, &prompt).await?;
        debug!(chars = text.len(), "Reflection generated");
        Ok(text)
    }

    /// Generate, parse, then persist a full reflection row
    pub async fn run(&self, query: &str, answer: &str, feedback: &str) -> AppResult<ParsedReflection> {
        debug!("Introspection: generating");
        let raw = self
            .generate_reflection(ReflectionInput {
                query,
                rag_output: "",
                web: WebContext::Empty,
                reasoning: "",
                feedback,
                answer: Some(answer),
            })
            .await?;

        debug!("Introspection: parsing");
        let parsed = parse_reflection(&raw)?;

        self.store
            .insert(NewReflection {
                reflection: parsed.reflection.clone(),
                query: Some(query.to_string()),
                answer: Some(answer.to_string()),
                feedback: Some(feedback.to_string()),
                score: Some(parsed.score),
            })
            .await?;

        info!(score = parsed.score, "Introspection: persisted");
        Ok(parsed)
    }
}

fn build_prompt(query: &str, answer: &str, web: &str, reasoning: &str, feedback: &str) -> String {
    format!(
        r#"You are the Introspection Agent.

USER QUERY: {query}
SYSTEM ANSWER: {answer}
WEB EVIDENCE: {web}
INTERNAL REASONING: {reasoning}
USER FEEDBACK: {feedback}

Produce a self-reflection that explains:
- Whether the answer was good or bad
- What could be improved next time
- Assign an improvement score from 1 to 10

Return ONLY JSON in this EXACT format:
{{
    "reflection": "text here",
    "score": number
}}"#
    )
}

/// Strip an optional ```json fence around the model output
fn extract_json(response: &str) -> &str {
    if response.contains("```json") {
        response
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .unwrap_or(response)
            .trim()
    } else if response.contains("```") {
        response.split("```").nth(1).unwrap_or(response).trim()
    } else {
        response.trim()
    }
}

pub fn parse_reflection(raw: &str) -> AppResult<ParsedReflection> {
    let parsed: RawReflection = serde_json::from_str(extract_json(raw))
        .map_err(|e| AppError::MalformedReflection(format!("invalid JSON: {}", e)))?;

    let score = parsed
        .score
        .as_i64()
        .ok_or_else(|| AppError::MalformedReflection(format!("score is not an integer: {}", parsed.score)))?;
    if !(1..=10).contains(&score) {
        return Err(AppError::MalformedReflection(format!("score {} outside 1..=10", score)));
    }

    Ok(ParsedReflection {
        reflection: parsed.reflection,
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::ScriptedLLM;

    async fn agent(llm: &ScriptedLLM) -> (tempfile::TempDir, IntrospectionAgent, ReflectionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ReflectionStore::open(&dir.path().join("reflections.db")).await.unwrap();
        let agent = IntrospectionAgent::new(llm.handle(), "mistral-medium-latest", store.clone());
        (dir, agent, store)
    }

    #[test]
    fn test_parse_plain_and_fenced() {
        let plain = parse_reflection(r#"{"reflection": "Cite limits.", "score": 6}"#).unwrap();
        assert_eq!(plain, ParsedReflection { reflection: "Cite limits.".to_string(), score: 6 });

        let fenced = parse_reflection("Here you go:\n```json\n{\"reflection\": \"Be brief.\", \"score\": 9}\n```").unwrap();
        assert_eq!(fenced.score, 9);
    }

    #[test]
    fn test_parse_rejects_bad_scores_and_prose() {
        for raw in [
            r#"{"reflection": "x", "score": 0}"#,
            r#"{"reflection": "x", "score": 11}"#,
            r#"{"reflection": "x", "score": 7.5}"#,
            r#"{"reflection": "x", "score": "7"}"#,
            r#"{"reflection": "x"}"#,
            "The answer was fine.",
        ] {
            assert!(
                matches!(parse_reflection(raw), Err(AppError::MalformedReflection(_))),
                "accepted {}",
                raw
            );
        }
    }

    #[tokio::test]
    async fn test_prompt_uses_answer_then_rag_output() {
        let llm = ScriptedLLM::new(vec![Ok("a".to_string()), Ok("b".to_string())]);
        let (_dir, agent, _store) = agent(&llm).await;

        let input = |answer| ReflectionInput {
            query: "lead?",
            rag_output: "rag text",
            web: WebContext::Text("web text"),
            reasoning: "why",
            feedback: "too vague",
            answer,
        };
        agent.generate_reflection(input(Some("final answer"))).await.unwrap();
        agent.generate_reflection(input(None)).await.unwrap();

        let prompts = llm.prompts();
        assert!(prompts[0].contains("SYSTEM ANSWER: final answer"));
        assert!(prompts[0].contains("WEB EVIDENCE: web text"));
        assert!(prompts[0].contains("USER FEEDBACK: too vague"));
        assert!(prompts[0].contains("Return ONLY JSON"));
        assert!(prompts[1].contains("SYSTEM ANSWER: rag text"));
    }

    #[tokio::test]
    async fn test_standalone_run_persists_full_row() {
        let llm = ScriptedLLM::new(vec![Ok(r#"{"reflection": "Add sources.", "score": 5}"#.to_string())]);
        let (_dir, agent, store) = agent(&llm).await;

        let parsed = agent.run("pfas?", "PFAS are...", "no sources").await.unwrap();
        assert_eq!(parsed.score, 5);

        let rows = store.all().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].query.as_deref(), Some("pfas?"));
        assert_eq!(rows[0].answer.as_deref(), Some("PFAS are..."));
        assert_eq!(rows[0].feedback.as_deref(), Some("no sources"));
        assert_eq!(rows[0].reflection, "Add sources.");
        assert_eq!(rows[0].score, Some(5));
    }

    #[tokio::test]
    async fn test_standalone_failures_write_nothing() {
        let llm = ScriptedLLM::new(vec![Err("timeout".to_string()), Ok("not json".to_string())]);
        let (_dir, agent, store) = agent(&llm).await;

        assert!(matches!(agent.run("q", "a", "f").await, Err(AppError::LLMApi(_))));
        assert!(matches!(agent.run("q", "a", "f").await, Err(AppError::MalformedReflection(_))));
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
