//! Coordinator Agent
//!
//! Drives one turn through a fixed sequence and returns it as a [`Turn`]:
//!
//! 1. load the most recent reflections (once, before anything else runs)
//! 2. intent analysis (advisory, recorded but not used for routing)
//! 3. in-house search
//! 4. web search
//! 5. reasoning over both outputs
//! 6. summarization
//!
//! Steps 2, 3, 5 and 6 degrade to fallback text on failure, so `run` always
//! produces an answer. Feedback on a turn goes through [`Coordinator::handle_feedback`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::inhouse::InHouseSearchAgent;
use super::introspection::{parse_reflection, IntrospectionAgent, ReflectionInput};
use super::summarizer::{SummarizerAgent, SummaryInput};
use super::web::{WebContext, WebSearchAgent, WebSearchOutput};
use crate::config::{Config, RagConfig};
use crate::db::ReflectionStore;
use crate::embeddings::{Ingestor, MistralEmbeddings, QdrantStore, RagRetriever, TextChunker};
use crate::llm::{LLMProviderConfig, LLM};
use crate::models::{NewReflection, Reflection};
use crate::search::build_search_tool;
use crate::types::{AppError, AppResult, StepOutput};

pub const HELPFUL_FEEDBACK: &str = "The user marked this answer as helpful.";

/// Everything one call to [`Coordinator::run`] produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub query: String,
    pub intent: StepOutput,
    pub rag_output: StepOutput,
    pub web_output: WebSearchOutput,
    pub reasoning: StepOutput,
    pub answer: StepOutput,
    pub reflections_used: Vec<String>,
    pub started_at: DateTime<Utc>,
}

impl Turn {
    pub fn is_degraded(&self) -> bool {
        [&self.intent, &self.rag_output, &self.reasoning, &self.answer]
            .iter()
            .any(|step| step.is_fallback())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Helpful,
    NotHelpful(String),
}

impl Feedback {
    /// Feedback text handed to the introspection prompt
    pub fn text(&self) -> AppResult<&str> {
        match self {
            Feedback::Helpful => Ok(HELPFUL_FEEDBACK),
            Feedback::NotHelpful(text) if text.trim().is_empty() => Err(AppError::InvalidRequest(
                "Feedback text is required when an answer is marked not helpful".to_string(),
            )),
            Feedback::NotHelpful(text) => Ok(text.as_str()),
        }
    }
}

/// Collaborators and settings a coordinator is assembled from
pub struct CoordinatorParts {
    pub llm: LLM,
    pub model: String,
    pub inhouse: InHouseSearchAgent,
    pub web: WebSearchAgent,
    pub summarizer: SummarizerAgent,
    pub introspection: IntrospectionAgent,
    pub store: ReflectionStore,
    pub recent_reflections: usize,
}

/// Stateless across turns; last-turn state lives in [`Session`] or the
/// HTTP session registry.
pub struct Coordinator {
    llm: LLM,
    model: String,
    inhouse: InHouseSearchAgent,
    web: WebSearchAgent,
    summarizer: SummarizerAgent,
    introspection: IntrospectionAgent,
    store: ReflectionStore,
    recent_reflections: usize,
}

/// Build the in-house agent against the configured Qdrant collection
pub async fn build_inhouse_agent(config: &Config, llm: LLM) -> AppResult<InHouseSearchAgent> {
    let rag: &RagConfig = &config.rag;
    let embedder = Arc::new(MistralEmbeddings::from_config(&config.llm)?);
    let store = Arc::new(QdrantStore::from_config(rag).await?);
    let chunker = TextChunker::new(rag.chunk_size, rag.chunk_overlap)?;

    let retriever = RagRetriever::new(store.clone(), embedder.clone());
    let ingestor = Ingestor::new(chunker, embedder, store);
    Ok(InHouseSearchAgent::new(
        llm,
        &config.llm.rag_model,
        retriever,
        ingestor,
        rag.clone(),
    ))
}

impl Coordinator {
    pub fn new(parts: CoordinatorParts) -> Self {
        Self {
            llm: parts.llm,
            model: parts.model,
            inhouse: parts.inhouse,
            web: parts.web,
            summarizer: parts.summarizer,
            introspection: parts.introspection,
            store: parts.store,
            recent_reflections: parts.recent_reflections,
        }
    }

    /// Wire the hosted-model collaborators. Missing credentials fail here,
    /// before any turn runs. The knowledge base is ingested if empty.
    pub async fn from_config(config: &Config) -> AppResult<Self> {
        let llm = LLM::new(LLMProviderConfig::from_config(&config.llm))?;
        let store = ReflectionStore::open(&config.store.db_path).await?;
        let search = build_search_tool(&config.search)?;

        let inhouse = build_inhouse_agent(config, llm.clone()).await?;
        if let Some(report) = inhouse.prepare(config.rag.rebuild).await? {
            info!(documents = report.documents, chunks = report.chunks, "Knowledge base ingested");
        }

        Ok(Self::new(CoordinatorParts {
            model: config.llm.coordinator_model.clone(),
            inhouse,
            web: WebSearchAgent::new(search, config.search.max_results),
            summarizer: SummarizerAgent::new(llm.clone(), &config.llm.summarizer_model, config.summarizer.bilingual),
            introspection: IntrospectionAgent::new(llm.clone(), &config.llm.introspection_model, store.clone()),
            store,
            recent_reflections: config.store.recent_reflections,
            llm,
        }))
    }

    pub fn store(&self) -> &ReflectionStore {
        &self.store
    }

    /// Most recent reflection texts, newest first. A read failure yields no
    /// guidelines rather than failing the turn.
    async fn load_reflections(&self) -> Vec<String> {
        match self.store.recent(self.recent_reflections).await {
            Ok(rows) => rows.into_iter().map(|r| r.reflection).collect(),
            Err(e) => {
                warn!(error = %e, "Failed to load reflections");
                Vec::new()
            }
        }
    }

    async fn model_step(&self, prompt: &str, fallback_label: &str) -> StepOutput {
        match self.llm.complete(&self.model, prompt).await {
            Ok(text) => StepOutput::generated(text),
            Err(e) => {
                warn!(error = %e, step = fallback_label, "Coordinator model step failed");
                StepOutput::fallback(
                    format!("[{} unavailable due to rate limit or error: {}]", fallback_label, e),
                    e.to_string(),
                )
            }
        }
    }

    pub async fn run(&self, query: &str) -> Turn {
        let id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(turn_id = %id, query_len = query.len(), "Starting turn");

        // Only reflections persisted before this turn are visible to it
        let reflections = self.load_reflections().await;
        let guidelines = reflections.join("\n");

        let intent = self.model_step(&intent_prompt(&guidelines, query), "Intent Analyzer").await;

        let rag_output = match self.inhouse.run(query).await {
            Ok(text) => StepOutput::generated(text),
            Err(e) => {
                warn!(error = %e, "In-house search failed");
                StepOutput::fallback(format!("[In-house search unavailable: {}]", e), e.to_string())
            }
        };

        let web_output = self.web.run(query).await;

        let reasoning = self
            .model_step(
                &reasoning_prompt(&guidelines, query, rag_output.text(), &web_output.summary),
                "Reasoning step",
            )
            .await;

        let answer = self
            .summarizer
            .summarize(SummaryInput {
                query,
                rag_output: rag_output.text(),
                web: WebContext::Structured(&web_output),
                reasoning: reasoning.text(),
            })
            .await;

        let turn = Turn {
            id,
            query: query.to_string(),
            intent,
            rag_output,
            web_output,
            reasoning,
            answer,
            reflections_used: reflections,
            started_at,
        };
        info!(turn_id = %id, degraded = turn.is_degraded(), "Turn complete");
        turn
    }

    /// Reflect on `turn` given the user's feedback and append the result.
    /// Nothing is written if reflection generation fails.
    pub async fn handle_feedback(&self, turn: Option<&Turn>, feedback: &Feedback) -> AppResult<Reflection> {
        let turn = turn.ok_or(AppError::NoPriorInteraction)?;
        let feedback_text = feedback.text()?;

        let raw = self
            .introspection
            .generate_reflection(ReflectionInput {
                query: &turn.query,
                rag_output: turn.rag_output.text(),
                web: WebContext::Structured(&turn.web_output),
                reasoning: turn.reasoning.text(),
                feedback: feedback_text,
                answer: Some(turn.answer.text()),
            })
            .await?;

        let score = match parse_reflection(&raw) {
            Ok(parsed) => Some(parsed.score),
            Err(e) => {
                warn!(error = %e, "Reflection text is not structured; storing without score");
                None
            }
        };

        self.store
            .insert(NewReflection {
                reflection: raw,
                query: Some(turn.query.clone()),
                answer: Some(turn.answer.text().to_string()),
                feedback: Some(feedback_text.to_string()),
                score,
            })
            .await
    }
}

fn intent_prompt(guidelines: &str, query: &str) -> String {
    format!(
        r#"You are the Intent Analyzer.

Past reflections to guide you:
{guidelines}

User Query: {query}

Decide what tasks are needed. Always respond as JSON like:
{{
    "intent": "...",
    "tasks": ["RAG", "WEB"]
}}"#
    )
}

fn reasoning_prompt(guidelines: &str, query: &str, rag: &str, web: &str) -> String {
    format!(
        "Past improvement guidelines:\n{guidelines}\n\n\
         User Query: {query}\n\n\
         RAG Output:\n{rag}\n\n\
         Web Output:\n{web}\n\n\
         Provide structured reasoning for the summarizer:"
    )
}

/// Single-user conversation over a shared coordinator
pub struct Session {
    coordinator: Arc<Coordinator>,
    last: Option<Turn>,
}

impl Session {
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self { coordinator, last: None }
    }

    pub fn last(&self) -> Option<&Turn> {
        self.last.as_ref()
    }

    /// Run a turn, replace the last-turn state and return the answer text
    pub async fn ask(&mut self, query: &str) -> String {
        let turn = self.coordinator.run(query).await;
        let answer = turn.answer.text().to_string();
        self.last = Some(turn);
        answer
    }

    pub async fn feedback(&self, feedback: &Feedback) -> AppResult<Reflection> {
        self.coordinator.handle_feedback(self.last.as_ref(), feedback).await
    }
}
