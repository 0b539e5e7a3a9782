//! In-House Search Agent
//!
//! Answers from the local PDF corpus only. The knowledge base is built on
//! first use (or on explicit rebuild); each query retrieves the top-k chunks
//! and asks the model for a context-grounded answer.

use tracing::{info, warn};

use crate::config::RagConfig;
use crate::embeddings::{IngestReport, Ingestor, RagRetriever};
use crate::llm::LLM;
use crate::types::{AppResult, LLMRequest};

pub const NO_RELEVANT_DOCUMENTS: &str = "No relevant documents found in the knowledge base.";

const SYSTEM_PROMPT: &str = "You are a RAG agent. Use ONLY the retrieved context to answer the question. \
Provide a detailed, well-structured, and complete explanation. \
Do not hallucinate or add info not found in the context. \
If context lacks information, say so clearly.";

const MAX_TOKENS: u32 = 2048;
const TEMPERATURE: f32 = 0.2;

#[derive(Clone)]
pub struct InHouseSearchAgent {
    llm: LLM,
    model: String,
    retriever: RagRetriever,
    ingestor: Ingestor,
    config: RagConfig,
}

impl InHouseSearchAgent {
    pub fn new(llm: LLM, model: &str, retriever: RagRetriever, ingestor: Ingestor, config: RagConfig) -> Self {
        Self {
            llm,
            model: model.to_string(),
            retriever,
            ingestor,
            config,
        }
    }

    /// Populate the vector store from the PDF directory when it is empty,
    /// or unconditionally after a reset when `rebuild` is set. Returns the
    /// ingestion report if ingestion ran.
    pub async fn prepare(&self, rebuild: bool) -> AppResult<Option<IngestReport>> {
        let store = self.retriever.store();
        if rebuild {
            info!("Rebuilding knowledge base");
            store.reset().await?;
        } else if store.count().await? > 0 {
            return Ok(None);
        }

        let report = self.ingestor.ingest_directory(&self.config.pdf_directory).await?;
        if report.chunks == 0 {
            warn!(directory = %self.config.pdf_directory.display(), "Knowledge base is empty after ingestion");
        }
        Ok(Some(report))
    }

    pub async fn run(&self, query: &str) -> AppResult<String> {
        let documents = self.retriever.retrieve(query, self.config.top_k).await?;
        if documents.is_empty() {
            return Ok(NO_RELEVANT_DOCUMENTS.to_string());
        }

        let context = documents
            .iter()
            .map(|d| d.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let request = LLMRequest::prompt(&self.model, build_prompt(&context, query))
            .with_max_tokens(MAX_TOKENS)
            .with_temperature(TEMPERATURE);

        let response = self.llm.create_chat_completion(&request).await?;
        info!(documents = documents.len(), response_len = response.content.len(), "In-house answer generated");
        Ok(response.content)
    }
}

fn build_prompt(context: &str, query: &str) -> String {
    format!(
        "{}\n\n### CONTEXT:\n{}\n\n### USER QUESTION:\n{}\n\n### ANSWER (detailed and context-grounded):",
        SYSTEM_PROMPT, context, query
    )
}
