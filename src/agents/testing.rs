// In-memory collaborators for agent unit tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::embeddings::{check_lengths, DocumentChunk, EmbeddingGenerator, ScoredChunk, VectorStore};
use crate::llm::{LLMAdapter, LLM};
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse, TokenUsage};

/// Replays canned responses in order and records every request.
/// `Err(text)` entries become `AppError::LLMApi(text)`.
#[derive(Clone, Default)]
pub struct ScriptedLLM {
    responses: Arc<Mutex<VecDeque<Result<String, String>>>>,
    requests: Arc<Mutex<Vec<LLMRequest>>>,
}

impl ScriptedLLM {
    pub fn new(responses: Vec<Result<String, String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            requests: Arc::default(),
        }
    }

    pub fn handle(&self) -> LLM {
        LLM::from_adapter(Arc::new(self.clone()))
    }

    pub fn requests(&self) -> Vec<LLMRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Last user message of each request
    pub fn prompts(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|r| r.messages.last().map(|m| m.content.clone()))
            .collect()
    }
}

#[async_trait]
impl LLMAdapter for ScriptedLLM {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(content)) => Ok(LLMResponse {
                content,
                finish_reason: "stop".to_string(),
                usage: TokenUsage::default(),
            }),
            Some(Err(message)) => Err(AppError::LLMApi(message)),
            None => Err(AppError::LLMApi("script exhausted".to_string())),
        }
    }
}

/// Every text embeds to the same unit vector
pub struct UnitEmbedder;

#[async_trait]
impl EmbeddingGenerator for UnitEmbedder {
    async fn generate_embeddings(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    points: Mutex<Vec<(DocumentChunk, Vec<f32>)>>,
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn add_documents(&self, chunks: &[DocumentChunk], embeddings: &[Vec<f32>]) -> AppResult<()> {
        check_lengths(chunks, embeddings)?;
        let mut points = self.points.lock().unwrap();
        points.extend(chunks.iter().cloned().zip(embeddings.iter().cloned()));
        Ok(())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.points.lock().unwrap().len() as u64)
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> AppResult<Vec<ScoredChunk>> {
        let points = self.points.lock().unwrap();
        let mut scored: Vec<ScoredChunk> = points
            .iter()
            .map(|(chunk, vector)| ScoredChunk {
                content: chunk.content.clone(),
                metadata: chunk.metadata.clone(),
                score: vector.iter().zip(embedding).map(|(a, b)| a * b).sum(),
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn reset(&self) -> AppResult<()> {
        self.points.lock().unwrap().clear();
        Ok(())
    }
}
