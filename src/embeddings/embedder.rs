// Embedding generation via the Mistral embeddings endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::types::{AppError, AppResult};
use crate::utils::with_retry;

const EMBEDDING_BATCH_SIZE: usize = 32;
const MAX_ATTEMPTS: u32 = 3;

#[async_trait]
pub trait EmbeddingGenerator: Send + Sync {
    /// One vector per input text, in input order
    async fn generate_embeddings(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;
}

pub struct MistralEmbeddings {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
    retry_delay: Duration,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

impl MistralEmbeddings {
    pub fn new(api_key: &str, api_base: &str, model: &str, timeout: Duration) -> AppResult<Self> {
        if api_key.trim().is_empty() {
            return Err(AppError::Config(
                "MISTRALAI_API_KEY is required for embedding generation".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
            retry_delay: Duration::from_millis(500),
        })
    }

    pub fn from_config(config: &crate::config::LLMConfig) -> AppResult<Self> {
        Self::new(
            &config.api_key,
            &config.api_base,
            &config.embedding_model,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    async fn embed_batch(&self, batch: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.api_base);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: batch,
            })
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("Embedding request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Embedding(format!("Embedding API error ({}): {}", status, body)));
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("Failed to parse embedding response: {}", e)))?;

        if parsed.data.len() != batch.len() {
            return Err(AppError::Embedding(format!(
                "Expected {} embeddings, received {}",
                batch.len(),
                parsed.data.len()
            )));
        }

        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingGenerator for MistralEmbeddings {
    async fn generate_embeddings(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        info!(count = texts.len(), model = %self.model, "Generating embeddings");
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBEDDING_BATCH_SIZE) {
            let this = self;
            let embedded = with_retry(move || this.embed_batch(batch), MAX_ATTEMPTS, self.retry_delay).await?;
            debug!(batch = batch.len(), "Embedded batch");
            vectors.extend(embedded);
        }
        Ok(vectors)
    }
}
