// Query-time retrieval over the vector store

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::{EmbeddingGenerator, Metadata, VectorStore};
use crate::types::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedDocument {
    pub content: String,
    pub metadata: Metadata,
    pub score: f32,
}

#[derive(Clone)]
pub struct RagRetriever {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingGenerator>,
}

impl RagRetriever {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn EmbeddingGenerator>) -> Self {
        Self { store, embedder }
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Embed `query` and return the `top_k` most similar chunks
    pub async fn retrieve(&self, query: &str, top_k: usize) -> AppResult<Vec<RetrievedDocument>> {
        let embedding = self
            .embedder
            .generate_embeddings(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Embedding("No embedding returned for query".to_string()))?;

        let results = self.store.query(&embedding, top_k).await?;
        debug!(top_k, found = results.len(), "Retrieved documents");

        Ok(results
            .into_iter()
            .map(|r| RetrievedDocument {
                content: r.content,
                metadata: r.metadata,
                score: r.score,
            })
            .collect())
    }
}
