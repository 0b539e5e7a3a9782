// Vector store collaborator backed by Qdrant

use async_trait::async_trait;
use qdrant_client::qdrant::{
    value::Kind, CountPointsBuilder, CreateCollectionBuilder, DeleteCollectionBuilder, Distance, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use std::collections::HashMap;
use tracing::info;

use super::{DocumentChunk, Metadata};
use crate::types::{AppError, AppResult};

const CONTENT_KEY: &str = "content";
const UPSERT_BATCH_SIZE: usize = 256;

/// A stored chunk returned by a similarity query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub content: String,
    pub metadata: Metadata,
    pub score: f32,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert chunks with their embeddings; both slices must have equal length
    async fn add_documents(&self, chunks: &[DocumentChunk], embeddings: &[Vec<f32>]) -> AppResult<()>;

    async fn count(&self) -> AppResult<u64>;

    /// Nearest `top_k` chunks to `embedding`, best first
    async fn query(&self, embedding: &[f32], top_k: usize) -> AppResult<Vec<ScoredChunk>>;

    /// Drop every stored chunk
    async fn reset(&self) -> AppResult<()>;
}

pub fn check_lengths(chunks: &[DocumentChunk], embeddings: &[Vec<f32>]) -> AppResult<()> {
    if chunks.len() != embeddings.len() {
        return Err(AppError::VectorStore(format!(
            "Number of chunks ({}) must match number of embeddings ({})",
            chunks.len(),
            embeddings.len()
        )));
    }
    Ok(())
}

pub struct QdrantStore {
    client: Qdrant,
    collection: String,
    dimension: u64,
}

impl QdrantStore {
    /// Connect and make sure the collection exists
    pub async fn connect(url: &str, collection: &str, dimension: u64) -> AppResult<Self> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| AppError::VectorStore(format!("Failed to create Qdrant client: {}", e)))?;

        let store = Self {
            client,
            collection: collection.to_string(),
            dimension,
        };
        store.ensure_collection().await?;
        Ok(store)
    }

    pub async fn from_config(config: &crate::config::RagConfig) -> AppResult<Self> {
        Self::connect(&config.qdrant_url, &config.collection, config.embedding_dim).await
    }

    async fn ensure_collection(&self) -> AppResult<()> {
        let exists = self
            .client
            .collection_exists(self.collection.as_str())
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to check collection: {}", e)))?;

        if !exists {
            info!(collection = %self.collection, dimension = self.dimension, "Creating collection");
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection)
                        .vectors_config(VectorParamsBuilder::new(self.dimension, Distance::Cosine)),
                )
                .await
                .map_err(|e| AppError::VectorStore(format!("Failed to create collection: {}", e)))?;
        }
        Ok(())
    }

    fn to_point(chunk: &DocumentChunk, embedding: &[f32]) -> PointStruct {
        let mut payload: HashMap<String, QdrantValue> = chunk
            .metadata
            .iter()
            .map(|(k, v)| (k.clone(), QdrantValue::from(v.clone())))
            .collect();
        payload.insert(CONTENT_KEY.to_string(), QdrantValue::from(chunk.content.clone()));
        PointStruct::new(chunk.id.clone(), embedding.to_vec(), payload)
    }
}

fn payload_string(value: &QdrantValue) -> Option<String> {
    match &value.kind {
        Some(Kind::StringValue(s)) => Some(s.clone()),
        Some(Kind::IntegerValue(i)) => Some(i.to_string()),
        Some(Kind::DoubleValue(d)) => Some(d.to_string()),
        Some(Kind::BoolValue(b)) => Some(b.to_string()),
        _ => None,
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn add_documents(&self, chunks: &[DocumentChunk], embeddings: &[Vec<f32>]) -> AppResult<()> {
        check_lengths(chunks, embeddings)?;

        let points: Vec<PointStruct> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| Self::to_point(chunk, embedding))
            .collect();

        for batch in points.chunks(UPSERT_BATCH_SIZE) {
            self.client
                .upsert_points(UpsertPointsBuilder::new(&self.collection, batch.to_vec()).wait(true))
                .await
                .map_err(|e| AppError::VectorStore(format!("Failed to upsert points: {}", e)))?;
        }

        info!(count = chunks.len(), collection = %self.collection, "Added documents to vector store");
        Ok(())
    }

    async fn count(&self) -> AppResult<u64> {
        let response = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to count points: {}", e)))?;
        Ok(response.result.map(|r| r.count).unwrap_or(0))
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> AppResult<Vec<ScoredChunk>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, embedding.to_vec(), top_k as u64).with_payload(true),
            )
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to search points: {}", e)))?;

        Ok(response
            .result
            .into_iter()
            .map(|point| {
                let mut content = String::new();
                let mut metadata = Metadata::new();
                for (key, value) in &point.payload {
                    if key == CONTENT_KEY {
                        content = payload_string(value).unwrap_or_default();
                    } else if let Some(v) = payload_string(value) {
                        metadata.insert(key.clone(), v);
                    }
                }
                ScoredChunk {
                    content,
                    metadata,
                    score: point.score,
                }
            })
            .collect())
    }

    async fn reset(&self) -> AppResult<()> {
        info!(collection = %self.collection, "Resetting vector store collection");
        self.client
            .delete_collection(DeleteCollectionBuilder::new(self.collection.as_str()))
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to delete collection: {}", e)))?;
        self.ensure_collection().await
    }
}
