// Ingestion: PDFs -> chunks -> embeddings -> vector store

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::{DocumentChunk, DocumentProcessor, EmbeddingGenerator, SourceDocument, TextChunker, VectorStore};
use crate::types::AppResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub documents: usize,
    pub chunks: usize,
}

#[derive(Clone)]
pub struct Ingestor {
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingGenerator>,
    store: Arc<dyn VectorStore>,
}

impl Ingestor {
    pub fn new(chunker: TextChunker, embedder: Arc<dyn EmbeddingGenerator>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            chunker,
            embedder,
            store,
        }
    }

    /// Split documents into chunks, each with a fresh id. No deduplication.
    pub fn chunk_documents(&self, documents: &[SourceDocument]) -> Vec<DocumentChunk> {
        documents
            .iter()
            .flat_map(|doc| {
                self.chunker
                    .split_text(&doc.text)
                    .into_iter()
                    .enumerate()
                    .map(move |(index, content)| {
                        let mut metadata = doc.metadata.clone();
                        metadata.insert("chunk_index".to_string(), index.to_string());
                        DocumentChunk {
                            id: Uuid::new_v4().to_string(),
                            content,
                            metadata,
                        }
                    })
            })
            .collect()
    }

    pub async fn ingest_documents(&self, documents: &[SourceDocument]) -> AppResult<IngestReport> {
        let chunks = self.chunk_documents(documents);
        info!(documents = documents.len(), chunks = chunks.len(), "Split documents into chunks");

        if chunks.is_empty() {
            info!("No extractable text, skipping embedding and insert");
            return Ok(IngestReport {
                documents: documents.len(),
                chunks: 0,
            });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.generate_embeddings(&texts).await?;
        self.store.add_documents(&chunks, &embeddings).await?;

        info!(chunks = chunks.len(), "Document ingestion complete");
        Ok(IngestReport {
            documents: documents.len(),
            chunks: chunks.len(),
        })
    }

    /// Ingest every PDF under `directory`
    pub async fn ingest_directory(&self, directory: &Path) -> AppResult<IngestReport> {
        let documents = DocumentProcessor::process_directory(directory);
        self.ingest_documents(&documents).await
    }
}
