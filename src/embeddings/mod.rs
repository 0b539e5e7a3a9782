//! Embeddings and vector search
//!
//! Everything the in-house agent needs to turn a directory of PDFs into
//! retrievable context:
//!
//! ```text
//! PDF files ─► DocumentProcessor ─► TextChunker ─► EmbeddingGenerator ─► VectorStore
//!                                                                          │
//!                           query ─► EmbeddingGenerator ─► RagRetriever ◄──┘
//! ```
//!
//! The embedding model and the nearest-neighbour index are external services
//! reached through the `EmbeddingGenerator` and `VectorStore` traits.

pub mod document_processor;
pub mod embedder;
pub mod ingest;
pub mod text_chunker;
pub mod vector_search;
pub mod vector_store;

pub use document_processor::*;
pub use embedder::*;
pub use ingest::*;
pub use text_chunker::*;
pub use vector_search::*;
pub use vector_store::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form string metadata attached to documents and chunks
pub type Metadata = BTreeMap<String, String>;

/// One unit of extracted text (a PDF page) before chunking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub text: String,
    pub metadata: Metadata,
}

/// A bounded segment of a source document, the unit of embedding and retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
}
