// Shared fakes for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use aqualens::agents::{
    Coordinator, CoordinatorParts, InHouseSearchAgent, IntrospectionAgent, SummarizerAgent, WebSearchAgent,
};
use aqualens::config::{
    Config, LLMConfig, RagConfig, SearchBackend, SearchConfig, ServerConfig, StoreConfig, SummarizerConfig,
};
use aqualens::db::ReflectionStore;
use aqualens::embeddings::{
    check_lengths, DocumentChunk, EmbeddingGenerator, Ingestor, Metadata, RagRetriever, ScoredChunk, TextChunker,
    VectorStore,
};
use aqualens::llm::{LLMAdapter, LLM};
use aqualens::routes::SessionRegistry;
use aqualens::search::StaticSearch;
use aqualens::types::{AppError, AppResult, LLMRequest, LLMResponse, TokenUsage};
use aqualens::AppState;

pub const COORDINATOR_MODEL: &str = "coordinator-model";
pub const RAG_MODEL: &str = "rag-model";
pub const SUMMARIZER_MODEL: &str = "summarizer-model";
pub const INTROSPECTION_MODEL: &str = "introspection-model";

/// Answers by model name; unknown models fail like a rate-limited API
#[derive(Clone, Default)]
pub struct ModelRouter {
    replies: Arc<Mutex<HashMap<String, Result<String, String>>>>,
    requests: Arc<Mutex<Vec<LLMRequest>>>,
}

impl ModelRouter {
    pub fn reply(&self, model: &str, reply: Result<&str, &str>) -> &Self {
        let reply = reply.map(str::to_string).map_err(str::to_string);
        self.replies.lock().unwrap().insert(model.to_string(), reply);
        self
    }

    pub fn requests_for(&self, model: &str) -> Vec<LLMRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.model == model)
            .cloned()
            .collect()
    }

    pub fn handle(&self) -> LLM {
        LLM::from_adapter(Arc::new(self.clone()))
    }
}

#[async_trait]
impl LLMAdapter for ModelRouter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.replies.lock().unwrap().get(&request.model).cloned();
        match reply {
            Some(Ok(content)) => Ok(LLMResponse {
                content,
                finish_reason: "stop".to_string(),
                usage: TokenUsage::default(),
            }),
            Some(Err(message)) => Err(AppError::LLMApi(message)),
            None => Err(AppError::LLMApi("429 Too Many Requests".to_string())),
        }
    }
}

pub struct ConstantEmbedder;

#[async_trait]
impl EmbeddingGenerator for ConstantEmbedder {
    async fn generate_embeddings(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    points: Mutex<Vec<DocumentChunk>>,
}

impl InMemoryStore {
    pub async fn seed(&self, texts: &[&str]) {
        let chunks: Vec<DocumentChunk> = texts
            .iter()
            .map(|t| DocumentChunk {
                id: uuid::Uuid::new_v4().to_string(),
                content: t.to_string(),
                metadata: Metadata::new(),
            })
            .collect();
        let embeddings = vec![vec![1.0, 0.0]; chunks.len()];
        self.add_documents(&chunks, &embeddings).await.unwrap();
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn add_documents(&self, chunks: &[DocumentChunk], embeddings: &[Vec<f32>]) -> AppResult<()> {
        check_lengths(chunks, embeddings)?;
        self.points.lock().unwrap().extend_from_slice(chunks);
        Ok(())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.points.lock().unwrap().len() as u64)
    }

    async fn query(&self, _embedding: &[f32], top_k: usize) -> AppResult<Vec<ScoredChunk>> {
        Ok(self
            .points
            .lock()
            .unwrap()
            .iter()
            .take(top_k)
            .map(|c| ScoredChunk {
                content: c.content.clone(),
                metadata: c.metadata.clone(),
                score: 1.0,
            })
            .collect())
    }

    async fn reset(&self) -> AppResult<()> {
        self.points.lock().unwrap().clear();
        Ok(())
    }
}

pub struct Harness {
    pub dir: tempfile::TempDir,
    pub models: ModelRouter,
    pub documents: Arc<InMemoryStore>,
    pub store: ReflectionStore,
    pub coordinator: Arc<Coordinator>,
}

pub async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let models = ModelRouter::default();
    let documents = Arc::new(InMemoryStore::default());
    let embedder = Arc::new(ConstantEmbedder);
    let store = ReflectionStore::open(&dir.path().join("aqualens.db")).await.unwrap();

    let rag = RagConfig {
        pdf_directory: dir.path().join("pdfs"),
        chunk_size: 500,
        chunk_overlap: 50,
        top_k: 5,
        qdrant_url: String::new(),
        collection: "integration".to_string(),
        embedding_dim: 2,
        rebuild: false,
    };
    let inhouse = InHouseSearchAgent::new(
        models.handle(),
        RAG_MODEL,
        RagRetriever::new(documents.clone(), embedder.clone()),
        Ingestor::new(TextChunker::new(500, 50).unwrap(), embedder, documents.clone()),
        rag,
    );

    let coordinator = Coordinator::new(CoordinatorParts {
        llm: models.handle(),
        model: COORDINATOR_MODEL.to_string(),
        inhouse,
        web: WebSearchAgent::new(Arc::new(StaticSearch::new()), 3),
        summarizer: SummarizerAgent::new(models.handle(), SUMMARIZER_MODEL, false),
        introspection: IntrospectionAgent::new(models.handle(), INTROSPECTION_MODEL, store.clone()),
        store: store.clone(),
        recent_reflections: 3,
    });

    Harness {
        dir,
        models,
        documents,
        store,
        coordinator: Arc::new(coordinator),
    }
}

pub fn config_for(h: &Harness) -> Config {
    Config {
        server: ServerConfig {
            port: 0,
            host: "127.0.0.1".to_string(),
            cors_allowed_origins: vec!["*".to_string()],
            session_capacity: 16,
        },
        llm: LLMConfig {
            provider: "mistral".to_string(),
            api_key: String::new(),
            api_base: "http://localhost".to_string(),
            coordinator_model: COORDINATOR_MODEL.to_string(),
            rag_model: RAG_MODEL.to_string(),
            summarizer_model: SUMMARIZER_MODEL.to_string(),
            introspection_model: INTROSPECTION_MODEL.to_string(),
            embedding_model: "embed".to_string(),
            request_timeout_secs: 5,
        },
        search: SearchConfig {
            backend: SearchBackend::Static,
            serpapi_key: String::new(),
            wikipedia_base: String::new(),
            max_results: 3,
        },
        rag: RagConfig {
            pdf_directory: h.dir.path().join("pdfs"),
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 5,
            qdrant_url: String::new(),
            collection: "integration".to_string(),
            embedding_dim: 2,
            rebuild: false,
        },
        store: StoreConfig {
            db_path: h.dir.path().join("aqualens.db"),
            recent_reflections: 3,
        },
        summarizer: SummarizerConfig { bilingual: false },
    }
}

pub fn app_state(h: &Harness) -> AppState {
    AppState {
        coordinator: h.coordinator.clone(),
        sessions: SessionRegistry::with_capacity(16),
        config: config_for(h),
    }
}
