use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub search: SearchConfig,
    pub rag: RagConfig,
    pub store: StoreConfig,
    pub summarizer: SummarizerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
    /// Conversations whose last turn is kept for feedback
    pub session_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    pub provider: String,
    pub api_key: String,
    pub api_base: String,
    pub coordinator_model: String,
    pub rag_model: String,
    pub summarizer_model: String,
    pub introspection_model: String,
    pub embedding_model: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackend {
    /// Keyword table only, no network
    Static,
    /// Wikipedia search API with the keyword table as fallback
    Wikipedia,
    /// SerpAPI Google search with the keyword table as fallback
    SerpApi,
}

impl FromStr for SearchBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "static" => Ok(SearchBackend::Static),
            "wikipedia" | "wiki" => Ok(SearchBackend::Wikipedia),
            "serpapi" | "google" => Ok(SearchBackend::SerpApi),
            other => Err(anyhow::anyhow!("Unknown web search backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub backend: SearchBackend,
    pub serpapi_key: String,
    pub wikipedia_base: String,
    pub max_results: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RagConfig {
    pub pdf_directory: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub qdrant_url: String,
    pub collection: String,
    pub embedding_dim: u64,
    pub rebuild: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub recent_reflections: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummarizerConfig {
    /// Emit English and Simplified Chinese instead of English only
    pub bilingual: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: parse_var("PORT", "3000")?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000,http://localhost:8501".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                session_capacity: parse_var("SESSION_CAPACITY", "1000")?,
            },
            llm: LLMConfig {
                provider: env::var("LLM_PROVIDER").unwrap_or_else(|_| "mistral".to_string()),
                api_key: env::var("MISTRALAI_API_KEY")
                    .or_else(|_| env::var("MISTRAL_API_KEY"))
                    .unwrap_or_default(),
                api_base: env::var("MISTRAL_API_BASE")
                    .unwrap_or_else(|_| "https://api.mistral.ai/v1".to_string()),
                coordinator_model: env::var("COORDINATOR_MODEL")
                    .unwrap_or_else(|_| "mistral-medium-latest".to_string()),
                rag_model: env::var("RAG_MODEL").unwrap_or_else(|_| "mistral-large-latest".to_string()),
                summarizer_model: env::var("SUMMARIZER_MODEL")
                    .unwrap_or_else(|_| "mistral-small-latest".to_string()),
                introspection_model: env::var("INTROSPECTION_MODEL")
                    .unwrap_or_else(|_| "mistral-medium-latest".to_string()),
                embedding_model: env::var("EMBEDDING_MODEL").unwrap_or_else(|_| "mistral-embed".to_string()),
                request_timeout_secs: parse_var("LLM_TIMEOUT_SECS", "60")?,
            },
            search: SearchConfig {
                backend: parse_var("WEB_SEARCH_BACKEND", "wikipedia")?,
                serpapi_key: env::var("SERPAPI_API_KEY").unwrap_or_default(),
                wikipedia_base: env::var("WIKIPEDIA_API_BASE")
                    .unwrap_or_else(|_| crate::search::wikipedia::WIKIPEDIA_API.to_string()),
                max_results: parse_var("WEB_SEARCH_MAX_RESULTS", "3")?,
            },
            rag: RagConfig {
                pdf_directory: PathBuf::from(env::var("PDF_DIRECTORY").unwrap_or_else(|_| "./data".to_string())),
                chunk_size: parse_var("RAG_CHUNK_SIZE", "1000")?,
                chunk_overlap: parse_var("RAG_CHUNK_OVERLAP", "200")?,
                top_k: parse_var("RAG_TOP_K", "5")?,
                qdrant_url: env::var("QDRANT_URL").unwrap_or_else(|_| "http://localhost:6334".to_string()),
                collection: env::var("QDRANT_COLLECTION").unwrap_or_else(|_| "aqualens_documents".to_string()),
                embedding_dim: parse_var("EMBEDDING_DIM", "1024")?,
                rebuild: parse_var("RAG_REBUILD", "false")?,
            },
            store: StoreConfig {
                db_path: env::var("AQUALENS_DB")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| default_data_dir().join("aqualens.db")),
                recent_reflections: parse_var("RECENT_REFLECTIONS", "3")?,
            },
            summarizer: SummarizerConfig {
                bilingual: parse_var("SUMMARY_BILINGUAL", "false")?,
            },
        })
    }
}

/// Per-user data directory, falling back to the working directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("aqualens"))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn parse_var<T>(name: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("{}", e))
        .with_context(|| format!("Invalid value for {}: {:?}", name, raw))
}
