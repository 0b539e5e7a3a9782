// Type definitions shared across agents and collaborators

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMRequest {
    pub model: String,
    pub messages: Vec<LLMMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub system_instruction: Option<String>,
}

impl LLMRequest {
    /// Single user message request with no system instruction
    pub fn prompt(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![LLMMessage::user(prompt)],
            max_tokens: None,
            temperature: None,
            system_instruction: None,
        }
    }

    pub fn with_system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LLMMessage {
    pub role: String, // "user", "assistant", "system"
    pub content: String,
}

impl LLMMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

/// Canonical model response. Adapters flatten provider-specific content
/// shapes into `content` before it leaves the llm module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub finish_reason: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Output of a model-backed step that is allowed to degrade.
///
/// `Fallback` still carries displayable text; `cause` keeps the error message
/// so callers can tell the two apart without matching on prose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutput {
    Generated { text: String },
    Fallback { text: String, cause: String },
}

impl StepOutput {
    pub fn generated(text: impl Into<String>) -> Self {
        StepOutput::Generated { text: text.into() }
    }

    pub fn fallback(text: impl Into<String>, cause: impl Into<String>) -> Self {
        StepOutput::Fallback {
            text: text.into(),
            cause: cause.into(),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            StepOutput::Generated { text } | StepOutput::Fallback { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            StepOutput::Generated { text } | StepOutput::Fallback { text, .. } => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, StepOutput::Fallback { .. })
    }

    pub fn cause(&self) -> Option<&str> {
        match self {
            StepOutput::Generated { .. } => None,
            StepOutput::Fallback { cause, .. } => Some(cause),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("LLM API error: {0}")]
    LLMApi(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("Malformed reflection output: {0}")]
    MalformedReflection(String),

    #[error("No prior interaction: run a query before submitting feedback")]
    NoPriorInteraction,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
