use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::agents::Coordinator;
use crate::config::Config;
use crate::routes::SessionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
    pub sessions: SessionRegistry,
    pub config: Config,
}

// Runtime query_as needs FromRow; created_at stays RFC 3339 text

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reflection {
    pub id: i64,
    pub reflection: String,
    pub created_at: String,
    pub query: Option<String>,
    pub answer: Option<String>,
    pub feedback: Option<String>,
    pub score: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewReflection {
    pub reflection: String,
    pub query: Option<String>,
    pub answer: Option<String>,
    pub feedback: Option<String>,
    pub score: Option<i64>,
}

impl NewReflection {
    /// Reflection text with no interaction context
    pub fn text(reflection: impl Into<String>) -> Self {
        Self {
            reflection: reflection.into(),
            ..Default::default()
        }
    }
}

// HTTP payloads

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub text: String,
    pub conversation_id: Uuid,
    pub turn_id: Uuid,
    /// True when any model-backed step fell back
    pub degraded: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    pub conversation_id: Uuid,
    pub helpful: bool,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReflectionsQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub database: String,
    /// Conversations with a recorded last turn
    pub sessions: usize,
}
