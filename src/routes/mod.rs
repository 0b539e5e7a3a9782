//! API Routes
//!
//! HTTP endpoints for the assistant:
//! - `POST /api/chat` - Run a turn
//! - `POST /api/feedback` - Reflect on the last turn of a conversation
//! - `GET /api/reflections` - Recent reflections
//! - `GET /api/health` - Health checks

pub mod chat;
pub mod health;
pub mod reflections;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::agents::Turn;
use crate::middleware::apply_cors;
use crate::models::AppState;
use crate::types::AppError;

#[derive(Default)]
struct Sessions {
    turns: HashMap<Uuid, Turn>,
    /// Conversation ids, least recently recorded first
    order: VecDeque<Uuid>,
}

/// Last turn per conversation, the state feedback is given against.
///
/// Holds at most `capacity` conversations; recording a new one past that
/// evicts the conversation recorded least recently.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<Mutex<Sessions>>,
    capacity: usize,
}

impl SessionRegistry {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Sessions::default())),
            capacity: capacity.max(1),
        }
    }

    /// Replace the conversation's last turn
    pub async fn record(&self, conversation_id: Uuid, turn: Turn) {
        let mut sessions = self.inner.lock().await;
        if sessions.turns.insert(conversation_id, turn).is_some() {
            sessions.order.retain(|id| *id != conversation_id);
        }
        sessions.order.push_back(conversation_id);

        while sessions.order.len() > self.capacity {
            if let Some(evicted) = sessions.order.pop_front() {
                sessions.turns.remove(&evicted);
                debug!(conversation_id = %evicted, "Evicted session");
            }
        }
    }

    pub async fn last(&self, conversation_id: Uuid) -> Option<Turn> {
        self.inner.lock().await.turns.get(&conversation_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.turns.len()
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NoPriorInteraction => StatusCode::CONFLICT,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");
    let origins = state.config.server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .merge(chat::router(state.clone()))
        .merge(reflections::router(state.clone()))
        .merge(health::router(state));

    apply_cors(api_router, &origins).layer(TraceLayer::new_for_http())
}
