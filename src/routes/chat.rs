use axum::{extract::State, response::Json as ResponseJson, routing::post, Json, Router};
use tracing::info;
use uuid::Uuid;

use crate::agents::Feedback;
use crate::models::{AppState, ChatRequest, ChatResponse, FeedbackRequest, Reflection};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(post_chat))
        .route("/api/feedback", post(post_feedback))
        .with_state(state)
}

pub async fn post_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> AppResult<ResponseJson<ChatResponse>> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::InvalidRequest("Message must not be empty".to_string()));
    }

    let conversation_id = request.conversation_id.unwrap_or_else(Uuid::new_v4);
    info!(conversation_id = %conversation_id, "Received chat request");

    let turn = state.coordinator.run(message).await;
    let response = ChatResponse {
        text: turn.answer.text().to_string(),
        conversation_id,
        turn_id: turn.id,
        degraded: turn.is_degraded(),
    };
    state.sessions.record(conversation_id, turn).await;

    info!(turn_id = %response.turn_id, degraded = response.degraded, "Chat response sent");
    Ok(Json(response))
}

pub async fn post_feedback(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> AppResult<ResponseJson<Reflection>> {
    let feedback = if request.helpful {
        Feedback::Helpful
    } else {
        Feedback::NotHelpful(request.text.unwrap_or_default())
    };

    let turn = state.sessions.last(request.conversation_id).await;
    let reflection = state.coordinator.handle_feedback(turn.as_ref(), &feedback).await?;

    info!(conversation_id = %request.conversation_id, reflection_id = reflection.id, "Feedback recorded");
    Ok(Json(reflection))
}
