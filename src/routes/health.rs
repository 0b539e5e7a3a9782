use axum::{extract::State, response::Json as ResponseJson, routing::get, Json, Router};

use crate::db::health_check as database_check;
use crate::models::{AppState, HealthResponse};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> ResponseJson<HealthResponse> {
    let database = match database_check(state.coordinator.store().pool()).await {
        Ok(_) => "connected",
        Err(_) => "unavailable",
    };

    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        database: database.to_string(),
        sessions: state.sessions.len().await,
    };

    Json(response)
}
