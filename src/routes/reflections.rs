use axum::{
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
    Json, Router,
};

use crate::models::{AppState, Reflection, ReflectionsQuery};
use crate::types::AppResult;

const MAX_LIMIT: usize = 100;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/reflections", get(list_reflections))
        .with_state(state)
}

/// Newest first; `limit` defaults to the number a turn reads
async fn list_reflections(
    State(state): State<AppState>,
    Query(query): Query<ReflectionsQuery>,
) -> AppResult<ResponseJson<Vec<Reflection>>> {
    let limit = query
        .limit
        .unwrap_or(state.config.store.recent_reflections)
        .min(MAX_LIMIT);
    let rows = state.coordinator.store().recent(limit).await?;
    Ok(Json(rows))
}
