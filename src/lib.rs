// AquaLens - multi-agent retrieval-augmented assistant for water quality research

pub mod agents;
pub mod cli;
pub mod config;
pub mod db;
pub mod embeddings;
pub mod llm;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod search; // Web search backends (static table, Wikipedia, SerpAPI)
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;
// Note: Import specific items from types module instead of glob to avoid name conflicts
// e.g., use aqualens::types::{StepOutput, AppResult};

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
