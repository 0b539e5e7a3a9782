use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

use crate::types::AppResult;

pub use operations::*;
pub use pool::*;

pub mod operations;
pub mod pool;

/// Open (creating if needed) the SQLite file at `path`.
///
/// A single connection serializes every write, so inserts from concurrent
/// feedback handlers never interleave.
pub async fn create_pool(path: &Path) -> AppResult<SqlitePool> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            crate::types::AppError::Config(format!(
                "Failed to create database directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let options = SqliteConnectOptions::new().filename(path).create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    health_check(&pool).await?;
    init_schema(&pool).await?;

    Ok(pool)
}
