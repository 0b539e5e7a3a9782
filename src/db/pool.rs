use sqlx::sqlite::SqlitePool;

use crate::types::AppResult;

const CREATE_REFLECTIONS: &str = r#"
CREATE TABLE IF NOT EXISTS reflections (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    reflection TEXT NOT NULL,
    created_at TEXT NOT NULL,
    query TEXT,
    answer TEXT,
    feedback TEXT,
    score INTEGER
)
"#;

pub async fn init_schema(pool: &SqlitePool) -> AppResult<()> {
    sqlx::query(CREATE_REFLECTIONS).execute(pool).await?;
    Ok(())
}

pub async fn health_check(pool: &SqlitePool) -> AppResult<bool> {
    let _result = sqlx::query("SELECT 1").fetch_one(pool).await?;

    Ok(true)
}
