use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqlitePool;
use std::path::Path;
use tracing::info;

use crate::models::{NewReflection, Reflection};
use crate::types::AppResult;

const SELECT_COLUMNS: &str = "SELECT id, reflection, created_at, query, answer, feedback, score FROM reflections";

/// Append-only reflection log
#[derive(Clone)]
pub struct ReflectionStore {
    pool: SqlitePool,
}

impl ReflectionStore {
    pub async fn open(path: &Path) -> AppResult<Self> {
        let pool = super::create_pool(path).await?;
        info!(path = %path.display(), "Opened reflection store");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn insert(&self, new: NewReflection) -> AppResult<Reflection> {
        let mut tx = self.pool.begin().await?;

        let last: Option<String> =
            sqlx::query_scalar("SELECT created_at FROM reflections ORDER BY id DESC LIMIT 1")
                .fetch_optional(&mut *tx)
                .await?;
        let created_at = next_timestamp(Utc::now(), last.as_deref());

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO reflections (reflection, created_at, query, answer, feedback, score)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&new.reflection)
        .bind(&created_at)
        .bind(&new.query)
        .bind(&new.answer)
        .bind(&new.feedback)
        .bind(new.score)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(id, score = ?new.score, "Stored reflection");
        Ok(Reflection {
            id,
            reflection: new.reflection,
            created_at,
            query: new.query,
            answer: new.answer,
            feedback: new.feedback,
            score: new.score,
        })
    }

    /// Up to `limit` reflections, newest first
    pub async fn recent(&self, limit: usize) -> AppResult<Vec<Reflection>> {
        let rows = sqlx::query_as::<_, Reflection>(&format!("{} ORDER BY id DESC LIMIT ?", SELECT_COLUMNS))
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reflections")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Every reflection, oldest first
    pub async fn all(&self) -> AppResult<Vec<Reflection>> {
        let rows = sqlx::query_as::<_, Reflection>(&format!("{} ORDER BY id ASC", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

/// RFC 3339 timestamp never earlier than the previous row's
fn next_timestamp(now: DateTime<Utc>, last: Option<&str>) -> String {
    let previous = last
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc));
    let stamp = match previous {
        Some(prev) if prev > now => prev,
        _ => now,
    };
    stamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}
