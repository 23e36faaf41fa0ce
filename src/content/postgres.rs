//! PostgreSQL content backend.
//!
//! Values live in a `JSONB` column; text is written as a JSON string, never
//! pre-serialized, so new rows are single-encoded.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::content::key::escape_like;
use crate::content::{ContentBackend, NewRow, StoredRow};
use crate::error::{ContentError, Result};
use crate::i18n::Locale;

const COLUMNS: &str = "id, key, language, value, published, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct PgContentRow {
    id: i64,
    key: String,
    language: String,
    value: Option<Value>,
    published: bool,
    updated_at: DateTime<Utc>,
}

impl PgContentRow {
    /// Rows with a language outside the supported set are skipped.
    fn into_stored(self) -> Option<StoredRow> {
        let Some(language) = Locale::from_code(&self.language) else {
            warn!(id = self.id, key = %self.key, language = %self.language, "Skipping content row with unsupported language");
            return None;
        };

        Some(StoredRow {
            id: self.id,
            key: self.key,
            language,
            value: self.value,
            published: self.published,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct PgContentBackend {
    pool: PgPool,
}

impl PgContentBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database and make sure the content table exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        let backend = Self::new(pool);
        backend.init_schema().await?;
        Ok(backend)
    }

    /// Create the content table and its indexes (safe to run always)
    pub async fn init_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS content (
                id BIGSERIAL PRIMARY KEY,
                key TEXT NOT NULL,
                language TEXT NOT NULL,
                value JSONB,
                published BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT content_key_language_unique UNIQUE (key, language)
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create content table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS content_key_prefix_idx ON content (key text_pattern_ops)",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create content key index")?;

        info!("Content schema ready");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn collect(rows: Vec<PgContentRow>) -> Vec<StoredRow> {
    rows.into_iter().filter_map(PgContentRow::into_stored).collect()
}

#[async_trait]
impl ContentBackend for PgContentBackend {
    async fn find(&self, key: &str, language: Locale) -> Result<Option<StoredRow>> {
        let row: Option<PgContentRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM content WHERE key = $1 AND language = $2 LIMIT 1"
        ))
        .bind(key)
        .bind(language.code())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(PgContentRow::into_stored))
    }

    async fn list_by_key(&self, key: &str, language: Option<Locale>) -> Result<Vec<StoredRow>> {
        let rows: Vec<PgContentRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM content
             WHERE key = $1 AND ($2::TEXT IS NULL OR language = $2)
             ORDER BY language"
        ))
        .bind(key)
        .bind(language.map(|l| l.code()))
        .fetch_all(&self.pool)
        .await?;

        Ok(collect(rows))
    }

    async fn list_by_prefix(
        &self,
        prefix: &str,
        language: Option<Locale>,
        published_only: bool,
    ) -> Result<Vec<StoredRow>> {
        let pattern = format!("{}%", escape_like(prefix));
        let rows: Vec<PgContentRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM content
             WHERE key LIKE $1 ESCAPE '\\'
               AND ($2::TEXT IS NULL OR language = $2)
               AND (NOT $3 OR published)
             ORDER BY language, key"
        ))
        .bind(pattern)
        .bind(language.map(|l| l.code()))
        .bind(published_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(collect(rows))
    }

    async fn insert(&self, row: NewRow<'_>) -> Result<StoredRow> {
        let inserted: Option<PgContentRow> = sqlx::query_as(&format!(
            "INSERT INTO content (key, language, value, published, updated_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (key, language) DO NOTHING
             RETURNING {COLUMNS}"
        ))
        .bind(row.key)
        .bind(row.language.code())
        .bind(Json(row.value))
        .bind(row.published)
        .bind(row.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        let conflict = || ContentError::Conflict {
            key: row.key.to_string(),
            language: row.language,
        };

        inserted
            .ok_or_else(conflict)?
            .into_stored()
            .ok_or_else(|| ContentError::Backend("Inserted row has unsupported language".to_string()))
    }

    async fn update(
        &self,
        id: i64,
        value: &str,
        published: bool,
        updated_at: DateTime<Utc>,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<Option<StoredRow>> {
        let updated: Option<PgContentRow> = sqlx::query_as(&format!(
            "UPDATE content SET value = $1, published = $2, updated_at = $3
             WHERE id = $4 AND ($5::TIMESTAMPTZ IS NULL OR updated_at = $5)
             RETURNING {COLUMNS}"
        ))
        .bind(Json(value))
        .bind(published)
        .bind(updated_at)
        .bind(id)
        .bind(expected_updated_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated.and_then(PgContentRow::into_stored))
    }

    async fn delete(&self, key: &str, language: Locale) -> Result<bool> {
        let result = sqlx::query("DELETE FROM content WHERE key = $1 AND language = $2")
            .bind(key)
            .bind(language.code())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
