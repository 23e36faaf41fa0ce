use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::content::{NewRow, StoredRow};
use crate::error::Result;
use crate::i18n::Locale;

/// Row-level access to the content table.
///
/// Implementations must enforce at most one row per `(key, language)`.
#[async_trait]
pub trait ContentBackend: Send + Sync {
    /// The row for `(key, language)`, if any.
    async fn find(&self, key: &str, language: Locale) -> Result<Option<StoredRow>>;

    /// Rows with exactly this key, optionally for one language.
    async fn list_by_key(&self, key: &str, language: Option<Locale>) -> Result<Vec<StoredRow>>;

    /// Rows whose key starts with `prefix`.
    async fn list_by_prefix(
        &self,
        prefix: &str,
        language: Option<Locale>,
        published_only: bool,
    ) -> Result<Vec<StoredRow>>;

    /// Insert a new row.
    ///
    /// Fails with `ContentError::Conflict` when `(key, language)` already exists.
    async fn insert(&self, row: NewRow<'_>) -> Result<StoredRow>;

    /// Overwrite value and flags of row `id`.
    ///
    /// With `expected_updated_at` set, the update only applies if the row
    /// still carries that timestamp. Returns `None` when nothing was updated.
    async fn update(
        &self,
        id: i64,
        value: &str,
        published: bool,
        updated_at: DateTime<Utc>,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<Option<StoredRow>>;

    /// Delete the row for `(key, language)`. Returns whether a row was removed.
    async fn delete(&self, key: &str, language: Locale) -> Result<bool>;
}
