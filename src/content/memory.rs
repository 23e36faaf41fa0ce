//! In-process content backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::content::{ContentBackend, NewRow, StoredRow};
use crate::error::{ContentError, Result};
use crate::i18n::Locale;

/// Content rows held in memory, keyed by `(key, language)`.
#[derive(Debug, Default)]
pub struct MemoryContentBackend {
    rows: RwLock<BTreeMap<(String, Locale), StoredRow>>,
    next_id: AtomicI64,
}

impl MemoryContentBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw JSON value as-is, bypassing the write path.
    ///
    /// Used to seed rows in shapes the write path never produces, such as
    /// legacy double-encoded strings.
    pub async fn seed_raw(
        &self,
        key: &str,
        language: Locale,
        value: Option<Value>,
        published: bool,
    ) -> StoredRow {
        let row = StoredRow {
            id: self.allocate_id(),
            key: key.to_string(),
            language,
            value,
            published,
            updated_at: Utc::now(),
        };
        self.rows
            .write()
            .await
            .insert((key.to_string(), language), row.clone());
        row
    }

    /// Number of stored rows.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl ContentBackend for MemoryContentBackend {
    async fn find(&self, key: &str, language: Locale) -> Result<Option<StoredRow>> {
        let rows = self.rows.read().await;
        Ok(rows.get(&(key.to_string(), language)).cloned())
    }

    async fn list_by_key(&self, key: &str, language: Option<Locale>) -> Result<Vec<StoredRow>> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|row| row.key == key)
            .filter(|row| language.map_or(true, |lang| row.language == lang))
            .cloned()
            .collect())
    }

    async fn list_by_prefix(
        &self,
        prefix: &str,
        language: Option<Locale>,
        published_only: bool,
    ) -> Result<Vec<StoredRow>> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|row| row.key.starts_with(prefix))
            .filter(|row| language.map_or(true, |lang| row.language == lang))
            .filter(|row| !published_only || row.published)
            .cloned()
            .collect())
    }

    async fn insert(&self, row: NewRow<'_>) -> Result<StoredRow> {
        let mut rows = self.rows.write().await;
        let slot = (row.key.to_string(), row.language);

        if rows.contains_key(&slot) {
            return Err(ContentError::Conflict {
                key: row.key.to_string(),
                language: row.language,
            });
        }

        let stored = StoredRow {
            id: self.allocate_id(),
            key: row.key.to_string(),
            language: row.language,
            value: Some(Value::String(row.value.to_string())),
            published: row.published,
            updated_at: row.updated_at,
        };
        rows.insert(slot, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: i64,
        value: &str,
        published: bool,
        updated_at: DateTime<Utc>,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<Option<StoredRow>> {
        let mut rows = self.rows.write().await;
        let Some(row) = rows.values_mut().find(|row| row.id == id) else {
            return Ok(None);
        };

        if expected_updated_at.is_some_and(|expected| expected != row.updated_at) {
            return Ok(None);
        }

        row.value = Some(Value::String(value.to_string()));
        row.published = published;
        row.updated_at = updated_at;
        Ok(Some(row.clone()))
    }

    async fn delete(&self, key: &str, language: Locale) -> Result<bool> {
        let mut rows = self.rows.write().await;
        Ok(rows.remove(&(key.to_string(), language)).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_row<'a>(key: &'a str, language: Locale, value: &'a str) -> NewRow<'a> {
        NewRow {
            key,
            language,
            value,
            published: true,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        let backend = MemoryContentBackend::new();
        let inserted = backend
            .insert(new_row("home.title", Locale::En, "Welcome"))
            .await
            .unwrap();

        let found = backend.find("home.title", Locale::En).await.unwrap();
        assert_eq!(found, Some(inserted));
        assert!(backend.find("home.title", Locale::De).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_is_conflict() {
        let backend = MemoryContentBackend::new();
        backend
            .insert(new_row("home.title", Locale::En, "A"))
            .await
            .unwrap();

        let result = backend.insert(new_row("home.title", Locale::En, "B")).await;
        assert!(matches!(result, Err(ContentError::Conflict { .. })));
        assert_eq!(backend.len().await, 1);
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let backend = MemoryContentBackend::new();
        let a = backend.insert(new_row("a", Locale::Sr, "1")).await.unwrap();
        let b = backend.insert(new_row("b", Locale::Sr, "2")).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_update_with_stale_timestamp_is_rejected() {
        let backend = MemoryContentBackend::new();
        let row = backend.insert(new_row("k", Locale::En, "v1")).await.unwrap();

        let stale = row.updated_at - chrono::Duration::seconds(5);
        let result = backend
            .update(row.id, "v2", true, Utc::now(), Some(stale))
            .await
            .unwrap();
        assert!(result.is_none());

        let result = backend
            .update(row.id, "v2", true, Utc::now(), Some(row.updated_at))
            .await
            .unwrap();
        assert_eq!(result.unwrap().value, Some(Value::String("v2".to_string())));
    }

    #[tokio::test]
    async fn test_update_missing_row() {
        let backend = MemoryContentBackend::new();
        let result = backend.update(99, "v", true, Utc::now(), None).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_list_by_prefix_filters() {
        let backend = MemoryContentBackend::new();
        backend.seed_raw("home.title", Locale::En, None, true).await;
        backend.seed_raw("home.draft", Locale::En, None, false).await;
        backend.seed_raw("home.title", Locale::De, None, true).await;
        backend.seed_raw("homepage.x", Locale::En, None, true).await;

        let all_en = backend
            .list_by_prefix("home.", Some(Locale::En), false)
            .await
            .unwrap();
        assert_eq!(all_en.len(), 2);

        let published = backend
            .list_by_prefix("home.", None, true)
            .await
            .unwrap();
        assert_eq!(published.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let backend = MemoryContentBackend::new();
        backend.seed_raw("phone", Locale::Sr, None, true).await;

        assert!(backend.delete("phone", Locale::Sr).await.unwrap());
        assert!(!backend.delete("phone", Locale::Sr).await.unwrap());
        assert!(backend.is_empty().await);
    }
}
