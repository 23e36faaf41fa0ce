//! The section-keyed content store.
//!
//! Rows are `(key, language) -> value`. Reads repair legacy double-encoded
//! values; writes are check-then-write, with a lost insert race retried as an
//! update.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::content::key::{field_of, section_key, section_prefix};
use crate::content::value::decode;
use crate::content::{ContentBackend, ContentRow, NewRow, SaveOutcome, SectionContent, StoredRow};
use crate::error::{ContentError, Result};
use crate::i18n::{Locale, LocalizationMetrics};
use crate::retry::{with_retry_if, RetryConfig};

#[derive(Clone)]
pub struct ContentStore {
    backend: Arc<dyn ContentBackend>,
    retry: RetryConfig,
}

impl ContentStore {
    pub fn new(backend: Arc<dyn ContentBackend>) -> Self {
        Self {
            backend,
            retry: RetryConfig::default(),
        }
    }

    /// Set how often a save that lost a uniqueness race is re-attempted
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    // ==================== Read Path ====================

    /// Rows with exactly `key`, optionally filtered to one language, ordered
    /// by language code.
    pub async fn get_by_key(&self, key: &str, language: Option<Locale>) -> Result<Vec<ContentRow>> {
        let mut rows = self.backend.list_by_key(key, language).await?;
        rows.sort_by(|a, b| a.language.code().cmp(b.language.code()));
        Ok(rows.into_iter().map(decode_row).collect())
    }

    /// All fields of a section grouped by language, section prefix stripped.
    ///
    /// When `language` is given the result always has an entry for it, empty
    /// if the section has no rows in that language. There is no
    /// cross-language fallback here.
    pub async fn get_by_section(
        &self,
        section: &str,
        language: Option<Locale>,
    ) -> Result<BTreeMap<Locale, SectionContent>> {
        let rows = self
            .backend
            .list_by_prefix(&section_prefix(section), language, false)
            .await?;

        let mut grouped: BTreeMap<Locale, SectionContent> = BTreeMap::new();
        if let Some(language) = language {
            grouped.insert(language, SectionContent::default());
        }

        for row in rows {
            let Some(field) = field_of(&row.key, section) else {
                continue;
            };
            let field = field.to_string();
            let updated_at = row.updated_at;
            let language = row.language;
            let value = decode_row(row).value;
            grouped
                .entry(language)
                .or_default()
                .insert(&field, value, updated_at);
        }

        debug!(section, languages = grouped.len(), "Fetched section content");
        Ok(grouped)
    }

    /// Published fields of a section in one language.
    pub async fn get_published_section(
        &self,
        section: &str,
        language: Locale,
    ) -> Result<BTreeMap<String, String>> {
        let rows = self
            .backend
            .list_by_prefix(&section_prefix(section), Some(language), true)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let field = field_of(&row.key, section)?.to_string();
                Some((field, decode_row(row).value))
            })
            .collect())
    }

    /// A single published value, or `fallback` when absent or unpublished.
    pub async fn get_value(&self, key: &str, language: Locale, fallback: &str) -> Result<String> {
        let row = self.backend.find(key, language).await?;
        Ok(row
            .filter(|row| row.published)
            .map(|row| decode_row(row).value)
            .unwrap_or_else(|| fallback.to_string()))
    }

    // ==================== Write Path ====================

    /// Create or update the row for `(key, language)`.
    ///
    /// `published` defaults to `true` on both insert and update, so a save
    /// without the flag republishes a draft. Concurrent updates are
    /// last-writer-wins.
    pub async fn save(
        &self,
        key: &str,
        language: Locale,
        value: &str,
        published: Option<bool>,
    ) -> Result<SaveOutcome> {
        with_retry_if(
            &self.retry,
            "content save",
            || self.write_once(key, language, value, published, None),
            ContentError::is_conflict,
        )
        .await
    }

    /// Like [`save`](Self::save), but only if the row still carries
    /// `expected_updated_at`. Fails with `ContentError::StaleWrite` otherwise,
    /// including when the row was deleted in the meantime.
    pub async fn save_if_unchanged(
        &self,
        key: &str,
        language: Locale,
        value: &str,
        published: Option<bool>,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<SaveOutcome> {
        self.write_once(key, language, value, published, Some(expected_updated_at))
            .await
    }

    /// Save each field as `<section>.<field>`, in iteration order.
    ///
    /// Not transactional: on failure, fields already written stay written and
    /// the rest are not attempted. The error lists the saved rows.
    pub async fn save_section<I, F, V>(
        &self,
        section: &str,
        language: Locale,
        fields: I,
        published: Option<bool>,
    ) -> Result<Vec<ContentRow>>
    where
        I: IntoIterator<Item = (F, V)>,
        F: AsRef<str>,
        V: AsRef<str>,
    {
        let mut saved = Vec::new();

        for (field, value) in fields {
            let field = field.as_ref();
            let result = match section_key(section, field) {
                Ok(key) => self.save(&key, language, value.as_ref(), published).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(outcome) => saved.push(outcome.row),
                Err(e) if saved.is_empty() => return Err(e),
                Err(e) => {
                    warn!(
                        section,
                        %language,
                        field,
                        saved = saved.len(),
                        "Section save failed partway: {}",
                        e
                    );
                    return Err(ContentError::PartialSectionWrite {
                        section: section.to_string(),
                        saved,
                        failed_field: field.to_string(),
                        source: Box::new(e),
                    });
                }
            }
        }

        info!(section, %language, fields = saved.len(), "Saved section content");
        Ok(saved)
    }

    /// Remove the row for `(key, language)`. Absence is not an error.
    pub async fn delete_by_key_and_language(&self, key: &str, language: Locale) -> Result<()> {
        let removed = self.backend.delete(key, language).await?;
        debug!(key, %language, removed, "Deleted content");
        Ok(())
    }

    async fn write_once(
        &self,
        key: &str,
        language: Locale,
        value: &str,
        published: Option<bool>,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<SaveOutcome> {
        let now = Utc::now();
        let stale = || ContentError::StaleWrite {
            key: key.to_string(),
            language,
        };

        match self.backend.find(key, language).await? {
            Some(existing) => {
                if expected_updated_at.is_some_and(|expected| expected != existing.updated_at) {
                    return Err(stale());
                }

                let published = published.unwrap_or(true);
                let updated = self
                    .backend
                    .update(existing.id, value, published, now, expected_updated_at)
                    .await?;

                match updated {
                    Some(row) => Ok(SaveOutcome {
                        row: written_row(row, value),
                        created: false,
                    }),
                    None if expected_updated_at.is_some() => Err(stale()),
                    // Deleted between find and update; retried as an insert
                    None => Err(ContentError::Conflict {
                        key: key.to_string(),
                        language,
                    }),
                }
            }
            None if expected_updated_at.is_some() => Err(stale()),
            None => {
                let row = self
                    .backend
                    .insert(NewRow {
                        key,
                        language,
                        value,
                        published: published.unwrap_or(true),
                        updated_at: now,
                    })
                    .await?;
                Ok(SaveOutcome {
                    row: written_row(row, value),
                    created: true,
                })
            }
        }
    }
}

/// Decode a row read from storage, repairing legacy double encoding.
fn decode_row(row: StoredRow) -> ContentRow {
    let decoded = decode(row.value.as_ref());
    if decoded.unwrapped {
        debug!(key = %row.key, language = %row.language, "Unwrapped legacy double-encoded value");
        LocalizationMetrics::global().record_legacy_unwrap();
    }

    ContentRow {
        id: row.id,
        language: row.language,
        key: row.key,
        value: decoded.text,
        published: row.published,
        updated_at: row.updated_at,
    }
}

/// A row just written: the value is what the caller saved, not re-decoded.
fn written_row(row: StoredRow, value: &str) -> ContentRow {
    ContentRow {
        id: row.id,
        language: row.language,
        key: row.key,
        value: value.to_string(),
        published: row.published,
        updated_at: row.updated_at,
    }
}
