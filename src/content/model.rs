use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::i18n::Locale;

/// A row as the backend holds it, value still in its raw JSON form.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub id: i64,
    pub key: String,
    pub language: Locale,
    pub value: Option<Value>,
    pub published: bool,
    pub updated_at: DateTime<Utc>,
}

/// A row to be inserted.
#[derive(Debug, Clone)]
pub struct NewRow<'a> {
    pub key: &'a str,
    pub language: Locale,
    pub value: &'a str,
    pub published: bool,
    pub updated_at: DateTime<Utc>,
}

/// A content row as handed to callers, value decoded to a string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRow {
    pub id: i64,
    pub language: Locale,
    pub key: String,
    pub value: String,
    pub published: bool,
    pub updated_at: DateTime<Utc>,
}

/// Result of a single save.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub row: ContentRow,
    /// `true` when the row did not exist before.
    pub created: bool,
}

/// One language's fields of a section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectionContent {
    /// Field name (section prefix stripped) to value
    pub data: BTreeMap<String, String>,
    /// Latest `updated_at` across the fields; `None` when there are none.
    ///
    /// Callers holding an edit buffer older than this are stale.
    pub updated_at: Option<DateTime<Utc>>,
}

impl SectionContent {
    pub(crate) fn insert(&mut self, field: &str, value: String, updated_at: DateTime<Utc>) {
        self.data.insert(field.to_string(), value);
        if self.updated_at.map_or(true, |latest| updated_at > latest) {
            self.updated_at = Some(updated_at);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
