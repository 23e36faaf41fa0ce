//! Locale fallback resolution for multi-language values.
//!
//! Fallback chain: requested locale → `sr` → first present in
//! [`CANONICAL_ORDER`] → empty string. The `sr` step runs before the
//! canonical scan on purpose: Serbian wins over English even though English
//! comes second in the order below.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::i18n::{Locale, LocalizationMetrics};

/// Last-resort scan order when neither the requested locale nor `sr` has a value.
pub const CANONICAL_ORDER: [Locale; 4] = [Locale::Sr, Locale::En, Locale::De, Locale::It];

/// A partial mapping from locale to text for one localizable field.
///
/// Deserialization is lenient: anything that is not a JSON object, unknown
/// keys and non-string leaves are dropped, so a malformed stored value reads
/// as "no translation" instead of failing the whole record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct LocalizedText(BTreeMap<Locale, String>);

/// Which step of the fallback chain produced a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The requested locale was present.
    Requested,
    /// Fell back to Serbian.
    Serbian,
    /// Fell back to the first locale present in canonical order.
    Canonical(Locale),
    /// No locale had a value; resolved to `""`.
    Missing,
}

impl LocalizedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// A value with a single translation.
    pub fn single(locale: Locale, value: impl Into<String>) -> Self {
        let mut text = Self::new();
        text.set(locale, value);
        text
    }

    pub fn get(&self, locale: Locale) -> Option<&str> {
        self.0.get(&locale).map(String::as_str)
    }

    pub fn set(&mut self, locale: Locale, value: impl Into<String>) {
        self.0.insert(locale, value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Present translations in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Locale, &str)> {
        self.0.iter().map(|(locale, value)| (*locale, value.as_str()))
    }

    /// Resolve to a display string for `locale`. Never fails.
    pub fn resolve(&self, locale: Locale) -> String {
        self.resolve_with_source(locale).0.to_string()
    }

    /// Resolve and report which fallback step was taken.
    pub fn resolve_with_source(&self, locale: Locale) -> (&str, Resolution) {
        if let Some(value) = self.get(locale) {
            return (value, Resolution::Requested);
        }

        if let Some(value) = self.get(Locale::Sr) {
            return (value, Resolution::Serbian);
        }

        for candidate in CANONICAL_ORDER {
            if let Some(value) = self.get(candidate) {
                return (value, Resolution::Canonical(candidate));
            }
        }

        ("", Resolution::Missing)
    }

    /// True when all four locales carry non-empty text.
    pub fn is_complete(&self) -> bool {
        self.missing_locales().is_empty()
    }

    /// Locales that are absent or empty, in canonical order.
    pub fn missing_locales(&self) -> Vec<Locale> {
        CANONICAL_ORDER
            .into_iter()
            .filter(|locale| self.get(*locale).map_or(true, str::is_empty))
            .collect()
    }

    /// Overlay the translations present in `update` onto this value.
    pub fn merge(&self, update: &LocalizedText) -> LocalizedText {
        let mut merged = self.clone();
        for (locale, value) in update.iter() {
            merged.set(locale, value);
        }
        merged
    }
}

impl From<Value> for LocalizedText {
    fn from(value: Value) -> Self {
        LocalizedText::from(&value)
    }
}

impl From<&Value> for LocalizedText {
    fn from(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return LocalizedText::new();
        };

        let translations = map
            .iter()
            .filter_map(|(code, leaf)| {
                let locale = Locale::from_code(code)?;
                let text = leaf.as_str()?;
                Some((locale, text.to_string()))
            })
            .collect();

        LocalizedText(translations)
    }
}

impl FromIterator<(Locale, String)> for LocalizedText {
    fn from_iter<I: IntoIterator<Item = (Locale, String)>>(iter: I) -> Self {
        LocalizedText(iter.into_iter().collect())
    }
}

/// Resolve a multi-language value for `locale`.
pub fn resolve(value: &LocalizedText, locale: Locale) -> String {
    value.resolve(locale)
}

/// Resolve each element of a list, keeping order and length.
pub fn resolve_list(values: &[LocalizedText], locale: Locale) -> Vec<String> {
    values.iter().map(|value| value.resolve(locale)).collect()
}

/// Resolve a named record field, logging and counting any fallback.
pub fn resolve_field(field: &str, value: &LocalizedText, locale: Locale) -> String {
    let (resolved, resolution) = value.resolve_with_source(locale);
    let metrics = LocalizationMetrics::global();
    metrics.record(resolution);

    match resolution {
        Resolution::Requested => {}
        Resolution::Serbian => {
            debug!(field, requested = %locale, fallback = "sr", "Missing translation, using Serbian");
        }
        Resolution::Canonical(used) => {
            debug!(field, requested = %locale, fallback = %used, "Missing Serbian fallback, using first available");
        }
        Resolution::Missing => {
            warn!(field, requested = %locale, "Multi-language value has no translations");
        }
    }

    resolved.to_string()
}
