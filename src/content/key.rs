//! Content key namespacing.
//!
//! Section-addressed rows use keys of the form `<section>.<field>`, where the
//! field may contain further dots (`privacy.dataCollection.content`). Bare
//! keys without a section are legacy standalone page fields.

use crate::error::{ContentError, Result};

/// Build the full key for a field of a section.
///
/// The section must be a single non-empty segment and the field non-empty.
pub fn section_key(section: &str, field: &str) -> Result<String> {
    let mut errors = Vec::new();
    if section.is_empty() {
        errors.push("Section must not be empty".to_string());
    } else if section.contains('.') {
        errors.push(format!("Section \"{}\" must not contain '.'", section));
    }
    if field.is_empty() {
        errors.push(format!("Field name in section \"{}\" must not be empty", section));
    }

    if errors.is_empty() {
        Ok(format!("{}.{}", section, field))
    } else {
        Err(ContentError::Validation(errors))
    }
}

/// The `<section>.` prefix every key of the section starts with.
pub fn section_prefix(section: &str) -> String {
    format!("{}.", section)
}

/// Strip the `<section>.` prefix, yielding the field name.
///
/// Returns `None` when the key does not belong to the section or the field
/// part would be empty.
pub fn field_of<'k>(key: &'k str, section: &str) -> Option<&'k str> {
    key.strip_prefix(section)
        .and_then(|rest| rest.strip_prefix('.'))
        .filter(|field| !field.is_empty())
}

/// Split a namespaced key at its first dot into `(section, field)`.
///
/// Bare legacy keys return `None`.
pub fn split_key(key: &str) -> Option<(&str, &str)> {
    key.split_once('.')
        .filter(|(section, field)| !section.is_empty() && !field.is_empty())
}

/// Escape `%`, `_` and `\` for use in a SQL `LIKE ... ESCAPE '\'` pattern.
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
