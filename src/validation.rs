//! Input validation and sanitization for content writes.
//!
//! Every write request passes through here before it reaches the
//! [`ContentStore`](crate::content::ContentStore). Reads are never sanitized.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::content::key::split_key;
use crate::content::value::coerce;
use crate::error::{ContentError, Result};
use crate::i18n::Locale;

/// Hard cap on stored content length, in characters.
pub const MAX_CONTENT_LENGTH: usize = 10_000;

/// Sections accepted for section writes unless configured otherwise.
pub const DEFAULT_SECTIONS: [&str; 9] = [
    "home",
    "apartments",
    "attractions",
    "location",
    "prices",
    "contact",
    "gallery",
    "footer",
    "privacy",
];

/// Outcome of a validation pass. All failed checks are listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Convert a failed report into `ContentError::Validation`.
    pub fn into_result(self) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(ContentError::Validation(self.errors))
        }
    }
}

/// Trim, normalize `\r\n` to `\n`, strip NUL bytes and cap at
/// [`MAX_CONTENT_LENGTH`] characters. Truncation is silent.
pub fn sanitize(value: &str) -> String {
    // NULs go first so that "\r\0\n" cannot reassemble into "\r\n"
    let sanitized = value.trim().replace('\0', "").replace("\r\n", "\n");

    match sanitized.char_indices().nth(MAX_CONTENT_LENGTH) {
        Some((cut, _)) => sanitized[..cut].to_string(),
        None => sanitized,
    }
}

/// Check that section data is an object whose values are all strings.
pub fn validate_content_structure(data: &Value) -> ValidationReport {
    let Value::Object(fields) = data else {
        return ValidationReport::from_errors(vec!["Content data must be an object".to_string()]);
    };

    let errors = fields
        .iter()
        .filter(|(_, value)| !value.is_string())
        .map(|(field, value)| {
            format!("Field \"{}\" must be a string, got {}", field, json_type(value))
        })
        .collect();

    ValidationReport::from_errors(errors)
}

/// Fields that must be non-blank before a section is published.
pub fn required_fields(section: &str) -> &'static [&'static str] {
    match section {
        "home" => &["title", "hero.title", "hero.subtitle"],
        "apartments" | "attractions" | "location" | "prices" | "contact" | "gallery" => {
            &["title", "description"]
        }
        "footer" => &["rights"],
        _ => &[],
    }
}

/// Check that every required field of the section has non-blank content.
pub fn validate_required_fields(section: &str, data: &BTreeMap<String, String>) -> ValidationReport {
    let errors = required_fields(section)
        .iter()
        .filter(|field| data.get(**field).map_or(true, |value| value.trim().is_empty()))
        .map(|field| format!("Field \"{}\" is required for publishing", field))
        .collect();

    ValidationReport::from_errors(errors)
}

/// The validation gate: knows the allowed sections.
#[derive(Debug, Clone)]
pub struct ContentGate {
    allowed_sections: Vec<String>,
}

impl Default for ContentGate {
    fn default() -> Self {
        Self::new(DEFAULT_SECTIONS.iter().map(|s| s.to_string()))
    }
}

impl ContentGate {
    pub fn new(allowed_sections: impl IntoIterator<Item = String>) -> Self {
        Self {
            allowed_sections: allowed_sections.into_iter().collect(),
        }
    }

    pub fn is_allowed_section(&self, section: &str) -> bool {
        self.allowed_sections.iter().any(|allowed| allowed == section)
    }

    /// Validate a section-write payload `{section, lang, data, published?}`.
    ///
    /// `language` is accepted in place of `lang`.
    pub fn validate_write_request(&self, payload: &Value) -> ValidationReport {
        let Value::Object(body) = payload else {
            return ValidationReport::from_errors(vec!["Request body must be an object".to_string()]);
        };

        let mut errors = Vec::new();

        match non_empty_str(body, "section") {
            None => errors.push("Section is required and must be a string".to_string()),
            Some(section) if !self.is_allowed_section(section) => errors.push(format!(
                "Section must be one of: {}",
                self.allowed_sections.join(", ")
            )),
            Some(_) => {}
        }

        match language_field(body) {
            None => errors.push("Language is required and must be a string".to_string()),
            Some(code) if Locale::from_code(code).is_none() => errors.push(format!(
                "Language must be one of: {}",
                Locale::ALL.map(|l| l.code()).join(", ")
            )),
            Some(_) => {}
        }

        if !matches!(body.get("data"), Some(Value::Object(_))) {
            errors.push("Data is required and must be an object".to_string());
        }

        ValidationReport::from_errors(errors)
    }

    /// Validate and sanitize a section write.
    pub fn section_write(&self, payload: &Value) -> Result<SectionWriteRequest> {
        self.validate_write_request(payload).into_result()?;

        let (Some(section), Some(language), Some(Value::Object(data))) = (
            non_empty_str_value(payload, "section"),
            payload_language(payload),
            payload.get("data"),
        ) else {
            return Err(ContentError::Validation(vec![
                "Malformed section write request".to_string(),
            ]));
        };

        let fields = data
            .iter()
            .map(|(field, value)| (field.clone(), sanitize(&coerce(Some(value)))))
            .collect();

        Ok(SectionWriteRequest {
            section: section.to_string(),
            language,
            fields,
            published: payload.get("published").and_then(Value::as_bool),
        })
    }

    /// Validate and sanitize a single-key write `{key, language, value, published?}`.
    pub fn key_write(&self, payload: &Value) -> Result<KeyWriteRequest> {
        let key = non_empty_str_value(payload, "key");
        let code = payload.as_object().and_then(language_field);

        let (Some(key), Some(code)) = (key, code) else {
            return Err(ContentError::Validation(vec![
                "Key and language are required".to_string(),
            ]));
        };
        if key.contains('.') && split_key(key).is_none() {
            return Err(ContentError::Validation(vec![format!(
                "Key \"{}\" must be a bare name or <section>.<field> with both parts non-empty",
                key
            )]));
        }

        let language: Locale = code.parse().map_err(|_| {
            ContentError::Validation(vec![format!(
                "Language must be one of: {}",
                Locale::ALL.map(|l| l.code()).join(", ")
            )])
        })?;

        Ok(KeyWriteRequest {
            key: key.to_string(),
            language,
            value: sanitize(&coerce(payload.get("value"))),
            published: payload.get("published").and_then(Value::as_bool),
        })
    }
}

/// A validated, sanitized section write.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionWriteRequest {
    pub section: String,
    pub language: Locale,
    /// Field name to sanitized value, in payload order
    pub fields: Vec<(String, String)>,
    pub published: Option<bool>,
}

/// A validated, sanitized single-key write.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyWriteRequest {
    pub key: String,
    pub language: Locale,
    pub value: String,
    pub published: Option<bool>,
}

fn non_empty_str<'a>(body: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

fn non_empty_str_value<'a>(payload: &'a Value, field: &str) -> Option<&'a str> {
    payload.as_object().and_then(|body| non_empty_str(body, field))
}

fn language_field(body: &Map<String, Value>) -> Option<&str> {
    non_empty_str(body, "lang").or_else(|| non_empty_str(body, "language"))
}

fn payload_language(payload: &Value) -> Option<Locale> {
    payload
        .as_object()
        .and_then(language_field)
        .and_then(Locale::from_code)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    // ==================== sanitize Tests ====================

    #[test]
    fn test_sanitize_trims_and_normalizes() {
        assert_eq!(sanitize("  a@b.com\r\n"), "a@b.com");
        assert_eq!(sanitize("line1\r\nline2"), "line1\nline2");
    }

    #[test]
    fn test_sanitize_strips_nul_bytes() {
        assert_eq!(sanitize("ab\0c\0"), "abc");
        assert_eq!(sanitize("a\r\0\nb"), "a\nb");
    }

    #[test]
    fn test_sanitize_truncates_to_cap() {
        let long = "x".repeat(15_000);
        assert_eq!(sanitize(&long).chars().count(), MAX_CONTENT_LENGTH);
    }

    #[test]
    fn test_sanitize_truncates_on_char_boundary() {
        let long = "č".repeat(12_000);
        let sanitized = sanitize(&long);
        assert_eq!(sanitized.chars().count(), MAX_CONTENT_LENGTH);
        assert!(sanitized.chars().all(|c| c == 'č'));
    }

    #[test]
    fn test_sanitize_keeps_short_input() {
        assert_eq!(sanitize("Dobrodošli"), "Dobrodošli");
        assert_eq!(sanitize(""), "");
    }

    proptest! {
        #[test]
        fn prop_sanitize_invariants(input in "(?s).{0,200}") {
            let sanitized = sanitize(&input);
            prop_assert!(!sanitized.contains('\0'));
            prop_assert!(sanitized.chars().count() <= MAX_CONTENT_LENGTH);
        }
    }

    // ==================== validate_write_request Tests ====================

    #[test]
    fn test_valid_section_payload() {
        let gate = ContentGate::default();
        let report = gate.validate_write_request(&json!({
            "section": "home",
            "lang": "en",
            "data": {"title": "Welcome"}
        }));
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_all_errors_collected() {
        let gate = ContentGate::default();
        let report = gate.validate_write_request(&json!({
            "section": "blog",
            "lang": "fr",
            "data": ["not", "an", "object"]
        }));
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 3);
        assert!(report.errors[0].contains("Section must be one of"));
        assert!(report.errors[1].contains("sr, en, de, it"));
        assert!(report.errors[2].contains("Data"));
    }

    #[test]
    fn test_missing_fields_reported() {
        let gate = ContentGate::default();
        let report = gate.validate_write_request(&json!({"section": "", "data": null}));
        assert_eq!(report.errors.len(), 3);
    }

    #[test]
    fn test_non_object_body() {
        let gate = ContentGate::default();
        let report = gate.validate_write_request(&json!("home"));
        assert_eq!(report.errors, vec!["Request body must be an object".to_string()]);
    }

    #[test]
    fn test_language_alias_accepted() {
        let gate = ContentGate::default();
        let report = gate.validate_write_request(&json!({
            "section": "privacy",
            "language": "de",
            "data": {}
        }));
        assert!(report.valid);
    }

    #[test]
    fn test_custom_sections() {
        let gate = ContentGate::new(vec!["faq".to_string()]);
        assert!(gate.is_allowed_section("faq"));
        assert!(!gate.is_allowed_section("home"));
    }

    // ==================== Request Building Tests ====================

    #[test]
    fn test_section_write_sanitizes_and_stringifies() {
        let gate = ContentGate::default();
        let request = gate
            .section_write(&json!({
                "section": "contact",
                "lang": "it",
                "data": {"email": "  a@b.com\r\n", "floor": 3},
                "published": false
            }))
            .unwrap();

        assert_eq!(request.section, "contact");
        assert_eq!(request.language, Locale::It);
        assert_eq!(request.published, Some(false));
        assert!(request.fields.contains(&("email".to_string(), "a@b.com".to_string())));
        assert!(request.fields.contains(&("floor".to_string(), "3".to_string())));
    }

    #[test]
    fn test_section_write_keeps_payload_field_order() {
        let gate = ContentGate::default();
        let payload: Value = serde_json::from_str(
            r#"{"section": "home", "lang": "sr", "data": {"title": "a", "hero.title": "b", "cta": "c"}}"#,
        )
        .unwrap();

        let request = gate.section_write(&payload).unwrap();
        let names: Vec<&str> = request.fields.iter().map(|(field, _)| field.as_str()).collect();
        assert_eq!(names, vec!["title", "hero.title", "cta"]);
    }

    #[test]
    fn test_section_write_rejects_invalid() {
        let gate = ContentGate::default();
        let result = gate.section_write(&json!({"section": "home", "lang": "xx", "data": {}}));
        match result {
            Err(ContentError::Validation(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_key_write() {
        let gate = ContentGate::default();
        let request = gate
            .key_write(&json!({"key": "contact.email", "language": "en", "value": " x\0 "}))
            .unwrap();
        assert_eq!(request.key, "contact.email");
        assert_eq!(request.language, Locale::En);
        assert_eq!(request.value, "x");
        assert_eq!(request.published, None);
    }

    #[test]
    fn test_key_write_rejects_empty_key_segments() {
        let gate = ContentGate::default();
        for key in ["home.", ".title", "."] {
            let result = gate.key_write(&json!({"key": key, "language": "en", "value": "x"}));
            assert!(
                matches!(result, Err(ContentError::Validation(_))),
                "{} should be rejected",
                key
            );
        }

        assert!(gate
            .key_write(&json!({"key": "footer", "language": "en", "value": "x"}))
            .is_ok());
        assert!(gate
            .key_write(&json!({"key": "privacy.dataCollection.content", "language": "en", "value": "x"}))
            .is_ok());
    }

    #[test]
    fn test_key_write_requires_key_and_language() {
        let gate = ContentGate::default();
        assert!(gate.key_write(&json!({"value": "x"})).is_err());
        assert!(gate.key_write(&json!({"key": "k", "language": "fr"})).is_err());
    }

    // ==================== Structure / Required Field Tests ====================

    #[test]
    fn test_validate_content_structure() {
        assert!(validate_content_structure(&json!({"a": "x"})).valid);

        let report = validate_content_structure(&json!({"a": 1, "b": "x", "c": null}));
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].contains("number"));

        assert!(!validate_content_structure(&json!([])).valid);
    }

    #[test]
    fn test_required_fields_for_home() {
        let mut data = BTreeMap::new();
        data.insert("title".to_string(), "Home".to_string());
        data.insert("hero.title".to_string(), "   ".to_string());

        let report = validate_required_fields("home", &data);
        assert_eq!(
            report.errors,
            vec![
                "Field \"hero.title\" is required for publishing".to_string(),
                "Field \"hero.subtitle\" is required for publishing".to_string(),
            ]
        );
    }

    #[test]
    fn test_required_fields_unknown_section() {
        assert!(required_fields("privacy").is_empty());
        assert!(validate_required_fields("privacy", &BTreeMap::new()).valid);
    }
}
