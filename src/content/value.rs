//! Decoding stored content values into display strings.
//!
//! Older writes JSON-encoded values before storing them in the JSON column,
//! so some rows hold `"\"text\""` instead of `"text"`. Those rows were never
//! migrated; reads unwrap exactly one level.

use serde_json::Value;

/// A stored value decoded for callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    /// Whether a legacy double encoding was unwrapped.
    pub unwrapped: bool,
}

/// Coerce any stored JSON value to a string.
///
/// - missing / `null` → `""`
/// - string → itself
/// - object / array → compact JSON text
/// - number / boolean → its literal form
pub fn coerce(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other @ (Value::Object(_) | Value::Array(_))) => other.to_string(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
    }
}

/// Coerce, then undo one level of legacy JSON string encoding.
///
/// Only a value that starts and ends with `"` and parses as a JSON string is
/// unwrapped. The result is never unwrapped again, so a triple-encoded row
/// comes back still quoted.
pub fn decode(value: Option<&Value>) -> Decoded {
    let text = coerce(value);

    if text.len() > 1 && text.starts_with('"') && text.ends_with('"') {
        if let Ok(Value::String(inner)) = serde_json::from_str::<Value>(&text) {
            return Decoded {
                text: inner,
                unwrapped: true,
            };
        }
    }

    Decoded {
        text,
        unwrapped: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ==================== Coercion Tests ====================

    #[test]
    fn test_null_and_missing_are_empty() {
        assert_eq!(coerce(None), "");
        assert_eq!(coerce(Some(&Value::Null)), "");
    }

    #[test]
    fn test_object_and_array_serialized() {
        assert_eq!(coerce(Some(&json!({"a": 1}))), r#"{"a":1}"#);
        assert_eq!(coerce(Some(&json!(["x", 2]))), r#"["x",2]"#);
    }

    #[test]
    fn test_scalars_stringified() {
        assert_eq!(coerce(Some(&json!(42))), "42");
        assert_eq!(coerce(Some(&json!(1.5))), "1.5");
        assert_eq!(coerce(Some(&json!(true))), "true");
    }

    // ==================== Legacy Unwrap Tests ====================

    #[test]
    fn test_double_encoded_unwrapped() {
        let decoded = decode(Some(&json!("\"hello\"")));
        assert_eq!(decoded.text, "hello");
        assert!(decoded.unwrapped);
    }

    #[test]
    fn test_plain_value_unchanged() {
        let decoded = decode(Some(&json!("hello")));
        assert_eq!(decoded.text, "hello");
        assert!(!decoded.unwrapped);
    }

    #[test]
    fn test_triple_encoded_unwrapped_once() {
        let decoded = decode(Some(&json!("\"\\\"hello\\\"\"")));
        assert_eq!(decoded.text, "\"hello\"");
    }

    #[test]
    fn test_quoted_text_that_is_not_json_kept() {
        // Inner quote is not escaped, so this is not a JSON string literal
        let decoded = decode(Some(&json!("\"Welcome\" she said \"home\"")));
        assert_eq!(decoded.text, "\"Welcome\" she said \"home\"");
        assert!(!decoded.unwrapped);
    }

    #[test]
    fn test_single_quote_character_kept() {
        assert_eq!(decode(Some(&json!("\""))).text, "\"");
    }

    #[test]
    fn test_escaped_newline_decoded() {
        let decoded = decode(Some(&json!("\"line1\\nline2\"")));
        assert_eq!(decoded.text, "line1\nline2");
    }

    #[test]
    fn test_null_decodes_to_empty() {
        assert_eq!(decode(Some(&Value::Null)).text, "");
    }
}
