use crate::content::ContentRow;
use crate::i18n::Locale;

pub type Result<T, E = ContentError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Concurrent write conflict on {key}/{language}")]
    Conflict { key: String, language: Locale },

    #[error("Content {key}/{language} changed since it was read")]
    StaleWrite { key: String, language: Locale },

    #[error("Section {section} partially saved: {} fields written before {failed_field} failed: {source}", .saved.len())]
    PartialSectionWrite {
        section: String,
        saved: Vec<ContentRow>,
        failed_field: String,
        #[source]
        source: Box<ContentError>,
    },

    #[error("Unknown locale code: '{0}'")]
    UnknownLocale(String),
}

impl ContentError {
    /// True for a lost uniqueness race, the only error a write retries on.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ContentError::Conflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_all_errors() {
        let err = ContentError::Validation(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.to_string(), "Validation failed: a; b");
    }

    #[test]
    fn test_is_conflict() {
        let conflict = ContentError::Conflict {
            key: "home.title".to_string(),
            language: Locale::En,
        };
        assert!(conflict.is_conflict());
        assert!(!ContentError::Backend("down".to_string()).is_conflict());
    }

    #[test]
    fn test_partial_write_message() {
        let err = ContentError::PartialSectionWrite {
            section: "home".to_string(),
            saved: Vec::new(),
            failed_field: "hero.title".to_string(),
            source: Box::new(ContentError::Backend("down".to_string())),
        };
        let message = err.to_string();
        assert!(message.contains("home"));
        assert!(message.contains("hero.title"));
        assert!(message.contains("0 fields"));
    }
}
