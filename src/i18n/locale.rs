//! Locale type: the four languages the site publishes content in.
//!
//! Content is authored in Serbian and translated into English, German and
//! Italian. The set is closed, so the type is an enum rather than a validated
//! string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ContentError;

/// A supported content locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Sr,
    En,
    De,
    It,
}

impl Locale {
    /// All supported locales, in canonical order.
    pub const ALL: [Locale; 4] = [Locale::Sr, Locale::En, Locale::De, Locale::It];

    /// The authoring language and default for requests that name no locale.
    pub const DEFAULT: Locale = Locale::Sr;

    /// Create a Locale from its two-letter code.
    ///
    /// # Returns
    /// * `Some(Locale)` for `sr`, `en`, `de` or `it`
    /// * `None` for anything else (codes are case-sensitive)
    pub fn from_code(code: &str) -> Option<Locale> {
        match code {
            "sr" => Some(Locale::Sr),
            "en" => Some(Locale::En),
            "de" => Some(Locale::De),
            "it" => Some(Locale::It),
            _ => None,
        }
    }

    /// Get the two-letter language code.
    pub fn code(&self) -> &'static str {
        match self {
            Locale::Sr => "sr",
            Locale::En => "en",
            Locale::De => "de",
            Locale::It => "it",
        }
    }

    /// Get the English name of the language.
    pub fn name(&self) -> &'static str {
        match self {
            Locale::Sr => "Serbian",
            Locale::En => "English",
            Locale::De => "German",
            Locale::It => "Italian",
        }
    }

    /// Get the name of the language in that language.
    pub fn native_name(&self) -> &'static str {
        match self {
            Locale::Sr => "Srpski",
            Locale::En => "English",
            Locale::De => "Deutsch",
            Locale::It => "Italiano",
        }
    }

    /// Check if this is the authoring language.
    pub fn is_default(&self) -> bool {
        *self == Locale::DEFAULT
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_code(s).ok_or_else(|| ContentError::UnknownLocale(s.to_string()))
    }
}
