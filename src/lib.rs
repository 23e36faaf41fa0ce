//! Multi-language content for a vacation-rental site.
//!
//! Locale resolution with a fixed fallback chain, a section-keyed content
//! store with a write gate, and the transformer that flattens apartment
//! records for one locale.

pub mod apartment;
pub mod api;
pub mod config;
pub mod content;
pub mod error;
pub mod i18n;
pub mod retry;
pub mod security;
pub mod validation;

pub use error::{ContentError, Result};
