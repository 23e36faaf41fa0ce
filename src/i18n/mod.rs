//! Internationalization (i18n) module for multi-language content.
//!
//! # Architecture
//!
//! - `locale`: the closed set of content locales (`sr`, `en`, `de`, `it`)
//! - `resolver`: multi-language values and the locale fallback chain
//! - `negotiation`: choosing a locale from request hints
//! - `metrics`: fallback and legacy-repair counters
//!
//! # Example
//!
//! ```rust
//! use rental_content::i18n::{Locale, LocalizedText};
//!
//! let name = LocalizedText::single(Locale::Sr, "Apartman Sunce");
//! assert_eq!(name.resolve(Locale::De), "Apartman Sunce");
//! ```

mod locale;
mod metrics;
mod negotiation;
mod resolver;

pub use locale::Locale;
pub use metrics::{LocalizationMetrics, MetricsReport};
pub use negotiation::{negotiate_locale, parse_accept_language, LocaleHints};
pub use resolver::{resolve, resolve_field, resolve_list, LocalizedText, Resolution, CANONICAL_ORDER};
