//! Picking the locale for an incoming request.

use crate::i18n::Locale;

/// The locale hints a request can carry.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocaleHints<'a> {
    /// `locale` or `lang` query parameter
    pub param: Option<&'a str>,
    /// Raw `Accept-Language` header
    pub accept_language: Option<&'a str>,
    /// `locale` cookie
    pub cookie: Option<&'a str>,
}

/// Choose a locale: explicit parameter, then `Accept-Language`, then cookie,
/// then [`Locale::DEFAULT`]. Unsupported values are skipped, never rejected.
pub fn negotiate_locale(hints: LocaleHints<'_>) -> Locale {
    hints
        .param
        .and_then(Locale::from_code)
        .or_else(|| hints.accept_language.and_then(parse_accept_language))
        .or_else(|| hints.cookie.and_then(Locale::from_code))
        .unwrap_or(Locale::DEFAULT)
}

/// First supported primary language tag in header order.
///
/// Quality values are ignored; `de-AT;q=0.8` counts as `de`.
pub fn parse_accept_language(header: &str) -> Option<Locale> {
    header.split(',').find_map(|entry| {
        let tag = entry.trim().split(';').next().unwrap_or_default();
        let primary = tag.split('-').next().unwrap_or_default().to_lowercase();
        Locale::from_code(&primary)
    })
}
