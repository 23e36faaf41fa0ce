//! Localization metrics and observability module.
//!
//! Counts how often resolution had to fall back, and how many legacy
//! double-encoded content rows were repaired on read.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use crate::i18n::Resolution;

/// Localization counters.
#[derive(Debug, Default)]
pub struct LocalizationMetrics {
    /// Resolutions served by the requested locale
    requested_hits: AtomicUsize,

    /// Resolutions that fell back to Serbian
    serbian_fallbacks: AtomicUsize,

    /// Resolutions that fell back to the canonical-order scan
    canonical_fallbacks: AtomicUsize,

    /// Resolutions of values with no translation at all
    missing: AtomicUsize,

    /// Content rows unwrapped from the legacy double encoding
    legacy_unwraps: AtomicUsize,
}

/// Global metrics instance (initialized lazily)
static METRICS: OnceLock<LocalizationMetrics> = OnceLock::new();

impl LocalizationMetrics {
    /// Get the process-wide metrics instance.
    pub fn global() -> &'static LocalizationMetrics {
        METRICS.get_or_init(LocalizationMetrics::default)
    }

    /// Record the outcome of one field resolution.
    pub fn record(&self, resolution: Resolution) {
        let counter = match resolution {
            Resolution::Requested => &self.requested_hits,
            Resolution::Serbian => &self.serbian_fallbacks,
            Resolution::Canonical(_) => &self.canonical_fallbacks,
            Resolution::Missing => &self.missing,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a legacy double-encoded value being unwrapped.
    pub fn record_legacy_unwrap(&self) {
        self.legacy_unwraps.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requested_hits(&self) -> usize {
        self.requested_hits.load(Ordering::Relaxed)
    }

    pub fn serbian_fallbacks(&self) -> usize {
        self.serbian_fallbacks.load(Ordering::Relaxed)
    }

    pub fn canonical_fallbacks(&self) -> usize {
        self.canonical_fallbacks.load(Ordering::Relaxed)
    }

    pub fn missing(&self) -> usize {
        self.missing.load(Ordering::Relaxed)
    }

    pub fn legacy_unwraps(&self) -> usize {
        self.legacy_unwraps.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let requested_hits = self.requested_hits();
        let serbian_fallbacks = self.serbian_fallbacks();
        let canonical_fallbacks = self.canonical_fallbacks();
        let missing = self.missing();

        let total = requested_hits + serbian_fallbacks + canonical_fallbacks + missing;
        let hit_rate = if total > 0 {
            (requested_hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            requested_hits,
            serbian_fallbacks,
            canonical_fallbacks,
            missing,
            hit_rate,
            legacy_unwraps: self.legacy_unwraps(),
        }
    }
}

/// Snapshot of the localization counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub requested_hits: usize,
    pub serbian_fallbacks: usize,
    pub canonical_fallbacks: usize,
    pub missing: usize,

    /// Share of resolutions served by the requested locale (0-100)
    pub hit_rate: f64,

    pub legacy_unwraps: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Locale;

    // ==================== Counter Tests ====================

    #[test]
    fn test_record_each_resolution_kind() {
        let metrics = LocalizationMetrics::default();

        metrics.record(Resolution::Requested);
        metrics.record(Resolution::Serbian);
        metrics.record(Resolution::Canonical(Locale::En));
        metrics.record(Resolution::Canonical(Locale::De));
        metrics.record(Resolution::Missing);

        assert_eq!(metrics.requested_hits(), 1);
        assert_eq!(metrics.serbian_fallbacks(), 1);
        assert_eq!(metrics.canonical_fallbacks(), 2);
        assert_eq!(metrics.missing(), 1);
    }

    #[test]
    fn test_record_legacy_unwrap() {
        let metrics = LocalizationMetrics::default();
        metrics.record_legacy_unwrap();
        metrics.record_legacy_unwrap();
        assert_eq!(metrics.legacy_unwraps(), 2);
    }

    // ==================== Report Tests ====================

    #[test]
    fn test_report_empty() {
        let report = LocalizationMetrics::default().report();
        assert_eq!(report.requested_hits, 0);
        assert_eq!(report.hit_rate, 0.0);
        assert_eq!(report.legacy_unwraps, 0);
    }

    #[test]
    fn test_report_hit_rate() {
        let metrics = LocalizationMetrics::default();

        // 3 hits, 1 fallback = 75%
        metrics.record(Resolution::Requested);
        metrics.record(Resolution::Requested);
        metrics.record(Resolution::Requested);
        metrics.record(Resolution::Serbian);

        let report = metrics.report();
        assert_eq!(report.hit_rate, 75.0);
    }

    #[test]
    fn test_report_serializes() {
        let metrics = LocalizationMetrics::default();
        metrics.record(Resolution::Missing);

        let json = serde_json::to_value(metrics.report()).expect("Should serialize");
        assert_eq!(json["missing"], 1);
    }

    // ==================== Singleton Tests ====================

    #[test]
    fn test_global_returns_same_instance() {
        let metrics1 = LocalizationMetrics::global();
        let metrics2 = LocalizationMetrics::global();
        assert!(std::ptr::eq(metrics1, metrics2));
    }
}
