//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Admission (accepted and rejected files)
//! - Jobs (terminal outcomes by media kind)
//! - Transcoding (duration, passthrough fallbacks, bytes saved)
//! - Maintenance (swept artifacts)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Admission Metrics
// =============================================================================

/// Admission decisions by result.
pub static ADMISSIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("squish_admissions_total", "Total admission decisions"),
        &["result"], // "accepted", "too_large", "too_small", "rate_limited_hourly", "rate_limited_daily"
    )
    .unwrap()
});

// =============================================================================
// Job Metrics
// =============================================================================

/// Jobs reaching a terminal state.
pub static JOBS_COMPLETED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("squish_jobs_completed_total", "Total jobs finished"),
        &["kind", "outcome"], // outcome: "succeeded", "failed", "cancelled"
    )
    .unwrap()
});

// =============================================================================
// Transcoder Metrics
// =============================================================================

/// Transcode duration in seconds.
pub static TRANSCODE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "squish_transcode_duration_seconds",
            "Duration of external transcoder runs",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
        &["kind", "result"],
    )
    .unwrap()
});

/// Bytes saved by compression.
pub static BYTES_SAVED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("squish_bytes_saved_total", "Total bytes saved by compression"),
        &["kind"],
    )
    .unwrap()
});

/// Inputs returned unchanged because the transcoder was unavailable.
pub static TRANSCODE_FALLBACKS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "squish_transcode_fallbacks_total",
        "Total passthrough copies made while the transcoder was unavailable",
    )
    .unwrap()
});

// =============================================================================
// Maintenance Metrics
// =============================================================================

/// Stale artifacts removed by the sweep.
pub static ARTIFACTS_SWEPT: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "squish_artifacts_swept_total",
        "Total stale job artifacts removed",
    )
    .unwrap()
});

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Admission
        Box::new(ADMISSIONS.clone()),
        // Jobs
        Box::new(JOBS_COMPLETED.clone()),
        // Transcoder
        Box::new(TRANSCODE_DURATION.clone()),
        Box::new(BYTES_SAVED.clone()),
        Box::new(TRANSCODE_FALLBACKS.clone()),
        // Maintenance
        Box::new(ARTIFACTS_SWEPT.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }

        ADMISSIONS.with_label_values(&["accepted"]).inc();
        let families = registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "squish_admissions_total"));
    }
}
