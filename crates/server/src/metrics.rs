//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the squish server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Pipeline and scheduler status (collected dynamically)
//! - Everything exported by `squish_core::metrics`

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use regex_lite::Regex;
use tracing::warn;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "squish_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("squish_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "squish_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Pipeline Metrics (collected dynamically)
// =============================================================================

/// Pipeline accepting state (1 = running, 0 = stopped).
pub static PIPELINE_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "squish_pipeline_running",
        "Whether the pipeline is accepting files (1) or stopped (0)",
    )
    .unwrap()
});

/// Jobs currently running.
pub static SCHEDULER_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("squish_scheduler_active_jobs", "Number of running jobs").unwrap()
});

/// Jobs waiting for a slot.
pub static SCHEDULER_QUEUED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("squish_scheduler_queued_jobs", "Number of queued jobs").unwrap()
});

/// Transcoder availability (1 = available).
pub static TRANSCODER_AVAILABLE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "squish_transcoder_available",
        "Whether the external transcoder can be run (1) or not (0)",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Pipeline
    registry
        .register(Box::new(PIPELINE_RUNNING.clone()))
        .unwrap();
    registry
        .register(Box::new(SCHEDULER_ACTIVE.clone()))
        .unwrap();
    registry
        .register(Box::new(SCHEDULER_QUEUED.clone()))
        .unwrap();
    registry
        .register(Box::new(TRANSCODER_AVAILABLE.clone()))
        .unwrap();

    // Core metrics (admission, jobs, transcoding, maintenance)
    for metric in squish_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so gauges reflect the scheduler at scrape time.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let pipeline = state.pipeline();
    let status = pipeline.status().await;
    PIPELINE_RUNNING.set(if status.running { 1 } else { 0 });
    SCHEDULER_ACTIVE.set(status.scheduler.active_jobs as i64);
    SCHEDULER_QUEUED.set(status.scheduler.queued_jobs as i64);
    TRANSCODER_AVAILABLE.set(if pipeline.is_transcoder_available().await { 1 } else { 0 });
}

static UUID_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap()
});

static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/-?\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = UUID_SEGMENT.replace_all(path, "{id}");
    let result = NUMERIC_SEGMENT.replace_all(&result, "/{id}$1");
    result.to_string()
}
