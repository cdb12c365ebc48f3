//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the shelfcheck server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Catalog status counts (collected dynamically)
//! - Verifier run state (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use regex_lite::Regex;

use shelfcheck_core::MatchStatus;

use crate::state::AppState;

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
            "shelfcheck_http_request_duration_seconds",
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
        Opts::new("shelfcheck_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "shelfcheck_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Catalog Metrics (collected dynamically)
// =============================================================================

/// Books by latest verification status; "unverified" for books never checked.
pub static BOOKS_BY_STATUS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("shelfcheck_books_by_status", "Catalog book count by status"),
        &["status"],
    )
    .unwrap()
});

// =============================================================================
// Verifier Metrics (collected dynamically)
// =============================================================================

/// Verifier run state (1 = running, 0 = idle).
pub static VERIFIER_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "shelfcheck_verifier_running",
        "Whether a verification run is in progress (1) or not (0)",
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

    // Catalog
    registry
        .register(Box::new(BOOKS_BY_STATUS.clone()))
        .unwrap();

    // Verifier
    registry
        .register(Box::new(VERIFIER_RUNNING.clone()))
        .unwrap();

    // Core metrics (verification, tracker)
    for metric in shelfcheck_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the gauges reflect the catalog and verifier as
/// they are now.
pub async fn collect_dynamic_metrics(state: &AppState) {
    if let Ok(stats) = state.store().stats() {
        BOOKS_BY_STATUS
            .with_label_values(&["unverified"])
            .set(stats.unverified as i64);
        for status in MatchStatus::ALL {
            BOOKS_BY_STATUS
                .with_label_values(&[status.as_str()])
                .set(stats.count(status) as i64);
        }
    }

    let running = state.verifier().map(|v| v.is_running()).unwrap_or(false);
    VERIFIER_RUNNING.set(if running { 1 } else { 0 });
}

static UUID_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap()
});

static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = UUID_SEGMENT.replace_all(path, "{id}");
    let result = NUMERIC_SEGMENT.replace_all(&result, "/{id}$1");
    result.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_uuid() {
        let path = "/api/v1/runs/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(normalize_path(path), "/api/v1/runs/{id}");
    }

    #[test]
    fn test_normalize_path_numeric() {
        let path = "/api/v1/books/12345";
        assert_eq!(normalize_path(path), "/api/v1/books/{id}");
    }

    #[test]
    fn test_normalize_path_numeric_middle() {
        let path = "/api/v1/groups/12345/torrents/2";
        assert_eq!(normalize_path(path), "/api/v1/groups/{id}/torrents/{id}");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        let path = "/api/v1/books/stats";
        assert_eq!(normalize_path(path), "/api/v1/books/stats");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("shelfcheck_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_all_metrics() {
        HTTP_REQUEST_DURATION
            .with_label_values(&["GET", "/test", "200"])
            .observe(0.1);
        HTTP_REQUESTS_IN_FLIGHT.set(0);
        BOOKS_BY_STATUS.with_label_values(&["match"]).set(0);
        VERIFIER_RUNNING.set(0);
        shelfcheck_core::metrics::VERIFICATIONS_TOTAL
            .with_label_values(&["no_match"])
            .inc();

        let output = encode_metrics();

        assert!(output.contains("shelfcheck_http_request_duration_seconds"));
        assert!(output.contains("shelfcheck_http_requests_in_flight"));
        assert!(output.contains("shelfcheck_books_by_status"));
        assert!(output.contains("shelfcheck_verifier_running"));
        assert!(output.contains("shelfcheck_verifications_total"));
    }
}
