//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Verification (per-item outcomes, run durations)
//! - Tracker API (requests, latency, result counts, rate-limit waits)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Verification Metrics
// =============================================================================

/// Verified items total by resulting status.
pub static VERIFICATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "shelfcheck_verifications_total",
            "Total items verified against the tracker",
        ),
        &["status"], // "match", "no_match", "ambiguous", "error"
    )
    .unwrap()
});

/// Verification run duration in seconds.
pub static RUN_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "shelfcheck_run_duration_seconds",
            "Duration of batch verification runs",
        )
        .buckets(vec![1.0, 10.0, 60.0, 300.0, 900.0, 1800.0, 3600.0, 7200.0]),
        &[],
    )
    .unwrap()
});

/// Books whose verification could not be persisted.
pub static PERSIST_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "shelfcheck_persist_failures_total",
        "Verification records that failed to save",
    )
    .unwrap()
});

// =============================================================================
// Tracker Metrics
// =============================================================================

/// Tracker requests total.
pub static TRACKER_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "shelfcheck_tracker_requests_total",
            "Total tracker API requests",
        ),
        &["status"], // "success", "error"
    )
    .unwrap()
});

/// Tracker request duration.
pub static TRACKER_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "shelfcheck_tracker_request_duration_seconds",
            "Duration of tracker API calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &[],
    )
    .unwrap()
});

/// Groups returned per search.
pub static SEARCH_GROUPS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "shelfcheck_search_groups",
            "Number of groups returned per tracker search",
        )
        .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 25.0, 50.0]),
        &[],
    )
    .unwrap()
});

/// Times a request had to wait for the rate limiter.
pub static RATE_LIMIT_WAITS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "shelfcheck_rate_limit_waits_total",
        "Tracker requests delayed by the rate limiter",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Verification
        Box::new(VERIFICATIONS_TOTAL.clone()),
        Box::new(RUN_DURATION.clone()),
        Box::new(PERSIST_FAILURES.clone()),
        // Tracker
        Box::new(TRACKER_REQUESTS.clone()),
        Box::new(TRACKER_DURATION.clone()),
        Box::new(SEARCH_GROUPS.clone()),
        Box::new(RATE_LIMIT_WAITS.clone()),
    ]
}
