//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Order runs (rows processed, run duration)
//! - Form filling (mandatory step failures)
//! - The spreadsheet backend

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

/// Completed runs by result.
pub static RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("portico_runs_total", "Total order runs"),
        &["result"], // "success", "error"
    )
    .unwrap()
});

/// Run duration in seconds.
pub static RUN_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("portico_run_duration_seconds", "Duration of order runs")
            .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]),
        &[],
    )
    .unwrap()
});

/// Rows handled per terminal outcome.
pub static ROWS_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("portico_rows_processed_total", "Total order rows handled"),
        &["outcome"], // "done", "failed", "skipped"
    )
    .unwrap()
});

/// Mandatory form step failures by step.
pub static STEP_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "portico_step_failures_total",
            "Mandatory form steps that aborted an order",
        ),
        &["step"],
    )
    .unwrap()
});

/// Spreadsheet backend requests.
pub static SHEET_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "portico_sheet_requests_total",
            "Total spreadsheet API requests",
        ),
        &["operation", "status"], // operation: "read", "write"; status: "success", "error"
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(RUNS_TOTAL.clone()),
        Box::new(RUN_DURATION.clone()),
        Box::new(ROWS_PROCESSED.clone()),
        Box::new(STEP_FAILURES.clone()),
        Box::new(SHEET_REQUESTS.clone()),
    ]
}
