//! Prometheus metrics for the Portico server.
//!
//! HTTP trigger metrics plus the core run/row/step metrics, served from one
//! registry at /metrics.

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Trigger endpoint invocations.
pub static TRIGGER_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("portico_trigger_requests_total", "Total trigger requests"),
        &["status"], // "success", "error"
    )
    .unwrap()
});

/// Whether a run is currently executing (1) or not (0).
pub static RUNS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("portico_runs_in_flight", "Order runs currently executing").unwrap()
});

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(TRIGGER_REQUESTS.clone()))
        .unwrap();
    registry.register(Box::new(RUNS_IN_FLIGHT.clone())).unwrap();

    // Core metrics (runner, filler, sheets)
    for metric in portico_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}
