//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define edge metrics (decisions, requests, latency, origin errors)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `edge_decisions_total` (counter): decisions by outcome
//! - `edge_requests_total` (counter): responses by method, status
//! - `edge_request_duration_seconds` (histogram): end-to-end latency
//! - `edge_origin_retries_total` (counter): retried origin attempts
//! - `edge_origin_errors_total` (counter): origin requests that failed
//! - `edge_telemetry_dropped_total` (counter): telemetry events not delivered
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op
//! - Labels kept low-cardinality (no paths)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_decision(outcome: &'static str) {
    metrics::counter!("edge_decisions_total", "outcome" => outcome).increment(1);
}

/// Record a finished request and its latency.
pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "edge_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("edge_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_origin_retry() {
    metrics::counter!("edge_origin_retries_total").increment(1);
}

pub fn record_origin_error() {
    metrics::counter!("edge_origin_errors_total").increment(1);
}

pub fn record_telemetry_dropped(reason: &'static str) {
    metrics::counter!("edge_telemetry_dropped_total", "reason" => reason).increment(1);
}
