//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_decisions_total` (counter): decisions by outcome
//! - `gate_faults_total` (counter): evaluation faults by kind
//! - `gate_session_validations_total` (counter): provider checks by result
//! - `gate_session_validation_duration_seconds` (histogram): provider latency
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_decision(decision: &'static str) {
    metrics::counter!("gate_decisions_total", "decision" => decision).increment(1);
}

pub fn record_fault(kind: &'static str) {
    metrics::counter!("gate_faults_total", "kind" => kind).increment(1);
}

pub fn record_session_validation(result: &'static str, started: Instant) {
    metrics::counter!("gate_session_validations_total", "result" => result).increment(1);
    metrics::histogram!("gate_session_validation_duration_seconds")
        .record(started.elapsed().as_secs_f64());
}
