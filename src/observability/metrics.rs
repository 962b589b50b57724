//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_transactions_total` (counter): calls by function, kind, outcome
//! - `gateway_transaction_duration_seconds` (histogram): end-to-end latency
//! - `gateway_sessions_open` (gauge): currently open gateway sessions
//! - `gateway_http_requests_total` (counter): HTTP requests by route, status
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one dispatched transaction.
pub fn record_transaction(function: &str, kind: &'static str, outcome: &'static str, start: Instant) {
    let function = function.to_string();
    counter!(
        "gateway_transactions_total",
        "function" => function.clone(),
        "kind" => kind,
        "outcome" => outcome
    )
    .increment(1);
    histogram!(
        "gateway_transaction_duration_seconds",
        "function" => function,
        "kind" => kind,
        "outcome" => outcome
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one HTTP request.
pub fn record_request(route: &'static str, status: u16) {
    counter!(
        "gateway_http_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn session_opened() {
    gauge!("gateway_sessions_open").increment(1.0);
}

pub fn session_closed() {
    gauge!("gateway_sessions_open").decrement(1.0);
}
