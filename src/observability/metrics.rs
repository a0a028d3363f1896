//! Metrics collection and exposition.
//!
//! # Metrics
//! - `slack_proxy_requests_total` (counter): proxied calls by method, status
//! - `slack_proxy_request_duration_seconds` (histogram): end-to-end latency
//! - `slack_proxy_errors_total` (counter): locally generated errors by kind
//! - `slack_proxy_payload_repairs_total` (counter): repair attempts by outcome
//!
//! Endpoint names are not used as labels; callers control them.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_counter!(
        "slack_proxy_requests_total",
        "Total number of calls forwarded to Slack"
    );
    describe_histogram!(
        "slack_proxy_request_duration_seconds",
        "Proxied request duration in seconds"
    );
    describe_counter!(
        "slack_proxy_errors_total",
        "Errors generated by the proxy itself"
    );
    describe_counter!(
        "slack_proxy_payload_repairs_total",
        "Malformed JSON repair attempts"
    );

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a completed proxied request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    counter!("slack_proxy_requests_total", &labels).increment(1);
    histogram!("slack_proxy_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record an error the proxy answered on its own.
pub fn record_error(kind: &'static str) {
    counter!("slack_proxy_errors_total", "kind" => kind).increment(1);
}

/// Record a repair attempt (`"repaired"` or `"failed"`).
pub fn record_repair(outcome: &'static str) {
    counter!("slack_proxy_payload_repairs_total", "outcome" => outcome).increment(1);
}
