//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): relayed requests by method, status, upstream
//! - `relay_request_duration_seconds` (histogram): latency distribution
//!
//! Metric updates are atomic increments; recording is safe before the
//! exporter is installed (they become no-ops).

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(error) => {
            tracing::error!(address = %addr, error = %error, "Failed to install metrics exporter");
            return;
        }
    }

    metrics::describe_counter!(
        "relay_requests_total",
        "Total relayed requests by method, status and upstream"
    );
    metrics::describe_histogram!(
        "relay_request_duration_seconds",
        "Latency of relayed requests in seconds"
    );
}

/// Record one completed (or failed) relayed request.
pub fn record_request(method: &str, status: u16, upstream: &str, start_time: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("upstream", upstream.to_string()),
    ];
    metrics::counter!("relay_requests_total", &labels).increment(1);
    metrics::histogram!("relay_request_duration_seconds", &labels)
        .record(start_time.elapsed().as_secs_f64());
}
