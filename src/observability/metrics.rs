//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, route
//! - `gateway_request_duration_seconds` (histogram): time to response head
//! - `gateway_open_api_cycles_total` (counter): finished aggregation cycles
//! - `gateway_open_api_fetch_failures_total` (counter): failed source fetches
//!
//! Recording is a no-op until [`init_metrics`] installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a dispatched request. `route` is `"none"` for unrouted requests.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let status = status.to_string();
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.clone(),
        "route" => route.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "gateway_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status,
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a finished aggregation cycle.
pub fn record_open_api_cycle(succeeded: usize, failed: usize, start: Instant) {
    metrics::counter!("gateway_open_api_cycles_total").increment(1);
    metrics::counter!("gateway_open_api_fetch_failures_total").increment(failed as u64);
    metrics::histogram!("gateway_open_api_cycle_duration_seconds").record(start.elapsed().as_secs_f64());
    tracing::trace!(succeeded, failed, "OpenAPI cycle recorded");
}
