//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): dispatched requests by route, status
//! - `router_dispatch_duration_seconds` (histogram): dispatch latency by route
//! - `router_error_routes_total` (counter): error routes rendered by code

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_dispatch(route: &str, status: u16, start: Instant) {
    let route = route.to_string();
    metrics::counter!(
        "router_requests_total",
        "route" => route.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("router_dispatch_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_error_route(code: u16) {
    metrics::counter!("router_error_routes_total", "code" => code.to_string()).increment(1);
}
