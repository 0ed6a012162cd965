//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, group
//! - `gateway_request_duration_seconds` (histogram): latency by method, group
//! - `gateway_unmatched_requests_total` (counter): paths with no mount
//! - `gateway_upstream_health` (gauge): 1=healthy, 0=unhealthy

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, group: &str, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "group" => group.to_string()
    )
    .increment(1);

    histogram!(
        "gateway_request_duration_seconds",
        "method" => method.to_string(),
        "group" => group.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_unmatched() {
    counter!("gateway_unmatched_requests_total").increment(1);
}

pub fn record_upstream_health(upstream: &str, healthy: bool) {
    gauge!("gateway_upstream_health", "upstream" => upstream.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
