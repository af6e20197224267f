//! Prometheus metrics

use climate_storage::METRIC_STORE_QUERIES;
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// HTTP requests served, labelled by route
pub const METRIC_HTTP_REQUESTS: &str = "climate_http_requests_total";

/// Install the global Prometheus recorder and register metric descriptions.
/// Call once at startup.
pub fn install_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_counter!(METRIC_HTTP_REQUESTS, "HTTP requests served by route");
    describe_counter!(METRIC_STORE_QUERIES, "Observation store queries by operation");

    Ok(handle)
}

/// Count one request against `route`
pub fn record_request(route: &'static str) {
    counter!(METRIC_HTTP_REQUESTS, "route" => route).increment(1);
}
