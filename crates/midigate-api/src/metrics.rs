//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "midigate_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "midigate_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "midigate_http_requests_in_flight";

    // Relay metrics
    pub const RELAY_REQUESTS_TOTAL: &str = "midigate_relay_requests_total";
    pub const RELAY_DURATION_SECONDS: &str = "midigate_relay_duration_seconds";
    pub const UPLOAD_BYTES: &str = "midigate_upload_bytes";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record one forwarded upload and the upstream status it ended with.
pub fn record_relay(endpoint: &str, upstream_status: u16, duration_secs: f64) {
    let labels = [
        ("endpoint", endpoint.to_string()),
        ("upstream_status", upstream_status.to_string()),
    ];
    counter!(names::RELAY_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::RELAY_DURATION_SECONDS, &labels).record(duration_secs);
}

pub fn record_upload_bytes(bytes: u64) {
    histogram!(names::UPLOAD_BYTES).record(bytes as f64);
}

/// Route label for a request. Unrouted paths collapse into one label so
/// arbitrary URLs cannot blow up label cardinality.
fn route_label(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string())
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = route_label(&request);
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
