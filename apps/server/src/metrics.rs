//! Prometheus exporter and HTTP request metrics.

use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

pub const HTTP_REQUESTS_TOTAL: &str = "ltp_http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "ltp_http_request_duration_seconds";

const DURATION_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Exporter configured with the request-duration buckets.
pub fn builder() -> Result<PrometheusBuilder, BuildError> {
    PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full(HTTP_REQUEST_DURATION_SECONDS.to_string()),
        DURATION_BUCKETS,
    )
}

/// Install the process-wide recorder. Returns `None` (metrics disabled) if
/// a recorder is already installed or the exporter cannot be built.
pub fn init_metrics() -> Option<PrometheusHandle> {
    match builder().and_then(PrometheusBuilder::install_recorder) {
        Ok(handle) => {
            describe();
            Some(handle)
        }
        Err(e) => {
            tracing::warn!("Metrics recorder not installed: {}", e);
            None
        }
    }
}

fn describe() {
    ltp_core::metrics::describe();
    describe_counter!(HTTP_REQUESTS_TOTAL, "HTTP requests by method, endpoint and status");
    describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        Unit::Seconds,
        "HTTP request latency by method and endpoint"
    );
}

pub fn record_request(method: &str, endpoint: &str, status: u16, elapsed: Duration) {
    counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string()
    )
    .record(elapsed.as_secs_f64());
}
