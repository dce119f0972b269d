// server/metrics.rs

//! Prometheus metrics of the server, exposed on their own port.

use std::sync::OnceLock;

use axum::extract::State;
use axum::{routing::get, Router};
use log::*;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub const METRICS_PATH: &str = "/metrics";

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the process-wide Prometheus recorder on first call and returns
/// the handle rendering it.
pub fn recorder_handle() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if let Err(e) = metrics::set_global_recorder(recorder) {
                warn!("Metrics recorder not installed: {}", e);
            }
            handle
        })
        .clone()
}

/// Router of the metrics service.
pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new()
        .route(METRICS_PATH, get(render_metrics))
        .with_state(handle)
}

async fn render_metrics(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}

/// Counts one served request and records its latency.
pub(crate) fn record_request(method: &str, path: &str, status: u16, seconds: f64) {
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("http_request_duration_seconds", "path" => path.to_string())
        .record(seconds);
}
