//! Prometheus metrics.
//!
//! HTTP request metrics come from `axum-prometheus`; the service adds its own counters through
//! the `metrics` facade. Both are rendered from the same global recorder at `/internal/metrics`.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

use crate::errors::Error;

static PROMETHEUS: OnceLock<PrometheusHandle> = OnceLock::new();

/// Handle to the process-wide Prometheus recorder, installing it on first use.
///
/// Only one global recorder can exist per process, and routers may be built more than once
/// (tests do this constantly), so the handle is created exactly once.
pub fn prometheus_handle() -> PrometheusHandle {
    PROMETHEUS
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!("Prometheus recorder not installed, metrics will be empty: {}", e);
                PrometheusBuilder::new().build_recorder().handle()
            }
        })
        .clone()
}

/// Label value for an upload attempt.
pub fn upload_outcome<T>(result: &Result<T, Error>) -> &'static str {
    match result {
        Ok(_) => "accepted",
        Err(Error::BadRequest { .. }) => "rejected",
        Err(Error::PayloadTooLarge { .. }) => "too_large",
        Err(Error::TooManyRequests { .. }) => "throttled",
        Err(_) => "failed",
    }
}

pub fn record_upload(outcome: &'static str) {
    ::metrics::counter!("wardrobe_uploads_total", "outcome" => outcome).increment(1);
}

pub fn record_analysis(backend: &'static str) {
    ::metrics::counter!("wardrobe_analyses_total", "backend" => backend).increment(1);
}
