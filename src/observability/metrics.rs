//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_selector_decisions_total` (counter): by `outcome` and `source`
//! - `proxy_selector_pattern_compile_failures_total` (counter)
//! - `proxy_selector_pattern_cache_entries` (gauge)
//! - `proxy_selector_snapshot_reloads_total` (counter): by `result`

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::routing::decision::Evaluation;
use crate::routing::profile::ProxyInfo;

/// Install the Prometheus exporter with its own HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_decision(evaluation: &Evaluation, proxy: &ProxyInfo) {
    metrics::counter!(
        "proxy_selector_decisions_total",
        "outcome" => proxy.proxy_type.label(),
        "source" => evaluation.source.label()
    )
    .increment(1);
}

pub fn record_pattern_compile_failure() {
    metrics::counter!("proxy_selector_pattern_compile_failures_total").increment(1);
}

pub fn record_pattern_cache_size(entries: usize) {
    metrics::gauge!("proxy_selector_pattern_cache_entries").set(entries as f64);
}

pub fn record_snapshot_reload(success: bool) {
    let result = if success { "success" } else { "failure" };
    metrics::counter!("proxy_selector_snapshot_reloads_total", "result" => result).increment(1);
}
