//! Metrics implementation using Prometheus.

use agent_skills_core::{Error, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize Prometheus recorder and return the handle.
///
/// Without an installed recorder the `track_*` helpers are no-ops.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| Error::internal(format!("Failed to install Prometheus recorder: {}", e)))?;

    tracing::info!("Prometheus metrics recorder initialized");
    Ok(handle)
}

/// Track one budget check. `outcome` is `allowed`, `denied` or an error code.
pub fn track_budget_check(outcome: &str, currency: &str, latency_sec: f64) {
    metrics::counter!(
        "budget_checks_total",
        "outcome" => outcome.to_string(),
        "currency" => currency.to_string()
    )
    .increment(1);

    metrics::histogram!("budget_oracle_latency_seconds").record(latency_sec);
}

/// Track one MCP resource read. `status` is `ok` or an error code.
pub fn track_resource_read(server: &str, status: &str, latency_sec: f64) {
    metrics::counter!(
        "mcp_resource_reads_total",
        "server" => server.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "mcp_resource_read_duration_seconds",
        "server" => server.to_string()
    )
    .record(latency_sec);
}
