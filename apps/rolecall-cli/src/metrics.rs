//! Prometheus export for `rolecall run --metrics`.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::error::CliError;

/// Install the Prometheus recorder and return a handle for rendering.
///
/// Must be called once, before the engine records anything.
pub fn init_metrics() -> Result<PrometheusHandle, CliError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| CliError::Metrics(e.to_string()))?;

    rolecall_engine::metrics::describe_metrics();
    Ok(handle)
}
