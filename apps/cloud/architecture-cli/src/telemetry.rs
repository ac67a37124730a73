//! Prometheus metrics for a single CLI run.
//!
//! The recorder is installed once per process. When `METRICS_FILE` is set the
//! rendered metrics are written there on exit, in the text format the
//! node_exporter textfile collector reads.

use std::fs;
use std::path::Path;

use domain_architecture::ArchitectureMetrics;
use eyre::{Result, WrapErr};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder; later calls return the same handle
///
/// Returns `None` when another recorder is already installed.
pub fn init_metrics() -> Option<&'static PrometheusHandle> {
    let handle = METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;
        ArchitectureMetrics::describe();
        info!("Prometheus metrics recorder initialized");
        Ok::<_, BuildError>(handle)
    });

    match handle {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Metrics recorder not installed");
            None
        }
    }
}

/// Write the current metrics to `path`
pub fn write_metrics(handle: &PrometheusHandle, path: &Path) -> Result<()> {
    fs::write(path, handle.render())
        .wrap_err_with(|| format!("Failed to write metrics to {}", path.display()))
}
