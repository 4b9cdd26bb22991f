//! Prometheus metrics for idstore

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::Result;
use crate::error::Error;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static START_TIME: OnceLock<Instant> = OnceLock::new();

const METRIC_UPTIME: &str = "idstore_uptime_seconds";
const METRIC_INFO: &str = "idstore_info";

// Validation metrics
const METRIC_VALIDATIONS: &str = "idstore_validations_total";

// Load metrics
const METRIC_LOADS: &str = "idstore_loads_total";
const METRIC_LOAD_DURATION: &str = "idstore_load_duration_seconds";

// Snapshot metrics
const METRIC_SNAPSHOT_CALLERS: &str = "idstore_snapshot_callers";
const METRIC_SNAPSHOT_GROUPS: &str = "idstore_snapshot_groups";
const METRIC_SNAPSHOT_ROLES: &str = "idstore_snapshot_roles";

/// Initialize Prometheus metrics recorder.
pub fn init_metrics() -> Result<()> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| Error::Config(format!("Failed to install metrics recorder: {e}")))?;

    PROMETHEUS_HANDLE.set(handle).ok();
    START_TIME.set(Instant::now()).ok();

    register_metrics();
    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

fn register_metrics() {
    describe_gauge!(METRIC_UPTIME, "Process uptime in seconds");
    describe_gauge!(METRIC_INFO, "Build information (always 1)");

    describe_counter!(METRIC_VALIDATIONS, "Credential validations by status");

    describe_counter!(METRIC_LOADS, "Identity loads by outcome");
    describe_histogram!(METRIC_LOAD_DURATION, "Identity load duration in seconds");

    describe_gauge!(METRIC_SNAPSHOT_CALLERS, "Callers in the active snapshot");
    describe_gauge!(METRIC_SNAPSHOT_GROUPS, "Groups in the active snapshot");
    describe_gauge!(METRIC_SNAPSHOT_ROLES, "Roles in the active snapshot");

    gauge!(
        METRIC_INFO,
        "version" => env!("CARGO_PKG_VERSION"),
    )
    .set(1.0);
}

/// Render metrics in Prometheus text format.
#[must_use]
pub fn render_metrics() -> String {
    if let Some(start) = START_TIME.get() {
        gauge!(METRIC_UPTIME).set(start.elapsed().as_secs_f64());
    }

    PROMETHEUS_HANDLE
        .get()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

/// Record a credential validation outcome.
pub fn record_validation(status: &str) {
    counter!(METRIC_VALIDATIONS, "status" => status.to_owned()).increment(1);
}

/// Record a load attempt.
pub fn record_reload(success: bool, duration: Duration) {
    let outcome = if success { "success" } else { "error" };

    counter!(METRIC_LOADS, "outcome" => outcome).increment(1);
    histogram!(METRIC_LOAD_DURATION, "outcome" => outcome).record(duration.as_secs_f64());
}

/// Update snapshot size gauges.
#[allow(clippy::cast_precision_loss)]
pub fn set_snapshot_size(callers: usize, groups: usize, roles: usize) {
    gauge!(METRIC_SNAPSHOT_CALLERS).set(callers as f64);
    gauge!(METRIC_SNAPSHOT_GROUPS).set(groups as f64);
    gauge!(METRIC_SNAPSHOT_ROLES).set(roles as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_without_recorder_is_noop() {
        record_validation("valid");
        record_reload(true, Duration::from_millis(5));
        record_reload(false, Duration::from_millis(5));
        set_snapshot_size(3, 2, 1);
    }

    #[test]
    fn test_render_before_init_is_empty_or_text() {
        let rendered = render_metrics();
        assert!(rendered.is_empty() || rendered.contains("idstore_"));
    }
}
