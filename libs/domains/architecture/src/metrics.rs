//! Architecture designer metrics.
//!
//! Recording is a no-op until the host process installs a `metrics` recorder.

use metrics::{counter, describe_counter, describe_gauge, gauge};

/// Architecture metrics recorder
pub struct ArchitectureMetrics;

impl ArchitectureMetrics {
    /// Register metric descriptions with the installed recorder
    pub fn describe() {
        describe_counter!(
            "architecture_catalog_misses_total",
            "Service ids or region codes missing from the catalog, by kind"
        );
        describe_counter!(
            "architecture_exports_total",
            "Infrastructure-as-code documents produced, by format"
        );
        describe_counter!(
            "architecture_gateway_requests_total",
            "Persistence gateway calls by operation and outcome"
        );
        describe_gauge!(
            "architecture_estimated_monthly_cost",
            "Estimated monthly cost of the last saved architecture"
        );
    }

    /// A node or lookup referenced a service id or region code missing from the catalog
    pub fn record_catalog_miss(kind: &'static str) {
        counter!("architecture_catalog_misses_total", "kind" => kind).increment(1);
    }

    /// An infrastructure-as-code document was produced
    pub fn record_export(format: &str, resources: usize) {
        counter!("architecture_exports_total", "format" => format.to_string()).increment(1);

        tracing::debug!(format = format, resources = resources, "Exported architecture");
    }

    /// A persistence gateway call finished
    pub fn record_gateway_request(operation: &'static str, success: bool) {
        let outcome = if success { "success" } else { "error" };
        counter!(
            "architecture_gateway_requests_total",
            "operation" => operation,
            "outcome" => outcome
        )
        .increment(1);
    }

    /// Last total persisted with a snapshot
    pub fn set_estimated_monthly_cost(total: f64) {
        gauge!("architecture_estimated_monthly_cost").set(total);
    }
}
