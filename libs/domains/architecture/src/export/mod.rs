//! Infrastructure-as-code export.
//!
//! Both exporters are pure and deterministic: the same nodes, edges and name
//! always produce byte-identical output, ordered by node insertion order.

pub mod cloudformation;
pub mod mapping;
pub mod terraform;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::metrics::ArchitectureMetrics;
use crate::models::{Connection, ServiceNode};

pub use cloudformation::to_cloudformation;
pub use mapping::{ResourceMapping, resource_mapping};
pub use terraform::to_terraform;

/// File base name used when an architecture has no name
pub const FALLBACK_FILE_NAME: &str = "architecture";

/// Supported export document formats
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    #[strum(to_string = "cloudformation", serialize = "cfn")]
    CloudFormation,
    #[strum(to_string = "terraform", serialize = "tf")]
    Terraform,
}

impl ExportFormat {
    /// Download file name for an architecture name
    pub fn file_name(&self, name: Option<&str>) -> String {
        let base = name
            .map(|n| n.trim().replace(['/', '\\'], "-"))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());

        match self {
            Self::CloudFormation => format!("{base}-cloudformation.json"),
            Self::Terraform => format!("{base}.tf"),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::CloudFormation => "application/json",
            Self::Terraform => "text/plain",
        }
    }
}

/// Render nodes and edges in the given format
pub fn export(format: ExportFormat, nodes: &[ServiceNode], edges: &[Connection], name: &str) -> String {
    let document = match format {
        ExportFormat::CloudFormation => to_cloudformation(nodes, edges, name),
        ExportFormat::Terraform => to_terraform(nodes, edges, name),
    };

    ArchitectureMetrics::record_export(&format.to_string(), nodes.len());
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_format_parsing() {
        assert_eq!(ExportFormat::from_str("cloudformation").unwrap(), ExportFormat::CloudFormation);
        assert_eq!(ExportFormat::from_str("CFN").unwrap(), ExportFormat::CloudFormation);
        assert_eq!(ExportFormat::from_str("tf").unwrap(), ExportFormat::Terraform);
        assert!(ExportFormat::from_str("pulumi").is_err());
        assert_eq!(ExportFormat::Terraform.to_string(), "terraform");
        assert_eq!(ExportFormat::CloudFormation.to_string(), "cloudformation");
    }

    #[test]
    fn test_file_names() {
        assert_eq!(
            ExportFormat::CloudFormation.file_name(Some("Web Tier")),
            "Web Tier-cloudformation.json"
        );
        assert_eq!(ExportFormat::Terraform.file_name(Some("Web Tier")), "Web Tier.tf");
        assert_eq!(ExportFormat::Terraform.file_name(None), "architecture.tf");
        assert_eq!(
            ExportFormat::CloudFormation.file_name(Some("  ")),
            "architecture-cloudformation.json"
        );
        assert_eq!(ExportFormat::Terraform.file_name(Some("prod/eu")), "prod-eu.tf");
    }

    #[test]
    fn test_export_dispatches_on_format() {
        let cfn = export(ExportFormat::CloudFormation, &[], &[], "Empty");
        assert!(cfn.contains("\"Resources\": {}"));
        let tf = export(ExportFormat::Terraform, &[], &[], "Empty");
        assert!(tf.starts_with("# Terraform configuration for Empty"));
    }
}
