use std::collections::HashSet;

use crate::error::{ArchitectureError, ArchitectureResult};
use crate::metrics::ArchitectureMetrics;
use crate::models::RegionDefinition;

/// Border color used for regions missing from the catalog
pub const UNKNOWN_REGION_COLOR: &str = "#6B7280";

/// Read-only registry of deployment regions
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    regions: Vec<RegionDefinition>,
}

impl RegionCatalog {
    /// Build a catalog, rejecting duplicate codes and non-positive multipliers
    pub fn new(regions: Vec<RegionDefinition>) -> ArchitectureResult<Self> {
        let mut seen = HashSet::new();
        for region in &regions {
            if !seen.insert(region.code.as_str()) {
                return Err(ArchitectureError::InvalidCatalog(format!(
                    "duplicate region code '{}'",
                    region.code
                )));
            }
            if !(region.price_multiplier > 0.0 && region.price_multiplier.is_finite()) {
                return Err(ArchitectureError::InvalidCatalog(format!(
                    "region '{}' has invalid price multiplier {}",
                    region.code, region.price_multiplier
                )));
            }
        }

        Ok(Self { regions })
    }

    /// The built-in AWS region catalog
    pub fn aws() -> Self {
        Self {
            regions: aws_regions(),
        }
    }

    pub fn get(&self, code: &str) -> Option<&RegionDefinition> {
        self.regions.iter().find(|r| r.code == code)
    }

    pub fn regions(&self) -> &[RegionDefinition] {
        &self.regions
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Price multiplier of a region; unknown regions are priced as-is (1.0)
    pub fn price_multiplier(&self, code: &str) -> f64 {
        match self.get(code) {
            Some(region) => region.price_multiplier,
            None => {
                tracing::warn!(region = code, "Unknown region code, applying no price adjustment");
                ArchitectureMetrics::record_catalog_miss("region");
                1.0
            }
        }
    }

    /// Display name of a region, falling back to the code itself
    pub fn name<'a>(&'a self, code: &'a str) -> &'a str {
        self.get(code).map(|r| r.name.as_str()).unwrap_or(code)
    }

    pub fn color(&self, code: &str) -> &str {
        self.get(code)
            .map(|r| r.color.as_str())
            .unwrap_or(UNKNOWN_REGION_COLOR)
    }

    /// Availability zones of a region; empty for unknown regions
    pub fn availability_zones(&self, code: &str) -> &[String] {
        self.get(code)
            .map(|r| r.availability_zones.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for RegionCatalog {
    fn default() -> Self {
        Self::aws()
    }
}

fn zones(code: &str, count: usize) -> Vec<String> {
    ('a'..='z')
        .take(count)
        .map(|letter| format!("{code}{letter}"))
        .collect()
}

fn region(code: &str, name: &str, price_multiplier: f64, zone_count: usize, color: &str) -> RegionDefinition {
    RegionDefinition {
        code: code.to_string(),
        name: name.to_string(),
        price_multiplier,
        availability_zones: zones(code, zone_count),
        color: color.to_string(),
    }
}

/// Built-in AWS regions, priced relative to us-east-1
pub fn aws_regions() -> Vec<RegionDefinition> {
    vec![
        region("us-east-1", "US East (N. Virginia)", 1.00, 6, "#3B82F6"),
        region("us-east-2", "US East (Ohio)", 1.00, 3, "#60A5FA"),
        region("us-west-1", "US West (N. California)", 1.12, 2, "#10B981"),
        region("us-west-2", "US West (Oregon)", 1.00, 4, "#34D399"),
        region("ca-central-1", "Canada (Central)", 1.05, 3, "#F59E0B"),
        region("eu-west-1", "Europe (Ireland)", 1.10, 3, "#8B5CF6"),
        region("eu-west-2", "Europe (London)", 1.13, 3, "#A78BFA"),
        region("eu-central-1", "Europe (Frankfurt)", 1.15, 3, "#EC4899"),
        region("ap-south-1", "Asia Pacific (Mumbai)", 0.92, 3, "#F97316"),
        region("ap-southeast-1", "Asia Pacific (Singapore)", 1.20, 3, "#EF4444"),
        region("ap-northeast-1", "Asia Pacific (Tokyo)", 1.25, 3, "#DC2626"),
        region("sa-east-1", "South America (São Paulo)", 1.50, 3, "#14B8A6"),
    ]
}
