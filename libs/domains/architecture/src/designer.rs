//! Designer session state.
//!
//! A [`Designer`] owns the architecture being edited, the identity it was saved
//! under and the default region for new nodes. Costs are recomputed from the
//! current state on every query.

use std::sync::Arc;

use crate::architecture::Architecture;
use crate::calculator::CostCalculator;
use crate::catalog::{RegionCatalog, ServiceCatalog};
use crate::export::{self, ExportFormat};
use crate::metrics::ArchitectureMetrics;
use crate::models::{
    ArchitectureMeta, ConfigValue, CostBreakdown, DEFAULT_REGION, NodeCost, Position, RegionCost,
    ServiceNode,
};
use crate::snapshot::{
    CreateArchitecture, SaveRequest, SavedArchitecture, SnapshotEdge, SnapshotNode,
    architecture_from_snapshot, format_cost, snapshot_edges, snapshot_nodes,
};

/// Name used in exported documents for architectures that were never saved
pub const UNNAMED_ARCHITECTURE: &str = "My Architecture";

/// Outcome of [`Designer::update_node_config`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigUpdate {
    /// Value stored for a declared option
    Applied,
    /// Value stored, but the node's service declares no such option
    AppliedUndeclared,
    /// No node with that id; nothing changed
    NodeNotFound,
}

/// Architecture designer session
#[derive(Debug, Clone)]
pub struct Designer {
    services: Arc<ServiceCatalog>,
    calculator: CostCalculator,
    architecture: Architecture,
    meta: Option<ArchitectureMeta>,
    default_region: String,
}

impl Designer {
    pub fn new(services: Arc<ServiceCatalog>, calculator: CostCalculator) -> Self {
        Self {
            services,
            calculator,
            architecture: Architecture::new(),
            meta: None,
            default_region: DEFAULT_REGION.to_string(),
        }
    }

    pub fn services(&self) -> &ServiceCatalog {
        &self.services
    }

    pub fn regions(&self) -> &RegionCatalog {
        self.calculator.regions()
    }

    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    /// Saved identity, `None` until the architecture has been saved or loaded
    pub fn meta(&self) -> Option<&ArchitectureMeta> {
        self.meta.as_ref()
    }

    pub fn default_region(&self) -> &str {
        &self.default_region
    }

    /// Region given to nodes added without an explicit one
    pub fn set_default_region(&mut self, region: &str) {
        if !self.regions().contains(region) {
            tracing::warn!(region = region, "Default region is not in the region catalog");
        }
        self.default_region = region.to_string();
    }

    pub fn node(&self, node_id: &str) -> Option<&ServiceNode> {
        self.architecture.node(node_id)
    }

    /// Place a catalog service; `None` region means the default region
    ///
    /// Returns `None` when the service id is not in the catalog.
    pub fn add_node(&mut self, service_id: &str, region: Option<&str>) -> Option<&ServiceNode> {
        let services = Arc::clone(&self.services);
        let Some(service) = services.get(service_id) else {
            tracing::warn!(service_id = service_id, "Cannot place unknown service");
            ArchitectureMetrics::record_catalog_miss("service");
            return None;
        };

        let region = region
            .map(str::to_string)
            .unwrap_or_else(|| self.default_region.clone());
        Some(self.architecture.add_node(service, &region))
    }

    pub fn remove_node(&mut self, node_id: &str) -> Option<ServiceNode> {
        self.architecture.remove_node(node_id)
    }

    /// Replace one config entry
    ///
    /// Option ids the service does not declare are stored anyway and reported
    /// as [`ConfigUpdate::AppliedUndeclared`]; the calculator ignores them.
    pub fn update_node_config(
        &mut self,
        node_id: &str,
        option_id: &str,
        value: impl Into<ConfigValue>,
    ) -> ConfigUpdate {
        let Some(node) = self.architecture.node(node_id) else {
            return ConfigUpdate::NodeNotFound;
        };
        let declared = self
            .services
            .get(&node.service_id)
            .and_then(|service| service.option(option_id))
            .is_some();

        self.architecture.set_config(node_id, option_id, value.into());

        if declared {
            ConfigUpdate::Applied
        } else {
            tracing::warn!(
                node_id = node_id,
                option = option_id,
                "Stored config value for undeclared option"
            );
            ConfigUpdate::AppliedUndeclared
        }
    }

    /// Move a node to another region and optionally pin a zone; other nodes are untouched
    pub fn update_node_region(&mut self, node_id: &str, region: &str, zone: Option<&str>) -> bool {
        let regions = self.calculator.regions();
        if !regions.contains(region) {
            tracing::warn!(node_id = node_id, region = region, "Node moved to unknown region");
        } else if let Some(zone) = zone {
            if !regions.availability_zones(region).iter().any(|z| z == zone) {
                tracing::warn!(
                    node_id = node_id,
                    region = region,
                    zone = zone,
                    "Availability zone does not belong to region"
                );
            }
        }

        self.architecture.set_region(node_id, region, zone)
    }

    pub fn move_node(&mut self, node_id: &str, position: Position) -> bool {
        self.architecture.move_node(node_id, position)
    }

    pub fn rename_node(&mut self, node_id: &str, label: &str) -> bool {
        self.architecture.rename_node(node_id, label)
    }

    pub fn connect(&mut self, source: &str, target: &str) -> bool {
        self.architecture.connect(source, target)
    }

    pub fn disconnect(&mut self, source: &str, target: &str) -> bool {
        self.architecture.disconnect(source, target)
    }

    pub fn remove_edge(&mut self, edge_id: &str) -> bool {
        self.architecture.remove_edge(edge_id)
    }

    /// Remove every node and edge, keeping the saved identity
    pub fn clear(&mut self) {
        self.architecture.clear();
    }

    /// Start over: empty canvas and no saved identity
    pub fn new_architecture(&mut self) {
        self.architecture.clear();
        self.meta = None;
    }

    /// Monthly cost of one node; `None` if the node does not exist
    pub fn node_cost(&self, node_id: &str) -> Option<f64> {
        self.architecture.node(node_id).map(|node| self.cost_of(node))
    }

    fn cost_of(&self, node: &ServiceNode) -> f64 {
        match self.services.get(&node.service_id) {
            Some(service) => self.calculator.cost(service, &node.config, &node.region),
            None => {
                tracing::warn!(
                    node_id = %node.id,
                    service_id = %node.service_id,
                    "Node references a service missing from the catalog, costing it at 0"
                );
                ArchitectureMetrics::record_catalog_miss("service");
                0.0
            }
        }
    }

    pub fn total_cost(&self) -> f64 {
        self.architecture
            .nodes()
            .iter()
            .map(|node| self.cost_of(node))
            .sum()
    }

    /// Totals per region, in order of first use
    pub fn cost_by_region(&self) -> Vec<RegionCost> {
        self.cost_breakdown().by_region
    }

    pub fn used_regions(&self) -> Vec<&str> {
        self.architecture.used_regions()
    }

    pub fn cost_breakdown(&self) -> CostBreakdown {
        let nodes: Vec<NodeCost> = self
            .architecture
            .nodes()
            .iter()
            .map(|node| NodeCost {
                node_id: node.id.clone(),
                service_id: node.service_id.clone(),
                label: node.label.clone(),
                region: node.region.clone(),
                monthly_cost: self.cost_of(node),
            })
            .collect();

        let total: f64 = nodes.iter().map(|n| n.monthly_cost).sum();

        let by_region = self
            .architecture
            .used_regions()
            .into_iter()
            .map(|region| {
                let monthly_cost: f64 = nodes
                    .iter()
                    .filter(|n| n.region == region)
                    .map(|n| n.monthly_cost)
                    .sum();
                let share_percent = if total > 0.0 {
                    monthly_cost / total * 100.0
                } else {
                    0.0
                };
                RegionCost {
                    region: region.to_string(),
                    region_name: self.regions().name(region).to_string(),
                    monthly_cost,
                    share_percent,
                }
            })
            .collect();

        CostBreakdown {
            nodes,
            by_region,
            total,
        }
    }

    /// Capture the current state for saving
    ///
    /// The request is owned: edits made while it is in flight are not part of
    /// it, and the designer is untouched until [`Designer::apply_saved`].
    pub fn save_request(&self, name: &str, description: Option<&str>) -> SaveRequest {
        SaveRequest {
            id: self.meta.as_ref().map(|meta| meta.id),
            payload: CreateArchitecture {
                name: name.trim().to_string(),
                description: description
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string),
                nodes: snapshot_nodes(&self.architecture),
                edges: snapshot_edges(&self.architecture),
                estimated_monthly_cost: Some(format_cost(self.total_cost())),
                is_public: self.meta.as_ref().is_some_and(|meta| meta.is_public),
            },
        }
    }

    /// Adopt the identity of a successful save; nodes and edges are left as they are
    pub fn apply_saved(&mut self, saved: &SavedArchitecture) {
        self.meta = Some(meta_of(saved));
    }

    /// Replace the current architecture with a saved one, keeping node ids
    pub fn load(&mut self, saved: SavedArchitecture) {
        let meta = meta_of(&saved);
        self.architecture = architecture_from_snapshot(saved.nodes, saved.edges);
        tracing::info!(
            architecture_id = %meta.id,
            nodes = self.architecture.nodes().len(),
            edges = self.architecture.edges().len(),
            "Loaded architecture"
        );
        self.meta = Some(meta);
    }

    /// Replace nodes and edges with stored ones, keeping the saved identity
    pub fn import(&mut self, nodes: Vec<SnapshotNode>, edges: Vec<SnapshotEdge>) {
        self.architecture = architecture_from_snapshot(nodes, edges);
        tracing::debug!(
            nodes = self.architecture.nodes().len(),
            edges = self.architecture.edges().len(),
            "Imported architecture"
        );
    }

    /// Export the current architecture
    pub fn export(&self, format: ExportFormat) -> String {
        let name = self
            .meta
            .as_ref()
            .map(|meta| meta.name.as_str())
            .unwrap_or(UNNAMED_ARCHITECTURE);
        export::export(
            format,
            self.architecture.nodes(),
            self.architecture.edges(),
            name,
        )
    }

    pub fn export_file_name(&self, format: ExportFormat) -> String {
        format.file_name(self.meta.as_ref().map(|meta| meta.name.as_str()))
    }
}

impl Default for Designer {
    fn default() -> Self {
        Self::new(Arc::new(ServiceCatalog::aws()), CostCalculator::default())
    }
}

fn meta_of(saved: &SavedArchitecture) -> ArchitectureMeta {
    ArchitectureMeta {
        id: saved.id,
        name: saved.name.clone(),
        description: saved.description.clone(),
        is_public: saved.is_public,
    }
}
