//! In-memory architecture graph.
//!
//! Every mutation keeps the edge set consistent with the node set: an edge
//! never outlives either of its endpoints.

use chrono::Utc;
use std::collections::HashSet;

use crate::models::{
    CanvasFields, ConfigValue, Connection, Position, ServiceDefinition, ServiceNode,
};

const LAYOUT_ORIGIN: Position = Position { x: 250.0, y: 100.0 };
const LAYOUT_STEP: f64 = 40.0;

/// Nodes and edges of one architecture, in insertion order
#[derive(Debug, Clone, Default)]
pub struct Architecture {
    nodes: Vec<ServiceNode>,
    edges: Vec<Connection>,
    /// Last timestamp handed out for a node id
    last_stamp: i64,
}

impl Architecture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an architecture from stored parts, keeping node ids as they are
    ///
    /// Duplicate node ids keep their first occurrence; edges that dangle or
    /// repeat an existing source/target pair are dropped. Edges with a missing
    /// or already used id get a fresh one.
    pub fn from_parts(nodes: Vec<ServiceNode>, edges: Vec<Connection>) -> Self {
        let mut architecture = Self::new();

        for node in nodes {
            if architecture.contains_node(&node.id) {
                tracing::warn!(node_id = %node.id, "Dropping duplicate node id");
                continue;
            }
            architecture.nodes.push(node);
        }

        for edge in edges {
            if !architecture.contains_node(&edge.source) || !architecture.contains_node(&edge.target) {
                tracing::warn!(
                    edge_id = %edge.id,
                    source = %edge.source,
                    target = %edge.target,
                    "Dropping edge with missing endpoint"
                );
                continue;
            }
            if architecture.has_edge(&edge.source, &edge.target) {
                tracing::warn!(edge_id = %edge.id, "Dropping parallel edge");
                continue;
            }

            let mut edge = edge;
            if edge.id.is_empty() || architecture.contains_edge(&edge.id) {
                let id = architecture.next_edge_id(&edge.source, &edge.target);
                if !edge.id.is_empty() {
                    tracing::warn!(edge_id = %edge.id, new_id = %id, "Renaming duplicate edge id");
                }
                edge.id = id;
            }
            architecture.edges.push(edge);
        }

        architecture
    }

    pub fn nodes(&self) -> &[ServiceNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Connection] {
        &self.edges
    }

    pub fn node(&self, node_id: &str) -> Option<&ServiceNode> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    pub fn contains_node(&self, node_id: &str) -> bool {
        self.node(node_id).is_some()
    }

    pub fn edge(&self, edge_id: &str) -> Option<&Connection> {
        self.edges.iter().find(|e| e.id == edge_id)
    }

    pub fn contains_edge(&self, edge_id: &str) -> bool {
        self.edge(edge_id).is_some()
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.source == source && e.target == target)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Place a service at the next cascade position
    pub fn add_node(&mut self, service: &ServiceDefinition, region: &str) -> &ServiceNode {
        let slot = self.nodes.len();
        let position = Position::new(
            LAYOUT_ORIGIN.x + (slot % 5) as f64 * LAYOUT_STEP,
            LAYOUT_ORIGIN.y + (slot % 5) as f64 * LAYOUT_STEP + (slot / 5) as f64 * LAYOUT_STEP * 2.0,
        );
        self.add_node_at(service, region, position)
    }

    /// Place a service at an explicit position
    pub fn add_node_at(
        &mut self,
        service: &ServiceDefinition,
        region: &str,
        position: Position,
    ) -> &ServiceNode {
        let id = self.next_node_id(&service.id);
        tracing::debug!(node_id = %id, service_id = %service.id, region = region, "Adding node");

        let index = self.nodes.len();
        self.nodes.push(ServiceNode {
            id,
            service_id: service.id.clone(),
            label: service.name.clone(),
            config: service.default_config(),
            region: region.to_string(),
            availability_zone: None,
            position,
            canvas: CanvasFields::new(),
            canvas_data: CanvasFields::new(),
        });
        &self.nodes[index]
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&mut self, node_id: &str) -> Option<ServiceNode> {
        let index = self.nodes.iter().position(|n| n.id == node_id)?;
        let node = self.nodes.remove(index);

        let before = self.edges.len();
        self.edges.retain(|e| !e.touches(node_id));
        tracing::debug!(
            node_id = node_id,
            edges_removed = before - self.edges.len(),
            "Removed node"
        );

        Some(node)
    }

    /// Replace one config entry; returns false when the node does not exist
    pub fn set_config(&mut self, node_id: &str, option_id: &str, value: ConfigValue) -> bool {
        match self.node_mut(node_id) {
            Some(node) => {
                node.config.insert(option_id.to_string(), value);
                true
            }
            None => false,
        }
    }

    /// Move a node to another region (and optionally pin a zone)
    pub fn set_region(&mut self, node_id: &str, region: &str, zone: Option<&str>) -> bool {
        match self.node_mut(node_id) {
            Some(node) => {
                node.region = region.to_string();
                node.availability_zone = zone.map(str::to_string);
                true
            }
            None => false,
        }
    }

    pub fn move_node(&mut self, node_id: &str, position: Position) -> bool {
        match self.node_mut(node_id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    pub fn rename_node(&mut self, node_id: &str, label: &str) -> bool {
        match self.node_mut(node_id) {
            Some(node) => {
                node.label = label.to_string();
                true
            }
            None => false,
        }
    }

    /// Connect two existing nodes; self-loops are allowed, parallel edges are not
    pub fn connect(&mut self, source: &str, target: &str) -> bool {
        if !self.contains_node(source) || !self.contains_node(target) {
            return false;
        }
        if self.has_edge(source, target) {
            return false;
        }

        let mut edge = Connection::new(source, target);
        edge.id = self.next_edge_id(source, target);
        self.edges.push(edge);
        true
    }

    /// Remove the edge from `source` to `target`
    pub fn disconnect(&mut self, source: &str, target: &str) -> bool {
        let before = self.edges.len();
        self.edges
            .retain(|e| !(e.source == source && e.target == target));
        before != self.edges.len()
    }

    pub fn remove_edge(&mut self, edge_id: &str) -> bool {
        match self.edges.iter().position(|e| e.id == edge_id) {
            Some(index) => {
                self.edges.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    /// Distinct node regions in order of first use
    pub fn used_regions(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.nodes
            .iter()
            .map(|n| n.region.as_str())
            .filter(|region| seen.insert(*region))
            .collect()
    }

    fn node_mut(&mut self, node_id: &str) -> Option<&mut ServiceNode> {
        self.nodes.iter_mut().find(|n| n.id == node_id)
    }

    /// `edge-<source>-<target>`, suffixed until unique within this architecture
    fn next_edge_id(&self, source: &str, target: &str) -> String {
        let base = Connection::new(source, target).id;
        let mut id = base.clone();
        let mut suffix = 2;
        while self.contains_edge(&id) {
            id = format!("{base}-{suffix}");
            suffix += 1;
        }
        id
    }

    /// `<service>-<millis>`, bumped until unique within this architecture
    fn next_node_id(&mut self, service_id: &str) -> String {
        let mut stamp = Utc::now().timestamp_millis().max(self.last_stamp + 1);
        loop {
            let id = format!("{service_id}-{stamp}");
            if !self.contains_node(&id) {
                self.last_stamp = stamp;
                return id;
            }
            stamp += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ServiceCatalog;

    fn ec2() -> ServiceDefinition {
        ServiceCatalog::aws().get("ec2").cloned().unwrap()
    }

    fn assert_no_dangling_edges(architecture: &Architecture) {
        for edge in architecture.edges() {
            assert!(architecture.contains_node(&edge.source), "dangling source {}", edge.source);
            assert!(architecture.contains_node(&edge.target), "dangling target {}", edge.target);
        }
    }

    #[test]
    fn test_add_node_seeds_defaults() {
        let mut architecture = Architecture::new();
        let node = architecture.add_node(&ec2(), "eu-west-1").clone();

        assert!(node.id.starts_with("ec2-"));
        assert_eq!(node.service_id, "ec2");
        assert_eq!(node.label, "Amazon EC2");
        assert_eq!(node.region, "eu-west-1");
        assert_eq!(node.availability_zone, None);
        assert_eq!(node.config.get("instanceCount"), Some(&ConfigValue::Number(1.0)));
        assert_eq!(node.config.get("instanceType"), Some(&ConfigValue::from("t3.medium")));
    }

    #[test]
    fn test_repeated_placements_get_unique_ids() {
        let mut architecture = Architecture::new();
        let service = ec2();
        let ids: HashSet<String> = (0..50)
            .map(|_| architecture.add_node(&service, "us-east-1").id.clone())
            .collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_remove_node_cascades_edges() {
        let mut architecture = Architecture::new();
        let service = ec2();
        let a = architecture.add_node(&service, "us-east-1").id.clone();
        let b = architecture.add_node(&service, "us-east-1").id.clone();
        let c = architecture.add_node(&service, "us-east-1").id.clone();

        assert!(architecture.connect(&a, &b));
        assert!(architecture.connect(&c, &a));
        assert!(architecture.connect(&b, &c));

        let removed = architecture.remove_node(&a).unwrap();
        assert_eq!(removed.id, a);
        assert_eq!(architecture.edges().len(), 1);
        assert_no_dangling_edges(&architecture);

        assert!(architecture.remove_node(&a).is_none());
    }

    #[test]
    fn test_connect_rules() {
        let mut architecture = Architecture::new();
        let service = ec2();
        let a = architecture.add_node(&service, "us-east-1").id.clone();
        let b = architecture.add_node(&service, "us-east-1").id.clone();

        assert!(architecture.connect(&a, &b));
        assert!(!architecture.connect(&a, &b));
        assert_eq!(architecture.edges().len(), 1);

        // reverse direction is a different edge
        assert!(architecture.connect(&b, &a));
        // self-loops are permitted
        assert!(architecture.connect(&a, &a));
        // unknown endpoints are refused
        assert!(!architecture.connect(&a, "ghost"));
        assert_eq!(architecture.edges().len(), 3);
    }

    #[test]
    fn test_disconnect_and_remove_edge() {
        let mut architecture = Architecture::new();
        let service = ec2();
        let a = architecture.add_node(&service, "us-east-1").id.clone();
        let b = architecture.add_node(&service, "us-east-1").id.clone();
        architecture.connect(&a, &b);
        architecture.connect(&b, &a);

        assert!(architecture.disconnect(&a, &b));
        assert!(!architecture.disconnect(&a, &b));

        let edge_id = architecture.edges()[0].id.clone();
        assert!(architecture.remove_edge(&edge_id));
        assert!(architecture.edges().is_empty());
        assert_eq!(architecture.nodes().len(), 2);
    }

    #[test]
    fn test_edge_invariant_over_random_sequence() {
        let mut architecture = Architecture::new();
        let service = ec2();
        let mut ids: Vec<String> = Vec::new();

        for step in 0..200usize {
            match step % 7 {
                0 | 1 | 2 => ids.push(architecture.add_node(&service, "us-east-1").id.clone()),
                3 | 4 if ids.len() >= 2 => {
                    let source = &ids[(step * 31) % ids.len()];
                    let target = &ids[(step * 17) % ids.len()];
                    architecture.connect(source, target);
                }
                5 if !ids.is_empty() => {
                    let victim = ids.remove((step * 13) % ids.len());
                    architecture.remove_node(&victim);
                }
                _ => {
                    architecture.remove_node("never-existed");
                }
            }
            assert_no_dangling_edges(&architecture);
        }
    }

    #[test]
    fn test_updates_on_missing_node_are_noops() {
        let mut architecture = Architecture::new();
        assert!(!architecture.set_config("ghost", "instanceCount", ConfigValue::Number(2.0)));
        assert!(!architecture.set_region("ghost", "eu-west-1", None));
        assert!(!architecture.move_node("ghost", Position::new(1.0, 1.0)));
        assert!(architecture.is_empty());
    }

    #[test]
    fn test_set_region_replaces_zone() {
        let mut architecture = Architecture::new();
        let id = architecture.add_node(&ec2(), "us-east-1").id.clone();

        assert!(architecture.set_region(&id, "eu-west-1", Some("eu-west-1b")));
        let node = architecture.node(&id).unwrap();
        assert_eq!(node.region, "eu-west-1");
        assert_eq!(node.availability_zone.as_deref(), Some("eu-west-1b"));

        assert!(architecture.set_region(&id, "us-west-2", None));
        assert_eq!(architecture.node(&id).unwrap().availability_zone, None);
    }

    #[test]
    fn test_used_regions_in_first_use_order() {
        let mut architecture = Architecture::new();
        let service = ec2();
        architecture.add_node(&service, "eu-west-1");
        architecture.add_node(&service, "us-east-1");
        architecture.add_node(&service, "eu-west-1");

        assert_eq!(architecture.used_regions(), vec!["eu-west-1", "us-east-1"]);
    }

    #[test]
    fn test_from_parts_prunes_invalid_edges_and_duplicate_nodes() {
        let mut source = Architecture::new();
        let service = ec2();
        let a = source.add_node(&service, "us-east-1").clone();
        let b = source.add_node(&service, "us-east-1").clone();

        let nodes = vec![a.clone(), b.clone(), a.clone()];
        let edges = vec![
            Connection::new(&a.id, &b.id),
            Connection::new(&a.id, &b.id),
            Connection::new(&a.id, "ghost"),
        ];

        let architecture = Architecture::from_parts(nodes, edges);
        assert_eq!(architecture.nodes().len(), 2);
        assert_eq!(architecture.edges().len(), 1);
        assert_eq!(architecture.nodes()[0].id, a.id);
    }

    fn renamed(node: &ServiceNode, id: &str) -> ServiceNode {
        ServiceNode {
            id: id.to_string(),
            ..node.clone()
        }
    }

    #[test]
    fn test_hyphenated_node_ids_get_distinct_edge_ids() {
        let mut source = Architecture::new();
        let template = source.add_node(&ec2(), "us-east-1").clone();
        let nodes: Vec<ServiceNode> = ["a-b", "c", "a", "b-c"]
            .iter()
            .map(|id| renamed(&template, id))
            .collect();

        // Both pairs produce `edge-a-b-c`
        let edges = vec![Connection::new("a-b", "c"), Connection::new("a", "b-c")];
        let mut architecture = Architecture::from_parts(nodes.clone(), edges);
        assert_eq!(architecture.edges().len(), 2);
        assert_eq!(architecture.edges()[0].id, "edge-a-b-c");
        assert_eq!(architecture.edges()[1].id, "edge-a-b-c-2");

        assert!(architecture.remove_edge("edge-a-b-c"));
        assert_eq!(architecture.edges().len(), 1);
        assert!(architecture.has_edge("a", "b-c"));

        let mut fresh = Architecture::from_parts(nodes, vec![]);
        assert!(fresh.connect("a-b", "c"));
        assert!(fresh.connect("a", "b-c"));
        assert_ne!(fresh.edges()[0].id, fresh.edges()[1].id);
        assert!(fresh.disconnect("a-b", "c"));
        assert!(fresh.has_edge("a", "b-c"));
    }

    #[test]
    fn test_from_parts_assigns_missing_edge_ids() {
        let mut source = Architecture::new();
        let service = ec2();
        let a = source.add_node(&service, "us-east-1").clone();
        let b = source.add_node(&service, "us-east-1").clone();

        let mut edge = Connection::new(&a.id, &b.id);
        edge.id = String::new();
        let architecture = Architecture::from_parts(vec![a.clone(), b.clone()], vec![edge]);
        assert_eq!(architecture.edges()[0].id, format!("edge-{}-{}", a.id, b.id));
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut architecture = Architecture::new();
        let service = ec2();
        let a = architecture.add_node(&service, "us-east-1").id.clone();
        architecture.connect(&a, &a);

        architecture.clear();
        assert!(architecture.is_empty());
        assert!(architecture.used_regions().is_empty());
    }
}
