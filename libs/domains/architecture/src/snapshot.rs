//! Snapshot wire shapes exchanged with the persistence gateway.
//!
//! Nodes and edges use the canvas layout (`{ id, type, position, data }`).
//! Canvas fields the designer does not model (`style`, edge `type`, extra
//! `data` keys) are carried through load and save untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

use crate::architecture::Architecture;
use crate::models::{CanvasFields, Connection, DEFAULT_REGION, NodeConfig, Position, ServiceNode};

fn default_node_type() -> String {
    "default".to_string()
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

/// Stored form of a [`ServiceNode`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SnapshotNode {
    pub id: String,
    #[serde(rename = "type", default = "default_node_type")]
    pub node_type: String,
    #[serde(default)]
    pub position: Position,
    pub data: SnapshotNodeData,
    #[serde(flatten)]
    #[ts(skip)]
    pub canvas: CanvasFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotNodeData {
    /// Empty when the node only embeds a `service` object
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub config: NodeConfig,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: CanvasFields,
}

impl SnapshotNodeData {
    /// `serviceId`, falling back to the id of an embedded `service` object
    ///
    /// Empty when neither is present; such a node prices as a catalog miss.
    pub fn resolved_service_id(&self) -> &str {
        if !self.service_id.is_empty() {
            return &self.service_id;
        }
        self.extra
            .get("service")
            .and_then(|service| service.get("id"))
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

/// Stored form of a [`Connection`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SnapshotEdge {
    /// Empty ids are replaced when the architecture is rebuilt
    #[serde(default)]
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(flatten)]
    #[ts(skip)]
    pub canvas: CanvasFields,
}

impl From<&ServiceNode> for SnapshotNode {
    fn from(node: &ServiceNode) -> Self {
        Self {
            id: node.id.clone(),
            node_type: default_node_type(),
            position: node.position,
            data: SnapshotNodeData {
                service_id: node.service_id.clone(),
                label: node.label.clone(),
                config: node.config.clone(),
                region: node.region.clone(),
                availability_zone: node.availability_zone.clone(),
                extra: node.canvas_data.clone(),
            },
            canvas: node.canvas.clone(),
        }
    }
}

impl From<SnapshotNode> for ServiceNode {
    fn from(node: SnapshotNode) -> Self {
        let data = node.data;
        let service_id = data.resolved_service_id().to_string();
        if service_id.is_empty() {
            tracing::warn!(node_id = %node.id, "Stored node names no service");
        }

        Self {
            id: node.id,
            label: if data.label.is_empty() {
                service_id.clone()
            } else {
                data.label
            },
            service_id,
            config: data.config,
            region: data.region,
            availability_zone: data.availability_zone.filter(|z| !z.is_empty()),
            position: node.position,
            canvas: node.canvas,
            canvas_data: data.extra,
        }
    }
}

impl From<&Connection> for SnapshotEdge {
    fn from(edge: &Connection) -> Self {
        Self {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            canvas: edge.canvas.clone(),
        }
    }
}

impl From<SnapshotEdge> for Connection {
    fn from(edge: SnapshotEdge) -> Self {
        Connection {
            id: edge.id,
            source: edge.source,
            target: edge.target,
            canvas: edge.canvas,
        }
    }
}

/// Stored nodes of an architecture, in insertion order
pub fn snapshot_nodes(architecture: &Architecture) -> Vec<SnapshotNode> {
    architecture.nodes().iter().map(SnapshotNode::from).collect()
}

/// Stored edges of an architecture, in insertion order
pub fn snapshot_edges(architecture: &Architecture) -> Vec<SnapshotEdge> {
    architecture.edges().iter().map(SnapshotEdge::from).collect()
}

/// Rebuild an architecture from stored nodes and edges, preserving node ids
pub fn architecture_from_snapshot(nodes: Vec<SnapshotNode>, edges: Vec<SnapshotEdge>) -> Architecture {
    Architecture::from_parts(
        nodes.into_iter().map(ServiceNode::from).collect(),
        edges.into_iter().map(Connection::from).collect(),
    )
}

/// Cost as persisted alongside a snapshot (two decimals)
pub fn format_cost(total: f64) -> String {
    format!("{total:.2}")
}

/// Payload for creating a saved architecture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
pub struct CreateArchitecture {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub nodes: Vec<SnapshotNode>,
    #[serde(default)]
    pub edges: Vec<SnapshotEdge>,
    #[serde(default)]
    pub estimated_monthly_cost: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

/// Partial update of a saved architecture; absent fields are left unchanged
///
/// Built from a full snapshot, `description` is always sent so that an
/// empty description clears the stored one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
pub struct UpdateArchitecture {
    #[validate(length(min = 1, max = 255))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<SnapshotNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<SnapshotEdge>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_monthly_cost: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

impl From<CreateArchitecture> for UpdateArchitecture {
    fn from(input: CreateArchitecture) -> Self {
        Self {
            name: Some(input.name),
            description: Some(input.description.unwrap_or_default()),
            nodes: Some(input.nodes),
            edges: Some(input.edges),
            estimated_monthly_cost: input.estimated_monthly_cost,
            is_public: Some(input.is_public),
        }
    }
}

/// Architecture as returned by the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SavedArchitecture {
    #[ts(as = "String")]
    pub id: Uuid,
    #[ts(as = "String")]
    #[serde(default)]
    pub tenant_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub nodes: Vec<SnapshotNode>,
    #[serde(default)]
    pub edges: Vec<SnapshotEdge>,
    #[serde(default)]
    pub estimated_monthly_cost: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// One page of saved architectures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ArchitectureList {
    pub architectures: Vec<SavedArchitecture>,
    pub total: usize,
}

/// Pagination for listing saved architectures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

/// Owned save payload captured from the designer at request time
///
/// Edits made after the capture are not part of the save.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    /// Saved identity to update; `None` creates a new architecture
    pub id: Option<Uuid>,
    pub payload: CreateArchitecture,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ServiceCatalog;
    use serde_json::json;

    #[test]
    fn test_node_wire_shape() {
        let mut architecture = Architecture::new();
        let ec2 = ServiceCatalog::aws().get("ec2").cloned().unwrap();
        let id = architecture.add_node(&ec2, "eu-west-1").id.clone();

        let value = serde_json::to_value(snapshot_nodes(&architecture)).unwrap();
        let node = &value[0];
        assert_eq!(node["id"], json!(id));
        assert_eq!(node["type"], json!("default"));
        assert_eq!(node["data"]["serviceId"], json!("ec2"));
        assert_eq!(node["data"]["region"], json!("eu-west-1"));
        assert_eq!(node["data"]["config"]["instanceType"], json!("t3.medium"));
        assert!(node["data"].get("availabilityZone").is_none());
    }

    #[test]
    fn test_lenient_node_decoding() {
        let node: SnapshotNode = serde_json::from_value(json!({
            "id": "s3-1",
            "data": { "serviceId": "s3", "availabilityZone": "" }
        }))
        .unwrap();

        let node = ServiceNode::from(node);
        assert_eq!(node.region, DEFAULT_REGION);
        assert_eq!(node.label, "s3");
        assert_eq!(node.availability_zone, None);
        assert_eq!(node.position, Position::default());
    }

    fn node_at(id: &str, service_id: &str) -> SnapshotNode {
        serde_json::from_value(json!({ "id": id, "data": { "serviceId": service_id } })).unwrap()
    }

    #[test]
    fn test_edge_without_id_gets_one() {
        let edge: SnapshotEdge =
            serde_json::from_value(json!({ "source": "a", "target": "b" })).unwrap();
        let architecture =
            architecture_from_snapshot(vec![node_at("a", "s3"), node_at("b", "s3")], vec![edge]);
        assert_eq!(architecture.edges()[0].id, "edge-a-b");
    }

    #[test]
    fn test_embedded_service_object_names_the_service() {
        let node: SnapshotNode = serde_json::from_value(json!({
            "id": "ec2-1718000000000",
            "type": "default",
            "position": { "x": 310.5, "y": 120 },
            "data": {
                "service": { "id": "ec2", "name": "EC2", "basePrice": 30 },
                "config": { "instanceType": "t3.large", "instanceCount": 2 },
                "label": "EC2",
                "region": "eu-west-1"
            }
        }))
        .unwrap();
        assert_eq!(node.data.resolved_service_id(), "ec2");

        let node = ServiceNode::from(node);
        assert_eq!(node.service_id, "ec2");
        assert_eq!(node.position, Position::new(310.5, 120.0));
        assert!(node.canvas_data.contains_key("service"));
    }

    #[test]
    fn test_node_without_any_service_decodes() {
        let node: SnapshotNode =
            serde_json::from_value(json!({ "id": "n1", "data": { "label": "Mystery" } })).unwrap();
        let node = ServiceNode::from(node);
        assert_eq!(node.service_id, "");
        assert_eq!(node.label, "Mystery");
    }

    #[test]
    fn test_canvas_fields_survive_a_round_trip() {
        let nodes: Vec<SnapshotNode> = serde_json::from_value(json!([
            {
                "id": "ec2-1",
                "type": "default",
                "position": { "x": 0, "y": 0 },
                "data": {
                    "serviceId": "ec2",
                    "label": "Web",
                    "config": {},
                    "region": "us-east-1",
                    "service": { "id": "ec2" },
                    "selected": true
                },
                "style": { "background": "#FF9900", "width": 180 }
            },
            { "id": "s3-1", "data": { "serviceId": "s3" } }
        ]))
        .unwrap();
        let edges: Vec<SnapshotEdge> = serde_json::from_value(json!([
            { "id": "e1", "source": "ec2-1", "target": "s3-1", "type": "smoothstep", "animated": true }
        ]))
        .unwrap();

        let architecture = architecture_from_snapshot(nodes, edges);
        let nodes = serde_json::to_value(snapshot_nodes(&architecture)).unwrap();
        let edges = serde_json::to_value(snapshot_edges(&architecture)).unwrap();

        assert_eq!(nodes[0]["style"], json!({ "background": "#FF9900", "width": 180 }));
        assert_eq!(nodes[0]["data"]["service"], json!({ "id": "ec2" }));
        assert_eq!(nodes[0]["data"]["selected"], json!(true));
        assert!(nodes[1].get("style").is_none());
        assert_eq!(edges[0]["type"], json!("smoothstep"));
        assert_eq!(edges[0]["animated"], json!(true));
        assert_eq!(edges[0]["id"], json!("e1"));
    }

    #[test]
    fn test_update_from_create_sets_every_field() {
        let update = UpdateArchitecture::from(CreateArchitecture {
            name: "web".to_string(),
            description: None,
            nodes: vec![],
            edges: vec![],
            estimated_monthly_cost: Some("0.00".to_string()),
            is_public: false,
        });
        assert_eq!(update.name.as_deref(), Some("web"));
        assert_eq!(update.description.as_deref(), Some(""));
        assert_eq!(update.nodes, Some(vec![]));
        assert_eq!(update.is_public, Some(false));
    }

    #[test]
    fn test_full_update_clears_description() {
        let update = UpdateArchitecture::from(CreateArchitecture {
            name: "web".to_string(),
            description: None,
            nodes: vec![],
            edges: vec![],
            estimated_monthly_cost: None,
            is_public: false,
        });
        let value = serde_json::to_value(update).unwrap();
        assert_eq!(value["description"], json!(""));
        assert!(value.get("estimated_monthly_cost").is_none());
    }

    #[test]
    fn test_partial_update_omits_absent_fields() {
        let update = UpdateArchitecture {
            is_public: Some(true),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(update).unwrap(), json!({ "is_public": true }));
    }

    #[test]
    fn test_format_cost() {
        assert_eq!(format_cost(36.0), "36.00");
        assert_eq!(format_cost(0.005), "0.01");
        assert_eq!(format_cost(0.0), "0.00");
    }
}
