//! CloudFormation JSON template exporter.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value, json};

use super::mapping::{CLOUDFORMATION_PLACEHOLDER, pascal_case, resource_mapping, unique_attributes};
use crate::models::{ConfigValue, Connection, NodeConfig, ServiceNode};

const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Render a CloudFormation template with one resource per node
///
/// Resources keep node insertion order. Edges become `DependsOn` entries on
/// their source resource; self-loops are skipped.
pub fn to_cloudformation(nodes: &[ServiceNode], edges: &[Connection], name: &str) -> String {
    let logical_ids = logical_ids(nodes);

    let mut resources = Map::new();
    for node in nodes {
        let logical_id = &logical_ids[node.id.as_str()];
        let depends_on = dependencies(node, edges, &logical_ids);
        resources.insert(logical_id.clone(), resource(node, depends_on));
    }

    let mut template = Map::new();
    template.insert(
        "AWSTemplateFormatVersion".to_string(),
        json!(TEMPLATE_FORMAT_VERSION),
    );
    template.insert(
        "Description".to_string(),
        json!(format!("{name} - exported from the architecture designer")),
    );
    template.insert("Resources".to_string(), Value::Object(resources));

    format!("{:#}", Value::Object(template))
}

/// Alphanumeric logical ids, unique across the template
fn logical_ids(nodes: &[ServiceNode]) -> HashMap<&str, String> {
    let mut taken = HashSet::new();
    let mut ids = HashMap::new();

    for node in nodes {
        let mut base = pascal_case(&node.id);
        if !base.starts_with(|c: char| c.is_ascii_alphabetic()) {
            base = format!("Node{base}");
        }

        let mut candidate = base.clone();
        let mut suffix = 2;
        while !taken.insert(candidate.clone()) {
            candidate = format!("{base}{suffix}");
            suffix += 1;
        }
        ids.insert(node.id.as_str(), candidate);
    }

    ids
}

fn dependencies(
    node: &ServiceNode,
    edges: &[Connection],
    logical_ids: &HashMap<&str, String>,
) -> Vec<String> {
    let mut seen = HashSet::new();
    edges
        .iter()
        .filter(|e| e.source == node.id && e.target != node.id)
        .filter_map(|e| logical_ids.get(e.target.as_str()))
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

fn resource(node: &ServiceNode, depends_on: Vec<String>) -> Value {
    let mut metadata = Map::new();
    metadata.insert("ServiceId".to_string(), json!(node.service_id));
    metadata.insert("Label".to_string(), json!(node.label));
    metadata.insert("Region".to_string(), json!(node.region));
    if let Some(zone) = &node.availability_zone {
        metadata.insert("AvailabilityZone".to_string(), json!(zone));
    }

    let mut resource = Map::new();
    match resource_mapping(&node.service_id) {
        Some(mapping) => {
            let mut properties = properties(node);
            if mapping.zonal {
                if let Some(zone) = &node.availability_zone {
                    properties
                        .entry("AvailabilityZone")
                        .or_insert_with(|| json!(zone));
                }
            }
            properties
                .entry("Tags")
                .or_insert_with(|| json!([{ "Key": "Name", "Value": node.label }]));

            resource.insert("Type".to_string(), json!(mapping.cloudformation));
            resource.insert("Properties".to_string(), Value::Object(properties));
        }
        None => {
            tracing::warn!(
                node_id = %node.id,
                service_id = %node.service_id,
                "No CloudFormation mapping, exporting placeholder"
            );
            resource.insert("Type".to_string(), json!(CLOUDFORMATION_PLACEHOLDER));
            // WaitConditionHandle takes no properties
            metadata.insert(
                "Config".to_string(),
                Value::Object(config_object(&node.config)),
            );
        }
    }

    resource.insert("Metadata".to_string(), Value::Object(metadata));
    if !depends_on.is_empty() {
        resource.insert("DependsOn".to_string(), json!(depends_on));
    }

    Value::Object(resource)
}

/// Config under PascalCase property names; colliding names get a numeric suffix
fn properties(node: &ServiceNode) -> Map<String, Value> {
    unique_attributes(node, &[], "", |id| Some(pascal_case(id)).filter(|key| !key.is_empty()))
        .into_iter()
        .map(|(key, value)| (key, config_json(value)))
        .collect()
}

fn config_object(config: &NodeConfig) -> Map<String, Value> {
    config
        .iter()
        .map(|(id, value)| (id.clone(), config_json(value)))
        .collect()
}

/// Integral numbers render without a fractional part
pub(crate) fn config_json(value: &ConfigValue) -> Value {
    match value {
        ConfigValue::Boolean(b) => Value::Bool(*b),
        ConfigValue::Text(s) => Value::String(s.clone()),
        ConfigValue::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => json!(*n as i64),
        ConfigValue::Number(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Position;

    fn node(id: &str, service_id: &str, config: &[(&str, ConfigValue)]) -> ServiceNode {
        ServiceNode {
            id: id.to_string(),
            service_id: service_id.to_string(),
            label: format!("{service_id} node"),
            config: config
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            region: "us-east-1".to_string(),
            availability_zone: None,
            position: Position::default(),
            canvas: Default::default(),
            canvas_data: Default::default(),
        }
    }

    fn parse(template: &str) -> Value {
        serde_json::from_str(template).unwrap()
    }

    #[test]
    fn test_empty_template_is_valid() {
        let template = parse(&to_cloudformation(&[], &[], "Empty"));
        assert_eq!(template["AWSTemplateFormatVersion"], json!("2010-09-09"));
        assert_eq!(template["Resources"], json!({}));
    }

    #[test]
    fn test_mapped_resource() {
        let mut ec2 = node(
            "ec2-1",
            "ec2",
            &[
                ("instanceType", ConfigValue::from("t3.large")),
                ("instanceCount", ConfigValue::Number(2.0)),
            ],
        );
        ec2.availability_zone = Some("us-east-1b".to_string());

        let template = parse(&to_cloudformation(&[ec2], &[], "Web"));
        let resource = &template["Resources"]["Ec21"];
        assert_eq!(resource["Type"], json!("AWS::EC2::Instance"));
        assert_eq!(resource["Properties"]["InstanceType"], json!("t3.large"));
        assert_eq!(resource["Properties"]["InstanceCount"], json!(2));
        assert_eq!(resource["Properties"]["AvailabilityZone"], json!("us-east-1b"));
        assert_eq!(resource["Properties"]["Tags"][0]["Value"], json!("ec2 node"));
        assert_eq!(resource["Metadata"]["Region"], json!("us-east-1"));
        assert!(resource.get("DependsOn").is_none());
    }

    #[test]
    fn test_unmapped_service_uses_placeholder() {
        let legacy = node("mainframe-1", "mainframe", &[("mips", ConfigValue::Number(1.5))]);
        let template = parse(&to_cloudformation(&[legacy], &[], "Legacy"));
        let resource = &template["Resources"]["Mainframe1"];
        assert_eq!(resource["Type"], json!(CLOUDFORMATION_PLACEHOLDER));
        assert!(resource.get("Properties").is_none());
        assert_eq!(resource["Metadata"]["Config"]["mips"], json!(1.5));
    }

    #[test]
    fn test_depends_on_follows_outgoing_edges() {
        let nodes = vec![node("lambda-1", "lambda", &[]), node("dynamodb-1", "dynamodb", &[])];
        let edges = vec![
            Connection::new("lambda-1", "dynamodb-1"),
            Connection::new("lambda-1", "lambda-1"),
        ];

        let template = parse(&to_cloudformation(&nodes, &edges, "Api"));
        assert_eq!(template["Resources"]["Lambda1"]["DependsOn"], json!(["Dynamodb1"]));
        assert!(template["Resources"]["Dynamodb1"].get("DependsOn").is_none());
    }

    #[test]
    fn test_logical_ids_are_unique_and_alphanumeric() {
        let nodes = vec![
            node("s3-1", "s3", &[]),
            node("s3_1", "s3", &[]),
            node("1-s3", "s3", &[]),
        ];
        let ids = logical_ids(&nodes);
        assert_eq!(ids["s3-1"], "S31");
        assert_eq!(ids["s3_1"], "S312");
        assert_eq!(ids["1-s3"], "Node1S3");
    }

    #[test]
    fn test_keys_converging_on_one_property_are_all_kept() {
        let ec2 = node(
            "ec2-1",
            "ec2",
            &[
                ("instanceType", ConfigValue::from("t3.medium")),
                ("instance_type", ConfigValue::from("m5.large")),
            ],
        );

        let template = parse(&to_cloudformation(&[ec2], &[], "Web"));
        let properties = &template["Resources"]["Ec21"]["Properties"];
        assert_eq!(properties["InstanceType"], json!("t3.medium"));
        assert_eq!(properties["InstanceType2"], json!("m5.large"));
    }

    #[test]
    fn test_resources_keep_insertion_order() {
        let nodes = vec![node("sqs-2", "sqs", &[]), node("alb-1", "alb", &[])];
        let template = to_cloudformation(&nodes, &[], "Order");
        let sqs = template.find("\"Sqs2\"").unwrap();
        let alb = template.find("\"Alb1\"").unwrap();
        assert!(sqs < alb);
    }
}
