//! Terraform (HCL) exporter.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use super::mapping::{TERRAFORM_PLACEHOLDER, resource_mapping, snake_case, unique_attributes};
use crate::models::{ConfigValue, Connection, ServiceNode};

const AWS_PROVIDER_VERSION: &str = "~> 5.0";

/// Names Terraform reserves inside a resource block, plus the ones this exporter writes itself
const RESERVED_ATTRIBUTES: &[&str] = &[
    "count",
    "for_each",
    "provider",
    "depends_on",
    "lifecycle",
    "provisioner",
    "connection",
    "tags",
    "availability_zone",
];

/// Keys the placeholder `input` map writes before the node config
const PLACEHOLDER_INPUTS: &[&str] = &["service_id", "region", "availability_zone"];

/// Render a Terraform configuration with one resource block per node
///
/// Each used region gets an `aws` provider; the first region used is the
/// default provider and the others are aliased by region code.
pub fn to_terraform(nodes: &[ServiceNode], edges: &[Connection], name: &str) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "# Terraform configuration for {}", comment_line(name));
    let _ = writeln!(out, "# Exported from the architecture designer");
    out.push('\n');
    out.push_str("terraform {\n");
    out.push_str("  required_providers {\n");
    out.push_str("    aws = {\n");
    out.push_str("      source  = \"hashicorp/aws\"\n");
    let _ = writeln!(out, "      version = \"{AWS_PROVIDER_VERSION}\"");
    out.push_str("    }\n");
    out.push_str("  }\n");
    out.push_str("}\n");

    let regions = regions(nodes);
    for (index, region) in regions.iter().enumerate() {
        out.push('\n');
        out.push_str("provider \"aws\" {\n");
        if index > 0 {
            let _ = writeln!(out, "  alias  = \"{}\"", provider_alias(region));
        }
        let _ = writeln!(out, "  region = {}", quote(region));
        out.push_str("}\n");
    }

    let addresses = addresses(nodes);
    for node in nodes {
        out.push('\n');
        write_resource(&mut out, node, edges, &addresses, regions.first().copied());
    }

    out
}

fn regions(nodes: &[ServiceNode]) -> Vec<&str> {
    let mut seen = HashSet::new();
    nodes
        .iter()
        .map(|n| n.region.as_str())
        .filter(|r| seen.insert(*r))
        .collect()
}

/// `eu-west-1` -> `eu_west_1`
fn provider_alias(region: &str) -> String {
    let alias = snake_case(region);
    if alias.starts_with(|c: char| c.is_ascii_alphabetic()) {
        alias
    } else {
        format!("r_{alias}")
    }
}

/// `(resource type, label)` per node id, labels unique across the document
fn addresses(nodes: &[ServiceNode]) -> HashMap<&str, (&'static str, String)> {
    let mut taken = HashSet::new();
    let mut addresses = HashMap::new();

    for node in nodes {
        let resource_type = resource_mapping(&node.service_id)
            .map(|m| m.terraform)
            .unwrap_or(TERRAFORM_PLACEHOLDER);

        let mut base = snake_case(&node.id);
        if !base.starts_with(|c: char| c.is_ascii_alphabetic()) {
            base = format!("r_{base}");
        }

        let mut label = base.clone();
        let mut suffix = 2;
        while !taken.insert(label.clone()) {
            label = format!("{base}_{suffix}");
            suffix += 1;
        }
        addresses.insert(node.id.as_str(), (resource_type, label));
    }

    addresses
}

fn write_resource(
    out: &mut String,
    node: &ServiceNode,
    edges: &[Connection],
    addresses: &HashMap<&str, (&'static str, String)>,
    primary_region: Option<&str>,
) {
    let Some((resource_type, label)) = addresses.get(node.id.as_str()) else {
        return;
    };
    let _ = writeln!(out, "resource \"{resource_type}\" \"{label}\" {{");

    match resource_mapping(&node.service_id) {
        Some(mapping) => {
            if primary_region != Some(node.region.as_str()) {
                let _ = writeln!(out, "  provider = aws.{}", provider_alias(&node.region));
            }
            for (key, value) in attributes(node, &[]) {
                let _ = writeln!(out, "  {key} = {value}");
            }
            if let Some(zone) = &node.availability_zone {
                if mapping.zonal {
                    let _ = writeln!(out, "  availability_zone = {}", quote(zone));
                }
            }
            out.push_str("\n  tags = {\n");
            let _ = writeln!(out, "    Name = {}", quote(&node.label));
            if let Some(zone) = node.availability_zone.as_ref().filter(|_| !mapping.zonal) {
                let _ = writeln!(out, "    AvailabilityZone = {}", quote(zone));
            }
            out.push_str("  }\n");
        }
        None => {
            tracing::warn!(
                node_id = %node.id,
                service_id = %node.service_id,
                "No Terraform mapping, exporting placeholder"
            );
            out.push_str("  input = {\n");
            let _ = writeln!(out, "    service_id = {}", quote(&node.service_id));
            let _ = writeln!(out, "    region = {}", quote(&node.region));
            if let Some(zone) = &node.availability_zone {
                let _ = writeln!(out, "    availability_zone = {}", quote(zone));
            }
            for (key, value) in attributes(node, PLACEHOLDER_INPUTS) {
                let _ = writeln!(out, "    {key} = {value}");
            }
            out.push_str("  }\n");
        }
    }

    let mut seen = HashSet::new();
    let depends_on: Vec<String> = edges
        .iter()
        .filter(|e| e.source == node.id && e.target != node.id)
        .filter_map(|e| addresses.get(e.target.as_str()))
        .map(|(resource_type, label)| format!("{resource_type}.{label}"))
        .filter(|address| seen.insert(address.clone()))
        .collect();
    if !depends_on.is_empty() {
        let _ = writeln!(out, "\n  depends_on = [{}]", depends_on.join(", "));
    }

    out.push_str("}\n");
}

/// Config entries as `(attribute, rendered value)`, unique within the block
///
/// Names that cannot be attributes are skipped; names already used by
/// another key or by `written` get a numeric suffix.
fn attributes(node: &ServiceNode, written: &[&str]) -> Vec<(String, String)> {
    unique_attributes(node, written, "_", |id| {
        let mut key = snake_case(id);
        if key.is_empty() {
            tracing::warn!(node_id = %node.id, option = %id, "Skipping config key with no usable name");
            return None;
        }
        if !key.starts_with(|c: char| c.is_ascii_alphabetic()) {
            key = format!("_{key}");
        }
        if RESERVED_ATTRIBUTES.contains(&key.as_str()) {
            key.push_str("_setting");
        }
        Some(key)
    })
    .into_iter()
    .map(|(key, value)| (key, render(value)))
    .collect()
}

fn render(value: &ConfigValue) -> String {
    match value {
        ConfigValue::Boolean(b) => b.to_string(),
        ConfigValue::Text(s) => quote(s),
        ConfigValue::Number(n) if n.is_finite() => value.to_string(),
        ConfigValue::Number(_) => "null".to_string(),
    }
}

/// Quote a string literal, escaping HCL template sequences
pub(crate) fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');

    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                quoted.push(c);
                quoted.push(c);
            }
            _ => quoted.push(c),
        }
    }

    quoted.push('"');
    quoted
}

fn comment_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Position;

    fn node(id: &str, service_id: &str, region: &str) -> ServiceNode {
        ServiceNode {
            id: id.to_string(),
            service_id: service_id.to_string(),
            label: format!("{service_id} node"),
            config: Default::default(),
            region: region.to_string(),
            availability_zone: None,
            position: Position::default(),
            canvas: Default::default(),
            canvas_data: Default::default(),
        }
    }

    #[test]
    fn test_empty_document_has_only_terraform_block() {
        let doc = to_terraform(&[], &[], "Empty");
        assert!(doc.starts_with("# Terraform configuration for Empty\n"));
        assert!(doc.contains("required_providers"));
        assert!(!doc.contains("provider \"aws\""));
        assert!(!doc.contains("resource "));
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote("a\\b"), "\"a\\\\b\"");
        assert_eq!(quote("line\nnext\tx"), "\"line\\nnext\\tx\"");
        assert_eq!(quote("${var.x} %{if}"), "\"$${var.x} %%{if}\"");
        assert_eq!(quote("$5 or 50%"), "\"$5 or 50%\"");
    }

    #[test]
    fn test_mapped_resource_block() {
        let mut ec2 = node("ec2-1", "ec2", "us-east-1");
        ec2.config.insert("instanceType".to_string(), ConfigValue::from("t3.large"));
        ec2.config.insert("instanceCount".to_string(), ConfigValue::Number(2.0));
        ec2.config.insert("detailedMonitoring".to_string(), ConfigValue::Boolean(true));
        ec2.availability_zone = Some("us-east-1a".to_string());

        let doc = to_terraform(&[ec2], &[], "Web");
        assert!(doc.contains("resource \"aws_instance\" \"ec2_1\" {\n"));
        assert!(doc.contains("  instance_type = \"t3.large\"\n"));
        assert!(doc.contains("  instance_count = 2\n"));
        assert!(doc.contains("  detailed_monitoring = true\n"));
        assert!(doc.contains("  availability_zone = \"us-east-1a\"\n"));
        assert!(doc.contains("    Name = \"ec2 node\"\n"));
        assert!(!doc.contains("provider = aws."));
    }

    #[test]
    fn test_secondary_regions_use_aliased_providers() {
        let nodes = vec![node("s3-1", "s3", "us-east-1"), node("sqs-1", "sqs", "eu-west-1")];
        let doc = to_terraform(&nodes, &[], "Multi");

        assert!(doc.contains("provider \"aws\" {\n  region = \"us-east-1\"\n}"));
        assert!(doc.contains("  alias  = \"eu_west_1\"\n  region = \"eu-west-1\"\n"));
        assert!(doc.contains("resource \"aws_sqs_queue\" \"sqs_1\" {\n  provider = aws.eu_west_1\n"));
    }

    #[test]
    fn test_placeholder_and_depends_on() {
        let nodes = vec![node("legacy-1", "mainframe", "us-east-1"), node("sns-1", "sns", "us-east-1")];
        let edges = vec![Connection::new("legacy-1", "sns-1"), Connection::new("sns-1", "sns-1")];
        let doc = to_terraform(&nodes, &edges, "Legacy");

        assert!(doc.contains("resource \"terraform_data\" \"legacy_1\" {\n  input = {\n"));
        assert!(doc.contains("    service_id = \"mainframe\"\n"));
        assert!(doc.contains("  depends_on = [aws_sns_topic.sns_1]\n"));
        assert_eq!(doc.matches("depends_on").count(), 1);
    }

    #[test]
    fn test_labels_are_unique_and_reserved_names_renamed() {
        let mut first = node("9-a", "sqs", "us-east-1");
        first.config.insert("count".to_string(), ConfigValue::Number(3.0));
        let second = node("9_a", "sqs", "us-east-1");

        let doc = to_terraform(&[first, second], &[], "Labels");
        assert!(doc.contains("\"aws_sqs_queue\" \"r_9_a\""));
        assert!(doc.contains("\"aws_sqs_queue\" \"r_9_a_2\""));
        assert!(doc.contains("  count_setting = 3\n"));
    }

    #[test]
    fn test_converging_config_keys_are_written_once_each() {
        let mut ec2 = node("ec2-1", "ec2", "us-east-1");
        ec2.config.insert("instanceType".to_string(), ConfigValue::from("t3.medium"));
        ec2.config.insert("instance_type".to_string(), ConfigValue::from("m5.large"));

        let doc = to_terraform(&[ec2], &[], "Web");
        assert_eq!(doc.matches("  instance_type = ").count(), 1);
        assert!(doc.contains("  instance_type = \"t3.medium\"\n"));
        assert!(doc.contains("  instance_type_2 = \"m5.large\"\n"));
    }

    #[test]
    fn test_placeholder_input_keys_do_not_repeat() {
        let mut legacy = node("legacy-1", "mainframe", "us-east-1");
        legacy.config.insert("serviceId".to_string(), ConfigValue::from("zos"));
        legacy.config.insert("region".to_string(), ConfigValue::from("basement"));

        let doc = to_terraform(&[legacy], &[], "Legacy");
        assert_eq!(doc.matches("    service_id = ").count(), 1);
        assert_eq!(doc.matches("    region = ").count(), 1);
        assert!(doc.contains("    service_id_2 = \"zos\"\n"));
        assert!(doc.contains("    region_2 = \"basement\"\n"));
    }

    #[test]
    fn test_name_newlines_do_not_break_header() {
        let doc = to_terraform(&[], &[], "two\nlines");
        assert!(doc.starts_with("# Terraform configuration for two lines\n"));
    }
}
