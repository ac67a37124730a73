//! Resource type mapping from catalog service ids to IaC resource types.

use std::collections::HashSet;

use crate::models::{ConfigValue, ServiceNode};

/// CloudFormation resource used for services without a mapping
pub const CLOUDFORMATION_PLACEHOLDER: &str = "AWS::CloudFormation::WaitConditionHandle";

/// Terraform resource used for services without a mapping
pub const TERRAFORM_PLACEHOLDER: &str = "terraform_data";

/// Target resource types of one service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceMapping {
    pub cloudformation: &'static str,
    pub terraform: &'static str,
    /// Resource accepts an availability zone argument
    pub zonal: bool,
}

const fn mapping(cloudformation: &'static str, terraform: &'static str, zonal: bool) -> ResourceMapping {
    ResourceMapping {
        cloudformation,
        terraform,
        zonal,
    }
}

const MAPPINGS: &[(&str, ResourceMapping)] = &[
    ("ec2", mapping("AWS::EC2::Instance", "aws_instance", true)),
    ("lambda", mapping("AWS::Lambda::Function", "aws_lambda_function", false)),
    ("ecs-fargate", mapping("AWS::ECS::Service", "aws_ecs_service", false)),
    ("eks", mapping("AWS::EKS::Cluster", "aws_eks_cluster", false)),
    ("s3", mapping("AWS::S3::Bucket", "aws_s3_bucket", false)),
    ("ebs", mapping("AWS::EC2::Volume", "aws_ebs_volume", true)),
    ("rds", mapping("AWS::RDS::DBInstance", "aws_db_instance", true)),
    ("dynamodb", mapping("AWS::DynamoDB::Table", "aws_dynamodb_table", false)),
    (
        "elasticache",
        mapping("AWS::ElastiCache::CacheCluster", "aws_elasticache_cluster", true),
    ),
    (
        "alb",
        mapping("AWS::ElasticLoadBalancingV2::LoadBalancer", "aws_lb", false),
    ),
    (
        "cloudfront",
        mapping("AWS::CloudFront::Distribution", "aws_cloudfront_distribution", false),
    ),
    ("nat-gateway", mapping("AWS::EC2::NatGateway", "aws_nat_gateway", false)),
    (
        "api-gateway",
        mapping("AWS::ApiGateway::RestApi", "aws_api_gateway_rest_api", false),
    ),
    ("sqs", mapping("AWS::SQS::Queue", "aws_sqs_queue", false)),
    ("sns", mapping("AWS::SNS::Topic", "aws_sns_topic", false)),
    ("kinesis", mapping("AWS::Kinesis::Stream", "aws_kinesis_stream", false)),
];

/// Mapping for a service id, `None` when the exporters must use a placeholder
pub fn resource_mapping(service_id: &str) -> Option<ResourceMapping> {
    MAPPINGS
        .iter()
        .find(|(id, _)| *id == service_id)
        .map(|(_, mapping)| *mapping)
}

/// Split an identifier into lowercase words on case changes and non-alphanumerics
fn words(id: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in id.chars() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_ascii_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        current.push(c.to_ascii_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// `instanceType` -> `InstanceType`
pub fn pascal_case(id: &str) -> String {
    words(id)
        .into_iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// `instanceType` -> `instance_type`
pub fn snake_case(id: &str) -> String {
    words(id).join("_")
}

/// Config entries of a node under converted attribute names, unique per resource
///
/// `convert` returns `None` for keys that cannot be attributes. A name that is
/// already taken, by another key or by one of `written`, gets
/// `<separator><n>` appended, starting at 2.
pub(crate) fn unique_attributes<'a>(
    node: &'a ServiceNode,
    written: &[&str],
    separator: &str,
    convert: impl Fn(&str) -> Option<String>,
) -> Vec<(String, &'a ConfigValue)> {
    let mut taken: HashSet<String> = written.iter().map(|name| name.to_string()).collect();

    node.config
        .iter()
        .filter_map(|(id, value)| {
            let base = convert(id)?;
            let mut name = base.clone();
            let mut suffix = 2;
            while !taken.insert(name.clone()) {
                name = format!("{base}{separator}{suffix}");
                suffix += 1;
            }
            if name != base {
                tracing::warn!(
                    node_id = %node.id,
                    option = %id,
                    attribute = %name,
                    "Config key collides with another after renaming"
                );
            }
            Some((name, value))
        })
        .collect()
}
