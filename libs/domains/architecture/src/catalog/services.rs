use serde::Serialize;
use std::collections::HashSet;

use crate::error::{ArchitectureError, ArchitectureResult};
use crate::models::{
    ConfigurableOption, OptionEffect, OptionKind, SelectChoice, ServiceCategory, ServiceDefinition,
};

/// Services of one category, in catalog declaration order
#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup<'a> {
    pub category: ServiceCategory,
    pub services: Vec<&'a ServiceDefinition>,
}

/// Read-only registry of placeable services
#[derive(Debug, Clone)]
pub struct ServiceCatalog {
    services: Vec<ServiceDefinition>,
}

impl ServiceCatalog {
    /// Build a catalog, rejecting definitions that break catalog invariants
    pub fn new(services: Vec<ServiceDefinition>) -> ArchitectureResult<Self> {
        let mut seen = HashSet::new();
        for service in &services {
            if !seen.insert(service.id.as_str()) {
                return Err(ArchitectureError::InvalidCatalog(format!(
                    "duplicate service id '{}'",
                    service.id
                )));
            }
            validate_service(service).map_err(ArchitectureError::InvalidCatalog)?;
        }

        Ok(Self { services })
    }

    /// The built-in AWS catalog
    pub fn aws() -> Self {
        Self {
            services: aws_services(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&ServiceDefinition> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn services(&self) -> &[ServiceDefinition] {
        &self.services
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Group services by category; groups appear in order of first declaration
    pub fn list_by_category(&self) -> Vec<CategoryGroup<'_>> {
        let mut groups: Vec<CategoryGroup<'_>> = Vec::new();

        for service in &self.services {
            match groups.iter_mut().find(|g| g.category == service.category) {
                Some(group) => group.services.push(service),
                None => groups.push(CategoryGroup {
                    category: service.category,
                    services: vec![service],
                }),
            }
        }

        groups
    }
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Self::aws()
    }
}

fn validate_service(service: &ServiceDefinition) -> Result<(), String> {
    if !(service.base_price >= 0.0 && service.base_price.is_finite()) {
        return Err(format!(
            "service '{}' has invalid base price {}",
            service.id, service.base_price
        ));
    }

    let mut option_ids = HashSet::new();
    for option in &service.configurable_options {
        if !option_ids.insert(option.id.as_str()) {
            return Err(format!(
                "service '{}' declares option '{}' twice",
                service.id, option.id
            ));
        }

        if option.default.kind() != option.kind {
            return Err(format!(
                "option '{}.{}' is {} but its default is {}",
                service.id,
                option.id,
                option.kind,
                option.default.kind()
            ));
        }

        match option.effect.expected_kind() {
            Some(expected) if expected != option.kind => {
                return Err(format!(
                    "option '{}.{}' is {} but its effect requires {}",
                    service.id, option.id, option.kind, expected
                ));
            }
            _ => {}
        }

        if option.kind == OptionKind::Select {
            let default = option.default.to_string();
            if option.choice(&default).is_none() {
                return Err(format!(
                    "option '{}.{}' default '{}' is not one of its choices",
                    service.id, option.id, default
                ));
            }
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn service(
    id: &str,
    name: &str,
    category: ServiceCategory,
    color: &str,
    icon: &str,
    base_price: f64,
    pricing_unit: &str,
    description: &str,
    configurable_options: Vec<ConfigurableOption>,
) -> ServiceDefinition {
    ServiceDefinition {
        id: id.to_string(),
        name: name.to_string(),
        category,
        color: color.to_string(),
        icon: icon.to_string(),
        base_price,
        pricing_unit: pricing_unit.to_string(),
        description: description.to_string(),
        configurable_options,
    }
}

/// Built-in AWS service definitions with on-demand monthly prices (us-east-1)
pub fn aws_services() -> Vec<ServiceDefinition> {
    vec![
        // Compute
        service(
            "ec2",
            "Amazon EC2",
            ServiceCategory::Compute,
            "#FF9900",
            "🖥️",
            30.37,
            "per instance/month",
            "Resizable virtual machines",
            vec![
                ConfigurableOption::select(
                    "instanceType",
                    "Instance Type",
                    "t3.medium",
                    vec![
                        SelectChoice::new("t3.micro", "t3.micro (2 vCPU, 1 GiB)", 0.25),
                        SelectChoice::new("t3.small", "t3.small (2 vCPU, 2 GiB)", 0.5),
                        SelectChoice::new("t3.medium", "t3.medium (2 vCPU, 4 GiB)", 1.0),
                        SelectChoice::new("t3.large", "t3.large (2 vCPU, 8 GiB)", 2.0),
                        SelectChoice::new("m5.large", "m5.large (2 vCPU, 8 GiB)", 2.3),
                        SelectChoice::new("m5.xlarge", "m5.xlarge (4 vCPU, 16 GiB)", 4.6),
                        SelectChoice::new("c5.2xlarge", "c5.2xlarge (8 vCPU, 16 GiB)", 8.2),
                    ],
                ),
                ConfigurableOption::toggle(
                    "detailedMonitoring",
                    "Detailed Monitoring",
                    false,
                    OptionEffect::AddWhenEnabled { amount: 2.10 },
                ),
                ConfigurableOption::number(
                    "instanceCount",
                    "Number of Instances",
                    1.0,
                    OptionEffect::Multiply,
                ),
            ],
        ),
        service(
            "lambda",
            "AWS Lambda",
            ServiceCategory::Compute,
            "#FF9900",
            "λ",
            3.53,
            "per million requests",
            "Serverless functions billed per request and duration",
            vec![
                ConfigurableOption::select(
                    "memoryMb",
                    "Memory",
                    "128",
                    vec![
                        SelectChoice::new("128", "128 MB", 1.0),
                        SelectChoice::new("512", "512 MB", 3.4),
                        SelectChoice::new("1024", "1024 MB", 6.6),
                        SelectChoice::new("2048", "2048 MB", 13.0),
                    ],
                ),
                ConfigurableOption::number(
                    "requestsMillions",
                    "Requests (millions/month)",
                    1.0,
                    OptionEffect::Multiply,
                ),
            ],
        ),
        // Containers
        service(
            "ecs-fargate",
            "ECS Fargate",
            ServiceCategory::Containers,
            "#F58536",
            "📦",
            36.04,
            "per task/month",
            "Serverless containers on Amazon ECS",
            vec![
                ConfigurableOption::select(
                    "taskSize",
                    "Task Size",
                    "1vcpu-2gb",
                    vec![
                        SelectChoice::new("0.25vcpu-0.5gb", "0.25 vCPU / 0.5 GB", 0.25),
                        SelectChoice::new("0.5vcpu-1gb", "0.5 vCPU / 1 GB", 0.5),
                        SelectChoice::new("1vcpu-2gb", "1 vCPU / 2 GB", 1.0),
                        SelectChoice::new("2vcpu-4gb", "2 vCPU / 4 GB", 2.0),
                        SelectChoice::new("4vcpu-8gb", "4 vCPU / 8 GB", 4.0),
                    ],
                ),
                ConfigurableOption::number("taskCount", "Running Tasks", 2.0, OptionEffect::Multiply),
            ],
        ),
        service(
            "eks",
            "Amazon EKS",
            ServiceCategory::Containers,
            "#F58536",
            "☸️",
            73.0,
            "per cluster/month",
            "Managed Kubernetes control plane with worker nodes",
            vec![ConfigurableOption::number(
                "nodeCount",
                "Worker Nodes (t3.medium)",
                2.0,
                OptionEffect::PerUnit { rate: 30.37 },
            )],
        ),
        // Storage
        service(
            "s3",
            "Amazon S3",
            ServiceCategory::Storage,
            "#569A31",
            "🪣",
            0.40,
            "per bucket/month + storage",
            "Object storage",
            vec![
                ConfigurableOption::number(
                    "storageGb",
                    "Storage (GB)",
                    100.0,
                    OptionEffect::PerUnit { rate: 0.023 },
                ),
                ConfigurableOption::select(
                    "storageClass",
                    "Storage Class",
                    "STANDARD",
                    vec![
                        SelectChoice::new("STANDARD", "Standard", 1.0),
                        SelectChoice::new("STANDARD_IA", "Standard-IA", 0.54),
                        SelectChoice::new("GLACIER_IR", "Glacier Instant Retrieval", 0.17),
                    ],
                ),
                ConfigurableOption::toggle(
                    "versioning",
                    "Versioning",
                    false,
                    OptionEffect::MultiplyWhenEnabled { factor: 1.3 },
                ),
            ],
        ),
        service(
            "ebs",
            "Amazon EBS",
            ServiceCategory::Storage,
            "#569A31",
            "💽",
            0.0,
            "per GB-month",
            "Block storage volumes",
            vec![
                ConfigurableOption::number(
                    "volumeSizeGb",
                    "Volume Size (GB)",
                    100.0,
                    OptionEffect::PerUnit { rate: 0.08 },
                ),
                ConfigurableOption::select(
                    "volumeType",
                    "Volume Type",
                    "gp3",
                    vec![
                        SelectChoice::new("gp3", "General Purpose SSD (gp3)", 1.0),
                        SelectChoice::new("gp2", "General Purpose SSD (gp2)", 1.25),
                        SelectChoice::new("io2", "Provisioned IOPS SSD (io2)", 1.56),
                        SelectChoice::new("st1", "Throughput Optimized HDD (st1)", 0.56),
                    ],
                ),
            ],
        ),
        // Database
        service(
            "rds",
            "Amazon RDS",
            ServiceCategory::Database,
            "#3B48CC",
            "🗄️",
            49.64,
            "per instance/month",
            "Managed relational databases",
            vec![
                ConfigurableOption::select(
                    "engine",
                    "Engine",
                    "postgres",
                    vec![
                        SelectChoice::new("postgres", "PostgreSQL", 1.0),
                        SelectChoice::new("mysql", "MySQL", 1.0),
                        SelectChoice::new("mariadb", "MariaDB", 1.0),
                        SelectChoice::new("sqlserver-ex", "SQL Server Express", 1.4),
                    ],
                ),
                ConfigurableOption::select(
                    "instanceClass",
                    "Instance Class",
                    "db.t3.medium",
                    vec![
                        SelectChoice::new("db.t3.micro", "db.t3.micro", 0.25),
                        SelectChoice::new("db.t3.medium", "db.t3.medium", 1.0),
                        SelectChoice::new("db.r5.large", "db.r5.large", 3.6),
                        SelectChoice::new("db.r5.xlarge", "db.r5.xlarge", 7.2),
                    ],
                ),
                ConfigurableOption::number(
                    "allocatedStorage",
                    "Storage (GB)",
                    20.0,
                    OptionEffect::PerUnit { rate: 0.115 },
                ),
                ConfigurableOption::toggle(
                    "multiAz",
                    "Multi-AZ",
                    false,
                    OptionEffect::MultiplyWhenEnabled { factor: 2.0 },
                ),
            ],
        ),
        service(
            "dynamodb",
            "Amazon DynamoDB",
            ServiceCategory::Database,
            "#3B48CC",
            "⚡",
            1.25,
            "per million writes",
            "On-demand NoSQL key-value store",
            vec![
                ConfigurableOption::number(
                    "writeRequestsMillions",
                    "Writes (millions/month)",
                    1.0,
                    OptionEffect::Multiply,
                ),
                ConfigurableOption::number(
                    "readRequestsMillions",
                    "Reads (millions/month)",
                    5.0,
                    OptionEffect::PerUnit { rate: 0.25 },
                ),
                ConfigurableOption::number(
                    "storageGb",
                    "Storage (GB)",
                    25.0,
                    OptionEffect::PerUnit { rate: 0.25 },
                ),
            ],
        ),
        service(
            "elasticache",
            "Amazon ElastiCache",
            ServiceCategory::Database,
            "#C925D1",
            "🧠",
            24.82,
            "per node/month",
            "Managed Redis and Memcached",
            vec![
                ConfigurableOption::select(
                    "nodeType",
                    "Node Type",
                    "cache.t3.small",
                    vec![
                        SelectChoice::new("cache.t3.micro", "cache.t3.micro", 0.5),
                        SelectChoice::new("cache.t3.small", "cache.t3.small", 1.0),
                        SelectChoice::new("cache.m5.large", "cache.m5.large", 4.6),
                    ],
                ),
                ConfigurableOption::number("numCacheNodes", "Nodes", 1.0, OptionEffect::Multiply),
            ],
        ),
        // Networking
        service(
            "alb",
            "Application Load Balancer",
            ServiceCategory::Networking,
            "#8C4FFF",
            "⚖️",
            16.43,
            "per load balancer/month",
            "Layer 7 load balancing",
            vec![ConfigurableOption::number(
                "lcuCount",
                "Load Balancer Capacity Units",
                1.0,
                OptionEffect::PerUnit { rate: 5.84 },
            )],
        ),
        service(
            "cloudfront",
            "Amazon CloudFront",
            ServiceCategory::Networking,
            "#8C4FFF",
            "🌐",
            0.0,
            "per GB transferred",
            "Content delivery network",
            vec![
                ConfigurableOption::number(
                    "dataTransferGb",
                    "Data Transfer Out (GB)",
                    100.0,
                    OptionEffect::PerUnit { rate: 0.085 },
                ),
                ConfigurableOption::toggle(
                    "originShield",
                    "Origin Shield",
                    false,
                    OptionEffect::AddWhenEnabled { amount: 10.0 },
                ),
            ],
        ),
        service(
            "nat-gateway",
            "NAT Gateway",
            ServiceCategory::Networking,
            "#8C4FFF",
            "🔀",
            32.85,
            "per gateway/month",
            "Outbound internet access for private subnets",
            vec![
                ConfigurableOption::number(
                    "dataProcessedGb",
                    "Data Processed (GB)",
                    100.0,
                    OptionEffect::PerUnit { rate: 0.045 },
                ),
                ConfigurableOption::number(
                    "gatewayCount",
                    "Gateways",
                    1.0,
                    OptionEffect::Multiply,
                ),
            ],
        ),
        // Integration
        service(
            "api-gateway",
            "Amazon API Gateway",
            ServiceCategory::Integration,
            "#E7157B",
            "🚪",
            3.50,
            "per million requests",
            "Managed REST and HTTP APIs",
            vec![
                ConfigurableOption::number(
                    "requestsMillions",
                    "Requests (millions/month)",
                    1.0,
                    OptionEffect::Multiply,
                ),
                ConfigurableOption::toggle(
                    "caching",
                    "Response Caching (0.5 GB)",
                    false,
                    OptionEffect::AddWhenEnabled { amount: 14.60 },
                ),
            ],
        ),
        service(
            "sqs",
            "Amazon SQS",
            ServiceCategory::Integration,
            "#E7157B",
            "📨",
            0.40,
            "per million requests",
            "Managed message queues",
            vec![
                ConfigurableOption::number(
                    "requestsMillions",
                    "Requests (millions/month)",
                    1.0,
                    OptionEffect::Multiply,
                ),
                ConfigurableOption::toggle(
                    "fifo",
                    "FIFO Queue",
                    false,
                    OptionEffect::MultiplyWhenEnabled { factor: 1.25 },
                ),
            ],
        ),
        service(
            "sns",
            "Amazon SNS",
            ServiceCategory::Integration,
            "#E7157B",
            "📣",
            0.50,
            "per million publishes",
            "Pub/sub notifications",
            vec![ConfigurableOption::number(
                "publishesMillions",
                "Publishes (millions/month)",
                1.0,
                OptionEffect::Multiply,
            )],
        ),
        // Analytics
        service(
            "kinesis",
            "Kinesis Data Streams",
            ServiceCategory::Analytics,
            "#8C4FFF",
            "🌊",
            10.95,
            "per shard/month",
            "Real-time data streaming",
            vec![
                ConfigurableOption::number("shardCount", "Shards", 1.0, OptionEffect::Multiply),
                ConfigurableOption::toggle(
                    "enhancedFanOut",
                    "Enhanced Fan-Out",
                    false,
                    OptionEffect::AddWhenEnabled { amount: 36.0 },
                ),
            ],
        ),
    ]
}
