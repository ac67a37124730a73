//! Architecture Domain
//!
//! Sketch a multi-region cloud architecture, price it live against a
//! service and region catalog, save it through a persistence gateway and
//! export it as CloudFormation or Terraform.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐      ┌──────────────────┐
//! │ ArchitectureSvc  │      │     Designer     │  ← Session: graph + saved identity
//! └────────┬─────────┘      └───┬──────────┬───┘
//!          │                    │          │
//! ┌────────▼─────────┐  ┌───────▼──────┐ ┌─▼──────────────┐
//! │    Repository    │  │  Calculator  │ │    Export      │  ← CloudFormation / Terraform
//! │ (trait + HTTP)   │  └───────┬──────┘ └────────────────┘
//! └────────┬─────────┘          │
//!          │             ┌──────▼───────┐
//! ┌────────▼─────────┐   │   Catalogs   │  ← Services, regions
//! │    Snapshots     │   └──────────────┘
//! └──────────────────┘
//! ```
//!
//! Catalog misses (a retired service id, an unknown region code) never
//! fail: they are priced at a safe default, logged and counted.

pub mod architecture;
pub mod calculator;
pub mod catalog;
pub mod client;
pub mod designer;
pub mod error;
pub mod export;
pub mod metrics;
pub mod models;
pub mod repository;
pub mod service;
pub mod snapshot;

// Re-export commonly used types
pub use architecture::Architecture;
pub use calculator::CostCalculator;
pub use catalog::{CategoryGroup, RegionCatalog, ServiceCatalog};
pub use client::HttpArchitectureRepository;
pub use designer::{ConfigUpdate, Designer};
pub use error::{ArchitectureError, ArchitectureResult};
pub use export::ExportFormat;
pub use crate::metrics::ArchitectureMetrics;
pub use models::{
    ArchitectureMeta, CanvasFields, ConfigValue, ConfigurableOption, Connection, CostBreakdown,
    NodeConfig, NodeCost, OptionEffect, OptionKind, Position, RegionCost, RegionDefinition,
    SelectChoice, ServiceCategory, ServiceDefinition, ServiceNode, DEFAULT_REGION,
};
pub use repository::ArchitectureRepository;
pub use service::ArchitectureService;
pub use snapshot::{
    ArchitectureList, CreateArchitecture, ListParams, SaveRequest, SavedArchitecture,
    SnapshotEdge, SnapshotNode, SnapshotNodeData, UpdateArchitecture,
};
