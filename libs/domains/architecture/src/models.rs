use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use strum::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Region every new node lands in unless the designer says otherwise
pub const DEFAULT_REGION: &str = "us-east-1";

/// Current configuration of a placed node, keyed by option id
pub type NodeConfig = BTreeMap<String, ConfigValue>;

/// A single configuration value
///
/// Serialized untagged so that canvas payloads (`3`, `"t3.large"`, `true`)
/// round-trip without a wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum ConfigValue {
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl ConfigValue {
    /// Read the value as a number; numeric text is accepted
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Number(_) => None,
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            Self::Boolean(_) => None,
        }
    }

    /// Read the value as a flag; `"true"`/`"false"` text and non-zero numbers are accepted
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            Self::Number(n) => Some(*n != 0.0),
            Self::Text(s) => s.trim().parse::<bool>().ok(),
        }
    }

    /// The option kind this value naturally belongs to
    pub fn kind(&self) -> OptionKind {
        match self {
            Self::Boolean(_) => OptionKind::Toggle,
            Self::Number(_) => OptionKind::Number,
            Self::Text(_) => OptionKind::Select,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Input widget type of a configurable option
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, TS,
)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OptionKind {
    Number,
    Select,
    Toggle,
}

/// One entry of a `select` option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SelectChoice {
    pub value: String,
    pub label: String,
    /// Price factor applied when this choice is selected
    #[serde(default = "default_factor")]
    pub factor: f64,
}

fn default_factor() -> f64 {
    1.0
}

impl SelectChoice {
    pub fn new(value: &str, label: &str, factor: f64) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            factor,
        }
    }
}

/// How an option's value changes the price of its service
///
/// Effects are applied in option declaration order, each one receiving the
/// running price produced by the options before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptionEffect {
    /// Informational only
    None,
    /// price × value (instance counts, request volume)
    Multiply,
    /// price + rate × value (storage size, data transfer)
    PerUnit { rate: f64 },
    /// price × factor of the selected choice (instance class)
    ChoiceFactor,
    /// price + amount when enabled
    AddWhenEnabled { amount: f64 },
    /// price × factor when enabled (multi-AZ replicas)
    MultiplyWhenEnabled { factor: f64 },
}

impl OptionEffect {
    /// The option kind this effect can be attached to, if restricted
    pub fn expected_kind(&self) -> Option<OptionKind> {
        match self {
            Self::None => None,
            Self::Multiply | Self::PerUnit { .. } => Some(OptionKind::Number),
            Self::ChoiceFactor => Some(OptionKind::Select),
            Self::AddWhenEnabled { .. } | Self::MultiplyWhenEnabled { .. } => {
                Some(OptionKind::Toggle)
            }
        }
    }
}

/// A configurable knob of a catalog service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurableOption {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub default: ConfigValue,
    #[serde(default, skip_serializing_if = "Vec::is_empty", rename = "options")]
    pub choices: Vec<SelectChoice>,
    pub effect: OptionEffect,
}

impl ConfigurableOption {
    pub fn number(id: &str, label: &str, default: f64, effect: OptionEffect) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind: OptionKind::Number,
            default: ConfigValue::Number(default),
            choices: Vec::new(),
            effect,
        }
    }

    pub fn select(id: &str, label: &str, default: &str, choices: Vec<SelectChoice>) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind: OptionKind::Select,
            default: ConfigValue::Text(default.to_string()),
            choices,
            effect: OptionEffect::ChoiceFactor,
        }
    }

    pub fn toggle(id: &str, label: &str, default: bool, effect: OptionEffect) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind: OptionKind::Toggle,
            default: ConfigValue::Boolean(default),
            choices: Vec::new(),
            effect,
        }
    }

    /// Find a select choice by its value
    pub fn choice(&self, value: &str) -> Option<&SelectChoice> {
        self.choices.iter().find(|c| c.value == value)
    }
}

/// Service category used to group the palette
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    TS,
)]
#[ts(export)]
pub enum ServiceCategory {
    Compute,
    Containers,
    Storage,
    Database,
    Networking,
    Integration,
    Analytics,
}

/// Immutable catalog entry describing a placeable service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDefinition {
    /// Unique identifier (e.g., "ec2", "rds")
    pub id: String,
    /// Display name
    pub name: String,
    pub category: ServiceCategory,
    /// Palette color (hex)
    pub color: String,
    pub icon: String,
    /// Monthly price before configuration and region adjustment
    pub base_price: f64,
    /// Display unit for `base_price` (e.g., "per instance/month")
    pub pricing_unit: String,
    pub description: String,
    pub configurable_options: Vec<ConfigurableOption>,
}

impl ServiceDefinition {
    /// Configuration seeded from every option's default
    pub fn default_config(&self) -> NodeConfig {
        self.configurable_options
            .iter()
            .map(|opt| (opt.id.clone(), opt.default.clone()))
            .collect()
    }

    pub fn option(&self, option_id: &str) -> Option<&ConfigurableOption> {
        self.configurable_options
            .iter()
            .find(|opt| opt.id == option_id)
    }
}

/// Immutable catalog entry describing a deployment region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RegionDefinition {
    /// Region code (e.g., "us-east-1")
    pub code: String,
    /// Display name (e.g., "US East (N. Virginia)")
    pub name: String,
    /// Scalar applied to every service price in this region
    pub price_multiplier: f64,
    pub availability_zones: Vec<String>,
    /// Canvas border color (hex)
    pub color: String,
}

/// Canvas coordinates; layout only, no cost semantics
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// JSON fields the canvas stores that the designer does not interpret
///
/// Kept as loaded so a save writes them back untouched.
pub type CanvasFields = serde_json::Map<String, serde_json::Value>;

/// A placed instance of a catalog service
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceNode {
    /// Unique within the architecture, e.g. "ec2-1718000000000"
    pub id: String,
    /// Catalog service this node instantiates (may be retired from the catalog)
    pub service_id: String,
    pub label: String,
    pub config: NodeConfig,
    pub region: String,
    /// `None` means any zone
    pub availability_zone: Option<String>,
    pub position: Position,
    /// Top-level canvas fields such as `style`
    pub canvas: CanvasFields,
    /// Extra keys of the canvas `data` object, e.g. an embedded `service`
    pub canvas_data: CanvasFields,
}

/// Directed edge between two nodes; no cost effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Unique within the architecture
    pub id: String,
    pub source: String,
    pub target: String,
    /// Canvas fields such as the edge `type`
    pub canvas: CanvasFields,
}

impl Connection {
    /// Edge with the conventional `edge-<source>-<target>` id
    ///
    /// The id is not unique on its own when node ids contain hyphens;
    /// [`crate::Architecture`] suffixes it when it is already taken.
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            id: format!("edge-{source}-{target}"),
            source: source.to_string(),
            target: target.to_string(),
            canvas: CanvasFields::new(),
        }
    }

    /// Whether either endpoint is the given node
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Identity of an architecture once it has been saved through the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchitectureMeta {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
}

/// Monthly cost of one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NodeCost {
    pub node_id: String,
    pub service_id: String,
    pub label: String,
    pub region: String,
    pub monthly_cost: f64,
}

/// Monthly cost of all nodes in one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RegionCost {
    pub region: String,
    /// Display name, or the code itself when the region is not in the catalog
    pub region_name: String,
    pub monthly_cost: f64,
    /// Share of the total in percent; 0 when the total is 0
    pub share_percent: f64,
}

/// Derived cost view of an architecture; never persisted
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CostBreakdown {
    pub nodes: Vec<NodeCost>,
    /// Ordered by first use of each region
    pub by_region: Vec<RegionCost>,
    pub total: f64,
}
