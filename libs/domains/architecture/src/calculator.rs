//! Cost Calculator
//!
//! Pure pricing: `(service, configuration, region) -> monthly cost`.
//! The calculator knows nothing about individual services; every option
//! carries its own [`OptionEffect`] and the calculator only folds them over the
//! base price before applying the region multiplier.

use std::sync::Arc;

use crate::catalog::RegionCatalog;
use crate::models::{
    ConfigValue, ConfigurableOption, NodeConfig, OptionEffect, ServiceDefinition,
};

impl OptionEffect {
    /// Apply this effect to the running price
    pub fn apply(&self, option: &ConfigurableOption, value: &ConfigValue, price: f64) -> f64 {
        match self {
            Self::None => price,
            Self::Multiply => price * number_or_default(option, value),
            Self::PerUnit { rate } => price + rate * number_or_default(option, value),
            Self::ChoiceFactor => price * choice_factor(option, value),
            Self::AddWhenEnabled { amount } => {
                if flag_or_default(option, value) {
                    price + amount
                } else {
                    price
                }
            }
            Self::MultiplyWhenEnabled { factor } => {
                if flag_or_default(option, value) {
                    price * factor
                } else {
                    price
                }
            }
        }
    }
}

fn number_or_default(option: &ConfigurableOption, value: &ConfigValue) -> f64 {
    value
        .as_number()
        .or_else(|| {
            tracing::warn!(option = %option.id, value = %value, "Non-numeric option value, using default");
            option.default.as_number()
        })
        .unwrap_or(0.0)
}

fn flag_or_default(option: &ConfigurableOption, value: &ConfigValue) -> bool {
    value
        .as_bool()
        .or_else(|| {
            tracing::warn!(option = %option.id, value = %value, "Non-boolean option value, using default");
            option.default.as_bool()
        })
        .unwrap_or(false)
}

fn choice_factor(option: &ConfigurableOption, value: &ConfigValue) -> f64 {
    let selected = value.to_string();
    option
        .choice(&selected)
        .or_else(|| {
            tracing::warn!(option = %option.id, value = %selected, "Unknown choice, using default");
            option.choice(&option.default.to_string())
        })
        .map(|choice| choice.factor)
        .unwrap_or(1.0)
}

/// Computes monthly service costs for a region catalog
#[derive(Debug, Clone)]
pub struct CostCalculator {
    regions: Arc<RegionCatalog>,
}

impl CostCalculator {
    pub fn new(regions: Arc<RegionCatalog>) -> Self {
        Self { regions }
    }

    pub fn regions(&self) -> &RegionCatalog {
        &self.regions
    }

    /// Price of a configured service before region adjustment
    ///
    /// Missing option values use the option default; config keys that are not
    /// declared options are ignored.
    pub fn list_price(&self, service: &ServiceDefinition, config: &NodeConfig) -> f64 {
        service
            .configurable_options
            .iter()
            .fold(service.base_price, |price, option| {
                let value = config.get(&option.id).unwrap_or(&option.default);
                option.effect.apply(option, value, price)
            })
    }

    /// Monthly cost of a configured service in a region, never negative
    pub fn cost(&self, service: &ServiceDefinition, config: &NodeConfig, region: &str) -> f64 {
        let cost = self.list_price(service, config) * self.regions.price_multiplier(region);
        // f64::max drops NaN in favour of 0.0
        cost.max(0.0)
    }

    /// Cost of a service with every option at its default
    pub fn starting_price(&self, service: &ServiceDefinition, region: &str) -> f64 {
        self.cost(service, &NodeConfig::new(), region)
    }
}

impl Default for CostCalculator {
    fn default() -> Self {
        Self::new(Arc::new(RegionCatalog::aws()))
    }
}
