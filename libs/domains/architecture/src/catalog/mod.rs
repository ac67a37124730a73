//! Static service and region catalogs.
//!
//! Lookups return `Option` and never fail: callers decide how to treat a
//! retired service id or an unknown region code.

pub mod regions;
pub mod services;

pub use regions::{RegionCatalog, aws_regions};
pub use services::{CategoryGroup, ServiceCatalog, aws_services};
