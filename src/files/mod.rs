//! File metadata registry, parameterized per dashboard

mod config;
mod registry;

pub use config::{
    Capabilities, Capability, CategoryRule, DashboardConfig, DashboardVariant,
};
pub use registry::{CategoryListing, FileRegistry, RegistryStats};
