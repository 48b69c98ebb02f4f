pub mod catalog;
pub mod registry;

pub use catalog::{register_catalog_tools, sample_registry, CatalogStore};
pub use registry::{Tool, ToolRegistry};
