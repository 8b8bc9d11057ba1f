//! Vitrina Catalog — the category hierarchy: cycle-safe re-parenting,
//! orphan promotion on delete, and product-count aggregation.

pub mod config;
pub mod service;
pub mod tree;

pub use config::CatalogConfig;
pub use service::{CategoryHierarchy, DeleteOutcome, EditCategory};
pub use tree::CategoryNode;
