//! Catalog configuration.

use serde::Deserialize;

/// Configuration for the category hierarchy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Number of tree levels allowed (default: 3 = main, sub, third).
    pub max_depth: usize,
    /// Reject inserts and moves that would exceed `max_depth`
    /// (default: true). When false the limit is left to callers.
    pub enforce_depth_limit: bool,
    /// Upper bound on parent links followed when walking ancestors
    /// (default: 50). Guards against corrupted data.
    pub max_ancestor_walk: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            enforce_depth_limit: true,
            max_ancestor_walk: 50,
        }
    }
}
