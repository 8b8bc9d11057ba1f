//! Sharing configuration.

use serde::Deserialize;

/// Configuration for the shareable link service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Shortest access code callers should accept (default: 4).
    ///
    /// Shorter codes are still stored when issued; see
    /// [`ShareableLinkService::check_access_code`].
    ///
    /// [`ShareableLinkService::check_access_code`]: crate::ShareableLinkService::check_access_code
    pub min_access_code_length: usize,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            min_access_code_length: 4,
        }
    }
}
