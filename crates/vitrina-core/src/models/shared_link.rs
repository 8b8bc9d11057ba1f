//! Shared link domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A capability link granting access to one panel module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedLink {
    pub id: Uuid,
    /// 32 lowercase hex characters.
    pub token: String,
    /// Module tag, e.g. `"employees"`.
    pub link_type: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    /// `None` means the link never expires.
    pub expires_at: Option<DateTime<Utc>>,
    pub requires_code: bool,
    /// Present only when `requires_code` is set.
    pub access_code: Option<String>,
    pub usage_count: u64,
}

impl SharedLink {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSharedLink {
    pub token: String,
    pub link_type: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub requires_code: bool,
    pub access_code: Option<String>,
}
