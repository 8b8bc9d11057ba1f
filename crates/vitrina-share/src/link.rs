//! Request and result types for shareable links.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// How long a newly issued link stays usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkExpiry {
    Days(u32),
    Never,
}

impl LinkExpiry {
    pub const ONE_DAY: Self = Self::Days(1);
    pub const ONE_WEEK: Self = Self::Days(7);
    pub const ONE_MONTH: Self = Self::Days(30);
    pub const THREE_MONTHS: Self = Self::Days(90);

    /// Expiry instant for a link issued at `issued_at`.
    pub fn expires_at(self, issued_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Days(days) => Some(issued_at + Duration::days(i64::from(days))),
            Self::Never => None,
        }
    }
}

/// Input for [`ShareableLinkService::generate_link`].
///
/// [`ShareableLinkService::generate_link`]: crate::ShareableLinkService::generate_link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateLink {
    pub expiry: LinkExpiry,
    pub requires_code: bool,
    /// Ignored unless `requires_code` is set.
    pub access_code: Option<String>,
}

/// Why a token was refused. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkRejection {
    NotFound,
    WrongType,
    Expired,
    BadCode,
}

impl LinkRejection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::WrongType => "wrong_type",
            Self::Expired => "expired",
            Self::BadCode => "bad_code",
        }
    }
}

impl fmt::Display for LinkRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of checking a token against a module and access code.
///
/// Serializes as `{"valid": true}` or `{"valid": false, "reason": "..."}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkValidation {
    Valid,
    Invalid { reason: LinkRejection },
}

impl LinkValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn rejection(&self) -> Option<LinkRejection> {
        match self {
            Self::Valid => None,
            Self::Invalid { reason } => Some(*reason),
        }
    }
}

impl From<LinkRejection> for LinkValidation {
    fn from(reason: LinkRejection) -> Self {
        Self::Invalid { reason }
    }
}

#[derive(Serialize)]
struct ValidationBody {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<LinkRejection>,
}

impl Serialize for LinkValidation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ValidationBody {
            valid: self.is_valid(),
            reason: self.rejection(),
        }
        .serialize(serializer)
    }
}
