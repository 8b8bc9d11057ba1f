//! Category domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Position of a category in the three-level catalog tree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CategoryLevel {
    Main,
    Sub,
    Third,
}

impl CategoryLevel {
    /// Map a tree depth (0 = root) to its level. Depths past the third
    /// level have no product placement field and yield `None`.
    pub fn from_depth(depth: usize) -> Option<Self> {
        match depth {
            0 => Some(Self::Main),
            1 => Some(Self::Sub),
            2 => Some(Self::Third),
            _ => None,
        }
    }

    pub fn depth(self) -> usize {
        match self {
            Self::Main => 0,
            Self::Sub => 1,
            Self::Third => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    /// Display image URL. Only root categories carry one.
    pub image: Option<String>,
    pub parent_id: Option<Uuid>,
    /// Denormalized copy of the parent's name for display.
    pub parent_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub image: Option<String>,
    pub parent_id: Option<Uuid>,
    pub parent_name: Option<String>,
}

/// Partial update. For the nested options, `Some(Some(val))` = set,
/// `Some(None)` = clear, `None` = no change.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub image: Option<Option<String>>,
    pub parent_id: Option<Option<Uuid>>,
    pub parent_name: Option<Option<String>>,
}
