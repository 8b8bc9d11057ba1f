//! Product domain model.
//!
//! Products are owned by the wider panel; the catalog core only reads
//! their placement fields. Each level carries both an id field and a
//! name field because older records reference categories by name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub category_name: Option<String>,
    pub subcategory: Option<String>,
    pub subcategory_name: Option<String>,
    pub third_category: Option<String>,
    pub third_category_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateProduct {
    pub name: String,
    pub category: Option<String>,
    pub category_name: Option<String>,
    pub subcategory: Option<String>,
    pub subcategory_name: Option<String>,
    pub third_category: Option<String>,
    pub third_category_name: Option<String>,
}
