//! SurrealDB implementation of [`ProductRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use vitrina_core::error::VitrinaResult;
use vitrina_core::models::category::CategoryLevel;
use vitrina_core::models::product::{CreateProduct, Product};
use vitrina_core::repository::ProductRepository;

use super::CountRow;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ProductRow {
    name: String,
    category: Option<String>,
    category_name: Option<String>,
    subcategory: Option<String>,
    subcategory_name: Option<String>,
    third_category: Option<String>,
    third_category_name: Option<String>,
    created_at: DateTime<Utc>,
}

fn row_to_product(row: ProductRow, id: Uuid) -> Product {
    Product {
        id,
        name: row.name,
        category: row.category,
        category_name: row.category_name,
        subcategory: row.subcategory,
        subcategory_name: row.subcategory_name,
        third_category: row.third_category,
        third_category_name: row.third_category_name,
        created_at: row.created_at,
    }
}

/// Placement field pair `(id field, name field)` for a tree level.
fn placement_fields(level: CategoryLevel) -> (&'static str, &'static str) {
    match level {
        CategoryLevel::Main => ("category", "category_name"),
        CategoryLevel::Sub => ("subcategory", "subcategory_name"),
        CategoryLevel::Third => ("third_category", "third_category_name"),
    }
}

/// SurrealDB implementation of the Product repository.
#[derive(Clone)]
pub struct SurrealProductRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProductRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProductRepository for SurrealProductRepository<C> {
    async fn create(&self, input: CreateProduct) -> VitrinaResult<Product> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('product', $id) SET \
                 name = $name, \
                 category = $category, category_name = $category_name, \
                 subcategory = $subcategory, subcategory_name = $subcategory_name, \
                 third_category = $third_category, \
                 third_category_name = $third_category_name",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("category", input.category))
            .bind(("category_name", input.category_name))
            .bind(("subcategory", input.subcategory))
            .bind(("subcategory_name", input.subcategory_name))
            .bind(("third_category", input.third_category))
            .bind(("third_category_name", input.third_category_name))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<ProductRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "product".into(),
            id: id_str,
        })?;

        Ok(row_to_product(row, id))
    }

    async fn get_by_id(&self, id: Uuid) -> VitrinaResult<Product> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('product', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProductRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "product".into(),
            id: id_str,
        })?;

        Ok(row_to_product(row, id))
    }

    async fn count_matching(
        &self,
        level: CategoryLevel,
        category_id: Uuid,
        category_name: &str,
    ) -> VitrinaResult<u64> {
        let (id_field, name_field) = placement_fields(level);

        // Field names come from the fixed table above, never from input.
        let query = format!(
            "SELECT count() AS total FROM product \
             WHERE {id_field} = $category_id OR {name_field} = $category_name \
             GROUP ALL"
        );

        let mut result = self
            .db
            .query(query)
            .bind(("category_id", category_id.to_string()))
            .bind(("category_name", category_name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_level_has_distinct_fields() {
        let main = placement_fields(CategoryLevel::Main);
        let sub = placement_fields(CategoryLevel::Sub);
        let third = placement_fields(CategoryLevel::Third);
        assert_ne!(main, sub);
        assert_ne!(sub, third);
        assert_eq!(third, ("third_category", "third_category_name"));
    }
}
