//! SurrealDB implementation of [`CategoryRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use vitrina_core::error::VitrinaResult;
use vitrina_core::models::category::{Category, CreateCategory, UpdateCategory};
use vitrina_core::repository::CategoryRepository;

use crate::error::{DbError, parse_uuid};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct CategoryRow {
    name: String,
    image: Option<String>,
    parent_id: Option<String>,
    parent_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct CategoryRowWithId {
    record_id: String,
    name: String,
    image: Option<String>,
    parent_id: Option<String>,
    parent_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CategoryRowWithId {
    fn try_into_category(self) -> Result<Category, DbError> {
        let id = parse_uuid(&self.record_id, "category")?;
        row_to_category(
            CategoryRow {
                name: self.name,
                image: self.image,
                parent_id: self.parent_id,
                parent_name: self.parent_name,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            id,
        )
    }
}

fn row_to_category(row: CategoryRow, id: Uuid) -> Result<Category, DbError> {
    let parent_id = row
        .parent_id
        .map(|p| parse_uuid(&p, "parent"))
        .transpose()?;
    Ok(Category {
        id,
        name: row.name,
        image: row.image,
        parent_id,
        parent_name: row.parent_name,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// SurrealDB implementation of the Category repository.
#[derive(Clone)]
pub struct SurrealCategoryRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCategoryRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CategoryRepository for SurrealCategoryRepository<C> {
    async fn create(&self, input: CreateCategory) -> VitrinaResult<Category> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('category', $id) SET \
                 name = $name, image = $image, \
                 parent_id = $parent_id, parent_name = $parent_name",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("image", input.image))
            .bind(("parent_id", input.parent_id.map(|p| p.to_string())))
            .bind(("parent_name", input.parent_name))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<CategoryRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "category".into(),
            id: id_str,
        })?;

        row_to_category(row, id).map_err(Into::into)
    }

    async fn get_by_id(&self, id: Uuid) -> VitrinaResult<Category> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('category', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CategoryRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "category".into(),
            id: id_str,
        })?;

        row_to_category(row, id).map_err(Into::into)
    }

    async fn update(&self, id: Uuid, input: UpdateCategory) -> VitrinaResult<Category> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.image.is_some() {
            sets.push("image = $image");
        }
        if input.parent_id.is_some() {
            sets.push("parent_id = $parent_id");
        }
        if input.parent_name.is_some() {
            sets.push("parent_name = $parent_name");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('category', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(image) = input.image {
            builder = builder.bind(("image", image));
        }
        if let Some(parent_id) = input.parent_id {
            builder = builder.bind(("parent_id", parent_id.map(|p| p.to_string())));
        }
        if let Some(parent_name) = input.parent_name {
            builder = builder.bind(("parent_name", parent_name));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<CategoryRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "category".into(),
            id: id_str,
        })?;

        row_to_category(row, id).map_err(Into::into)
    }

    async fn delete(&self, id: Uuid) -> VitrinaResult<()> {
        self.db
            .query("DELETE type::record('category', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        Ok(())
    }

    async fn list(&self) -> VitrinaResult<Vec<Category>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM category \
                 ORDER BY created_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CategoryRowWithId> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .map(|row| row.try_into_category())
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }

    async fn get_children(&self, parent_id: Uuid) -> VitrinaResult<Vec<Category>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM category \
                 WHERE parent_id = $parent_id \
                 ORDER BY created_at ASC",
            )
            .bind(("parent_id", parent_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CategoryRowWithId> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .map(|row| row.try_into_category())
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }

    async fn set_parent_name_for_children(
        &self,
        parent_id: Uuid,
        parent_name: &str,
    ) -> VitrinaResult<u64> {
        let result = self
            .db
            .query(
                "UPDATE category SET parent_name = $parent_name, \
                 updated_at = time::now() \
                 WHERE parent_id = $parent_id",
            )
            .bind(("parent_id", parent_id.to_string()))
            .bind(("parent_name", parent_name.to_string()))
            .await
            .map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<CategoryRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.len() as u64)
    }
}
