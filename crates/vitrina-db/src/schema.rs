//! Table definitions for the catalog and link collections, and the
//! versioned migration runner that installs them.
//!
//! All table definitions use SCHEMAFULL mode. UUIDs are stored as
//! strings; record ids are the UUIDs themselves.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

/// Bookkeeping table; one row per applied schema version.
const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct AppliedVersion {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "catalog_and_links",
    sql: SCHEMA_V1,
}];

fn pending(applied: u32) -> impl Iterator<Item = &'static Migration> {
    MIGRATIONS.iter().filter(move |m| m.version > applied)
}

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Categories (three-level tree linked through parent_id)
-- =======================================================================
DEFINE TABLE category SCHEMAFULL;
DEFINE FIELD name ON TABLE category TYPE string \
    ASSERT string::len(string::trim($value)) > 0;
DEFINE FIELD image ON TABLE category TYPE option<string>;
DEFINE FIELD parent_id ON TABLE category TYPE option<string>;
DEFINE FIELD parent_name ON TABLE category TYPE option<string>;
DEFINE FIELD created_at ON TABLE category TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE category TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_category_parent ON TABLE category COLUMNS parent_id;

-- =======================================================================
-- Products (placement fields reference categories by id or by name)
-- =======================================================================
DEFINE TABLE product SCHEMAFULL;
DEFINE FIELD name ON TABLE product TYPE string;
DEFINE FIELD category ON TABLE product TYPE option<string>;
DEFINE FIELD category_name ON TABLE product TYPE option<string>;
DEFINE FIELD subcategory ON TABLE product TYPE option<string>;
DEFINE FIELD subcategory_name ON TABLE product TYPE option<string>;
DEFINE FIELD third_category ON TABLE product TYPE option<string>;
DEFINE FIELD third_category_name ON TABLE product TYPE option<string>;
DEFINE FIELD created_at ON TABLE product TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_product_category ON TABLE product COLUMNS category;
DEFINE INDEX idx_product_subcategory ON TABLE product COLUMNS subcategory;
DEFINE INDEX idx_product_third_category ON TABLE product \
    COLUMNS third_category;

-- =======================================================================
-- Shared links
-- =======================================================================
DEFINE TABLE shared_link SCHEMAFULL;
DEFINE FIELD token ON TABLE shared_link TYPE string;
DEFINE FIELD link_type ON TABLE shared_link TYPE string;
DEFINE FIELD created_by ON TABLE shared_link TYPE string;
DEFINE FIELD created_at ON TABLE shared_link TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD expires_at ON TABLE shared_link TYPE option<datetime>;
DEFINE FIELD requires_code ON TABLE shared_link TYPE bool DEFAULT false;
DEFINE FIELD access_code ON TABLE shared_link TYPE option<string>;
DEFINE FIELD usage_count ON TABLE shared_link TYPE int DEFAULT 0 \
    ASSERT $value >= 0;
DEFINE INDEX idx_shared_link_token ON TABLE shared_link \
    COLUMNS token UNIQUE;
DEFINE INDEX idx_shared_link_type ON TABLE shared_link COLUMNS link_type;
";

/// Highest schema version recorded in the store, or 0 for a fresh one.
pub async fn schema_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let rows: Vec<AppliedVersion> = result.take(0)?;
    Ok(rows.into_iter().next().map_or(0, |r| r.version))
}

/// Bring the store up to the latest schema.
///
/// Each migration is sent in one request together with its
/// `_migration` row.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    let applied = schema_version(db).await?;

    for migration in pending(applied) {
        info!(
            version = migration.version,
            name = migration.name,
            "applying schema migration"
        );

        let script = format!(
            "{}\nCREATE _migration SET version = $version, name = $name;",
            migration.sql
        );
        db.query(script)
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "schema v{} ({}): {e}",
                    migration.version, migration.name
                ))
            })?;
    }

    Ok(())
}

/// DDL of the first schema version.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
