//! SurrealDB implementation of [`SharedLinkRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;
use vitrina_core::error::VitrinaResult;
use vitrina_core::models::shared_link::{CreateSharedLink, SharedLink};
use vitrina_core::repository::SharedLinkRepository;

use crate::error::{DbError, parse_uuid};

/// Optimistic transactions may abort when two writers touch the same
/// record; the increment is replayed up to this many times.
const MAX_CONFLICT_RETRIES: usize = 16;

fn is_write_conflict(err: &DbError) -> bool {
    let msg = err.to_string().to_ascii_lowercase();
    msg.contains("conflict") || msg.contains("can be retried")
}

#[derive(Debug, SurrealValue)]
struct SharedLinkRow {
    token: String,
    link_type: String,
    created_by: String,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    requires_code: bool,
    access_code: Option<String>,
    usage_count: u64,
}

#[derive(Debug, SurrealValue)]
struct SharedLinkRowWithId {
    record_id: String,
    token: String,
    link_type: String,
    created_by: String,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    requires_code: bool,
    access_code: Option<String>,
    usage_count: u64,
}

fn row_to_link(row: SharedLinkRow, id: Uuid) -> SharedLink {
    SharedLink {
        id,
        token: row.token,
        link_type: row.link_type,
        created_by: row.created_by,
        created_at: row.created_at,
        expires_at: row.expires_at,
        requires_code: row.requires_code,
        access_code: row.access_code,
        usage_count: row.usage_count,
    }
}

impl SharedLinkRowWithId {
    fn try_into_link(self) -> Result<SharedLink, DbError> {
        let id = parse_uuid(&self.record_id, "shared link")?;
        Ok(SharedLink {
            id,
            token: self.token,
            link_type: self.link_type,
            created_by: self.created_by,
            created_at: self.created_at,
            expires_at: self.expires_at,
            requires_code: self.requires_code,
            access_code: self.access_code,
            usage_count: self.usage_count,
        })
    }
}

/// SurrealDB implementation of the SharedLink repository.
#[derive(Clone)]
pub struct SurrealSharedLinkRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSharedLinkRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn increment_once(&self, token: &str) -> Result<(), DbError> {
        // `$token` is a reserved session parameter, hence `$link_token`.
        // `+=` is evaluated inside the record write, never as a separate
        // read followed by a write.
        let result = self
            .db
            .query("UPDATE shared_link SET usage_count += 1 WHERE token = $link_token")
            .bind(("link_token", token.to_string()))
            .await?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<SharedLinkRow> = result.take(0)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "shared_link".into(),
                id: format!("token={token}"),
            });
        }

        Ok(())
    }
}

impl<C: Connection> SharedLinkRepository for SurrealSharedLinkRepository<C> {
    async fn create(&self, input: CreateSharedLink) -> VitrinaResult<SharedLink> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('shared_link', $id) SET \
                 token = $link_token, link_type = $link_type, \
                 created_by = $created_by, created_at = $created_at, \
                 expires_at = $expires_at, \
                 requires_code = $requires_code, access_code = $access_code, \
                 usage_count = 0",
            )
            .bind(("id", id_str.clone()))
            .bind(("link_token", input.token))
            .bind(("link_type", input.link_type))
            .bind(("created_by", input.created_by))
            .bind(("created_at", input.created_at))
            .bind(("expires_at", input.expires_at))
            .bind(("requires_code", input.requires_code))
            .bind(("access_code", input.access_code))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<SharedLinkRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "shared_link".into(),
            id: id_str,
        })?;

        Ok(row_to_link(row, id))
    }

    async fn get_by_token(&self, token: &str) -> VitrinaResult<SharedLink> {
        let token_owned = token.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM shared_link \
                 WHERE token = $link_token",
            )
            .bind(("link_token", token_owned.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SharedLinkRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "shared_link".into(),
            id: format!("token={token_owned}"),
        })?;

        row.try_into_link().map_err(Into::into)
    }

    async fn list_by_type(&self, link_type: &str) -> VitrinaResult<Vec<SharedLink>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM shared_link \
                 WHERE link_type = $link_type \
                 ORDER BY created_at DESC",
            )
            .bind(("link_type", link_type.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SharedLinkRowWithId> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .map(|row| row.try_into_link())
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }

    async fn increment_usage(&self, token: &str) -> VitrinaResult<()> {
        let token_owned = token.to_string();
        let mut attempt = 0;

        loop {
            match self.increment_once(&token_owned).await {
                Err(err) if is_write_conflict(&err) && attempt < MAX_CONFLICT_RETRIES => {
                    attempt += 1;
                    debug!(attempt, "usage increment hit a write conflict, retrying");
                }
                other => return other.map_err(Into::into),
            }
        }
    }
}
