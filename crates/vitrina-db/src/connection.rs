//! SurrealDB connection management and repository wiring.

use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;
use crate::repository::{
    SurrealCategoryRepository, SurrealProductRepository, SurrealSharedLinkRepository,
};

/// Where the admin panel's document store lives.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket endpoint, `host:port`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "vitrina".into(),
            database: "admin".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// Owns a SurrealDB handle and hands out repositories bound to it.
///
/// Remote deployments use [`DbManager::connect`]; embedded engines (and
/// tests) wrap an existing handle with [`DbManager::from_client`].
#[derive(Clone)]
pub struct DbManager<C: Connection = Client> {
    db: Surreal<C>,
}

impl DbManager<Client> {
    /// Open a WebSocket session, sign in as root and select the
    /// configured namespace and database.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "connecting to store"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;
        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
        db.use_ns(&config.namespace).use_db(&config.database).await?;

        info!("store connected");
        Ok(Self { db })
    }

    /// [`connect`](Self::connect) followed by [`migrate`](Self::migrate).
    pub async fn connect_and_migrate(config: &DbConfig) -> Result<Self, DbError> {
        let manager = Self::connect(config).await?;
        manager.migrate().await?;
        Ok(manager)
    }
}

impl<C: Connection> DbManager<C> {
    /// Wrap a handle whose namespace and database are already selected.
    pub fn from_client(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Apply any schema migrations the store has not seen yet.
    pub async fn migrate(&self) -> Result<(), DbError> {
        crate::run_migrations(&self.db).await
    }

    pub fn client(&self) -> &Surreal<C> {
        &self.db
    }

    pub fn categories(&self) -> SurrealCategoryRepository<C> {
        SurrealCategoryRepository::new(self.db.clone())
    }

    pub fn products(&self) -> SurrealProductRepository<C> {
        SurrealProductRepository::new(self.db.clone())
    }

    pub fn shared_links(&self) -> SurrealSharedLinkRepository<C> {
        SurrealSharedLinkRepository::new(self.db.clone())
    }
}
