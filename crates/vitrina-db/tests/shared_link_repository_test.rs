//! Integration tests for the SharedLink repository using in-memory SurrealDB.

use chrono::{Duration, Utc};
use futures::future::join_all;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use vitrina_core::error::VitrinaError;
use vitrina_core::models::shared_link::CreateSharedLink;
use vitrina_core::repository::SharedLinkRepository;
use vitrina_db::repository::SurrealSharedLinkRepository;

async fn setup() -> SurrealSharedLinkRepository<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    vitrina_db::run_migrations(&db).await.unwrap();
    SurrealSharedLinkRepository::new(db)
}

fn link(token: &str, link_type: &str) -> CreateSharedLink {
    CreateSharedLink {
        token: token.into(),
        link_type: link_type.into(),
        created_by: "admin-1".into(),
        created_at: Utc::now(),
        expires_at: None,
        requires_code: false,
        access_code: None,
    }
}

#[tokio::test]
async fn create_and_get_by_token() {
    let repo = setup().await;
    let expires_at = Utc::now() + Duration::days(7);

    let created = repo
        .create(CreateSharedLink {
            expires_at: Some(expires_at),
            requires_code: true,
            access_code: Some("1234".into()),
            ..link("aaaabbbbccccdddd", "employees")
        })
        .await
        .unwrap();

    assert_eq!(created.usage_count, 0);

    let fetched = repo.get_by_token("aaaabbbbccccdddd").await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.link_type, "employees");
    assert!(fetched.requires_code);
    assert_eq!(fetched.access_code.as_deref(), Some("1234"));
    assert!(fetched.expires_at.is_some());
}

#[tokio::test]
async fn unknown_token_is_not_found() {
    let repo = setup().await;

    let err = repo.get_by_token("missing").await.unwrap_err();
    assert!(matches!(err, VitrinaError::NotFound { .. }));
}

#[tokio::test]
async fn duplicate_token_is_rejected() {
    let repo = setup().await;

    repo.create(link("same", "employees")).await.unwrap();
    let result = repo.create(link("same", "employees")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn list_by_type_filters_modules() {
    let repo = setup().await;

    repo.create(link("t1", "employees")).await.unwrap();
    repo.create(link("t2", "employees")).await.unwrap();
    repo.create(link("t3", "products")).await.unwrap();

    let employees = repo.list_by_type("employees").await.unwrap();
    assert_eq!(employees.len(), 2);
    assert!(employees.iter().all(|l| l.link_type == "employees"));
}

#[tokio::test]
async fn increment_usage_is_additive() {
    let repo = setup().await;
    repo.create(link("counted", "employees")).await.unwrap();

    for _ in 0..3 {
        repo.increment_usage("counted").await.unwrap();
    }

    let fetched = repo.get_by_token("counted").await.unwrap();
    assert_eq!(fetched.usage_count, 3);
}

#[tokio::test]
async fn concurrent_increments_are_not_lost() {
    let repo = setup().await;
    repo.create(link("busy", "employees")).await.unwrap();

    const N: usize = 25;
    let results = join_all((0..N).map(|_| repo.increment_usage("busy"))).await;
    for result in results {
        result.unwrap();
    }

    let fetched = repo.get_by_token("busy").await.unwrap();
    assert_eq!(fetched.usage_count, N as u64);
}

#[tokio::test]
async fn increment_unknown_token_is_not_found() {
    let repo = setup().await;

    let err = repo.increment_usage("nope").await.unwrap_err();
    assert!(matches!(err, VitrinaError::NotFound { .. }));
}
