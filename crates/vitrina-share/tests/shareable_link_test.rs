//! Integration tests for ShareableLinkService using in-memory SurrealDB.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use vitrina_core::clock::Clock;
use vitrina_core::error::VitrinaError;
use vitrina_db::repository::SurrealSharedLinkRepository;
use vitrina_share::{
    GenerateLink, LinkExpiry, LinkRejection, LinkValidation, ShareConfig, ShareableLinkService,
};

/// Clock that only moves when told to.
struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    fn new() -> Arc<Self> {
        Arc::new(Self(Mutex::new(Utc::now())))
    }

    fn advance(&self, by: Duration) {
        *self.0.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

type Service = ShareableLinkService<SurrealSharedLinkRepository<Db>, Arc<ManualClock>>;

async fn setup() -> (Service, Arc<ManualClock>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    vitrina_db::run_migrations(&db).await.unwrap();

    let clock = ManualClock::new();
    let service = ShareableLinkService::new(
        SurrealSharedLinkRepository::new(db),
        clock.clone(),
        ShareConfig::default(),
    );
    (service, clock)
}

fn open(expiry: LinkExpiry) -> GenerateLink {
    GenerateLink {
        expiry,
        requires_code: false,
        access_code: None,
    }
}

fn gated(expiry: LinkExpiry, code: &str) -> GenerateLink {
    GenerateLink {
        expiry,
        requires_code: true,
        access_code: Some(code.into()),
    }
}

#[tokio::test]
async fn generated_link_is_stored_with_zero_usage() {
    let (service, clock) = setup().await;

    let link = service
        .generate_link("employees", "admin-1", open(LinkExpiry::ONE_WEEK))
        .await
        .unwrap();

    assert_eq!(link.token.len(), 32);
    assert_eq!(link.link_type, "employees");
    assert_eq!(link.created_by, "admin-1");
    assert_eq!(link.usage_count, 0);
    assert!(!link.requires_code);
    assert_eq!(link.access_code, None);

    let expires_at = link.expires_at.unwrap();
    let expected = clock.now() + Duration::days(7);
    assert!((expires_at - expected).num_seconds().abs() <= 1);

    let fetched = service.get_link(&link.token).await.unwrap();
    assert_eq!(fetched.id, link.id);
}

#[tokio::test]
async fn link_expires_once_clock_passes_expiry() {
    let (service, clock) = setup().await;
    let link = service
        .generate_link("employees", "admin-1", open(LinkExpiry::ONE_DAY))
        .await
        .unwrap();

    let before = service
        .validate_token(&link.token, "employees", None)
        .await
        .unwrap();
    assert_eq!(before, LinkValidation::Valid);

    clock.advance(Duration::days(2));

    let after = service
        .validate_token(&link.token, "employees", None)
        .await
        .unwrap();
    assert_eq!(after.rejection(), Some(LinkRejection::Expired));
}

#[tokio::test]
async fn never_expiring_link_stays_valid() {
    let (service, clock) = setup().await;
    let link = service
        .generate_link("orders", "admin-1", open(LinkExpiry::Never))
        .await
        .unwrap();
    assert_eq!(link.expires_at, None);

    clock.advance(Duration::days(3650));

    assert!(
        service
            .validate_token(&link.token, "orders", None)
            .await
            .unwrap()
            .is_valid()
    );
}

#[tokio::test]
async fn access_code_must_match() {
    let (service, _clock) = setup().await;
    let link = service
        .generate_link("employees", "admin-1", gated(LinkExpiry::ONE_MONTH, "4821"))
        .await
        .unwrap();
    assert!(link.requires_code);

    let wrong = service
        .validate_token(&link.token, "employees", Some("1111"))
        .await
        .unwrap();
    assert_eq!(wrong.rejection(), Some(LinkRejection::BadCode));

    let missing = service
        .validate_token(&link.token, "employees", None)
        .await
        .unwrap();
    assert_eq!(missing.rejection(), Some(LinkRejection::BadCode));

    let right = service
        .validate_token(&link.token, "employees", Some("4821"))
        .await
        .unwrap();
    assert!(right.is_valid());
}

#[tokio::test]
async fn link_for_other_module_is_wrong_type() {
    let (service, _clock) = setup().await;
    let link = service
        .generate_link("employees", "admin-1", open(LinkExpiry::ONE_DAY))
        .await
        .unwrap();

    let result = service
        .validate_token(&link.token, "orders", None)
        .await
        .unwrap();
    assert_eq!(result.rejection(), Some(LinkRejection::WrongType));
}

#[tokio::test]
async fn unknown_and_malformed_tokens_are_not_found() {
    let (service, _clock) = setup().await;

    let unknown = service
        .validate_token(&"ab".repeat(16), "employees", None)
        .await
        .unwrap();
    assert_eq!(unknown.rejection(), Some(LinkRejection::NotFound));

    let malformed = service
        .validate_token("not-a-token", "employees", None)
        .await
        .unwrap();
    assert_eq!(malformed.rejection(), Some(LinkRejection::NotFound));
}

#[tokio::test]
async fn gated_link_without_code_is_rejected_at_issue() {
    let (service, _clock) = setup().await;

    let err = service
        .generate_link(
            "employees",
            "admin-1",
            GenerateLink {
                expiry: LinkExpiry::ONE_DAY,
                requires_code: true,
                access_code: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, VitrinaError::Validation { .. }));

    assert!(service.list_links("employees").await.unwrap().is_empty());
}

#[tokio::test]
async fn code_is_dropped_for_ungated_link() {
    let (service, _clock) = setup().await;
    let link = service
        .generate_link(
            "employees",
            "admin-1",
            GenerateLink {
                expiry: LinkExpiry::ONE_DAY,
                requires_code: false,
                access_code: Some("4821".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(link.access_code, None);
    assert!(
        service
            .validate_token(&link.token, "employees", None)
            .await
            .unwrap()
            .is_valid()
    );
}

#[tokio::test]
async fn short_code_is_accepted_but_fails_check() {
    let (service, _clock) = setup().await;
    let link = service
        .generate_link("employees", "admin-1", gated(LinkExpiry::ONE_DAY, "12"))
        .await
        .unwrap();
    assert_eq!(link.access_code.as_deref(), Some("12"));

    assert!(matches!(
        service.check_access_code("12"),
        Err(VitrinaError::Validation { .. })
    ));
    assert!(service.check_access_code("1234").is_ok());
}

#[tokio::test]
async fn concurrent_usage_is_counted_exactly() {
    let (service, _clock) = setup().await;
    let link = service
        .generate_link("employees", "admin-1", open(LinkExpiry::Never))
        .await
        .unwrap();

    let uses = 20;
    let results = join_all((0..uses).map(|_| service.record_usage(&link.token))).await;
    for result in results {
        result.unwrap();
    }

    let fetched = service.get_link(&link.token).await.unwrap();
    assert_eq!(fetched.usage_count, uses);
}

#[tokio::test]
async fn record_usage_on_unknown_token_is_not_found() {
    let (service, _clock) = setup().await;
    let err = service.record_usage(&"cd".repeat(16)).await.unwrap_err();
    assert!(matches!(err, VitrinaError::NotFound { .. }));
}

#[tokio::test]
async fn redeem_counts_only_accepted_uses() {
    let (service, _clock) = setup().await;
    let link = service
        .generate_link("employees", "admin-1", gated(LinkExpiry::ONE_WEEK, "4821"))
        .await
        .unwrap();

    let rejected = service
        .redeem(&link.token, "employees", Some("0000"))
        .await
        .unwrap();
    assert_eq!(rejected.rejection(), Some(LinkRejection::BadCode));

    let accepted = service
        .redeem(&link.token, "employees", Some("4821"))
        .await
        .unwrap();
    assert!(accepted.is_valid());

    assert_eq!(service.get_link(&link.token).await.unwrap().usage_count, 1);
}

#[tokio::test]
async fn list_links_filters_by_module() {
    let (service, clock) = setup().await;
    let first = service
        .generate_link("employees", "admin-1", open(LinkExpiry::ONE_DAY))
        .await
        .unwrap();
    clock.advance(Duration::minutes(1));
    let second = service
        .generate_link("employees", "admin-2", open(LinkExpiry::ONE_DAY))
        .await
        .unwrap();
    service
        .generate_link("orders", "admin-1", open(LinkExpiry::ONE_DAY))
        .await
        .unwrap();

    let links = service.list_links("employees").await.unwrap();
    let ids: Vec<_> = links.iter().map(|l| l.id).collect();
    assert_eq!(ids, [second.id, first.id]);
}

#[tokio::test]
async fn blank_module_type_is_rejected() {
    let (service, _clock) = setup().await;
    let err = service
        .generate_link("  ", "admin-1", open(LinkExpiry::ONE_DAY))
        .await
        .unwrap_err();
    assert!(matches!(err, VitrinaError::Validation { .. }));
}

#[tokio::test]
async fn padded_module_type_matches_itself() {
    let (service, _clock) = setup().await;
    let link = service
        .generate_link(" employees ", "admin-1", open(LinkExpiry::ONE_DAY))
        .await
        .unwrap();
    assert_eq!(link.link_type, "employees");

    let result = service
        .validate_token(&link.token, " employees ", None)
        .await
        .unwrap();
    assert!(result.is_valid());
}

#[tokio::test]
async fn empty_access_code_is_stored_as_given() {
    let (service, _clock) = setup().await;
    let link = service
        .generate_link("employees", "admin-1", gated(LinkExpiry::ONE_DAY, ""))
        .await
        .unwrap();
    assert!(link.requires_code);
    assert_eq!(link.access_code.as_deref(), Some(""));

    let missing = service
        .validate_token(&link.token, "employees", None)
        .await
        .unwrap();
    assert_eq!(missing.rejection(), Some(LinkRejection::BadCode));

    let matching = service
        .validate_token(&link.token, "employees", Some(""))
        .await
        .unwrap();
    assert!(matching.is_valid());
}
