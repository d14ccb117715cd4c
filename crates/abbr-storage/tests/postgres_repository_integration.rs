//! These tests start a PostgreSQL container and need a running Docker
//! daemon. Run them with `cargo test -- --ignored`.

use std::time::Duration;

use abbr_core::ShortCode;
use abbr_storage::{PostgresRepository, ReadRepository, Repository, StorageError, UrlMapping};
use abbr_test_infra::postgres::{PostgresConfig, PostgresServer};
use sqlx::postgres::PgPoolOptions;

struct Fixture {
    _postgres: PostgresServer,
    repo: PostgresRepository,
}

impl Fixture {
    async fn start() -> Self {
        let postgres = PostgresServer::new(PostgresConfig::builder().build())
            .await
            .expect("start postgres");
        let url = postgres.database_url().await.expect("postgres url");
        let pool = connect_with_retry(&url).await;

        let repo = PostgresRepository::new(pool);
        repo.migrate().await.expect("create schema");

        Self {
            _postgres: postgres,
            repo,
        }
    }
}

async fn connect_with_retry(url: &str) -> sqlx::PgPool {
    let mut last_error = None;

    for _ in 0..20 {
        match PgPoolOptions::new().max_connections(5).connect(url).await {
            Ok(pool) => return pool,
            Err(err) => {
                last_error = Some(err);
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }

    panic!("failed to connect postgres: {last_error:?}");
}

fn code(value: &str) -> ShortCode {
    ShortCode::new(value).unwrap()
}

#[tokio::test]
#[ignore = "requires docker"]
async fn insert_and_lookup_both_directions() {
    let fixture = Fixture::start().await;
    let short_code = code("abcdefghij");

    fixture
        .repo
        .insert(UrlMapping::new(short_code, "job.ozon.ru/internships/"))
        .await
        .unwrap();

    let url = fixture.repo.get(&short_code).await.unwrap();
    assert_eq!(url.as_deref(), Some("job.ozon.ru/internships/"));

    let found = fixture
        .repo
        .find_by_url("job.ozon.ru/internships/")
        .await
        .unwrap();
    assert_eq!(found, Some(short_code));
    assert!(fixture.repo.exists(&short_code).await.unwrap());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn absent_rows_are_not_errors() {
    let fixture = Fixture::start().await;

    assert!(fixture.repo.get(&code("nothere___")).await.unwrap().is_none());
    assert!(fixture.repo.find_by_url("mail.ru").await.unwrap().is_none());
    assert!(!fixture.repo.exists(&code("nothere___")).await.unwrap());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn codes_are_case_sensitive() {
    let fixture = Fixture::start().await;

    fixture
        .repo
        .insert(UrlMapping::new(code("abcdefghij"), "yandex.ru"))
        .await
        .unwrap();

    assert!(fixture.repo.get(&code("ABCDEFGHIJ")).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn backend_failure_is_reported_not_hidden() {
    let fixture = Fixture::start().await;
    fixture.repo.pool().close().await;

    let err = fixture.repo.get(&code("abcdefghij")).await.unwrap_err();
    assert!(matches!(err, StorageError::Unavailable(_)));

    let err = fixture.repo.exists(&code("abcdefghij")).await.unwrap_err();
    assert!(matches!(err, StorageError::Unavailable(_)));

    let err = fixture.repo.find_by_url("mail.ru").await.unwrap_err();
    assert!(matches!(err, StorageError::Unavailable(_)));

    let err = fixture
        .repo
        .insert(UrlMapping::new(code("abcdefghij"), "mail.ru"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Unavailable(_)));
}
