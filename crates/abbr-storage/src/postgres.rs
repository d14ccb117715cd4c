use abbr_core::error::StorageError;
use abbr_core::repository::{ReadRepository, Repository, Result, UrlMapping};
use abbr_core::shortcode::ShortCode;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use tracing::{debug, warn};

const SCHEMA: &str = include_str!("../ddl/postgres/links.sql");

/// PostgreSQL implementation of the repository contract.
///
/// Mappings live in a single `links (url, link)` table without constraints.
/// Uniqueness of both columns is maintained by the shortener service, not
/// by the schema. Lookups return `Ok(None)` only when no row matches; any
/// other failure is reported as a [`StorageError`].
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a repository from an existing PostgreSQL connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new PostgreSQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Opens a pool with an explicit size and connection acquire timeout.
    pub async fn connect_with(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `links` table if it does not exist yet.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        debug!("links table is ready");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadRepository for PostgresRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT url
            FROM links
            WHERE link = $1
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| {
            warn!(code = %code, error = %err, "lookup by code failed");
            map_sqlx_error(err)
        })?;

        let Some(row) = row else {
            return Ok(None);
        };

        let url: String = row.try_get("url").map_err(map_sqlx_error)?;
        Ok(Some(url))
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<ShortCode>> {
        let row = sqlx::query(
            r#"
            SELECT link
            FROM links
            WHERE url = $1
            LIMIT 1
            "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| {
            warn!(url = %url, error = %err, "lookup by url failed");
            map_sqlx_error(err)
        })?;

        let Some(row) = row else {
            return Ok(None);
        };

        let link: String = row.try_get("link").map_err(map_sqlx_error)?;
        let code = ShortCode::new(link.trim_end()).map_err(|e| {
            StorageError::InvalidData(format!("stored link for '{}' is malformed: {e}", url))
        })?;
        Ok(Some(code))
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        let exists = sqlx::query(
            r#"
            SELECT 1
            FROM links
            WHERE link = $1
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| {
            warn!(code = %code, error = %err, "existence check failed");
            map_sqlx_error(err)
        })?
        .is_some();

        Ok(exists)
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn insert(&self, mapping: UrlMapping) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO links (url, link)
            VALUES ($1, $2)
            "#,
        )
        .bind(&mapping.original_url)
        .bind(mapping.code.as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(mapping.code.to_string()))
            }
            Err(err) => {
                warn!(code = %mapping.code, error = %err, "insert failed");
                Err(map_sqlx_error(err))
            }
        }
    }
}
