use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A single code ↔ URL pair held by a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlMapping {
    /// The short code handed out for the URL.
    pub code: ShortCode,
    /// The original URL that was shortened.
    pub original_url: String,
}

impl UrlMapping {
    pub fn new(code: ShortCode, original_url: impl Into<String>) -> Self {
        Self {
            code,
            original_url: original_url.into(),
        }
    }
}

/// A read-only view of a repository.
///
/// Lookups in both directions. An absent entry is `Ok(None)`, while a
/// backend failure is always an `Err` so callers can tell the two apart.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the original URL stored for a given short code.
    async fn get(&self, code: &ShortCode) -> Result<Option<String>>;

    /// Retrieves the short code previously issued for `url`.
    async fn find_by_url(&self, url: &str) -> Result<Option<ShortCode>>;

    /// Checks whether a short code is already taken.
    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.get(code).await?.is_some())
    }
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Stores a new mapping. Once this returns `Ok`, the mapping is visible
    /// to every subsequent lookup in both directions.
    async fn insert(&self, mapping: UrlMapping) -> Result<()>;
}
