use abbr_core::repository::{ReadRepository, Repository, Result, UrlMapping};
use abbr_core::{ShortCode, StorageError};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::trace;

/// Both directions of the mapping, always updated together.
#[derive(Debug, Default)]
struct Mappings {
    by_code: HashMap<ShortCode, String>,
    by_url: HashMap<String, ShortCode>,
}

/// In-memory implementation of the Repository trait.
///
/// A single `RwLock` guards both maps: lookups share the read lock while
/// an insert holds the write lock, so no reader can observe one direction
/// of a mapping without the other.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    mappings: RwLock<Mappings>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            mappings: RwLock::new(Mappings {
                by_code: HashMap::with_capacity(capacity),
                by_url: HashMap::with_capacity(capacity),
            }),
        }
    }

    /// Number of stored mappings.
    pub fn len(&self) -> usize {
        self.mappings.read().by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<String>> {
        Ok(self.mappings.read().by_code.get(code).cloned())
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<ShortCode>> {
        Ok(self.mappings.read().by_url.get(url).copied())
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.mappings.read().by_code.contains_key(code))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, mapping: UrlMapping) -> Result<()> {
        let mut mappings = self.mappings.write();

        // Reject anything that would break the one-to-one mapping.
        if mappings.by_code.contains_key(&mapping.code) {
            return Err(StorageError::Conflict(format!(
                "code {} is already mapped",
                mapping.code
            )));
        }
        if mappings.by_url.contains_key(&mapping.original_url) {
            return Err(StorageError::Conflict(format!(
                "url {} is already mapped",
                mapping.original_url
            )));
        }

        trace!(code = %mapping.code, url = %mapping.original_url, "inserting mapping");
        mappings
            .by_url
            .insert(mapping.original_url.clone(), mapping.code);
        mappings.by_code.insert(mapping.code, mapping.original_url);
        Ok(())
    }
}
