pub mod memory;
pub mod postgres;

pub use abbr_core::{ReadRepository, Repository, StorageError, UrlMapping};
pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;
