//! Core types and traits for the abbr URL shortener.
//!
//! This crate provides the short code type, the error taxonomy and the
//! repository and shortener contracts shared by the generator, the storage
//! backends, the shortener service and the HTTP gateway.

pub mod error;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use error::{CoreError, ShortenerError, StorageError};
pub use repository::{ReadRepository, Repository, UrlMapping};
pub use shortcode::{ShortCode, CODE_LENGTH, CODE_SYMBOLS, RADIX};
pub use shortener::Shortener;
