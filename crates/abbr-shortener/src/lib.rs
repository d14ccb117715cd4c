//! URL shortener service implementation.
//!
//! This crate composes a code generator and a repository into the
//! shorten/resolve protocol. Core types are re-exported from `abbr_core`.

pub mod service;

pub use abbr_core::{ShortCode, Shortener, ShortenerError};
pub use service::ShortenerService;
