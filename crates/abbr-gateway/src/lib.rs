//! HTTP front end for the abbr URL shortener.
//!
//! Translates requests into [`Shortener`][abbr_core::Shortener] calls. Both
//! the plain-text protocol on `/` and the JSON API under `/v1/urls` are
//! served from the same [`AppState`].

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use error::AppError;
pub use state::AppState;
