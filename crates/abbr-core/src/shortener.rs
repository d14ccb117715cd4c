use crate::shortcode::ShortCode;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

/// The contract exposed to request handlers.
#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Returns the short code for `url`, issuing a new one on first use.
    ///
    /// Shortening the same URL again returns the same code.
    async fn shorten(&self, url: &str) -> Result<ShortCode>;

    /// Resolves a short code to its original URL.
    /// Returns `None` if the code was never issued.
    async fn resolve(&self, code: &ShortCode) -> Result<Option<String>>;

    /// Returns the code already issued for `url`, without issuing one.
    async fn reverse_lookup(&self, url: &str) -> Result<Option<ShortCode>>;
}
