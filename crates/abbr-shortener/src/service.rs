use abbr_core::{Repository, ShortCode, Shortener, ShortenerError, UrlMapping};
use abbr_generator::Generator;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, trace, warn};

/// Upper bound on consecutive generated codes found already taken.
pub const MAX_GENERATION_ATTEMPTS: usize = 16;

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Repository` and a `Generator` and handles:
/// - Idempotent shortening (a known URL gets its existing code back)
/// - Serializing code generation with the write that consumes the code
/// - Skipping generated codes the repository already holds
///
/// A code whose insert fails is burned: it is never handed out and never
/// reaches the repository.
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
    write_lock: Arc<Mutex<()>>,
}

impl<R, G> Clone for ShortenerService<R, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            generator: Arc::clone(&self.generator),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

impl<R, G> std::fmt::Debug for ShortenerService<R, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShortenerService").finish_non_exhaustive()
    }
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    /// Creates a new `ShortenerService` owning the repository and generator.
    pub fn new(repository: R, generator: G) -> Self {
        Self::from_shared(Arc::new(repository), Arc::new(generator))
    }

    /// Creates a new `ShortenerService` from already shared components.
    pub fn from_shared(repository: Arc<R>, generator: Arc<G>) -> Self {
        Self {
            repository,
            generator,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Draws codes from the generator until one is not in the repository.
    ///
    /// Must be called with the write lock held.
    async fn issue_code(&self) -> Result<ShortCode, ShortenerError> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let code: ShortCode = self.generator.generate().into();
            if !self.repository.exists(&code).await? {
                return Ok(code);
            }
            warn!(code = %code, attempt, "generated code is already taken");
        }

        Err(ShortenerError::CodeSpaceExhausted {
            attempts: MAX_GENERATION_ATTEMPTS,
        })
    }
}

#[async_trait]
impl<R: Repository, G: Generator> Shortener for ShortenerService<R, G> {
    /// URLs are stored verbatim, the empty string included.
    async fn shorten(&self, url: &str) -> Result<ShortCode, ShortenerError> {
        if let Some(code) = self.repository.find_by_url(url).await? {
            debug!(code = %code, url = %url, "url already shortened");
            return Ok(code);
        }

        let _guard = self.write_lock.lock().await;

        // Another task may have shortened the same URL while we waited.
        if let Some(code) = self.repository.find_by_url(url).await? {
            debug!(code = %code, url = %url, "url shortened concurrently");
            return Ok(code);
        }

        let code = self.issue_code().await?;

        if let Err(err) = self
            .repository
            .insert(UrlMapping::new(code, url))
            .await
        {
            warn!(code = %code, url = %url, error = %err, "failed to store mapping, code is burned");
            return Err(err.into());
        }

        info!(code = %code, url = %url, "shortened url");
        Ok(code)
    }

    async fn resolve(&self, code: &ShortCode) -> Result<Option<String>, ShortenerError> {
        trace!(code = %code, "resolving short code");

        let url = self.repository.get(code).await?;
        match &url {
            Some(url) => debug!(code = %code, url = %url, "resolved short code"),
            None => trace!(code = %code, "short code not found"),
        }
        Ok(url)
    }

    async fn reverse_lookup(&self, url: &str) -> Result<Option<ShortCode>, ShortenerError> {
        trace!(url = %url, "looking up code for url");
        Ok(self.repository.find_by_url(url).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abbr_core::{ReadRepository, StorageError, CODE_LENGTH};
    use abbr_generator::{Alphabet, Odometer, OdometerSettings};
    use abbr_storage::InMemoryRepository;
    use std::collections::HashSet;

    fn odometer() -> Odometer {
        let settings = OdometerSettings::builder()
            .alphabet(Alphabet::canonical())
            .start([0; CODE_LENGTH])
            .build();
        Odometer::new(settings).unwrap()
    }

    fn test_service() -> ShortenerService<InMemoryRepository, Odometer> {
        ShortenerService::new(InMemoryRepository::new(), odometer())
    }

    fn code(s: &str) -> ShortCode {
        ShortCode::new(s).unwrap()
    }

    /// A generator that keeps returning the same code.
    struct StuckGenerator(ShortCode);

    impl Generator for StuckGenerator {
        type Output = ShortCode;

        fn generate(&self) -> Self::Output {
            self.0
        }
    }

    /// A repository whose writes always fail.
    struct ReadOnlyRepository;

    #[async_trait]
    impl ReadRepository for ReadOnlyRepository {
        async fn get(&self, _code: &ShortCode) -> abbr_core::repository::Result<Option<String>> {
            Ok(None)
        }

        async fn find_by_url(
            &self,
            _url: &str,
        ) -> abbr_core::repository::Result<Option<ShortCode>> {
            Ok(None)
        }
    }

    #[async_trait]
    impl Repository for ReadOnlyRepository {
        async fn insert(&self, _mapping: UrlMapping) -> abbr_core::repository::Result<()> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }
    }

    /// A repository whose backend is down for every call.
    struct UnreachableRepository;

    #[async_trait]
    impl ReadRepository for UnreachableRepository {
        async fn get(&self, _code: &ShortCode) -> abbr_core::repository::Result<Option<String>> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn find_by_url(
            &self,
            _url: &str,
        ) -> abbr_core::repository::Result<Option<ShortCode>> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn exists(&self, _code: &ShortCode) -> abbr_core::repository::Result<bool> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }
    }

    #[async_trait]
    impl Repository for UnreachableRepository {
        async fn insert(&self, _mapping: UrlMapping) -> abbr_core::repository::Result<()> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn shorten_issues_sequential_codes() {
        let service = test_service();

        let first = service.shorten("www.google.com").await.unwrap();
        let second = service.shorten("yandex.ru").await.unwrap();

        assert_eq!(first.as_str(), "AAAAAAAAAB");
        assert_eq!(second.as_str(), "AAAAAAAAAC");
    }

    #[tokio::test]
    async fn shorten_is_idempotent() {
        let service = test_service();

        let first = service.shorten("www.google.com").await.unwrap();
        let again = service.shorten("www.google.com").await.unwrap();

        assert_eq!(first, again);
        assert_eq!(service.repository().len(), 1);
    }

    #[tokio::test]
    async fn shorten_then_resolve_round_trips() {
        let service = test_service();

        let url = "job.ozon.ru/internships/";
        let code = service.shorten(url).await.unwrap();

        assert_eq!(service.resolve(&code).await.unwrap().as_deref(), Some(url));
        assert_eq!(service.reverse_lookup(url).await.unwrap(), Some(code));
    }

    #[tokio::test]
    async fn blank_urls_are_stored_verbatim() {
        let service = test_service();

        let empty = service.shorten("").await.unwrap();
        let blank = service.shorten("   ").await.unwrap();

        assert_ne!(empty, blank);
        assert_eq!(service.resolve(&empty).await.unwrap().as_deref(), Some(""));
        assert_eq!(service.resolve(&blank).await.unwrap().as_deref(), Some("   "));
        assert_eq!(service.shorten("").await.unwrap(), empty);
        assert_eq!(service.repository().len(), 2);
    }

    #[tokio::test]
    async fn resolve_unissued_code() {
        let service = test_service();
        service.shorten("mail.ru").await.unwrap();

        let url = service.resolve(&code("AAAAAAAAAC")).await.unwrap();
        assert!(url.is_none());
    }

    #[tokio::test]
    async fn reverse_lookup_does_not_issue() {
        let service = test_service();

        assert!(service.reverse_lookup("mail.ru").await.unwrap().is_none());
        assert!(service.repository().is_empty());
    }

    #[tokio::test]
    async fn shorten_skips_codes_already_taken() {
        let repository = Arc::new(InMemoryRepository::new());
        repository
            .insert(UrlMapping::new(code("AAAAAAAAAB"), "left-over.example"))
            .await
            .unwrap();
        let service = ShortenerService::from_shared(repository, Arc::new(odometer()));

        let issued = service.shorten("mail.ru").await.unwrap();

        assert_eq!(issued.as_str(), "AAAAAAAAAC");
        assert_eq!(
            service.resolve(&code("AAAAAAAAAB")).await.unwrap().as_deref(),
            Some("left-over.example")
        );
    }

    #[tokio::test]
    async fn shorten_gives_up_when_every_code_is_taken() {
        let taken = code("AAAAAAAAAA");
        let repository = InMemoryRepository::new();
        repository
            .insert(UrlMapping::new(taken, "first.example"))
            .await
            .unwrap();
        let service = ShortenerService::new(repository, StuckGenerator(taken));

        let err = service.shorten("second.example").await.unwrap_err();
        assert!(matches!(
            err,
            ShortenerError::CodeSpaceExhausted {
                attempts: MAX_GENERATION_ATTEMPTS
            }
        ));
    }

    #[tokio::test]
    async fn failed_insert_burns_the_code() {
        let generator = Arc::new(odometer());
        let service =
            ShortenerService::from_shared(Arc::new(ReadOnlyRepository), Arc::clone(&generator));

        let err = service.shorten("mail.ru").await.unwrap_err();
        assert!(matches!(
            err,
            ShortenerError::Storage(StorageError::Unavailable(_))
        ));

        // the odometer moved on; the code is not handed out again
        assert_eq!(generator.next_code().as_str(), "AAAAAAAAAC");
    }

    #[tokio::test]
    async fn backend_read_failures_are_not_reported_as_absent() {
        let generator = Arc::new(odometer());
        let service =
            ShortenerService::from_shared(Arc::new(UnreachableRepository), Arc::clone(&generator));

        let err = service.resolve(&code("AAAAAAAAAB")).await.unwrap_err();
        assert!(matches!(
            err,
            ShortenerError::Storage(StorageError::Unavailable(_))
        ));

        let err = service.reverse_lookup("mail.ru").await.unwrap_err();
        assert!(matches!(
            err,
            ShortenerError::Storage(StorageError::Unavailable(_))
        ));

        let err = service.shorten("mail.ru").await.unwrap_err();
        assert!(matches!(
            err,
            ShortenerError::Storage(StorageError::Unavailable(_))
        ));

        // the lookup failed before any code was drawn
        assert_eq!(generator.next_code().as_str(), "AAAAAAAAAB");
    }

    #[tokio::test]
    async fn concurrent_shortens_of_distinct_urls() {
        let service = test_service();
        let mut handles = vec![];

        for i in 0..64 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                let url = format!("https://example{}.com", i);
                let code = service.shorten(&url).await.unwrap();
                (url, code)
            }));
        }

        let mut codes = HashSet::new();
        for handle in handles {
            let (url, code) = handle.await.unwrap();
            assert!(codes.insert(code));
            assert_eq!(service.resolve(&code).await.unwrap(), Some(url.clone()));
            assert_eq!(service.reverse_lookup(&url).await.unwrap(), Some(code));
        }
        assert_eq!(service.repository().len(), 64);
    }

    #[tokio::test]
    async fn concurrent_shortens_of_the_same_url() {
        let service = test_service();
        let mut handles = vec![];

        for _ in 0..32 {
            let service = service.clone();
            handles.push(tokio::spawn(
                async move { service.shorten("yandex.ru").await.unwrap() },
            ));
        }

        let mut codes = HashSet::new();
        for handle in handles {
            codes.insert(handle.await.unwrap());
        }
        assert_eq!(codes.len(), 1);
        assert_eq!(service.repository().len(), 1);
    }
}
