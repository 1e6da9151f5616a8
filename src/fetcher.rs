use crate::{ProductCode, Result, Work};
use async_trait::async_trait;

/// Capability to resolve a product code to its [`Work`] metadata.
///
/// [`DlsiteClient`](crate::DlsiteClient) implements this by scraping the
/// product page, and [`CachedFetcher`](crate::CachedFetcher) wraps any other
/// implementation with a persistent cache. The organizer only depends on this
/// trait, which keeps it testable without network access.
///
/// # Mocking Support
///
/// When the `mock` feature is enabled, this crate provides `MockWorkFetcher`
/// that implements this trait using the `mockall` library.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait(?Send)]
pub trait WorkFetcher {
    /// Fetch metadata for the work identified by `code`.
    async fn fetch_work(&mut self, code: &ProductCode) -> Result<Work>;

    /// Key under which results for `code` may be cached.
    ///
    /// Fetchers whose output varies by something other than the code (such
    /// as the page locale) must include it in the key.
    fn cache_key(&self, code: &ProductCode) -> String {
        code.to_string()
    }
}
