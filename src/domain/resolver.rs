//! Short-link resolution contract.

use async_trait::async_trait;
use thiserror::Error;

/// Why a short link could not be turned into a product URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("transport error: {0}")]
    Http(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("timed out")]
    Timeout,

    /// Redirects ended somewhere that is not an AliExpress product page.
    #[error("resolved to a non-product page: {0}")]
    NotAProductPage(String),
}

/// Follows affiliate short links to the product page they point at.
///
/// # Implementations
///
/// - [`crate::infrastructure::resolver::HttpShortLinkResolver`] - follows redirects over HTTP
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkResolver: Send + Sync {
    /// Returns the final product URL for `short_url`.
    async fn resolve(&self, short_url: &str) -> Result<String, ResolveError>;
}
