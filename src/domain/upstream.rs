//! Upstream client contract for the affiliate API.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::entities::{LinkVariant, ProductDetail, ProductKey};

/// Failure of a single upstream call.
///
/// Cloneable so the same cause can be recorded in a bundle and logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    #[error("transport error: {0}")]
    Http(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("not found")]
    NotFound,

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl UpstreamError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout(_) => true,
            Self::Status(code) => *code >= 500 || *code == 429,
            Self::Api { .. } | Self::Decode(_) | Self::NotFound => false,
        }
    }
}

/// Remote API used to build product bundles.
///
/// Both calls fail independently. Retries and authentication are the
/// implementation's concern; callers impose their own timeout.
///
/// # Implementations
///
/// - [`crate::infrastructure::aliexpress::AliExpressClient`] - AliExpress affiliate API
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Fetches title, image and sale price for a product.
    async fn fetch_detail(&self, product_id: &ProductKey) -> Result<ProductDetail, UpstreamError>;

    /// Generates the affiliate link for one variant of a product.
    async fn generate_link(
        &self,
        product_id: &ProductKey,
        variant: LinkVariant,
    ) -> Result<String, UpstreamError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(UpstreamError::Http("reset".into()).is_transient());
        assert!(UpstreamError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(UpstreamError::Status(503).is_transient());
        assert!(UpstreamError::Status(429).is_transient());

        assert!(!UpstreamError::Status(404).is_transient());
        assert!(!UpstreamError::NotFound.is_transient());
        assert!(
            !UpstreamError::Api {
                code: "IncompleteSignature".into(),
                message: "bad sign".into()
            }
            .is_transient()
        );
    }
}
