//! Contract between the coalescing cache and whatever builds bundles.

use async_trait::async_trait;

use crate::domain::entities::{ProductBundle, ProductKey, VariantSet};
use crate::domain::errors::BundleError;

/// Builds a fresh [`ProductBundle`] for one product.
///
/// The cache calls this at most once per key at a time and never while
/// holding any of its locks.
///
/// # Implementations
///
/// - [`crate::application::services::BundleAggregator`] - fans out to the upstream API
#[async_trait]
pub trait BundleBuilder: Send + Sync {
    /// Returns a bundle with one link result per variant in `variants`,
    /// or [`BundleError::UpstreamUnavailable`] when every call failed.
    async fn build(
        &self,
        product_id: &ProductKey,
        variants: &VariantSet,
    ) -> Result<ProductBundle, BundleError>;
}
