//! Errors surfaced by bundle building and the coalescing cache.

use thiserror::Error;

use crate::domain::entities::ProductKey;

/// Fatal outcome of a `get_or_build` call.
///
/// Cloneable because a single build failure is delivered to every caller
/// that was coalesced onto that build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BundleError {
    /// Every constituent upstream call failed; nothing was cached.
    #[error("upstream unavailable for product {product_id}: {reason}")]
    UpstreamUnavailable {
        product_id: ProductKey,
        reason: String,
    },

    /// The build task ended without publishing a result.
    #[error("bundle build for product {product_id} was aborted")]
    BuildAborted { product_id: ProductKey },
}

impl BundleError {
    pub fn product_id(&self) -> &ProductKey {
        match self {
            Self::UpstreamUnavailable { product_id, .. } | Self::BuildAborted { product_id } => {
                product_id
            }
        }
    }
}
