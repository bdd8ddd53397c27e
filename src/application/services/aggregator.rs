//! Fan-out/fan-in bundle builder.

use async_trait::async_trait;
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::domain::entities::{LinkResult, LinkVariant, ProductBundle, ProductKey, VariantSet};
use crate::domain::{BundleBuilder, BundleError, UpstreamClient, UpstreamError};

/// Builds a [`ProductBundle`] from one detail call and one link call per variant.
///
/// All calls run concurrently and each is bounded by `call_timeout`. A
/// failed or timed-out call only affects its own slot in the bundle; the
/// build fails as a whole only when every call failed.
pub struct BundleAggregator<U: UpstreamClient> {
    upstream: Arc<U>,
    call_timeout: Duration,
}

impl<U: UpstreamClient> BundleAggregator<U> {
    pub fn new(upstream: Arc<U>, call_timeout: Duration) -> Self {
        Self {
            upstream,
            call_timeout,
        }
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Runs one upstream call under the per-call timeout.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, UpstreamError>>,
    ) -> Result<T, UpstreamError> {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout(self.call_timeout)),
        }
    }

    async fn link_for(&self, product_id: &ProductKey, variant: LinkVariant) -> LinkResult {
        match self
            .bounded(self.upstream.generate_link(product_id, variant))
            .await
        {
            Ok(url) => LinkResult::resolved(variant, url),
            Err(e) => {
                warn!(
                    product_id = %product_id,
                    variant = %variant,
                    error = %e,
                    "Link generation failed"
                );
                LinkResult::failed(variant, e.to_string())
            }
        }
    }
}

#[async_trait]
impl<U: UpstreamClient> BundleBuilder for BundleAggregator<U> {
    async fn build(
        &self,
        product_id: &ProductKey,
        variants: &VariantSet,
    ) -> Result<ProductBundle, BundleError> {
        debug!(product_id = %product_id, variants = variants.len(), "Building bundle");

        let detail_call = self.bounded(self.upstream.fetch_detail(product_id));
        let link_calls = join_all(
            variants
                .iter()
                .map(|&variant| self.link_for(product_id, variant)),
        );

        let (detail, links) = tokio::join!(detail_call, link_calls);

        let detail = match detail {
            Ok(detail) => Some(detail),
            Err(e) => {
                warn!(product_id = %product_id, error = %e, "Detail call failed");
                if links.iter().all(|l| !l.is_resolved()) {
                    return Err(BundleError::UpstreamUnavailable {
                        product_id: product_id.clone(),
                        reason: format!(
                            "detail: {}; {} of {} link calls failed",
                            e,
                            links.len(),
                            links.len()
                        ),
                    });
                }
                None
            }
        };

        let bundle = ProductBundle::new(product_id.clone(), detail, links);

        info!(
            product_id = %product_id,
            has_detail = bundle.detail.is_some(),
            resolved = bundle.resolved_count(),
            requested = variants.len(),
            "Bundle built"
        );

        Ok(bundle)
    }
}
