//! Message handling: from chat text to per-product deal replies.

use futures::future::join_all;
use serde::Serialize;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::entities::{ProductBundle, ProductKey, VariantSet};
use crate::domain::LinkResolver;
use crate::error::AppError;
use crate::infrastructure::cache::BundleCache;
use crate::utils::formatter::{render_caption, render_no_offers, render_unavailable};
use crate::utils::url_extractor::{
    AliExpressUrl, classify, extract_potential_urls, extract_product_id,
};

/// How a single product was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    /// At least one offer link was generated.
    Ok,
    /// The bundle was built but holds no usable link.
    NoOffers,
    /// Every upstream call failed; nothing was cached.
    Unavailable,
}

/// Reply for one product of a message.
#[derive(Debug, Clone, Serialize)]
pub struct ProductReply {
    pub product_id: ProductKey,
    pub status: ReplyStatus,
    /// HTML caption ready to send to the chat.
    pub caption: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle: Option<ProductBundle>,
}

impl ProductReply {
    fn from_bundle(bundle: &ProductBundle) -> Result<Self, AppError> {
        let (status, caption) = if bundle.resolved_count() == 0 {
            (ReplyStatus::NoOffers, render_no_offers(bundle)?)
        } else {
            (ReplyStatus::Ok, render_caption(bundle)?)
        };

        Ok(Self {
            product_id: bundle.product_id.clone(),
            status,
            caption,
            bundle: Some(bundle.clone()),
        })
    }

    fn unavailable(product_id: &ProductKey) -> Result<Self, AppError> {
        Ok(Self {
            product_id: product_id.clone(),
            status: ReplyStatus::Unavailable,
            caption: render_unavailable(product_id)?,
            bundle: None,
        })
    }

    pub fn is_success(&self) -> bool {
        self.status == ReplyStatus::Ok
    }
}

/// Counts over the products of one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplySummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

/// Everything produced for one chat message.
#[derive(Debug, Clone, Serialize)]
pub struct MessageReport {
    pub summary: ReplySummary,
    pub items: Vec<ProductReply>,
    /// Short links that could not be resolved to a product.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
}

/// Turns chat messages into product deal replies.
///
/// URLs are extracted from the text, short links are resolved, product ids
/// are deduplicated, and every distinct product is answered through the
/// shared [`BundleCache`] concurrently.
pub struct DealService {
    cache: BundleCache,
    resolver: Arc<dyn LinkResolver>,
    default_variants: VariantSet,
}

impl DealService {
    pub fn new(
        cache: BundleCache,
        resolver: Arc<dyn LinkResolver>,
        default_variants: VariantSet,
    ) -> Self {
        Self {
            cache,
            resolver,
            default_variants,
        }
    }

    pub fn cache(&self) -> &BundleCache {
        &self.cache
    }

    pub fn default_variants(&self) -> &VariantSet {
        &self.default_variants
    }

    /// Distinct product ids referenced by `text`, in order of appearance.
    ///
    /// Also returns the short links that failed to resolve.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the text holds no URL at all.
    pub async fn product_ids_in(
        &self,
        text: &str,
    ) -> Result<(Vec<ProductKey>, Vec<String>), AppError> {
        let urls = extract_potential_urls(text);
        if urls.is_empty() {
            return Err(AppError::bad_request(
                "No AliExpress links found in the message",
                json!({}),
            ));
        }
        debug!(count = urls.len(), "Found potential URLs");

        let found = urls.iter().filter_map(|url| classify(url));
        let resolved = join_all(found.map(|found| async move {
            match found {
                AliExpressUrl::Product(id) => Ok(id),
                AliExpressUrl::Short(short) => match self.resolver.resolve(&short).await {
                    Ok(full) => extract_product_id(&full).ok_or(short),
                    Err(e) => {
                        warn!(short_url = %short, error = %e, "Could not resolve short link");
                        Err(short)
                    }
                },
            }
        }))
        .await;

        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        let mut unresolved = Vec::new();
        for outcome in resolved {
            match outcome {
                Ok(id) => {
                    if seen.insert(id.clone()) {
                        ids.push(id);
                    } else {
                        debug!(product_id = %id, "Skipping duplicate product id");
                    }
                }
                Err(short) => unresolved.push(short),
            }
        }

        Ok((ids, unresolved))
    }

    /// Answers one product with the given variants.
    ///
    /// # Errors
    ///
    /// - [`AppError::ServiceUnavailable`] when the bundle cannot be built
    /// - [`AppError::Internal`] when the reply fails to render
    pub async fn lookup(
        &self,
        product_id: &ProductKey,
        variants: &VariantSet,
    ) -> Result<ProductReply, AppError> {
        let bundle = self.cache.get_or_build(product_id, variants).await?;
        ProductReply::from_bundle(&bundle)
    }

    /// Processes a whole chat message.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the message holds no URL or no
    /// URL leads to a product.
    pub async fn handle_message(&self, text: &str) -> Result<MessageReport, AppError> {
        let (ids, unresolved) = self.product_ids_in(text).await?;

        if ids.is_empty() {
            return Err(AppError::bad_request(
                "No valid AliExpress product links found in the message",
                json!({ "unresolved": unresolved }),
            ));
        }

        info!(products = ids.len(), "Processing message");

        let items = join_all(ids.iter().map(|id| async move {
            match self.lookup(id, &self.default_variants).await {
                Ok(reply) => Ok(reply),
                Err(e) => {
                    warn!(product_id = %id, error = ?e, "Product unavailable");
                    ProductReply::unavailable(id)
                }
            }
        }))
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

        let successful = items.iter().filter(|i| i.is_success()).count();
        let summary = ReplySummary {
            total: items.len(),
            successful,
            failed: items.len() - successful,
        };

        info!(
            total = summary.total,
            successful = summary.successful,
            failed = summary.failed,
            "Message processed"
        );

        Ok(MessageReport {
            summary,
            items,
            unresolved,
        })
    }
}
