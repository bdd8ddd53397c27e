//! Aggregated product result.

use serde::Serialize;

use super::link::{LinkResult, VariantSet};
use super::product::{ProductDetail, ProductKey};

/// Product detail plus one link outcome per requested variant.
///
/// Built once per cache fill and never mutated afterwards; the cache hands
/// out shared `Arc<ProductBundle>` handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductBundle {
    pub product_id: ProductKey,
    /// `None` when the detail call failed.
    pub detail: Option<ProductDetail>,
    /// Sorted by canonical variant order, one entry per variant.
    pub links: Vec<LinkResult>,
}

impl ProductBundle {
    /// Creates a bundle, putting `links` into canonical variant order.
    pub fn new(
        product_id: ProductKey,
        detail: Option<ProductDetail>,
        mut links: Vec<LinkResult>,
    ) -> Self {
        links.sort_by_key(|l| l.variant);
        Self {
            product_id,
            detail,
            links,
        }
    }

    /// Variants this bundle carries a result for.
    pub fn variants(&self) -> VariantSet {
        self.links.iter().map(|l| l.variant).collect()
    }

    /// True when every variant in `requested` has a result in this bundle.
    pub fn covers(&self, requested: &VariantSet) -> bool {
        requested
            .iter()
            .all(|v| self.links.iter().any(|l| l.variant == *v))
    }

    /// Copy of this bundle keeping only the `requested` variants.
    pub fn restricted_to(&self, requested: &VariantSet) -> Self {
        Self {
            product_id: self.product_id.clone(),
            detail: self.detail.clone(),
            links: self
                .links
                .iter()
                .filter(|l| requested.contains(&l.variant))
                .cloned()
                .collect(),
        }
    }

    pub fn resolved_links(&self) -> impl Iterator<Item = &LinkResult> {
        self.links.iter().filter(|l| l.is_resolved())
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved_links().count()
    }

    /// True when neither the detail nor any link could be fetched.
    pub fn is_total_failure(&self) -> bool {
        self.detail.is_none() && self.resolved_count() == 0
    }
}
