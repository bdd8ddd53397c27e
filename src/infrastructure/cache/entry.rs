//! Cached bundle with its creation time.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::domain::entities::{ProductBundle, VariantSet};

/// A bundle as stored by [`super::BundleCache`].
///
/// Replaced wholesale on rebuild, never updated in place.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    bundle: Arc<ProductBundle>,
    variants: VariantSet,
    created_at: Instant,
}

impl CacheEntry {
    pub fn new(bundle: Arc<ProductBundle>, variants: VariantSet, created_at: Instant) -> Self {
        Self {
            bundle,
            variants,
            created_at,
        }
    }

    pub fn bundle(&self) -> &Arc<ProductBundle> {
        &self.bundle
    }

    /// Variant set the bundle was built for.
    pub fn variants(&self) -> &VariantSet {
        &self.variants
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    /// An entry is live while its age is strictly below the TTL.
    pub fn is_live(&self, now: Instant, ttl: Duration) -> bool {
        self.age(now) < ttl
    }

    /// True when the entry was built for at least the `requested` variants.
    pub fn covers(&self, requested: &VariantSet) -> bool {
        requested.is_subset(&self.variants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{LinkVariant, ProductKey};

    fn entry(created_at: Instant) -> CacheEntry {
        let bundle = ProductBundle::new(ProductKey::parse("1").unwrap(), None, vec![]);
        let variants = [LinkVariant::CoinOffer, LinkVariant::SuperDeal]
            .into_iter()
            .collect();
        CacheEntry::new(Arc::new(bundle), variants, created_at)
    }

    #[test]
    fn test_liveness_boundary() {
        let t0 = Instant::now();
        let e = entry(t0);
        let ttl = Duration::from_secs(2);

        assert!(e.is_live(t0, ttl));
        assert!(e.is_live(t0 + Duration::from_millis(1999), ttl));
        assert!(!e.is_live(t0 + ttl, ttl));
        assert!(!e.is_live(t0 + Duration::from_secs(3), ttl));
    }

    #[test]
    fn test_age_never_underflows() {
        let t0 = Instant::now();
        let e = entry(t0 + Duration::from_secs(5));
        assert_eq!(e.age(t0), Duration::ZERO);
    }

    #[test]
    fn test_covers_uses_variant_superset() {
        let e = entry(Instant::now());
        let subset: VariantSet = [LinkVariant::SuperDeal].into_iter().collect();
        let wider: VariantSet = [LinkVariant::SuperDeal, LinkVariant::BigSave]
            .into_iter()
            .collect();

        assert!(e.covers(&subset));
        assert!(!e.covers(&wider));
    }
}
