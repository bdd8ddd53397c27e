#![allow(dead_code)]

use aliexpress_deals::application::services::{BundleAggregator, DealService};
use aliexpress_deals::domain::entities::{LinkVariant, Price, ProductDetail, ProductKey, VariantSet};
use aliexpress_deals::domain::{LinkResolver, ResolveError, UpstreamClient, UpstreamError};
use aliexpress_deals::infrastructure::cache::{BundleCache, ResolvedUrlCache};
use aliexpress_deals::state::AppState;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const CALL_TIMEOUT: Duration = Duration::from_secs(5);
pub const TTL: Duration = Duration::from_secs(60);

/// Scriptable upstream with per-call delays, failures and call counters.
#[derive(Default)]
pub struct StubUpstream {
    pub detail_calls: AtomicUsize,
    pub link_calls: AtomicUsize,
    detail_delay: Duration,
    link_delays: HashMap<LinkVariant, Duration>,
    failing_details: HashSet<String>,
    failing_links: HashSet<String>,
}

impl StubUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_detail_delay(mut self, delay: Duration) -> Self {
        self.detail_delay = delay;
        self
    }

    pub fn with_link_delay(mut self, variant: LinkVariant, delay: Duration) -> Self {
        self.link_delays.insert(variant, delay);
        self
    }

    /// Every call for `product_id` fails with a 503.
    pub fn failing(mut self, product_id: &str) -> Self {
        self.failing_details.insert(product_id.to_string());
        self.failing_links.insert(product_id.to_string());
        self
    }

    /// Link calls for `product_id` fail; the detail call still succeeds.
    pub fn without_links(mut self, product_id: &str) -> Self {
        self.failing_links.insert(product_id.to_string());
        self
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub fn link_calls(&self) -> usize {
        self.link_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamClient for StubUpstream {
    async fn fetch_detail(&self, product_id: &ProductKey) -> Result<ProductDetail, UpstreamError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.detail_delay).await;

        if self.failing_details.contains(product_id.as_str()) {
            return Err(UpstreamError::Status(503));
        }

        Ok(ProductDetail::new(
            format!("Product {}", product_id),
            Some(format!("https://img.example/{}.jpg", product_id)),
            Some(Price {
                amount: "9.99".to_string(),
                currency: "USD".to_string(),
            }),
        ))
    }

    async fn generate_link(
        &self,
        product_id: &ProductKey,
        variant: LinkVariant,
    ) -> Result<String, UpstreamError> {
        self.link_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.link_delays.get(&variant) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing_links.contains(product_id.as_str()) {
            return Err(UpstreamError::Status(503));
        }

        Ok(format!("https://s.click.aliexpress.com/e/{}_{}", product_id, variant.key()))
    }
}

/// Resolver backed by a fixed short-to-full URL table.
#[derive(Default)]
pub struct StubResolver {
    table: Mutex<HashMap<String, String>>,
}

impl StubResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, short_url: &str, full_url: &str) -> Self {
        self.table
            .lock()
            .insert(short_url.to_string(), full_url.to_string());
        self
    }
}

#[async_trait]
impl LinkResolver for StubResolver {
    async fn resolve(&self, short_url: &str) -> Result<String, ResolveError> {
        self.table
            .lock()
            .get(short_url)
            .cloned()
            .ok_or(ResolveError::Status(404))
    }
}

pub fn default_variants() -> VariantSet {
    [LinkVariant::CoinOffer, LinkVariant::SuperDeal, LinkVariant::BigSave]
        .into_iter()
        .collect()
}

pub fn key(raw: &str) -> ProductKey {
    ProductKey::parse(raw).unwrap()
}

pub fn create_test_cache(upstream: Arc<StubUpstream>, ttl: Duration) -> BundleCache {
    let aggregator = BundleAggregator::new(upstream, CALL_TIMEOUT);
    BundleCache::new(Arc::new(aggregator), ttl)
}

pub fn create_test_state(upstream: Arc<StubUpstream>, resolver: StubResolver) -> AppState {
    let cache = create_test_cache(upstream, TTL);
    let deal_service = DealService::new(cache, Arc::new(resolver), default_variants());

    AppState::new(
        Arc::new(deal_service),
        Arc::new(ResolvedUrlCache::new(TTL)),
    )
}
