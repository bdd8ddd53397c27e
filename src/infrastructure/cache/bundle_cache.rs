//! Coalescing TTL cache for product bundles.
//!
//! Many chat messages can reference the same product at the same time. The
//! cache makes sure only one bundle build runs per product, and that every
//! caller asking for that product while it runs gets the same outcome.
//!
//! ```text
//! caller A ─┐                          ┌──────────────┐
//!           │   miss, registers   ───► │ build task   │──► entries[key]
//! caller B ─┼─► marker (leader)        │ (spawned)    │
//!           │                          └──────┬───────┘
//! caller C ─┘   marker exists  ◄── watch ─────┘ publishes outcome,
//!               (waiters)                      then clears marker
//! ```
//!
//! # Locking
//!
//! Two maps, each behind its own `parking_lot` lock: `entries` (bundles with
//! their creation time) and `in_flight` (one `watch` sender per running
//! build). Every critical section is a single map operation; no lock is held
//! across an `.await`, so a slow upstream never blocks other keys.
//!
//! Lock order is `in_flight` then `entries`. A finishing build writes its
//! entry before it removes its marker, so a caller holding `in_flight` always
//! sees either the marker or the fresh entry.

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::entry::CacheEntry;
use super::service::{Evictable, EvictionError, EvictionResult};
use crate::domain::entities::{ProductBundle, ProductKey, VariantSet};
use crate::domain::{BundleBuilder, BundleError};

type BuildOutcome = Result<Arc<ProductBundle>, BundleError>;
type FlightSender = watch::Sender<Option<BuildOutcome>>;
type FlightReceiver = watch::Receiver<Option<BuildOutcome>>;

/// Result of looking a key up in `entries`.
enum Lookup {
    Fresh(Arc<ProductBundle>),
    /// Live entry built for fewer variants than requested.
    Incomplete(VariantSet),
    /// Entry at or past its TTL. Never returned to callers.
    Stale,
    Missing,
}

enum Registration {
    Leader(FlightSender),
    Waiter(FlightReceiver),
}

struct Shared {
    entries: RwLock<HashMap<ProductKey, CacheEntry>>,
    in_flight: Mutex<HashMap<ProductKey, FlightSender>>,
    ttl: Duration,
}

impl Shared {
    fn lookup(&self, key: &ProductKey, requested: &VariantSet, now: Instant) -> Lookup {
        let entries = self.entries.read();
        match entries.get(key) {
            None => Lookup::Missing,
            Some(entry) if !entry.is_live(now, self.ttl) => Lookup::Stale,
            Some(entry) if entry.covers(requested) => Lookup::Fresh(Arc::clone(entry.bundle())),
            Some(entry) => Lookup::Incomplete(entry.variants().clone()),
        }
    }
}

/// Clears the in-flight marker when the build task ends, including by panic.
struct FlightGuard {
    shared: Arc<Shared>,
    key: ProductKey,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.shared.in_flight.lock().remove(&self.key);
    }
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub in_flight: usize,
}

/// Process-wide bundle cache with request coalescing.
///
/// Cheap to clone; clones share the same maps.
#[derive(Clone)]
pub struct BundleCache {
    shared: Arc<Shared>,
    builder: Arc<dyn BundleBuilder>,
}

impl BundleCache {
    pub fn new(builder: Arc<dyn BundleBuilder>, ttl: Duration) -> Self {
        info!(ttl_secs = ttl.as_secs(), "Bundle cache initialized");
        Self {
            shared: Arc::new(Shared {
                entries: RwLock::new(HashMap::new()),
                in_flight: Mutex::new(HashMap::new()),
                ttl,
            }),
            builder,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.shared.ttl
    }

    /// Returns the bundle for `product_id`, building it if needed.
    ///
    /// - A live entry built for a superset of `variants` is returned without
    ///   any upstream call.
    /// - Otherwise the first caller builds (with `variants` plus whatever the
    ///   live entry already had) and concurrent callers wait for that build.
    /// - Failed builds are not cached; every waiter gets the same error.
    ///
    /// The returned bundle holds exactly the requested variants, in
    /// canonical order.
    ///
    /// # Errors
    ///
    /// - [`BundleError::UpstreamUnavailable`] when every upstream call failed
    /// - [`BundleError::BuildAborted`] when the build task died without a result
    pub async fn get_or_build(
        &self,
        product_id: &ProductKey,
        variants: &VariantSet,
    ) -> Result<Arc<ProductBundle>, BundleError> {
        if let Lookup::Fresh(bundle) = self.shared.lookup(product_id, variants, Instant::now()) {
            debug!(product_id = %product_id, "Cache HIT");
            metrics::counter!("bundle_cache_hits_total").increment(1);
            return Ok(project(bundle, variants));
        }

        loop {
            let mut wanted = variants.clone();

            let registration = {
                let mut in_flight = self.shared.in_flight.lock();

                match self.shared.lookup(product_id, variants, Instant::now()) {
                    Lookup::Fresh(bundle) => {
                        debug!(product_id = %product_id, "Cache HIT after in-flight build");
                        metrics::counter!("bundle_cache_hits_total").increment(1);
                        return Ok(project(bundle, variants));
                    }
                    Lookup::Incomplete(existing) => {
                        debug!(product_id = %product_id, "Cache entry lacks requested variants");
                        wanted.extend(existing);
                    }
                    Lookup::Stale => debug!(product_id = %product_id, "Cache entry expired"),
                    Lookup::Missing => debug!(product_id = %product_id, "Cache MISS"),
                }

                match in_flight.get(product_id) {
                    Some(sender) => Registration::Waiter(sender.subscribe()),
                    None => {
                        let (sender, _) = watch::channel(None);
                        in_flight.insert(product_id.clone(), sender.clone());
                        Registration::Leader(sender)
                    }
                }
            };

            match registration {
                Registration::Leader(sender) => {
                    metrics::counter!("bundle_cache_misses_total").increment(1);
                    let bundle = self.lead(product_id.clone(), wanted, sender).await?;
                    return Ok(project(bundle, variants));
                }
                Registration::Waiter(receiver) => {
                    debug!(product_id = %product_id, "Coalescing onto in-flight build");
                    metrics::counter!("bundle_cache_coalesced_total").increment(1);

                    let bundle = wait_for_leader(receiver, product_id).await?;
                    if bundle.covers(variants) {
                        return Ok(project(bundle, variants));
                    }
                    debug!(
                        product_id = %product_id,
                        "In-flight build lacked requested variants, retrying"
                    );
                }
            }
        }
    }

    /// Runs the build on its own task so it completes even if this caller
    /// is dropped, then stores and publishes the outcome.
    async fn lead(
        &self,
        product_id: ProductKey,
        variants: VariantSet,
        sender: FlightSender,
    ) -> BuildOutcome {
        let guard = FlightGuard {
            shared: Arc::clone(&self.shared),
            key: product_id.clone(),
        };
        let shared = Arc::clone(&self.shared);
        let builder = Arc::clone(&self.builder);
        let key = product_id.clone();

        let task = tokio::spawn(async move {
            let _guard = guard;
            let outcome = builder.build(&key, &variants).await.map(Arc::new);

            match &outcome {
                Ok(bundle) => {
                    let entry = CacheEntry::new(Arc::clone(bundle), variants, Instant::now());
                    shared.entries.write().insert(key.clone(), entry);
                    metrics::counter!("bundle_builds_total", "outcome" => "success").increment(1);
                    debug!(product_id = %key, "Cached bundle");
                }
                Err(e) => {
                    metrics::counter!("bundle_builds_total", "outcome" => "failure").increment(1);
                    warn!(product_id = %key, error = %e, "Bundle build failed, nothing cached");
                }
            }

            let waiters = sender.receiver_count();
            sender.send_replace(Some(outcome.clone()));
            if waiters > 0 {
                debug!(product_id = %key, waiters, "Published build outcome to coalesced waiters");
            }

            outcome
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(product_id = %product_id, error = %e, "Bundle build task aborted");
                Err(BundleError::BuildAborted { product_id })
            }
        }
    }

    /// Drops the entry for `product_id`. Returns whether one existed.
    pub fn invalidate(&self, product_id: &ProductKey) -> bool {
        let removed = self.shared.entries.write().remove(product_id).is_some();
        if removed {
            debug!(product_id = %product_id, "Cache INVALIDATE");
        }
        removed
    }

    /// Drops every entry. In-flight builds are left to finish.
    pub fn flush(&self) -> usize {
        let flushed = {
            let mut entries = self.shared.entries.write();
            let count = entries.len();
            entries.clear();
            count
        };
        info!(flushed, "Bundle cache flushed");
        flushed
    }

    /// True when an entry exists for `product_id`, expired or not.
    pub fn contains(&self, product_id: &ProductKey) -> bool {
        self.shared.entries.read().contains_key(product_id)
    }

    pub fn in_flight_count(&self) -> usize {
        self.shared.in_flight.lock().len()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.shared.entries.read().len(),
            in_flight: self.in_flight_count(),
        }
    }
}

impl Evictable for BundleCache {
    fn name(&self) -> &'static str {
        "bundles"
    }

    fn expired_keys(&self, now: Instant) -> Vec<String> {
        self.shared
            .entries
            .read()
            .iter()
            .filter(|(_, entry)| !entry.is_live(now, self.shared.ttl))
            .map(|(key, _)| key.to_string())
            .collect()
    }

    fn evict(&self, key: &str, now: Instant) -> EvictionResult<bool> {
        let product_id =
            ProductKey::parse(key).ok_or_else(|| EvictionError::InvalidKey(key.to_string()))?;

        let mut entries = self.shared.entries.write();
        match entries.get(&product_id) {
            Some(entry) if !entry.is_live(now, self.shared.ttl) => {
                entries.remove(&product_id);
                metrics::counter!("bundle_cache_evictions_total").increment(1);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn len(&self) -> usize {
        self.shared.entries.read().len()
    }
}

async fn wait_for_leader(mut receiver: FlightReceiver, product_id: &ProductKey) -> BuildOutcome {
    let published = match receiver.wait_for(Option::is_some).await {
        Ok(value) => value.clone(),
        Err(_) => None,
    };

    published.unwrap_or_else(|| {
        Err(BundleError::BuildAborted {
            product_id: product_id.clone(),
        })
    })
}

/// Narrows a covering bundle down to the requested variants.
fn project(bundle: Arc<ProductBundle>, requested: &VariantSet) -> Arc<ProductBundle> {
    if bundle.links.len() == requested.len() {
        bundle
    } else {
        Arc::new(bundle.restricted_to(requested))
    }
}
