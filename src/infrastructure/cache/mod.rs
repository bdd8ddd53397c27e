//! In-process caches and their eviction daemon.
//!
//! - [`BundleCache`] - Coalescing TTL cache of product bundles
//! - [`ResolvedUrlCache`] - TTL cache of short-link resolutions
//! - [`Evictor`] - Periodic sweep over every [`Evictable`] store

mod bundle_cache;
mod entry;
mod evictor;
mod resolved_url_cache;
mod service;

pub use bundle_cache::{BundleCache, CacheStats};
pub use entry::CacheEntry;
pub use evictor::{EvictionReport, Evictor};
pub use resolved_url_cache::ResolvedUrlCache;
pub use service::{Evictable, EvictionError, EvictionResult};
