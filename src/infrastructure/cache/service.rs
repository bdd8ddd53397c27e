//! Eviction contract shared by every TTL store in the process.

use thiserror::Error;
use tokio::time::Instant;

/// Errors that can occur while evicting a single key.
///
/// The evictor logs these and moves on to the next key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvictionError {
    #[error("invalid cache key '{0}'")]
    InvalidKey(String),
}

/// Result type for eviction operations.
pub type EvictionResult<T> = Result<T, EvictionError>;

/// A store whose entries expire after a time-to-live.
///
/// Implementations must keep every lock section short: the evictor first
/// collects candidate keys, then evicts them one by one, so concurrent
/// readers and writers only ever wait for a single map operation.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::BundleCache`] - Product bundles
/// - [`crate::infrastructure::cache::ResolvedUrlCache`] - Resolved short links
pub trait Evictable: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Keys whose entries are at least TTL old at `now`.
    fn expired_keys(&self, now: Instant) -> Vec<String>;

    /// Removes `key` if its entry is still expired at `now`.
    ///
    /// Returns `Ok(false)` when the entry is gone or was replaced by a fresh
    /// one since [`Evictable::expired_keys`] ran.
    fn evict(&self, key: &str, now: Instant) -> EvictionResult<bool>;

    /// Number of stored entries, live or expired.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
