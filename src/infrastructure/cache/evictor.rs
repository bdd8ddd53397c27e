//! Periodic eviction daemon.
//!
//! Sweeps every registered [`Evictable`] store on a fixed interval and drops
//! entries whose age has reached the TTL. Lookups already treat such entries
//! as misses, so eviction only bounds memory and never changes what callers
//! observe.
//!
//! # Example
//!
//! ```ignore
//! let evictor = Evictor::new(vec![bundle_cache, resolved_urls], Duration::from_secs(86_400));
//! tokio::spawn(evictor.run(shutdown.clone()));
//! ```

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::service::Evictable;

/// Outcome of one sweep over all stores.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EvictionReport {
    /// Entries examined across all stores.
    pub scanned: usize,
    pub evicted: usize,
    pub failed: usize,
}

/// Background daemon that evicts expired cache entries.
pub struct Evictor {
    targets: Vec<Arc<dyn Evictable>>,
    interval: Duration,
}

impl Evictor {
    pub fn new(targets: Vec<Arc<dyn Evictable>>, interval: Duration) -> Self {
        Self { targets, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Evicts every entry that is expired at `now`.
    ///
    /// Candidates are collected first and removed one by one; a key that
    /// fails to evict is logged and skipped.
    pub fn scan_once(&self, now: Instant) -> EvictionReport {
        let mut report = EvictionReport::default();

        for target in &self.targets {
            report.scanned += target.len();

            for key in target.expired_keys(now) {
                match target.evict(&key, now) {
                    Ok(true) => report.evicted += 1,
                    Ok(false) => {
                        debug!(store = target.name(), key = %key, "Entry refreshed before eviction")
                    }
                    Err(e) => {
                        report.failed += 1;
                        error!(
                            store = target.name(),
                            key = %key,
                            error = %e,
                            "Failed to evict entry"
                        );
                    }
                }
            }
        }

        info!(
            scanned = report.scanned,
            evicted = report.evicted,
            failed = report.failed,
            "Eviction pass complete"
        );

        report
    }

    /// Runs sweeps until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            stores = self.targets.len(),
            "Evictor starting"
        );

        let mut interval = tokio::time::interval(self.interval);
        // Skip the first immediate tick
        interval.tick().await;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Evictor shutting down");
                    break;
                }

                _ = interval.tick() => {
                    self.scan_once(Instant::now());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::{EvictionError, EvictionResult};
    use parking_lot::Mutex;

    /// Store with a fixed list of expired keys; keys starting with `bad` fail.
    struct FakeStore {
        expired: Mutex<Vec<String>>,
        live: usize,
    }

    impl FakeStore {
        fn new(expired: &[&str], live: usize) -> Self {
            Self {
                expired: Mutex::new(expired.iter().map(|s| s.to_string()).collect()),
                live,
            }
        }
    }

    impl Evictable for FakeStore {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn expired_keys(&self, _now: Instant) -> Vec<String> {
            self.expired.lock().clone()
        }

        fn evict(&self, key: &str, _now: Instant) -> EvictionResult<bool> {
            if key.starts_with("bad") {
                return Err(EvictionError::InvalidKey(key.to_string()));
            }
            let mut expired = self.expired.lock();
            let before = expired.len();
            expired.retain(|k| k != key);
            Ok(expired.len() < before)
        }

        fn len(&self) -> usize {
            self.expired.lock().len() + self.live
        }
    }

    #[test]
    fn test_scan_once_counts_evictions_and_failures() {
        let store = Arc::new(FakeStore::new(&["1", "bad-key", "2"], 3));
        let evictor = Evictor::new(vec![store.clone()], Duration::from_secs(1));

        let report = evictor.scan_once(Instant::now());

        assert_eq!(
            report,
            EvictionReport {
                scanned: 6,
                evicted: 2,
                failed: 1
            }
        );
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_scan_once_covers_every_store() {
        let a = Arc::new(FakeStore::new(&["1"], 0));
        let b = Arc::new(FakeStore::new(&["x", "y"], 1));
        let evictor = Evictor::new(vec![a.clone(), b.clone()], Duration::from_secs(1));

        let report = evictor.scan_once(Instant::now());

        assert_eq!(report.evicted, 3);
        assert!(a.is_empty());
        assert_eq!(b.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_cancel() {
        let store = Arc::new(FakeStore::new(&["1"], 0));
        let evictor = Evictor::new(vec![store.clone()], Duration::from_secs(5));
        let shutdown = CancellationToken::new();

        let handle = tokio::spawn(evictor.run(shutdown.clone()));

        // First tick is skipped, so nothing is evicted before one interval.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(store.len(), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(store.is_empty());

        shutdown.cancel();
        handle.await.unwrap();
    }
}
