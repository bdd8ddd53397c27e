//! TTL store for short-link resolutions.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use super::service::{Evictable, EvictionResult};

/// Maps a short link (`s.click.aliexpress.com/e/...`) to the full product URL
/// it redirects to.
///
/// Resolutions are stable for a long time, so they share the bundle TTL and
/// the same evictor.
pub struct ResolvedUrlCache {
    entries: RwLock<HashMap<String, (String, Instant)>>,
    ttl: Duration,
}

impl ResolvedUrlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Live resolution for `short_url`, if any.
    pub fn get(&self, short_url: &str) -> Option<String> {
        let now = Instant::now();
        self.entries
            .read()
            .get(short_url)
            .filter(|(_, stored_at)| now.saturating_duration_since(*stored_at) < self.ttl)
            .map(|(resolved, _)| resolved.clone())
    }

    pub fn insert(&self, short_url: impl Into<String>, resolved: impl Into<String>) {
        self.entries
            .write()
            .insert(short_url.into(), (resolved.into(), Instant::now()));
    }

    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let count = entries.len();
        entries.clear();
        count
    }

    fn is_expired(&self, stored_at: Instant, now: Instant) -> bool {
        now.saturating_duration_since(stored_at) >= self.ttl
    }
}

impl Evictable for ResolvedUrlCache {
    fn name(&self) -> &'static str {
        "resolved_urls"
    }

    fn expired_keys(&self, now: Instant) -> Vec<String> {
        self.entries
            .read()
            .iter()
            .filter(|(_, (_, stored_at))| self.is_expired(*stored_at, now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    fn evict(&self, key: &str, now: Instant) -> EvictionResult<bool> {
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some((_, stored_at)) if self.is_expired(*stored_at, now) => {
                entries.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}
