use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use crate::clock::Clock;

// Cache entry with timestamp
#[derive(Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: DateTime<Utc>,
}

/// A cache hit. `fresh` is false once the entry is older than the TTL.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub data: T,
    pub fresh: bool,
}

/// Last-known-good responses keyed by endpoint and identity.
///
/// Expired entries are kept so a caller can fall back to them when the
/// upstream fails; nothing is evicted until [`ResponseCache::clear`].
pub struct ResponseCache<T> {
    entries: DashMap<String, CacheEntry<T>>,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> ResponseCache<T> {
    pub fn new(ttl: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    pub fn get(&self, key: &str) -> Option<Cached<T>> {
        let entry = self.entries.get(key)?;
        let age = self.clock.now() - entry.timestamp;
        Some(Cached {
            data: entry.data.clone(),
            fresh: age < self.ttl,
        })
    }

    pub fn put(&self, key: &str, data: T) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                data,
                timestamp: self.clock.now(),
            },
        );
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

// Create a cache key for the GitHub endpoint
pub fn github_cache_key(username: &str) -> String {
    format!("github-{}", username)
}
