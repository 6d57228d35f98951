use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use crate::clock::Clock;

// Rate limit entry - tracks accepted requests per client address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_time: DateTime<Utc>,
}

/// Fixed-window counter keyed by client address.
///
/// A window opens on the first request from a key and lasts `window`. Up to
/// `limit` requests are accepted inside it; the first request after
/// `reset_time` opens a new window. Callers can therefore burst `limit`
/// requests on each side of a boundary.
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    limit: u32,
    window: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            limit,
            window,
            clock,
        }
    }

    /// Returns `true` and records the request if `key` is under its limit.
    pub fn check_and_consume(&self, key: &str) -> bool {
        let now = self.clock.now();
        let fresh_window = RateLimitEntry {
            count: 1,
            reset_time: now + self.window,
        };

        // the entry guard holds the shard lock for the whole check-and-update
        match self.entries.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(fresh_window);
                true
            }
            Entry::Occupied(mut slot) => {
                let entry = slot.get_mut();

                // window expired..? start a new one
                if now > entry.reset_time {
                    *entry = fresh_window;
                    return true;
                }

                if entry.count >= self.limit {
                    return false;
                }

                entry.count += 1;
                true
            }
        }
    }

    /// Drops entries whose window has expired. Returns how many keys remain.
    pub fn cleanup(&self) -> usize {
        let now = self.clock.now();
        self.entries.retain(|_, entry| now <= entry.reset_time);
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn entry(&self, key: &str) -> Option<RateLimitEntry> {
        self.entries.get(key).map(|entry| *entry)
    }
}
