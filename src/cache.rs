/// Time-bounded memoization of resolved records, keyed by normalized query.
///
/// Stale entries read as a miss and are replaced on the next put. Once
/// `capacity` entries exist, the least recently used one is evicted.
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::models::AthleteRecord;

/// Cache key for a raw query: trimmed, lowercased, whitespace collapsed.
#[must_use]
pub fn normalize_key(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone)]
struct CacheEntry {
    record: AthleteRecord,
    created_at: Instant,
}

#[derive(Debug)]
pub struct ResultCache {
    ttl: Duration,
    entries: LruCache<String, CacheEntry>,
}

impl ResultCache {
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            ttl,
            entries: LruCache::new(capacity),
        }
    }

    /// Fresh record for `key`, if any.
    pub fn get(&mut self, key: &str) -> Option<AthleteRecord> {
        self.get_at(key, Instant::now())
    }

    pub fn put(&mut self, key: &str, record: AthleteRecord) {
        self.put_at(key, record, Instant::now());
    }

    /// Number of stored entries, stale ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get_at(&mut self, key: &str, now: Instant) -> Option<AthleteRecord> {
        // peek first so a stale entry is not promoted
        let created_at = self.entries.peek(key)?.created_at;
        if now.saturating_duration_since(created_at) >= self.ttl {
            return None;
        }
        self.entries.get(key).map(|e| e.record.clone())
    }

    fn put_at(&mut self, key: &str, record: AthleteRecord, now: Instant) {
        self.entries.put(
            key.to_string(),
            CacheEntry {
                record,
                created_at: now,
            },
        );
    }
}
