//! In-memory response cache
//!
//! Bounded LRU map with hit and miss counters. Values are cloned out, so
//! callers never hold the lock across an await.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::Mutex;

/// Cache statistics for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CacheStatistics {
    /// Entries currently held
    pub entries: usize,
    /// Entries held before eviction starts
    pub capacity: usize,
    /// Lookups answered from the cache
    pub hit_count: u64,
    /// Lookups that found nothing
    pub miss_count: u64,
}

impl CacheStatistics {
    /// Fraction of lookups answered from the cache, 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hit_count + self.miss_count;
        if lookups == 0 {
            0.0
        } else {
            self.hit_count as f64 / lookups as f64
        }
    }

    /// Adds another cache's counts to these.
    pub fn merge(self, other: CacheStatistics) -> CacheStatistics {
        CacheStatistics {
            entries: self.entries + other.entries,
            capacity: self.capacity + other.capacity,
            hit_count: self.hit_count + other.hit_count,
            miss_count: self.miss_count + other.miss_count,
        }
    }
}

/// LRU cache of decoded API responses.
#[derive(Debug)]
pub struct ResponseCache<K: Hash + Eq, V> {
    entries: Mutex<LruCache<K, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K: Hash + Eq, V: Clone> ResponseCache<K, V> {
    /// Creates a cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns a copy of the entry and marks it most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        let value = self.entries.lock().get(key).cloned();
        let counter = if value.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        value
    }

    /// Inserts or replaces an entry, evicting the least recently used one
    /// when full.
    pub fn put(&self, key: K, value: V) {
        self.entries.lock().put(key, value);
    }

    /// First entry matching `predicate`, most recent first. Does not touch
    /// recency or the counters.
    pub fn find(&self, mut predicate: impl FnMut(&K, &V) -> bool) -> Option<V> {
        self.entries
            .lock()
            .iter()
            .find(|(key, value)| predicate(key, value))
            .map(|(_, value)| value.clone())
    }

    /// Snapshot of the counters.
    pub fn statistics(&self) -> CacheStatistics {
        let entries = self.entries.lock();
        CacheStatistics {
            entries: entries.len(),
            capacity: entries.cap().get(),
            hit_count: self.hits.load(Ordering::Relaxed),
            miss_count: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hits_and_misses_are_counted() {
        let cache = ResponseCache::new(4);
        cache.put("popular", vec![1, 2, 3]);

        assert_eq!(cache.get(&"popular"), Some(vec![1, 2, 3]));
        assert_eq!(cache.get(&"upcoming"), None);

        let stats = cache.statistics();
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.hit_rate(), 0.5);
        assert_eq!(stats.capacity, 4);
    }

    #[test]
    fn test_least_recent_entry_is_evicted() {
        let cache = ResponseCache::new(2);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.get(&1);
        cache.put(3, "c");

        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&1), Some("a"));
        assert_eq!(cache.statistics().entries, 2);
    }

    #[test]
    fn test_find_does_not_count_lookups() {
        let cache = ResponseCache::new(8);
        cache.put((10, "popular"), "Fight Club");
        cache.put((10, "top_rated"), "Fight Club");

        assert_eq!(cache.find(|key, _| key.0 == 10), Some("Fight Club"));
        assert_eq!(cache.find(|key, _| key.0 == 11), None);
        assert_eq!(cache.statistics().hit_count, 0);
    }

    #[test]
    fn test_zero_capacity_still_caches_one_entry() {
        let cache = ResponseCache::new(0);
        cache.put("only", 1);
        assert_eq!(cache.get(&"only"), Some(1));
        assert_eq!(cache.statistics().capacity, 1);
    }
}
