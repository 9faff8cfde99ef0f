//! TTL-bounded read caches
//!
//! Serves hot reads (highest-bid snapshots, bid-history pages) with
//! explicit invalidation on every accepted write. Cached values are
//! advisory: close decisions always re-read the durable store.
//!
//! Time is passed explicitly so expiry behavior is deterministic in tests.

use dashmap::DashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};
use types::bid::{Bid, HighestBidSnapshot};
use types::ids::ListingId;

/// Default entry lifetime (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Generic TTL cache over a concurrent map
pub struct TtlCache<K, V> {
    entries: DashMap<K, Entry<V>>,
    ttl: Duration,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Get a live entry, removing it if expired
    pub fn get(&self, key: &K, now: Instant) -> Option<V> {
        if let Some(entry) = self.entries.get(key) {
            if now < entry.expires_at {
                return Some(entry.value.clone());
            }
        }
        // Expired: drop outside the read guard to avoid deadlock
        self.entries.remove_if(key, |_, e| now >= e.expires_at);
        None
    }

    pub fn put(&self, key: K, value: V, now: Instant) {
        self.entries.insert(
            key,
            Entry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    pub fn invalidate(&self, key: &K) {
        self.entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The two derived views the engine caches per listing
pub struct BidCaches {
    /// Current highest bid snapshot
    pub snapshots: TtlCache<ListingId, HighestBidSnapshot>,
    /// Amount-descending bid history page
    pub history: TtlCache<ListingId, Vec<Bid>>,
}

impl BidCaches {
    pub fn new(ttl: Duration) -> Self {
        Self {
            snapshots: TtlCache::new(ttl),
            history: TtlCache::new(ttl),
        }
    }

    /// Drop every derived view of a listing; the next read recomputes
    /// from the store
    pub fn invalidate_listing(&self, listing_id: &ListingId) {
        self.snapshots.invalidate(listing_id);
        self.history.invalidate(listing_id);
    }
}

impl Default for BidCaches {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_within_ttl() {
        let cache: TtlCache<u32, String> = TtlCache::new(Duration::from_secs(10));
        let t0 = Instant::now();
        cache.put(1, "a".to_string(), t0);

        let t1 = t0 + Duration::from_secs(9);
        assert_eq!(cache.get(&1, t1), Some("a".to_string()));
    }

    #[test]
    fn test_expiry() {
        let cache: TtlCache<u32, String> = TtlCache::new(Duration::from_secs(10));
        let t0 = Instant::now();
        cache.put(1, "a".to_string(), t0);

        let t1 = t0 + Duration::from_secs(11);
        assert_eq!(cache.get(&1, t1), None);
        // Expired entry is gone, not just hidden
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate() {
        let cache: TtlCache<u32, u32> = TtlCache::new(Duration::from_secs(10));
        let t0 = Instant::now();
        cache.put(1, 7, t0);
        cache.invalidate(&1);
        assert_eq!(cache.get(&1, t0), None);
    }

    #[test]
    fn test_put_refreshes_ttl() {
        let cache: TtlCache<u32, u32> = TtlCache::new(Duration::from_secs(10));
        let t0 = Instant::now();
        cache.put(1, 7, t0);

        let t1 = t0 + Duration::from_secs(8);
        cache.put(1, 8, t1);

        let t2 = t0 + Duration::from_secs(15);
        assert_eq!(cache.get(&1, t2), Some(8));
    }

    #[test]
    fn test_invalidate_listing_clears_both_views() {
        let caches = BidCaches::new(Duration::from_secs(10));
        let listing = ListingId::new();
        let now = Instant::now();
        caches.history.put(listing, Vec::new(), now);
        caches.invalidate_listing(&listing);
        assert_eq!(caches.history.get(&listing, now), None);
    }
}
