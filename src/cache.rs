//! Caching of derived metadata and encoded chunks.
//!
//! A [`CostCache`] stores values with the wall-clock cost of computing them and their size in bytes.
//! [`CostAwareCache`] is a capacity bounded implementation that evicts entries which are cheap to recompute, large, or stale first.
//! [`CostTimer`] measures the cost of a scoped computation.

mod cost_aware_cache;
mod cost_timer;

pub use cost_aware_cache::{CostAwareCache, MIN_HALFLIFE};
pub use cost_timer::{measure, CostTimer};

use std::time::Duration;

/// Traits for a cache of values that are costly to compute.
pub trait CostCache<V>: Send + Sync {
    /// Retrieve a value from the cache. Returns [`None`] if the value is not present.
    ///
    /// A retrieval may update the cache (e.g. the recency of the entry).
    fn get(&self, key: &str) -> Option<V>;

    /// Insert a value into the cache, replacing any existing value with the same key.
    ///
    /// `cost` is the time taken to compute `value` and `size` is its size in bytes.
    /// The cache may evict other entries, or the inserted entry itself, to stay within capacity.
    fn put(&self, key: String, value: V, cost: Duration, size: u64);

    /// Return the number of entries in the cache.
    #[must_use]
    fn len(&self) -> usize;

    /// Returns true if the cache is empty.
    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the total size in bytes of the entries in the cache.
    #[must_use]
    fn total_bytes(&self) -> u64;
}
