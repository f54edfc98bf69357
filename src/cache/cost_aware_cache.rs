use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    sync::atomic::{AtomicU64, Ordering as AtomicOrdering},
    time::Duration,
};

use parking_lot::Mutex;

use crate::config::global_config;

use super::CostCache;

/// Scores are rescaled once the touch multiplier exceeds this.
const RENORMALISE_THRESHOLD: f64 = 1e100;

/// The smallest halflife, in touches, of a [`CostAwareCache`].
pub const MIN_HALFLIFE: f64 = 0.01;

/// A totally ordered score.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Score(f64);

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// The eviction order of an entry: lowest score first, then least recently touched.
type Rank = (Score, u64);

#[derive(Debug)]
struct Entry<V> {
    value: V,
    size: u64,
    cost_per_byte: f64,
    score: f64,
    touched: u64,
}

impl<V> Entry<V> {
    fn rank(&self) -> Rank {
        (Score(self.score), self.touched)
    }
}

#[derive(Debug)]
struct CostAwareCacheState<V> {
    entries: HashMap<String, Entry<V>>,
    ranks: BTreeMap<Rank, String>,
    total_bytes: u64,
    tick: u64,
    multiplier: f64,
}

impl<V> CostAwareCacheState<V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            ranks: BTreeMap::new(),
            total_bytes: 0,
            tick: 0,
            multiplier: 1.0,
        }
    }

    /// Add the weighted cost of the entry to its score and advance the clock.
    fn touch(&mut self, key: &str, growth: f64) {
        let Some(entry) = self.entries.get_mut(key) else {
            return;
        };
        self.ranks.remove(&entry.rank());
        entry.score += entry.cost_per_byte * self.multiplier;
        entry.touched = self.tick;
        self.ranks.insert(entry.rank(), key.to_string());

        self.tick += 1;
        self.multiplier *= growth;
        if self.multiplier > RENORMALISE_THRESHOLD {
            self.renormalise();
        }
    }

    fn renormalise(&mut self) {
        log::trace!("renormalising {} cache scores", self.entries.len());
        let multiplier = self.multiplier;
        self.ranks.clear();
        for (key, entry) in &mut self.entries {
            entry.score /= multiplier;
            self.ranks.insert(entry.rank(), key.clone());
        }
        self.multiplier = 1.0;
    }

    fn remove(&mut self, key: &str) -> Option<Entry<V>> {
        let entry = self.entries.remove(key)?;
        self.ranks.remove(&entry.rank());
        self.total_bytes -= entry.size;
        Some(entry)
    }

    /// Evict the lowest ranked entries until the total size is within `available_bytes`.
    fn shrink(&mut self, available_bytes: u64) {
        while self.total_bytes > available_bytes {
            let Some((_, key)) = self.ranks.pop_first() else {
                break;
            };
            if let Some(entry) = self.entries.remove(&key) {
                self.total_bytes -= entry.size;
                log::trace!(
                    "cache evict {key} ({} bytes, score {})",
                    entry.size,
                    entry.score
                );
            }
        }
    }
}

/// A capacity bounded cache that retains entries by the cost of recomputing them.
///
/// Every retrieval hit and insertion touches the entry, adding `cost / size * m` to its score, where `m = (1 + ln 2 / halflife)^t` grows with the number of touches `t` of the cache.
/// So the score of an entry increases with its cost, decreases with its size, and older touches lose half of their weight relative to new touches every `halflife` touches.
///
/// When the total size of the entries exceeds the available bytes, the entry with the lowest score (then the least recently touched) is evicted until the cache is within capacity.
/// An entry larger than the available bytes is never retained.
///
/// The cache is [`Sync`], values are cloned on retrieval and should be cheap to clone (e.g. [`Arc`](std::sync::Arc) or [`Bytes`](bytes::Bytes)).
///
/// ```rust
/// # use std::time::Duration;
/// use zarrs_serve::cache::{CostAwareCache, CostCache};
/// let cache = CostAwareCache::new(100);
/// cache.put("cheap".to_string(), 1, Duration::from_millis(1), 60);
/// cache.put("costly".to_string(), 2, Duration::from_millis(100), 60);
/// assert_eq!(cache.get("cheap"), None);
/// assert_eq!(cache.get("costly"), Some(2));
/// ```
#[derive(Debug)]
pub struct CostAwareCache<V> {
    state: Mutex<CostAwareCacheState<V>>,
    available_bytes: u64,
    growth: f64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> Default for CostAwareCache<V> {
    /// Create a cache with the [cache available bytes](crate::config::Config#cache-available-bytes) and [cache halflife](crate::config::Config#cache-halflife) of the global configuration.
    fn default() -> Self {
        let (available_bytes, halflife) = {
            let config = global_config();
            (config.cache_available_bytes(), config.cache_halflife())
        };
        Self::with_halflife(available_bytes, halflife)
    }
}

impl<V> CostAwareCache<V> {
    /// Create a new cache with a capacity of `available_bytes`.
    ///
    /// The halflife is the [cache halflife](crate::config::Config#cache-halflife) of the global configuration.
    #[must_use]
    pub fn new(available_bytes: u64) -> Self {
        let halflife = global_config().cache_halflife();
        Self::with_halflife(available_bytes, halflife)
    }

    /// Create a new cache with a capacity of `available_bytes` where the weight of a touch halves every `halflife` touches.
    ///
    /// A non-positive or non-finite `halflife` is treated as `1`, and a positive `halflife` below [`MIN_HALFLIFE`] is raised to it.
    #[must_use]
    pub fn with_halflife(available_bytes: u64, halflife: f64) -> Self {
        let halflife = if halflife.is_finite() && halflife > 0.0 {
            halflife.max(MIN_HALFLIFE)
        } else {
            1.0
        };
        Self {
            state: Mutex::new(CostAwareCacheState::new()),
            available_bytes,
            growth: 1.0 + std::f64::consts::LN_2 / halflife,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the capacity of the cache in bytes.
    #[must_use]
    pub const fn available_bytes(&self) -> u64 {
        self.available_bytes
    }

    /// Return the number of retrievals that found a value.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(AtomicOrdering::Relaxed)
    }

    /// Return the number of retrievals that did not find a value.
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses.load(AtomicOrdering::Relaxed)
    }

    /// Returns true if the cache holds a value for `key`.
    ///
    /// Does not touch the entry or count as a hit or miss.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.state.lock().entries.contains_key(key)
    }

    /// Return the score of the entry for `key`, if present.
    #[must_use]
    pub fn score(&self, key: &str) -> Option<f64> {
        let state = self.state.lock();
        state
            .entries
            .get(key)
            .map(|entry| entry.score / state.multiplier)
    }
}

impl<V: Clone + Send + Sync> CostCache<V> for CostAwareCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        let mut state = self.state.lock();
        if let Some(value) = state.entries.get(key).map(|entry| entry.value.clone()) {
            state.touch(key, self.growth);
            drop(state);
            self.hits.fetch_add(1, AtomicOrdering::Relaxed);
            log::trace!("cache hit {key}");
            Some(value)
        } else {
            drop(state);
            self.misses.fetch_add(1, AtomicOrdering::Relaxed);
            log::trace!("cache miss {key}");
            None
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn put(&self, key: String, value: V, cost: Duration, size: u64) {
        let mut state = self.state.lock();
        let score = state.remove(&key).map_or(0.0, |entry| entry.score);
        if size > self.available_bytes {
            log::trace!(
                "cache evict {key} ({size} bytes exceeds capacity of {} bytes)",
                self.available_bytes
            );
            return;
        }

        let entry = Entry {
            value,
            size,
            cost_per_byte: cost.as_secs_f64() / size.max(1) as f64,
            score,
            touched: state.tick,
        };
        state.ranks.insert(entry.rank(), key.clone());
        state.entries.insert(key.clone(), entry);
        state.total_bytes += size;
        state.touch(&key, self.growth);
        log::trace!("cache put {key} ({size} bytes, cost {cost:?})");
        state.shrink(self.available_bytes);
    }

    fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    fn total_bytes(&self) -> u64 {
        self.state.lock().total_bytes
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rand::Rng;

    use super::*;

    impl<V> CostAwareCache<V> {
        /// Panics if the size accounting or eviction order diverges from the stored entries.
        fn assert_consistent(&self) {
            let state = self.state.lock();
            let total_bytes: u64 = state.entries.values().map(|entry| entry.size).sum();
            assert_eq!(state.total_bytes, total_bytes);
            assert_eq!(state.ranks.len(), state.entries.len());
            for (rank, key) in &state.ranks {
                assert_eq!(state.entries[key].rank(), *rank);
            }
            assert!(state.total_bytes <= self.available_bytes);
        }
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn cost_aware_cache_get_put() {
        let cache = CostAwareCache::new(1000);
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
        cache.put("a".to_string(), 1u8, ms(1), 10);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.total_bytes(), 10);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
        cache.assert_consistent();
    }

    #[test]
    fn cost_aware_cache_overwrite() {
        let cache = CostAwareCache::new(1000);
        cache.put("a".to_string(), 1u8, ms(1), 10);
        let score = cache.score("a").unwrap();
        cache.put("a".to_string(), 2u8, ms(1), 20);
        assert_eq!(cache.get("a"), Some(2));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.total_bytes(), 20);
        assert!(cache.score("a").unwrap() > score);
        cache.assert_consistent();
    }

    #[test]
    fn cost_aware_cache_evicts_cheapest() {
        let cache = CostAwareCache::new(100);
        cache.put("costly".to_string(), 0u8, ms(100), 40);
        cache.put("cheap".to_string(), 1u8, ms(1), 40);
        cache.put("new".to_string(), 2u8, ms(50), 40);
        assert!(cache.contains_key("costly"));
        assert!(!cache.contains_key("cheap"));
        assert!(cache.contains_key("new"));
        assert_eq!(cache.total_bytes(), 80);
        cache.assert_consistent();
    }

    #[test]
    fn cost_aware_cache_evicts_largest() {
        let cache = CostAwareCache::new(100);
        cache.put("large".to_string(), 0u8, ms(10), 60);
        cache.put("small".to_string(), 1u8, ms(10), 30);
        cache.put("other".to_string(), 2u8, ms(10), 30);
        assert!(!cache.contains_key("large"));
        assert!(cache.contains_key("small"));
        assert!(cache.contains_key("other"));
        cache.assert_consistent();
    }

    #[test]
    fn cost_aware_cache_recency() {
        let cache = CostAwareCache::with_halflife(100, 10.0);
        cache.put("a".to_string(), 0u8, ms(10), 40);
        cache.put("b".to_string(), 1u8, ms(10), 40);
        // Reading "a" makes "b" the eviction candidate
        assert_eq!(cache.get("a"), Some(0));
        cache.put("c".to_string(), 2u8, ms(10), 40);
        assert!(cache.contains_key("a"));
        assert!(!cache.contains_key("b"));
        assert!(cache.contains_key("c"));
        cache.assert_consistent();
    }

    #[test]
    fn cost_aware_cache_ties_evict_least_recent() {
        let cache = CostAwareCache::new(20);
        cache.put("a".to_string(), 0u8, Duration::ZERO, 10);
        cache.put("b".to_string(), 1u8, Duration::ZERO, 10);
        cache.put("c".to_string(), 2u8, Duration::ZERO, 10);
        assert!(!cache.contains_key("a"));
        assert_eq!(cache.len(), 2);
        cache.assert_consistent();
    }

    #[test]
    fn cost_aware_cache_oversize() {
        let cache = CostAwareCache::new(10);
        cache.put("a".to_string(), 0u8, ms(1), 5);
        cache.put("big".to_string(), 1u8, ms(1000), 11);
        assert_eq!(cache.get("big"), None);
        assert!(cache.contains_key("a"));
        cache.put("a".to_string(), 2u8, ms(1), 11);
        assert!(cache.is_empty());
        assert_eq!(cache.total_bytes(), 0);
        cache.assert_consistent();
    }

    #[test]
    fn cost_aware_cache_zero_size() {
        let cache = CostAwareCache::new(0);
        cache.put("a".to_string(), 0u8, ms(1), 0);
        assert_eq!(cache.get("a"), Some(0));
        cache.assert_consistent();
    }

    #[test]
    fn cost_aware_cache_renormalise() {
        let cache = CostAwareCache::with_halflife(1000, 0.01);
        for i in 0..2000u64 {
            cache.put(format!("{}", i % 7), i, ms(i % 5), 10 + i % 3);
            assert!(cache.score(&format!("{}", i % 7)).unwrap().is_finite());
        }
        assert_eq!(cache.len(), 7);
        cache.assert_consistent();
    }

    #[test]
    fn cost_aware_cache_tiny_halflife_keeps_cost() {
        let cache = CostAwareCache::with_halflife(100, 1e-300);
        cache.put("costly".to_string(), 0u8, ms(10_000), 40);
        cache.put("cheap".to_string(), 1u8, ms(1), 40);
        assert!(cache.score("costly").unwrap() > 0.0);
        cache.put("c".to_string(), 2u8, ms(1), 40);
        assert!(cache.contains_key("costly"));
        assert!(!cache.contains_key("cheap"));
        assert!(cache.contains_key("c"));
        cache.assert_consistent();
    }

    #[test]
    fn cost_aware_cache_concurrent() {
        let cache = Arc::new(CostAwareCache::new(5_000));
        std::thread::scope(|s| {
            for _ in 0..8 {
                let cache = cache.clone();
                s.spawn(move || {
                    let mut rng = rand::thread_rng();
                    for _ in 0..1000 {
                        let key = format!("{}", rng.gen_range(0..64));
                        if cache.get(&key).is_none() {
                            let size = rng.gen_range(1..500);
                            cache.put(key, size, Duration::from_micros(rng.gen_range(0..100)), size);
                        }
                    }
                });
            }
        });
        assert!(cache.total_bytes() <= 5_000);
        assert_eq!(cache.hits() + cache.misses(), 8000);
        cache.assert_consistent();
    }
}
