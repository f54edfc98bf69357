//! Zarrs serve global configuration options.

use std::sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Global configuration options for the zarrs serve crate.
///
/// Retrieve the global [`Config`] with [`global_config`] and modify it with [`global_config_mut`].
///
/// # Cache Configuration Options
///
/// ## Cache Available Bytes
/// > default: `1_000_000`
///
/// The capacity in bytes of a cache created with [`CostAwareCache::default`](crate::cache::CostAwareCache::default).
/// A cache constructed with an explicit capacity ignores this option.
///
/// ## Cache Halflife
/// > default: `1000.0`
///
/// The number of cache touches after which the recency weight of an earlier touch halves.
/// Smaller values make the cache behave more like an LRU cache, larger values favour expensive entries for longer.
///
/// # Chunk Configuration Options
///
/// ## Pad Partial Chunks
/// > default: [`true`]
///
/// If enabled, chunks on the trailing edge of an array are padded to the nominal chunk shape with the fill value of the variable before encoding.
/// Zarr V2 readers expect every stored chunk to have the full chunk shape.
/// If disabled, the truncated chunk is encoded as is.
#[derive(Debug)]
pub struct Config {
    cache_available_bytes: u64,
    cache_halflife: f64,
    pad_partial_chunks: bool,
}

#[allow(clippy::derivable_impls)]
impl Default for Config {
    fn default() -> Self {
        Config {
            cache_available_bytes: 1_000_000,
            cache_halflife: 1000.0,
            pad_partial_chunks: true,
        }
    }
}

impl Config {
    /// Get the [cache available bytes](#cache-available-bytes) configuration.
    #[must_use]
    pub fn cache_available_bytes(&self) -> u64 {
        self.cache_available_bytes
    }

    /// Set the [cache available bytes](#cache-available-bytes) configuration.
    pub fn set_cache_available_bytes(&mut self, available_bytes: u64) {
        self.cache_available_bytes = available_bytes;
    }

    /// Get the [cache halflife](#cache-halflife) configuration.
    #[must_use]
    pub fn cache_halflife(&self) -> f64 {
        self.cache_halflife
    }

    /// Set the [cache halflife](#cache-halflife) configuration.
    ///
    /// Non-positive or non-finite values are ignored.
    pub fn set_cache_halflife(&mut self, halflife: f64) {
        if halflife.is_finite() && halflife > 0.0 {
            self.cache_halflife = halflife;
        }
    }

    /// Get the [pad partial chunks](#pad-partial-chunks) configuration.
    #[must_use]
    pub fn pad_partial_chunks(&self) -> bool {
        self.pad_partial_chunks
    }

    /// Set the [pad partial chunks](#pad-partial-chunks) configuration.
    pub fn set_pad_partial_chunks(&mut self, pad_partial_chunks: bool) {
        self.pad_partial_chunks = pad_partial_chunks;
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Returns a reference to the global zarrs serve configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global config is already held by the current thread.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .read()
        .unwrap()
}

/// Returns a mutable reference to the global zarrs serve configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global config is already held by the current thread.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .write()
        .unwrap()
}
