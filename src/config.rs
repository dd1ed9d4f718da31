//! Configuration for a collection cache.
//!
//! # Example
//!
//! ```
//! use doc_cache::CollectionCacheConfig;
//!
//! // Minimal config (uses defaults)
//! let config = CollectionCacheConfig::default();
//! assert_eq!(config.max_cached_entries, 1000);
//! assert!(!config.allow_flushing_collection_cache);
//!
//! // Full config
//! let config = CollectionCacheConfig {
//!     max_cached_entries: 5000,
//!     allow_flushing_collection_cache: true,
//! };
//! ```

use serde::Deserialize;

/// Configuration for a [`CollectionCache`](crate::CollectionCache).
///
/// All fields have sensible defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionCacheConfig {
    /// Entry bound for the default in-process cache store (ignored when a
    /// cache store is injected).
    #[serde(default = "default_max_cached_entries")]
    pub max_cached_entries: usize,

    /// Whether `flush_collection_cache` is allowed to do anything.
    ///
    /// Off by default: supporting collection-wide flushes means recording
    /// every key ever written for the collection, and unbounded key lists
    /// are themselves a memory liability.
    #[serde(default)]
    pub allow_flushing_collection_cache: bool,
}

fn default_max_cached_entries() -> usize { 1000 }

impl Default for CollectionCacheConfig {
    fn default() -> Self {
        Self {
            max_cached_entries: default_max_cached_entries(),
            allow_flushing_collection_cache: false,
        }
    }
}
