use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::entry::CachedEntry;

/// Errors from the injected cache store.
///
/// The gateway treats read failures as misses and swallows write failures
/// after a successful fetch; only flush, which has no fallback, surfaces
/// these to callers.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),
    #[error("cache payload serialization failed: {0}")]
    Serialization(String),
    #[error("cache store does not support {0}")]
    Unsupported(&'static str),
}

/// How collection-wide flushes are executed against a store.
///
/// Declared explicitly by each implementation; the gateway never infers a
/// store's capabilities from its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushSupport {
    /// No native key enumeration: the gateway maintains a key index and
    /// deletes the recorded keys one by one.
    KeyIndex,
    /// The store enumerates keys by prefix natively; flush bypasses the key
    /// index and calls [`CacheStore::delete_prefix`].
    PrefixScan,
}

/// A TTL key-value store.
///
/// Two flavors: reference-holding in-process stores keep [`CachedEntry`]
/// values directly; serialization-boundary stores (Redis) serialize inside
/// the implementation, invisibly to the gateway.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CachedEntry>, CacheError>;

    /// Store `entry` under `key`. `ttl = None` means no expiry.
    async fn set(
        &self,
        key: &str,
        entry: CachedEntry,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    fn flush_support(&self) -> FlushSupport {
        FlushSupport::KeyIndex
    }

    /// Delete every key beginning with `prefix`, returning how many went.
    /// Only stores declaring [`FlushSupport::PrefixScan`] implement this.
    async fn delete_prefix(&self, _prefix: &str) -> Result<u64, CacheError> {
        Err(CacheError::Unsupported("prefix deletion"))
    }
}
