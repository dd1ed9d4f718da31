//! Cache stores.
//!
//! The TTL cache behind the gateway is an injected [`CacheStore`]. Two
//! flavors ship here: [`InMemoryCache`] (reference-holding, bounded, the
//! default) and [`RedisCache`] (serialization boundary, native prefix-scan
//! flush). Which flush strategy the gateway uses follows from the store's
//! declared [`FlushSupport`], never from inspecting its shape.

pub mod entry;
pub mod memory;
pub mod redis;
pub mod traits;

pub use entry::CachedEntry;
pub use memory::InMemoryCache;
pub use redis::RedisCache;
pub use traits::{CacheError, CacheStore, FlushSupport};
