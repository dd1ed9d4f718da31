//! # doc-cache
//!
//! A request-coalescing, TTL-aware caching layer for document collections.
//!
//! ## Architecture
//!
//! Two mechanisms that usually fight each other, layered so they cooperate:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   CollectionCache (gateway)                 │
//! │  • load_one_by_id / load_many_by_ids / load_many_by_query  │
//! │  • read-through TTL cache, write-through on positive TTL   │
//! │  • targeted deletes + opt-in collection flush              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ miss
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Batching loaders (per-tick coalescing)         │
//! │  • IdLoader: dedup'd id set, one fetch, demux per caller   │
//! │  • QueryLoader: OR-combined fetch, re-partitioned union    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ one call per batch
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  BackingStore (injected)                    │
//! │  • MemoryCollection: plain JSON records                    │
//! │  • MappedCollection<T>: typed records, serde-projected     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The TTL cache itself is an injected [`CacheStore`]: [`InMemoryCache`]
//! (bounded, reference-holding, the default) or [`RedisCache`]
//! (serialization boundary, native prefix-scan flushes).
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use doc_cache::{
//!     CollectionCache, CollectionCacheConfig, Document, LoadOptions,
//!     MemoryCollection, Predicate,
//! };
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(MemoryCollection::new("users"));
//! store.insert(Document::new("u1", json!({"name": "Alice", "age": 34})));
//! store.insert(Document::new("u2", json!({"name": "Bob", "age": 17})));
//!
//! let users = CollectionCache::new(store, CollectionCacheConfig::default());
//!
//! // Point lookup, cached for a minute.
//! let alice = users.load_one_by_id("u1", LoadOptions::ttl(60)).await.unwrap();
//! assert!(alice.is_some());
//!
//! // Predicate query; concurrent queries coalesce into one OR fetch.
//! let adults = users
//!     .load_many_by_query(Predicate::gte("age", 18), LoadOptions::new())
//!     .await
//!     .unwrap();
//! assert_eq!(adults.len(), 1);
//! # }
//! ```
//!
//! ## Semantics
//!
//! - **Coalescing**: every load issued before the current tick yields shares
//!   one backing-store call. Callers that want batching must issue their
//!   loads without intervening suspensions.
//! - **TTL**: a positive TTL in [`LoadOptions`] is the only trigger for
//!   persistence. Without one, nothing outlives the coalescing tick.
//! - **Soft cache failures**: a cache read error is a miss; a cache write
//!   error after a successful fetch is logged and swallowed. Backing-store
//!   failures are fatal to the batch and reach every coalesced caller.
//! - **Invalidation**: `delete_from_cache` removes one entry (id or query)
//!   and detaches its in-flight loader entry; `flush_collection_cache` is
//!   gated behind explicit opt-in and removes every recorded key.
//!
//! ## Modules
//!
//! - [`collection`]: the [`CollectionCache`] gateway
//! - [`loader`]: per-tick batching loaders
//! - [`storage`]: backing store adapters
//! - [`cache`]: cache store implementations
//! - [`query`]: the predicate language
//! - [`document`]: documents and id normalization
//! - [`key`]: cache-key derivation
//! - [`metrics`]: instrumentation hook points

pub mod cache;
pub mod collection;
pub mod config;
pub mod document;
pub mod key;
pub mod loader;
pub mod metrics;
pub mod query;
pub mod storage;

pub use cache::{CacheError, CacheStore, CachedEntry, FlushSupport, InMemoryCache, RedisCache};
pub use collection::{CacheTarget, CollectionCache, FlushOutcome, LoadOptions};
pub use config::CollectionCacheConfig;
pub use document::{Document, DocumentId, ObjectId, ObjectIdError};
pub use key::KeyCodec;
pub use loader::{IdLoader, QueryLoader};
pub use query::{CmpOp, FieldCondition, Predicate};
pub use storage::{BackingStore, CollectionModel, MappedCollection, MemoryCollection, StoreError};
