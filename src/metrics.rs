// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for doc-cache.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host application chooses the exporter (Prometheus, OTEL, etc.);
//! no output is mandatory for correctness.
//!
//! # Metric Naming Convention
//! - `doc_cache_` prefix for all metrics
//! - `_total` suffix for counters
//!
//! # Labels
//! - `collection`: the collection name
//! - `outcome`: hit, miss
//! - `kind`: ids, queries / id, query

use metrics::{counter, histogram};

/// Record a TTL-cache lookup and its outcome ("hit" or "miss").
pub fn record_cache_lookup(collection: &str, outcome: &str) {
    counter!(
        "doc_cache_lookups_total",
        "collection" => collection.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a write-through into the TTL cache.
pub fn record_write_through(collection: &str) {
    counter!(
        "doc_cache_writes_total",
        "collection" => collection.to_string()
    )
    .increment(1);
}

/// Record a key registered in the collection's key index.
pub fn record_key_registered(collection: &str) {
    counter!(
        "doc_cache_keys_registered_total",
        "collection" => collection.to_string()
    )
    .increment(1);
}

/// Record a targeted invalidation ("id" or "query").
pub fn record_invalidation(collection: &str, kind: &str) {
    counter!(
        "doc_cache_invalidations_total",
        "collection" => collection.to_string(),
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// Record an executed collection flush and how many keys it removed.
pub fn record_flush(collection: &str, deleted: usize) {
    counter!(
        "doc_cache_flushes_total",
        "collection" => collection.to_string()
    )
    .increment(1);
    histogram!(
        "doc_cache_flush_deleted_keys",
        "collection" => collection.to_string()
    )
    .record(deleted as f64);
}

/// Record a coalesced backing-store dispatch ("ids" or "queries") and its
/// batch size.
pub fn record_dispatch(collection: &str, kind: &str, batch_size: usize) {
    counter!(
        "doc_cache_dispatches_total",
        "collection" => collection.to_string(),
        "kind" => kind.to_string()
    )
    .increment(1);
    histogram!(
        "doc_cache_dispatch_batch_size",
        "collection" => collection.to_string(),
        "kind" => kind.to_string()
    )
    .record(batch_size as f64);
}
