// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Basic doc-cache usage example.
//!
//! Demonstrates:
//! 1. Building a collection cache over an in-memory backing store
//! 2. Coalescing concurrent loads into one backing fetch
//! 3. TTL-cached reads and predicate queries
//! 4. Targeted invalidation and collection flushing
//!
//! # Run
//!
//! ```bash
//! cargo run --example basic_usage
//! ```

use std::sync::Arc;

use serde_json::json;

use doc_cache::{
    CollectionCache, CollectionCacheConfig, Document, LoadOptions, MemoryCollection, Predicate,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("doc_cache=debug")
        .with_target(false)
        .compact()
        .init();

    // ─────────────────────────────────────────────────────────────────────────
    // 1. Seed a collection and wrap it in a cache
    // ─────────────────────────────────────────────────────────────────────────
    let store = Arc::new(MemoryCollection::new("patients"));
    store.insert_many([
        Document::new("p1", json!({"name": "Alice", "age": 34, "ward": "A"})),
        Document::new("p2", json!({"name": "Bob", "age": 17, "ward": "B"})),
        Document::new("p3", json!({"name": "Cleo", "age": 60, "ward": "A"})),
    ]);

    let patients = CollectionCache::new(
        store,
        CollectionCacheConfig {
            allow_flushing_collection_cache: true,
            ..Default::default()
        },
    );

    // ─────────────────────────────────────────────────────────────────────────
    // 2. Concurrent loads coalesce into one backing fetch
    // ─────────────────────────────────────────────────────────────────────────
    let (a, b, c) = tokio::join!(
        patients.load_one_by_id("p1", LoadOptions::ttl(60)),
        patients.load_one_by_id("p2", LoadOptions::ttl(60)),
        patients.load_one_by_id("p3", LoadOptions::ttl(60)),
    );
    println!(
        "loaded {} {} {}",
        a?.unwrap().fields["name"],
        b?.unwrap().fields["name"],
        c?.unwrap().fields["name"]
    );

    // A repeat read is a cache hit; the backing store is not consulted.
    let alice = patients.load_one_by_id("p1", LoadOptions::new()).await?;
    println!("cache hit: {}", alice.unwrap().fields["name"]);

    // ─────────────────────────────────────────────────────────────────────────
    // 3. Predicate queries batch into one OR fetch and re-partition
    // ─────────────────────────────────────────────────────────────────────────
    let (ward_a, adults) = tokio::join!(
        patients.load_many_by_query(Predicate::eq("ward", "A"), LoadOptions::ttl(30)),
        patients.load_many_by_query(Predicate::gte("age", 18), LoadOptions::ttl(30)),
    );
    println!("ward A: {} patients", ward_a?.len());
    println!("adults: {} patients", adults?.len());

    // ─────────────────────────────────────────────────────────────────────────
    // 4. Invalidation
    // ─────────────────────────────────────────────────────────────────────────
    patients.delete_from_cache("p1").await?;
    println!("p1 invalidated; next load refetches");

    let outcome = patients.flush_collection_cache().await?;
    println!("flush: {outcome:?}");

    Ok(())
}
