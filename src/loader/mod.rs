// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Batching loaders.
//!
//! Coalesce the loads of one scheduling tick into one backing-store call:
//!
//! ```text
//! load(a) ─┐
//! load(b) ─┼─ (tick yields) ─→ fetch_by_ids([a, b, c]) ─→ demux per caller
//! load(c) ─┘
//! ```
//!
//! [`IdLoader`] batches point lookups, [`QueryLoader`] batches predicate
//! queries into one OR-combined fetch and re-partitions the union. Both keep
//! no state beyond their in-flight batches; cross-tick reuse belongs to the
//! TTL cache layer above.

mod coalesce;
pub mod id_loader;
pub mod query_loader;

pub use id_loader::IdLoader;
pub use query_loader::QueryLoader;
