// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Tick-scoped request coalescing.
//!
//! Shared machinery for the id and query loaders. The first request of a
//! scheduling tick opens a batch and schedules a dispatch; the dispatcher
//! yields once, so every load issued before the enqueuing tasks suspend
//! lands in the same batch and costs one backing-store call.
//!
//! A flight (one coalesced key) is joinable from registration until its
//! batch resolves: loads that arrive while the fetch is on the wire attach
//! to it rather than opening a second fetch. Resolution removes the flight,
//! so a later load starts fresh. Completed results are never memoized here;
//! cross-tick reuse is the TTL cache's job, not the coalescer's.
//!
//! [`Coalescer::invalidate`] detaches a live flight without stranding it:
//! the dispatcher owns the waiter list it took and still resolves everyone
//! already registered, but loads issued after the invalidation never join a
//! possibly-stale flight.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::storage::StoreError;

type Waiters<T> = Arc<Mutex<Vec<oneshot::Sender<Result<T, StoreError>>>>>;

/// One coalesced request: the representative request plus its waiter list.
pub(crate) struct Flight<R, T> {
    pub key: String,
    pub request: R,
    waiters: Waiters<T>,
}

struct State<R, T> {
    /// Live flights by coalescing key.
    flights: HashMap<String, Waiters<T>>,
    /// Flights queued for the next dispatch.
    queue: Vec<Flight<R, T>>,
    /// Whether a dispatch is already scheduled for the open batch.
    scheduled: bool,
}

pub(crate) struct Coalescer<R, T> {
    state: Mutex<State<R, T>>,
}

impl<R, T: Clone> Coalescer<R, T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                flights: HashMap::new(),
                queue: Vec::new(),
                scheduled: false,
            }),
        }
    }

    /// Register interest in `key`.
    ///
    /// Returns the waiter's receiver and whether the caller just opened a new
    /// batch and must schedule its dispatch. `request` is only materialized
    /// for the first waiter of a flight.
    pub fn enqueue(
        &self,
        key: &str,
        request: impl FnOnce() -> R,
    ) -> (oneshot::Receiver<Result<T, StoreError>>, bool) {
        let (tx, rx) = oneshot::channel();
        let mut state = self.state.lock();

        if let Some(waiters) = state.flights.get(key) {
            waiters.lock().push(tx);
            return (rx, false);
        }

        let waiters: Waiters<T> = Arc::new(Mutex::new(vec![tx]));
        state.flights.insert(key.to_string(), Arc::clone(&waiters));
        state.queue.push(Flight {
            key: key.to_string(),
            request: request(),
            waiters,
        });

        let opened_batch = !state.scheduled;
        state.scheduled = true;
        (rx, opened_batch)
    }

    /// Take every queued flight for dispatch. The next enqueue of an unseen
    /// key opens a new batch.
    pub fn take_batch(&self) -> Vec<Flight<R, T>> {
        let mut state = self.state.lock();
        state.scheduled = false;
        std::mem::take(&mut state.queue)
    }

    /// Resolve a dispatched flight: retire its live entry (unless it was
    /// detached and superseded meanwhile) and hand `result` to every waiter.
    pub fn complete(&self, flight: &Flight<R, T>, result: Result<T, StoreError>) {
        {
            let mut state = self.state.lock();
            let same = state
                .flights
                .get(&flight.key)
                .map_or(false, |live| Arc::ptr_eq(live, &flight.waiters));
            if same {
                state.flights.remove(&flight.key);
            }
        }

        // The entry is out of the map, so no waiter can join past this point.
        let mut waiters = flight.waiters.lock();
        for tx in waiters.drain(..) {
            let _ = tx.send(result.clone());
        }
    }

    /// Detach the live flight for `key`, if any, so later loads start a
    /// fresh fetch. Already-registered waiters still resolve.
    pub fn invalidate(&self, key: &str) {
        self.state.lock().flights.remove(key);
    }

    #[cfg(test)]
    pub fn live_flights(&self) -> usize {
        self.state.lock().flights.len()
    }
}
