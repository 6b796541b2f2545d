//! Client-side stores
//!
//! Each store is the single point of truth for one server-owned collection
//! (or, for the session, for locally owned auth state). Stores are plain
//! injected instances sharing `Arc<dyn BusApi>` and `Arc<Database>`; there
//! are no process-global singletons. Every action returns a typed
//! `Result`; failures are logged at the store boundary and always
//! propagate to the caller.
//!
//! Reads replace their collection wholesale. A fetch that fails leaves the
//! prior snapshot untouched (stale-read-on-error); a fetch that is no
//! longer the latest issued for its key is discarded on completion, so two
//! racing fetches resolve to the later-issued one's result rather than
//! last-write-wins.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub mod bus;
pub mod schedule;
pub mod search;
pub mod session;

pub use bus::BusStore;
pub use schedule::ScheduleStore;
pub use search::SearchStore;
pub use session::SessionStore;

/// Monotonic fetch fence for a single collection.
///
/// `issue()` hands out a ticket before the request goes out;
/// `is_current()` decides on completion whether the response may still be
/// applied. Only the latest-issued ticket wins.
#[derive(Default)]
pub(crate) struct FetchGate {
    seq: AtomicU64,
}

impl FetchGate {
    pub fn issue(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.seq.load(Ordering::SeqCst) == ticket
    }
}

/// Per-key fetch fence for keyed caches (schedules by bus id)
#[derive(Default)]
pub(crate) struct KeyedFetchGate {
    seqs: Mutex<HashMap<String, u64>>,
}

impl KeyedFetchGate {
    pub fn issue(&self, key: &str) -> u64 {
        let mut seqs = self.seqs.lock().unwrap_or_else(|e| e.into_inner());
        let seq = seqs.entry(key.to_string()).or_insert(0);
        *seq += 1;
        *seq
    }

    pub fn is_current(&self, key: &str, ticket: u64) -> bool {
        let seqs = self.seqs.lock().unwrap_or_else(|e| e.into_inner());
        seqs.get(key).copied() == Some(ticket)
    }
}

/// Lock accessors that survive poisoning; store state stays readable even
/// if a writer panicked mid-update.
pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}
