//! Time-bounded store for results awaiting pickup

use relay_core::{ActionId, DateTime, Json, StoredResult};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Mapping from action ID to a result nobody has consumed yet.
///
/// Entries are created unconditionally on ingestion, whatever the push
/// outcome, and leave the store through exactly one of: an atomic
/// [`take`](Self::take), an expiry [`sweep`](Self::sweep), or an
/// administrative [`clear`](Self::clear). Like the registry, the store
/// carries no lock of its own; the delivery engine serializes access.
#[derive(Debug, Default)]
pub struct ResultStore {
    results: HashMap<ActionId, StoredResult>,
}

impl ResultStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            results: HashMap::new(),
        }
    }

    /// Insert or overwrite the result for an action ID with a fresh
    /// arrival timestamp
    pub fn put(&mut self, action_id: ActionId, payload: Json, origin: impl Into<String>) {
        self.results
            .insert(action_id, StoredResult::new(payload, origin));
    }

    /// Atomically read and remove the result for an action ID.
    ///
    /// Of two concurrent consumers for the same key, exactly one sees the
    /// entry; the other observes a miss.
    pub fn take(&mut self, action_id: &ActionId) -> Option<StoredResult> {
        self.results.remove(action_id)
    }

    /// Read the result for an action ID without consuming it
    pub fn get(&self, action_id: &ActionId) -> Option<&StoredResult> {
        self.results.get(action_id)
    }

    /// All currently stored action IDs, for diagnostics
    pub fn peek_all_keys(&self) -> Vec<ActionId> {
        self.results.keys().cloned().collect()
    }

    /// Remove all entries; returns the prior count
    pub fn clear(&mut self) -> usize {
        let count = self.results.len();
        self.results.clear();
        count
    }

    /// Evict every entry whose age exceeds the retention window.
    ///
    /// Entries with an arrival timestamp in the future (clock skew) age as
    /// zero and are kept. Returns the number of entries removed.
    pub fn sweep(&mut self, now: DateTime, retention_window: Duration) -> usize {
        let before = self.results.len();
        self.results.retain(|action_id, result| {
            let expired = result.age(now) > retention_window;
            if expired {
                debug!(
                    action_id = %action_id,
                    origin = %result.origin,
                    age_ms = result.age_ms(now),
                    "evicting expired result"
                );
            }
            !expired
        });
        before - self.results.len()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Check whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Iterate over stored entries, for the development dump surface
    pub fn entries(&self) -> impl Iterator<Item = (&ActionId, &StoredResult)> {
        self.results.iter()
    }

    /// Ages of all stored entries in milliseconds relative to `now`
    pub fn ages_ms(&self, now: DateTime) -> Vec<u64> {
        self.results.values().map(|r| r.age_ms(now)).collect()
    }
}
