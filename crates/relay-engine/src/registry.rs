//! Registry of active push subscribers

use crate::subscriber::{ConnectionId, SubscriberHandle};
use relay_core::ActionId;
use std::collections::HashMap;
use tracing::debug;

/// Mapping from action ID to the one active push subscriber for that key.
///
/// At most one handle is registered per action ID; a later registration
/// silently replaces an earlier one with no notification to the displaced
/// subscriber. The registry itself carries no lock; the delivery engine
/// serializes every mutation (see [`crate::engine::DeliveryEngine`]).
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    subscribers: HashMap<ActionId, SubscriberHandle>,
}

impl SubscriberRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            subscribers: HashMap::new(),
        }
    }

    /// Register a subscriber for an action ID, last registration wins.
    ///
    /// Returns the displaced handle if the key was already taken.
    pub fn register(
        &mut self,
        action_id: ActionId,
        handle: SubscriberHandle,
    ) -> Option<SubscriberHandle> {
        let displaced = self.subscribers.insert(action_id.clone(), handle);
        if displaced.is_some() {
            debug!(action_id = %action_id, "existing subscriber displaced by re-registration");
        }
        displaced
    }

    /// Look up the subscriber for an action ID
    pub fn lookup(&self, action_id: &ActionId) -> Option<&SubscriberHandle> {
        self.subscribers.get(action_id)
    }

    /// Remove the subscriber for an action ID
    pub fn remove(&mut self, action_id: &ActionId) -> Option<SubscriberHandle> {
        self.subscribers.remove(action_id)
    }

    /// Remove the first entry backed by the given connection.
    ///
    /// Linear scan; concurrent subscriber counts are expected to be small.
    /// Returns the action ID that was unregistered, if any.
    pub fn unregister_by_connection(&mut self, connection_id: ConnectionId) -> Option<ActionId> {
        let action_id = self
            .subscribers
            .iter()
            .find(|(_, handle)| handle.connection_id() == connection_id)
            .map(|(key, _)| key.clone())?;

        self.subscribers.remove(&action_id);
        Some(action_id)
    }

    /// Remove all entries; returns the prior count
    pub fn clear(&mut self) -> usize {
        let count = self.subscribers.len();
        self.subscribers.clear();
        count
    }

    /// Number of active registrations
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Check whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// All currently registered action IDs
    pub fn keys(&self) -> Vec<ActionId> {
        self.subscribers.keys().cloned().collect()
    }

    /// Registered action IDs with their backing connections, for diagnostics
    pub fn connections(&self) -> Vec<(ActionId, ConnectionId)> {
        self.subscribers
            .iter()
            .map(|(key, handle)| (key.clone(), handle.connection_id()))
            .collect()
    }
}
