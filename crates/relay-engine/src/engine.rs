//! Push-first delivery with pull fallback

use crate::registry::SubscriberRegistry;
use crate::store::ResultStore;
use crate::subscriber::{ConnectionId, PushDelivery, SubscriberHandle};
use relay_core::{ActionId, CallbackEvent, DateTime, Error, Json, Result, StoredResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Acknowledgement returned to the callback submitter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestAck {
    /// Correlation key extracted from the payload
    pub action_id: ActionId,
    /// Whether the payload was persisted (always true once validated)
    pub stored: bool,
}

/// A result handed to a pull-path consumer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumedResult {
    /// Correlation key the result answers
    pub action_id: ActionId,
    /// The payload as received from the signing service
    #[serde(rename = "data")]
    pub payload: Json,
    /// When the result arrived
    pub stored_at: DateTime,
    /// Human-readable arrival time (RFC 3339)
    pub stored_at_human: String,
    /// Source tag recorded at ingestion
    pub origin: String,
    /// Milliseconds between arrival and this consumption
    pub age_ms: u64,
}

/// Per-key outcome of a bulk consume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkConsumeEntry {
    /// Whether a stored result existed for the key
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Json>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_at: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Aggregate outcome of a bulk consume; individual misses never fail the call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkConsumeOutcome {
    /// Number of keys with a stored result
    pub found: usize,
    /// Number of keys with nothing stored
    pub missed: usize,
    /// Per-key results, in no particular order
    pub results: HashMap<ActionId, BulkConsumeEntry>,
}

/// Counts and key lists for the health surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub registered: usize,
    pub registered_keys: Vec<ActionId>,
    pub stored: usize,
    pub stored_keys: Vec<ActionId>,
}

/// Raw contents of both maps. Development only: leaks stored payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineDump {
    pub registry: HashMap<ActionId, ConnectionId>,
    pub store: HashMap<ActionId, StoredResult>,
}

/// Prior sizes reported by a full reset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetReport {
    pub registry_cleared: usize,
    pub store_cleared: usize,
}

/// Aggregate age statistics over stored entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub stored: usize,
    pub ages_ms: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_ms: Option<u64>,
}

/// The correlation and delivery engine.
///
/// Both containers live under one lock, and every mutating operation holds
/// the write guard for its whole read-modify-write sequence. That single
/// serialization domain is what makes the ingest/register race for the
/// same key collapse deterministically: whichever call runs second
/// observes the other's completed mutation and performs the catch-up
/// check itself, so a pairing is delivered exactly once. The push send is
/// a non-blocking channel write, so no I/O ever happens under the lock.
#[derive(Debug, Default)]
pub struct DeliveryEngine {
    state: RwLock<EngineState>,
}

#[derive(Debug, Default)]
struct EngineState {
    registry: SubscriberRegistry,
    store: ResultStore,
}

impl DeliveryEngine {
    /// Create an engine with empty registry and store
    pub fn new() -> Self {
        Self {
            state: RwLock::new(EngineState::default()),
        }
    }

    /// Ingest an inbound callback.
    ///
    /// The payload is persisted unconditionally, then pushed to the
    /// registered subscriber if one is reachable; the stored copy remains
    /// either way, for pull consumption or eventual reaping. Absence of a
    /// subscriber is not an error. Fails only when the payload carries no
    /// usable `actionId`, in which case nothing is stored.
    pub async fn ingest(&self, payload: Json, origin: impl Into<String>) -> Result<IngestAck> {
        let event = CallbackEvent::from_payload(payload)?;
        let origin = origin.into();

        let mut state = self.state.write().await;
        state
            .store
            .put(event.action_id.clone(), event.payload.clone(), &origin);

        let subscriber = state.registry.lookup(&event.action_id).cloned();
        match subscriber {
            Some(handle) if handle.is_open() => {
                let delivered = handle.send(PushDelivery {
                    action_id: event.action_id.clone(),
                    payload: event.payload.clone(),
                });
                if delivered {
                    state.registry.remove(&event.action_id);
                    info!(action_id = %event.action_id, origin = %origin, "callback pushed to subscriber");
                } else {
                    warn!(action_id = %event.action_id, "subscriber channel closed mid-push, result kept for pull");
                }
            }
            Some(_) => {
                debug!(action_id = %event.action_id, "subscriber channel closed, result stored for pull");
            }
            None => {
                debug!(action_id = %event.action_id, origin = %origin, "no subscriber, result stored for pull");
            }
        }

        Ok(IngestAck {
            action_id: event.action_id,
            stored: true,
        })
    }

    /// Register a push subscriber for an action ID, last registration wins.
    ///
    /// When a result already arrived before the registration, it is pushed
    /// over the new handle immediately and the registration is consumed
    /// (catch-up delivery for late subscribers). The stored copy remains
    /// until pulled or reaped. Returns the payload if catch-up happened.
    pub async fn register(&self, action_id: ActionId, handle: SubscriberHandle) -> Option<Json> {
        let mut state = self.state.write().await;
        state.registry.register(action_id.clone(), handle.clone());
        info!(
            action_id = %action_id,
            connection_id = %handle.connection_id(),
            "subscriber registered"
        );

        let payload = state.store.get(&action_id).map(|r| r.payload.clone())?;
        let delivered = handle.send(PushDelivery {
            action_id: action_id.clone(),
            payload: payload.clone(),
        });
        if delivered {
            state.registry.remove(&action_id);
            info!(action_id = %action_id, "stored result caught up to late subscriber");
            Some(payload)
        } else {
            warn!(action_id = %action_id, "subscriber channel closed before catch-up");
            None
        }
    }

    /// Consume the stored result for one action ID.
    ///
    /// Atomic test-and-remove: of two concurrent consumers, exactly one
    /// wins. A miss carries the currently stored keys as a diagnostic.
    pub async fn consume_one(&self, action_id: &ActionId) -> Result<ConsumedResult> {
        let mut state = self.state.write().await;
        match state.store.take(action_id) {
            Some(result) => {
                let consumed = Self::into_consumed(action_id.clone(), result);
                info!(action_id = %action_id, age_ms = consumed.age_ms, "result consumed via pull");
                Ok(consumed)
            }
            None => Err(Error::result_not_found(
                action_id.clone(),
                state.store.peek_all_keys(),
            )),
        }
    }

    /// Consume stored results for a batch of action IDs.
    ///
    /// Each key is handled independently; misses are reported per key and
    /// never fail the call as a whole.
    pub async fn consume_many(&self, action_ids: Vec<ActionId>) -> BulkConsumeOutcome {
        let mut state = self.state.write().await;
        let mut results = HashMap::with_capacity(action_ids.len());
        let mut found = 0;
        let mut missed = 0;

        for action_id in action_ids {
            match state.store.take(&action_id) {
                Some(result) => {
                    found += 1;
                    let consumed = Self::into_consumed(action_id.clone(), result);
                    results.insert(
                        action_id,
                        BulkConsumeEntry {
                            found: true,
                            data: Some(consumed.payload),
                            stored_at: Some(consumed.stored_at),
                            age_ms: Some(consumed.age_ms),
                            message: None,
                        },
                    );
                }
                None => {
                    missed += 1;
                    results.insert(
                        action_id,
                        BulkConsumeEntry {
                            found: false,
                            data: None,
                            stored_at: None,
                            age_ms: None,
                            message: Some("no stored result".to_string()),
                        },
                    );
                }
            }
        }

        debug!(found, missed, "bulk consume completed");
        BulkConsumeOutcome {
            found,
            missed,
            results,
        }
    }

    /// Drop the registration backed by a closed push connection
    pub async fn disconnect(&self, connection_id: ConnectionId) -> Option<ActionId> {
        let mut state = self.state.write().await;
        let removed = state.registry.unregister_by_connection(connection_id);
        if let Some(action_id) = &removed {
            info!(
                action_id = %action_id,
                connection_id = %connection_id,
                "subscriber unregistered on disconnect"
            );
        }
        removed
    }

    /// Clear both containers; returns the prior sizes
    pub async fn reset(&self) -> ResetReport {
        let mut state = self.state.write().await;
        let report = ResetReport {
            registry_cleared: state.registry.clear(),
            store_cleared: state.store.clear(),
        };
        warn!(
            registry_cleared = report.registry_cleared,
            store_cleared = report.store_cleared,
            "engine state reset"
        );
        report
    }

    /// Evict stored results older than the retention window
    pub async fn sweep(&self, retention_window: Duration) -> usize {
        let mut state = self.state.write().await;
        state.store.sweep(chrono::Utc::now(), retention_window)
    }

    /// Counts and key lists for the health surface
    pub async fn snapshot(&self) -> EngineSnapshot {
        let state = self.state.read().await;
        EngineSnapshot {
            registered: state.registry.len(),
            registered_keys: state.registry.keys(),
            stored: state.store.len(),
            stored_keys: state.store.peek_all_keys(),
        }
    }

    /// Raw contents of both maps. Development only: leaks stored payloads.
    pub async fn dump(&self) -> EngineDump {
        let state = self.state.read().await;
        EngineDump {
            registry: state.registry.connections().into_iter().collect(),
            store: state
                .store
                .entries()
                .map(|(key, result)| (key.clone(), result.clone()))
                .collect(),
        }
    }

    /// Aggregate age statistics over stored entries
    pub async fn stats(&self) -> StoreStats {
        let state = self.state.read().await;
        let ages_ms = state.store.ages_ms(chrono::Utc::now());
        let oldest_ms = ages_ms.iter().max().copied();
        let newest_ms = ages_ms.iter().min().copied();
        let mean_ms = if ages_ms.is_empty() {
            None
        } else {
            Some(ages_ms.iter().sum::<u64>() / ages_ms.len() as u64)
        };
        StoreStats {
            stored: ages_ms.len(),
            ages_ms,
            oldest_ms,
            newest_ms,
            mean_ms,
        }
    }

    fn into_consumed(action_id: ActionId, result: StoredResult) -> ConsumedResult {
        let age_ms = result.age_ms(chrono::Utc::now());
        ConsumedResult {
            action_id,
            payload: result.payload,
            stored_at: result.arrived_at,
            stored_at_human: result.arrived_at_human,
            origin: result.origin,
            age_ms,
        }
    }
}
