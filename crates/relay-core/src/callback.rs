use crate::{ActionId, DateTime, Error, Json, Result};
use serde::{Deserialize, Serialize};

/// Field of the inbound payload carrying the correlation key.
pub const ACTION_ID_FIELD: &str = "actionId";

/// A validated inbound signing callback.
///
/// The signing service posts back an arbitrary JSON payload; the relay only
/// requires the `actionId` field. Everything else passes through opaquely
/// to storage and later delivery, `actionId` included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackEvent {
    /// Correlation key extracted from the payload
    pub action_id: ActionId,
    /// The full payload as received
    pub payload: Json,
}

impl CallbackEvent {
    /// Validate a raw payload and extract its correlation key.
    ///
    /// Fails when `actionId` is absent, not a string, or empty; the caller
    /// must discard the event in that case.
    pub fn from_payload(payload: Json) -> Result<Self> {
        let action_id = payload
            .get(ACTION_ID_FIELD)
            .and_then(Json::as_str)
            .ok_or_else(|| {
                Error::missing_action_id(format!(
                    "payload has no string `{ACTION_ID_FIELD}` field"
                ))
            })?;

        if action_id.is_empty() {
            return Err(Error::missing_action_id(format!(
                "`{ACTION_ID_FIELD}` must not be empty"
            )));
        }

        Ok(Self {
            action_id: ActionId::new(action_id),
            payload,
        })
    }
}

/// A delivered-but-unconsumed callback payload plus arrival metadata.
///
/// Created when an event is ingested, regardless of whether a push
/// delivery succeeded. Destroyed on pull consumption, expiry sweep, or
/// administrative clear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredResult {
    /// The event payload as received
    pub payload: Json,
    /// Machine-readable arrival timestamp
    pub arrived_at: DateTime,
    /// Human-readable arrival time (RFC 3339)
    pub arrived_at_human: String,
    /// Free-form tag describing the event's source
    pub origin: String,
}

impl StoredResult {
    /// Create a stored result with a fresh arrival timestamp
    pub fn new(payload: Json, origin: impl Into<String>) -> Self {
        let now = chrono::Utc::now();
        Self {
            payload,
            arrived_at: now,
            arrived_at_human: now.to_rfc3339(),
            origin: origin.into(),
        }
    }

    /// Age of this entry relative to `now`, clamped at zero
    pub fn age(&self, now: DateTime) -> std::time::Duration {
        (now - self.arrived_at)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }

    /// Age of this entry in milliseconds relative to `now`, clamped at zero
    pub fn age_ms(&self, now: DateTime) -> u64 {
        self.age(now).as_millis() as u64
    }
}
