//! Push-channel subscriber handles

use relay_core::{ActionId, Json};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Unique identifier for one push-channel connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Generate a new connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A payload handed to a push subscriber
#[derive(Debug, Clone, PartialEq)]
pub struct PushDelivery {
    /// Correlation key the payload answers
    pub action_id: ActionId,
    /// The payload as received from the signing service
    pub payload: Json,
}

/// Receiver half of a push subscription
pub type DeliveryReceiver = mpsc::UnboundedReceiver<PushDelivery>;

/// Sender half of a push subscription
pub type DeliverySender = mpsc::UnboundedSender<PushDelivery>;

/// Handle to one active push-channel connection.
///
/// The send is fire-and-forget: the engine never waits for the subscriber
/// to acknowledge a delivery. Dropping the receiver closes the handle.
#[derive(Debug, Clone)]
pub struct SubscriberHandle {
    connection_id: ConnectionId,
    sender: DeliverySender,
}

impl SubscriberHandle {
    /// Create a new handle and its paired delivery receiver
    pub fn new(connection_id: ConnectionId) -> (Self, DeliveryReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = Self {
            connection_id,
            sender,
        };
        (handle, receiver)
    }

    /// Get the connection ID backing this handle
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Check whether the underlying channel is still open
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Send a payload to the subscriber; returns false if the channel is gone
    pub fn send(&self, delivery: PushDelivery) -> bool {
        self.sender.send(delivery).is_ok()
    }
}
