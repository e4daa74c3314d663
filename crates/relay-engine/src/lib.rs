//! # relay-engine
//!
//! Correlation and delivery engine for the signer callback relay.
//!
//! A requester registers interest in an action ID before or after the
//! signing callback arrives. Inbound callbacks are always persisted in the
//! result store, then pushed to a registered subscriber when one is
//! reachable; clients that cannot hold a connection consume stored results
//! by polling. A periodic reaper evicts results nobody picked up.
//!
//! ## Key Components
//!
//! - **SubscriberRegistry**: action ID → active push subscriber handle
//! - **ResultStore**: action ID → stored result awaiting pickup
//! - **DeliveryEngine**: push-first delivery with pull fallback, serialized
//!   through a single lock over both containers
//! - **Reaper**: periodic sweep of entries past the retention window

pub mod engine;
pub mod reaper;
pub mod registry;
pub mod store;
pub mod subscriber;

// Re-export public API
pub use engine::{
    BulkConsumeEntry, BulkConsumeOutcome, ConsumedResult, DeliveryEngine, EngineDump,
    EngineSnapshot, IngestAck, ResetReport, StoreStats,
};
pub use reaper::{Reaper, ReaperConfig};
pub use registry::SubscriberRegistry;
pub use store::ResultStore;
pub use subscriber::{
    ConnectionId, DeliveryReceiver, DeliverySender, PushDelivery, SubscriberHandle,
};

// Re-export commonly used types from relay-core
pub use relay_core::{ActionId, Error, Json, Result, StoredResult};
