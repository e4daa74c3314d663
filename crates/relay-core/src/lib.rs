//! # relay-core
//!
//! Foundational types for the signer callback relay. The relay bridges
//! asynchronous wallet-signing callbacks to the requester that is waiting
//! for them, over either a persistent push connection or HTTP polling.
//!
//! ## Key Components
//!
//! - **ActionId**: the correlation key tying a callback to its requester
//! - **CallbackEvent**: a validated inbound callback payload
//! - **StoredResult**: a delivered-but-unconsumed payload plus arrival metadata
//! - **Errors**: the shared error taxonomy for relay operations

pub mod callback;
pub mod error;
pub mod id;

// Re-export commonly used types
pub use callback::{CallbackEvent, StoredResult};
pub use error::{Error, Result};
pub use id::ActionId;

/// Common type aliases for convenience
pub type DateTime = chrono::DateTime<chrono::Utc>;
pub type Duration = std::time::Duration;
pub type Json = serde_json::Value;
