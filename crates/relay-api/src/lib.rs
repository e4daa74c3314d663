//! # relay-api
//!
//! HTTP and WebSocket transport for the signer callback relay.
//!
//! The signing service posts callbacks to `/callback`; requesters pick
//! results up either over the `/ws` push channel (register an action ID,
//! receive the payload when it lands) or by polling `/result/{action_id}`
//! and `/results`. A small admin surface exposes health, aggregate
//! statistics, and development-only state dump/reset.

pub mod config;
pub mod error;
pub mod handlers;
pub mod realtime;
pub mod routes;
pub mod types;

// Re-export public API
pub use config::ApiSettings;
pub use error::{ApiError, ErrorResponse, Result};
pub use handlers::AppState;
pub use routes::create_router;
