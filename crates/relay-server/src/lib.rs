//! # relay-server
//!
//! The relay server binary: configuration loading, CLI, process
//! lifecycle, and wiring of the delivery engine to its HTTP/WebSocket
//! transport and the reaper.

pub mod cli;
pub mod config;
pub mod error;
pub mod server;

pub use cli::{Args, Commands};
pub use config::RelayConfig;
pub use error::{ConfigError, ConfigResult, Result, ServerError};
pub use server::RelayServer;
