//! Configuration for the API surface

use derive_setters::Setters;
use serde::{Deserialize, Serialize};

/// Configuration for the HTTP/WebSocket transport
#[derive(Debug, Clone, Serialize, Deserialize, Setters)]
#[setters(strip_option, into)]
pub struct ApiSettings {
    /// Origins allowed by the CORS layer; `*` allows any origin
    pub cors_origins: Vec<String>,

    /// Whether the development-only `/debug` endpoints are reachable.
    /// The state dump leaks every stored payload; keep this off outside
    /// local development.
    pub expose_debug: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            cors_origins: vec!["*".to_string()],
            expose_debug: false,
        }
    }
}
