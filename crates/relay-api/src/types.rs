//! API response types and utilities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,

    /// Response metadata
    pub meta: ResponseMeta,
}

/// Response metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// Request ID for tracing
    pub request_id: Uuid,

    /// Response timestamp
    pub timestamp: DateTime<Utc>,

    /// API version
    pub version: String,
}

impl<T> ApiResponse<T> {
    /// Create a new API response
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(),
        }
    }
}

impl ResponseMeta {
    /// Create new response metadata
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for ResponseMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// Acknowledgement returned to the callback submitter
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackAck {
    /// Whether the callback was accepted and stored
    pub accepted: bool,

    /// Correlation key echoed back to the submitter
    pub action_id: String,
}

/// Bulk consume request body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkConsumeRequest {
    /// Keys to consume, each handled independently
    pub action_ids: Vec<String>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Uptime in seconds
    pub uptime_seconds: u64,

    /// Resident memory of the process in bytes, best effort (0 when the
    /// platform offers no cheap way to read it)
    pub memory_bytes: u64,

    /// Number of active push registrations
    pub registered: usize,

    /// Action IDs with an active push registration
    pub registered_action_ids: Vec<String>,

    /// Number of results awaiting pickup
    pub stored: usize,

    /// Action IDs with a stored result
    pub available_action_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_api_response_creation() {
        let data = "test data";
        let response = ApiResponse::new(data);

        assert_eq!(response.data, "test data");
        assert_eq!(response.meta.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_response_meta_unique_request_ids() {
        let meta = ResponseMeta::default();
        let meta2 = ResponseMeta::default();
        assert_ne!(meta.request_id, meta2.request_id);
    }

    #[test]
    fn test_callback_ack_serialization() {
        let fixture = CallbackAck {
            accepted: true,
            action_id: "act-1".to_string(),
        };
        let actual = serde_json::to_value(&fixture).unwrap();
        let expected = serde_json::json!({"accepted": true, "actionId": "act-1"});
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_bulk_consume_request_deserialization() {
        let fixture = r#"{"actionIds": ["a", "b"]}"#;
        let actual: BulkConsumeRequest = serde_json::from_str(fixture).unwrap();
        assert_eq!(actual.action_ids, vec!["a", "b"]);
    }

    #[test]
    fn test_bulk_consume_request_rejects_non_sequence() {
        let fixture = r#"{"actionIds": "a"}"#;
        let actual = serde_json::from_str::<BulkConsumeRequest>(fixture);
        assert!(actual.is_err());
    }
}
