//! Error types for the API layer

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API-specific error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing action id: {0}")]
    MissingActionId(String),

    #[error("Invalid action id list: {0}")]
    InvalidActionIds(String),

    #[error("No stored result for action id: {action_id}")]
    ResultNotFound {
        action_id: String,
        available: Vec<String>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingActionId(_) | ApiError::InvalidActionIds(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ResultNotFound { .. } | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code as a string
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::MissingActionId(_) => "MISSING_ACTION_ID",
            ApiError::InvalidActionIds(_) => "INVALID_ACTION_IDS",
            ApiError::ResultNotFound { .. } => "RESULT_NOT_FOUND",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to ErrorResponse, attaching diagnostic details where the
    /// variant carries them
    pub fn to_response(&self) -> ErrorResponse {
        let details = match self {
            ApiError::ResultNotFound { available, .. } => Some(serde_json::json!({
                "availableActionIds": available,
            })),
            _ => None,
        };

        ErrorResponse {
            error: self.error_code().to_string(),
            message: self.to_string(),
            code: self.status_code().as_u16(),
            details,
        }
    }
}

impl From<relay_core::Error> for ApiError {
    fn from(error: relay_core::Error) -> Self {
        match error {
            relay_core::Error::MissingActionId { message } => Self::MissingActionId(message),
            relay_core::Error::InvalidActionIds { message } => Self::InvalidActionIds(message),
            relay_core::Error::ResultNotFound {
                action_id,
                available,
            } => Self::ResultNotFound {
                action_id: action_id.into_string(),
                available: available.into_iter().map(|id| id.into_string()).collect(),
            },
            other => Self::Internal(anyhow::anyhow!(other)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let response = self.to_response();

        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "API error occurred");
        } else {
            tracing::debug!(error = %self, status = %status, "request rejected");
        }

        (status, Json(response)).into_response()
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_status_codes() {
        let fixtures = vec![
            (
                ApiError::MissingActionId("test".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::InvalidActionIds("test".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::ResultNotFound {
                    action_id: "a".to_string(),
                    available: vec![],
                },
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::NotFound("test".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::BadRequest("test".to_string()),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (error, expected_status) in fixtures {
            let actual = error.status_code();
            assert_eq!(actual, expected_status);
        }
    }

    #[test]
    fn test_error_codes() {
        let fixtures = vec![
            (
                ApiError::MissingActionId("test".to_string()),
                "MISSING_ACTION_ID",
            ),
            (
                ApiError::InvalidActionIds("test".to_string()),
                "INVALID_ACTION_IDS",
            ),
            (
                ApiError::ResultNotFound {
                    action_id: "a".to_string(),
                    available: vec![],
                },
                "RESULT_NOT_FOUND",
            ),
            (ApiError::NotFound("test".to_string()), "NOT_FOUND"),
        ];

        for (error, expected_code) in fixtures {
            let actual = error.error_code();
            assert_eq!(actual, expected_code);
        }
    }

    #[test]
    fn test_not_found_response_carries_available_keys() {
        let error = ApiError::ResultNotFound {
            action_id: "x1".to_string(),
            available: vec!["x2".to_string(), "x3".to_string()],
        };
        let response = error.to_response();

        assert_eq!(response.error, "RESULT_NOT_FOUND");
        assert_eq!(response.code, 404);
        let details = response.details.unwrap();
        assert_eq!(
            details["availableActionIds"],
            serde_json::json!(["x2", "x3"])
        );
    }

    #[test]
    fn test_core_error_conversion() {
        let core = relay_core::Error::result_not_found(
            relay_core::ActionId::new("x1"),
            vec![relay_core::ActionId::new("x2")],
        );
        let actual = ApiError::from(core);

        match actual {
            ApiError::ResultNotFound {
                action_id,
                available,
            } => {
                assert_eq!(action_id, "x1");
                assert_eq!(available, vec!["x2".to_string()]);
            }
            other => panic!("Expected ResultNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_action_id_conversion() {
        let core = relay_core::Error::missing_action_id("no field");
        let actual = ApiError::from(core);
        assert!(matches!(actual, ApiError::MissingActionId(_)));
    }
}
