use crate::ActionId;
use thiserror::Error;

/// Core error types for the callback relay
#[derive(Error, Debug)]
pub enum Error {
    /// Inbound callback carries no usable correlation key. The event is
    /// discarded, never stored.
    #[error("Missing action id: {message}")]
    MissingActionId { message: String },

    /// Single-key consume found nothing stored under the key. Carries the
    /// currently stored keys as a diagnostic aid for the caller.
    #[error("No stored result for action id: {action_id}")]
    ResultNotFound {
        action_id: ActionId,
        available: Vec<ActionId>,
    },

    /// Bulk consume was called with something other than a list of keys.
    #[error("Invalid action id list: {message}")]
    InvalidActionIds { message: String },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl Error {
    /// Create a new missing-action-id error
    pub fn missing_action_id(message: impl Into<String>) -> Self {
        Self::MissingActionId {
            message: message.into(),
        }
    }

    /// Create a new result-not-found error
    pub fn result_not_found(action_id: ActionId, available: Vec<ActionId>) -> Self {
        Self::ResultNotFound {
            action_id,
            available,
        }
    }

    /// Create a new invalid-action-ids error
    pub fn invalid_action_ids(message: impl Into<String>) -> Self {
        Self::InvalidActionIds {
            message: message.into(),
        }
    }

    /// Get the error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingActionId { .. } => "missing_action_id",
            Self::ResultNotFound { .. } => "result_not_found",
            Self::InvalidActionIds { .. } => "invalid_action_ids",
            Self::Serialization { .. } => "serialization",
        }
    }

    /// Check if the error is a client-side validation problem
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingActionId { .. }
                | Self::ResultNotFound { .. }
                | Self::InvalidActionIds { .. }
        )
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;
