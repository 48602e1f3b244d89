//! Error types for REDCap gateway calls.

use thiserror::Error;

/// Errors that can occur while talking to a REDCap project.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// The API token was rejected or lacks API rights.
    #[error("REDCap rejected the API token: {0}")]
    Unauthorized(String),

    /// REDCap answered with a non-success status.
    #[error("REDCap API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error text extracted from the response body.
        message: String,
    },

    /// The response body was not the JSON we asked for.
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// An exported row cannot be turned into an SAE record.
    #[error("invalid row for record {record_id}: {reason}")]
    InvalidRow {
        /// Participant the row belongs to.
        record_id: String,
        /// What is wrong with the row.
        reason: String,
    },
}

impl GatewayError {
    /// Returns whether an operator retry may succeed. Nothing retries automatically.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Unauthorized(_) | Self::JsonParse(_) | Self::InvalidRow { .. } => false,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParse(err.to_string())
    }
}

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
