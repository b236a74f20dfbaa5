//! Error types for talking to the assistant backend.
//!
//! Every variant here collapses into the same user-visible outcome inside
//! [`ConversationSession`](crate::session::ConversationSession): an assistant
//! error message. The variants exist for logging and diagnostics.

use thiserror::Error;

/// Backend client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection could not be established
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request exceeded the configured timeout
    #[error("Network timeout after {0}s: {1}")]
    Timeout(u64, String),

    /// Backend answered with a non-success status
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Body was not the JSON shape the contract requires
    #[error("Malformed response from {endpoint}: {message}")]
    MalformedResponse { endpoint: String, message: String },

    /// HTTP request error not classified above
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Core error
    #[error("Core error: {0}")]
    CoreError(#[from] pocket_core::PocketError),
}

impl ClientError {
    /// Classify a reqwest transport error.
    pub fn from_transport(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(timeout_secs, err.to_string())
        } else if err.is_connect() {
            ClientError::ConnectionFailed(err.to_string())
        } else {
            ClientError::HttpError(err)
        }
    }

    /// Classify a non-success HTTP status.
    pub fn from_http_status(status: u16, body: &str) -> Self {
        match status {
            408 | 504 => ClientError::Timeout(0, format!("Gateway reported timeout ({})", status)),
            _ => ClientError::HttpStatus {
                status,
                body: body.to_string(),
            },
        }
    }

    /// Create a malformed response error.
    pub fn malformed(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        ClientError::MalformedResponse {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Check if this error is a network-related error.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            ClientError::Timeout(_, _) | ClientError::ConnectionFailed(_) | ClientError::HttpError(_)
        )
    }

    /// Check if the backend was reached but answered badly.
    pub fn is_backend_fault(&self) -> bool {
        matches!(
            self,
            ClientError::HttpStatus { .. } | ClientError::MalformedResponse { .. }
        )
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
