//! Error types for the Pocket AI client.
//!
//! [`PocketError`] covers everything outside the HTTP conversation itself:
//! configuration files, filesystem paths and logging setup.
//! Backend failures have their own type in `pocket-client` and never reach
//! this one, because the conversation core recovers from them locally.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`PocketError`].
pub type Result<T> = std::result::Result<T, PocketError>;

/// Error type for client-side setup.
#[derive(Debug, Error)]
pub enum PocketError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration file exists but could not be parsed
    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    /// Configuration parsed but holds unusable values
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error with context
    #[error("I/O error {operation}: {path}")]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory creation failed
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No home directory could be determined
    #[error("Home directory not found")]
    HomeNotFound,

    /// Internal error (bug in the client)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PocketError {
    /// Create a ConfigInvalid error
    pub fn config_invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a ConfigValidation error
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigInvalid { .. } | Self::ConfigValidation { .. }
        )
    }

    /// Returns actionable guidance for the user
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::ConfigInvalid { .. } => Some("Check YAML syntax in ~/.pocket/client.yaml"),
            Self::ConfigValidation { .. } => {
                Some("base_url must start with http:// or https:// and timeout_secs must be positive")
            }
            Self::HomeNotFound => Some("Set HOME or pass --log-dir and --config explicitly"),
            _ => None,
        }
    }
}
