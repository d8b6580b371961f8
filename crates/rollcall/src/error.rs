//! Error types for rollcall.
//!
//! This module defines all error types used throughout the rollcall crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for rollcall operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Failed to write the configuration file.
    #[error("failed to write configuration to {path}: {source}")]
    ConfigWrite {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to encode the configuration as TOML.
    #[error("failed to encode configuration: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    /// An endpoint URL did not parse or used an unsupported scheme.
    #[error("invalid endpoint URL '{url}': {message}")]
    InvalidEndpoint {
        /// The offending URL string.
        url: String,
        /// Description of what went wrong.
        message: String,
    },

    // === Scan Input Errors ===
    /// A scan source failed to start.
    #[error("failed to start scan source '{name}': {message}")]
    ScanSourceStart {
        /// Name of the scan source.
        name: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// A scan source failed to stop.
    #[error("failed to stop scan source '{name}': {message}")]
    ScanSourceStop {
        /// Name of the scan source.
        name: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for rollcall operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create an invalid endpoint error.
    #[must_use]
    pub fn invalid_endpoint(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a scan source start error.
    #[must_use]
    pub fn scan_source_start(name: &'static str, message: impl Into<String>) -> Self {
        Self::ScanSourceStart {
            name,
            message: message.into(),
        }
    }

    /// Create a scan source stop error.
    #[must_use]
    pub fn scan_source_stop(name: &'static str, message: impl Into<String>) -> Self {
        Self::ScanSourceStop {
            name,
            message: message.into(),
        }
    }

    /// Check if this error is an endpoint URL problem.
    #[must_use]
    pub fn is_invalid_endpoint(&self) -> bool {
        matches!(self, Self::InvalidEndpoint { .. })
    }

    /// Check if this error came from configuration handling.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigLoad(_)
                | Self::ConfigWrite { .. }
                | Self::ConfigEncode(_)
                | Self::InvalidEndpoint { .. }
        )
    }
}
