//! Error types for gridkv
//!
//! Provides a unified error type for all connector operations.

use thiserror::Error;

/// Result type alias using GridError
pub type Result<T> = std::result::Result<T, GridError>;

/// HTTP status reported for operations the grid's REST surface cannot perform
pub const NOT_IMPLEMENTED: u16 = 501;

/// Unified error type for gridkv operations
#[derive(Debug, Error)]
pub enum GridError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    /// The request never produced an HTTP response (DNS, TLS, refused, ...)
    #[error("Connectivity error: {0}")]
    Connectivity(#[from] reqwest::Error),

    // -------------------------------------------------------------------------
    // Remote Errors
    // -------------------------------------------------------------------------
    /// The grid answered with a status outside 2xx
    #[error("{message}")]
    Remote { status: u16, message: String },

    #[error("The grid connector does not support \"{operation}\" method")]
    NotSupported { operation: &'static str },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Key Errors
    // -------------------------------------------------------------------------
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GridError {
    /// HTTP status attached to the error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GridError::Remote { status, .. } => Some(*status),
            GridError::NotSupported { .. } => Some(NOT_IMPLEMENTED),
            _ => None,
        }
    }

    /// Message carried by a remote error
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            GridError::Remote { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl From<bincode::Error> for GridError {
    fn from(e: bincode::Error) -> Self {
        GridError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for GridError {
    fn from(e: serde_json::Error) -> Self {
        GridError::Serialization(e.to_string())
    }
}
