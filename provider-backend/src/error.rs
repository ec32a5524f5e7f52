//! Error types for the backend provider

use thiserror::Error;

/// Backend provider errors
#[derive(Error, Debug)]
pub enum BackendError {
    /// API request returned an error status
    #[error("Backend API error (status {status}): {}", message.as_deref().unwrap_or("no message"))]
    Api {
        status: u16,
        /// The server's `message` field, verbatim, when the error body was
        /// decodable
        message: Option<String>,
    },

    /// Failed to parse API response
    #[error("Failed to parse backend response: {0}")]
    Parse(String),

    /// Transport-level error from the HTTP bridge
    #[error(transparent)]
    Bridge(#[from] bridge_traits::error::BridgeError),
}

impl BackendError {
    /// The server-provided message, when one was decoded from the error body.
    ///
    /// Callers use this to surface backend validation messages verbatim,
    /// falling back to an operation-specific string otherwise.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            BackendError::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;
