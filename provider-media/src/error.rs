//! Error types for the media upload provider

use thiserror::Error;

/// Media upload provider errors
#[derive(Error, Debug)]
pub enum MediaError {
    /// Upload endpoint returned an error status
    #[error("Media upload failed (status {status}): {message}")]
    UploadFailed { status: u16, message: String },

    /// Failed to parse the upload response
    #[error("Failed to parse upload response: {0}")]
    ParseError(String),

    /// The response did not contain a usable asset URL
    #[error("Upload response missing asset URL")]
    MissingUrl,

    /// Transport-level error from the HTTP bridge
    #[error(transparent)]
    Bridge(#[from] bridge_traits::error::BridgeError),
}

/// Result type for media operations
pub type Result<T> = std::result::Result<T, MediaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = MediaError::UploadFailed {
            status: 413,
            message: "File too large".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Media upload failed (status 413): File too large"
        );
    }
}
