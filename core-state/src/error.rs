use thiserror::Error;

/// Message stored and announced when a mutating dispatch finds no credential.
pub const NOT_AUTHENTICATED_MESSAGE: &str = "Please sign in to continue.";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Media uploads are not configured")]
    MediaUnavailable,

    #[error(transparent)]
    Backend(#[from] provider_backend::BackendError),

    #[error(transparent)]
    Media(#[from] provider_media::MediaError),

    #[error(transparent)]
    Session(#[from] core_session::SessionError),
}

impl StoreError {
    /// The user-facing message for this error.
    ///
    /// Server-reported messages are surfaced verbatim; everything else maps
    /// to the operation's fallback string (network failures and unexpected
    /// errors are deliberately indistinguishable to the user).
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            StoreError::NotAuthenticated => NOT_AUTHENTICATED_MESSAGE.to_string(),
            StoreError::Backend(backend) => backend
                .server_message()
                .map(|m| m.to_string())
                .unwrap_or_else(|| fallback.to_string()),
            _ => fallback.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
