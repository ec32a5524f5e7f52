use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Sign-in already in progress")]
    SignInInProgress,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Secure storage unavailable: {0}")]
    SecureStorageUnavailable(String),

    #[error("Persisted session corrupted: {0}")]
    RecordCorrupted(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error(transparent)]
    Backend(#[from] provider_backend::BackendError),
}

impl SessionError {
    /// The user-facing message for this error: the backend's `message` field
    /// verbatim when one was reported, the operation's fallback otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            SessionError::Backend(backend) => backend
                .server_message()
                .map(|m| m.to_string())
                .unwrap_or_else(|| fallback.to_string()),
            _ => fallback.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use provider_backend::BackendError;

    #[test]
    fn test_user_message_prefers_server_message() {
        let err = SessionError::Backend(BackendError::Api {
            status: 401,
            message: Some("Invalid credentials".to_string()),
        });
        assert_eq!(err.user_message("Unable to sign in"), "Invalid credentials");
    }

    #[test]
    fn test_user_message_falls_back() {
        let err = SessionError::Backend(BackendError::Parse("bad json".to_string()));
        assert_eq!(err.user_message("Unable to sign in"), "Unable to sign in");

        let err = SessionError::NotAuthenticated;
        assert_eq!(err.user_message("Unable to sign in"), "Unable to sign in");
    }
}
