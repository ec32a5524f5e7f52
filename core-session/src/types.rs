use std::fmt;

/// Opaque bearer credential proving an authenticated session.
///
/// The token is issued by the backend at login and attached to every
/// protected request as `Authorization: Bearer <token>`. The core never
/// inspects its contents.
///
/// # Security
///
/// The `Debug` implementation redacts the token value so it cannot leak
/// through logs or error chains.
///
/// # Examples
///
/// ```
/// use core_session::BearerToken;
///
/// let token = BearerToken::new("tok-abc");
/// assert_eq!(token.as_str(), "tok-abc");
/// assert_eq!(format!("{:?}", token), "BearerToken(\"[REDACTED]\")");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token value, for the `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BearerToken").field(&"[REDACTED]").finish()
    }
}

/// Session state for the signed-in user.
///
/// # State Transitions
///
/// ```text
/// SignedOut -> SigningIn -> SignedIn -> SignedOut
///                  |
///                  v (rejected)
///              SignedOut
/// ```
///
/// # Examples
///
/// ```
/// use core_session::SessionState;
///
/// let state = SessionState::SignedOut;
/// assert!(!state.is_authenticated());
///
/// let state = SessionState::SignedIn;
/// assert!(state.is_authenticated());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No credential present
    #[default]
    SignedOut,
    /// A login or registration request is in flight
    SigningIn,
    /// A credential is held in memory (and persisted)
    SignedIn,
}

impl SessionState {
    /// Check if the user is authenticated (has a credential).
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::SignedIn)
    }

    /// Check if a sign-in operation is in progress.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, SessionState::SigningIn)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::SignedOut => write!(f, "Signed Out"),
            SessionState::SigningIn => write!(f, "Signing In..."),
            SessionState::SignedIn => write!(f, "Signed In"),
        }
    }
}
