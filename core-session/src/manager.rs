//! # Session Manager
//!
//! Orchestrates the session credential lifecycle: login, registration,
//! logout, and bootstrap restore.
//!
//! ## Overview
//!
//! `SessionManager` is the single source of truth for the bearer token. Every
//! slice asks it for the current token before dispatching a mutating request;
//! when no token is present the slice rejects locally without touching the
//! network.
//!
//! ## Behavior
//!
//! - Login/registration call the backend, persist the credential on success,
//!   and emit [`SessionEvent`]s plus a user-facing notice
//! - A failed login surfaces the server's message verbatim and leaves both
//!   the in-memory and the persisted credential untouched
//! - Concurrent sign-in attempts are rejected while one is in flight
//! - Logout clears the persisted credential and is idempotent
//!
//! ## Usage
//!
//! ```ignore
//! use core_session::{Credentials, SessionManager};
//!
//! let manager = SessionManager::new(backend, session_store, event_bus);
//! manager.bootstrap().await?;
//!
//! let user = manager.login(Credentials {
//!     email: "mara@example.com".into(),
//!     password: "hunter2".into(),
//! }).await?;
//! ```

use crate::error::{Result, SessionError};
use crate::store::SessionStore;
use crate::types::{BearerToken, SessionState};
use core_runtime::events::{CoreEvent, EventBus, NoticeEvent, SessionEvent};
use provider_backend::types::{AuthResponse, Credentials, Registration, UserProfile};
use provider_backend::BackendClient;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, instrument, warn};

/// Fallback message when a login fails without a server-provided message.
const LOGIN_FALLBACK: &str = "Unable to sign in. Please try again.";

/// Fallback message when registration fails without a server-provided message.
const REGISTER_FALLBACK: &str = "Unable to create your account. Please try again.";

/// The in-memory credential for the signed-in user.
#[derive(Debug, Clone)]
struct ActiveSession {
    token: BearerToken,
    user: UserProfile,
}

/// Session credential orchestrator.
pub struct SessionManager {
    /// Backend connector used for login/registration
    backend: Arc<BackendClient>,
    /// Persistence for the two session keys
    store: SessionStore,
    /// Event bus for session events and notices
    event_bus: EventBus,
    /// Current credential, if signed in
    session: RwLock<Option<ActiveSession>>,
    /// Held for the duration of a sign-in attempt; a second attempt fails
    /// fast instead of racing the first
    in_progress: Mutex<()>,
}

impl SessionManager {
    /// Create a new session manager.
    pub fn new(backend: Arc<BackendClient>, store: SessionStore, event_bus: EventBus) -> Self {
        Self {
            backend,
            store,
            event_bus,
            session: RwLock::new(None),
            in_progress: Mutex::new(()),
        }
    }

    /// Restore a persisted session at startup, if one exists.
    ///
    /// Emits `SignedIn` when a credential was restored. A corrupted record
    /// has already been cleared by the store when this returns an error.
    #[instrument(skip(self))]
    pub async fn bootstrap(&self) -> Result<Option<UserProfile>> {
        let Some(persisted) = self.store.load().await? else {
            return Ok(None);
        };

        let user = persisted.user.clone();

        {
            let mut session = self.session.write().await;
            *session = Some(ActiveSession {
                token: persisted.token,
                user: user.clone(),
            });
        }

        self.emit(CoreEvent::Session(SessionEvent::SignedIn {
            user_id: user.id,
            role: user.role.as_str().to_string(),
        }));

        info!(user_id = user.id, "Session restored at bootstrap");
        Ok(Some(user))
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// - [`SessionError::SignInInProgress`] when another attempt is in flight
    /// - [`SessionError::Backend`] carrying the server's message for
    ///   rejected credentials; the previous credential (if any) is untouched
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: Credentials) -> Result<UserProfile> {
        let _guard = self
            .in_progress
            .try_lock()
            .map_err(|_| SessionError::SignInInProgress)?;

        self.emit(CoreEvent::Session(SessionEvent::SigningIn));

        let response = match self.backend.login(&credentials).await {
            Ok(response) => response,
            Err(e) => {
                let error = SessionError::from(e);
                self.report_failure(&error, LOGIN_FALLBACK);
                return Err(error);
            }
        };

        let user = self.adopt(response).await?;
        self.emit(CoreEvent::Notice(NoticeEvent::Success {
            message: format!("Signed in as {}", user.name),
        }));

        Ok(user)
    }

    /// Create an account. On success the user is signed in directly.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: Registration) -> Result<UserProfile> {
        let _guard = self
            .in_progress
            .try_lock()
            .map_err(|_| SessionError::SignInInProgress)?;

        self.emit(CoreEvent::Session(SessionEvent::SigningIn));

        let response = match self.backend.register(&registration).await {
            Ok(response) => response,
            Err(e) => {
                let error = SessionError::from(e);
                self.report_failure(&error, REGISTER_FALLBACK);
                return Err(error);
            }
        };

        let user = self.adopt(response).await?;
        self.emit(CoreEvent::Notice(NoticeEvent::Success {
            message: format!("Welcome, {}", user.name),
        }));

        Ok(user)
    }

    /// Sign out, clearing the in-memory and persisted credential.
    ///
    /// Idempotent: signing out while signed out is not an error.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        self.store.clear().await?;

        {
            let mut session = self.session.write().await;
            *session = None;
        }

        self.emit(CoreEvent::Session(SessionEvent::SignedOut));
        info!("Signed out");
        Ok(())
    }

    /// The signed-in user, if any.
    pub async fn current_user(&self) -> Option<UserProfile> {
        self.session.read().await.as_ref().map(|s| s.user.clone())
    }

    /// The current bearer token, if signed in.
    pub async fn bearer_token(&self) -> Option<BearerToken> {
        self.session.read().await.as_ref().map(|s| s.token.clone())
    }

    /// The current bearer token, or [`SessionError::NotAuthenticated`].
    ///
    /// This is the gate every mutating slice dispatch goes through before
    /// issuing a request.
    pub async fn require_token(&self) -> Result<BearerToken> {
        self.bearer_token()
            .await
            .ok_or(SessionError::NotAuthenticated)
    }

    /// The current session state.
    pub async fn state(&self) -> SessionState {
        if self.session.read().await.is_some() {
            return SessionState::SignedIn;
        }

        // A held guard means a sign-in attempt is mid-flight
        match self.in_progress.try_lock() {
            Ok(_) => SessionState::SignedOut,
            Err(_) => SessionState::SigningIn,
        }
    }

    /// Refresh the in-memory user record after a profile update.
    ///
    /// Keeps the persisted record in step with the backend's response.
    pub async fn replace_user(&self, user: UserProfile) -> Result<()> {
        let token = {
            let mut session = self.session.write().await;
            let Some(active) = session.as_mut() else {
                return Err(SessionError::NotAuthenticated);
            };
            active.user = user.clone();
            active.token.clone()
        };

        self.store.save(&token, &user).await
    }

    /// Persist and adopt a fresh credential from the backend.
    async fn adopt(&self, response: AuthResponse) -> Result<UserProfile> {
        let token = BearerToken::new(response.token);
        let user = response.user;

        self.store.save(&token, &user).await?;

        {
            let mut session = self.session.write().await;
            *session = Some(ActiveSession {
                token,
                user: user.clone(),
            });
        }

        self.emit(CoreEvent::Session(SessionEvent::SignedIn {
            user_id: user.id,
            role: user.role.as_str().to_string(),
        }));

        info!(user_id = user.id, role = %user.role, "Signed in");
        Ok(user)
    }

    /// Surface a sign-in failure on both channels: session event and notice.
    fn report_failure(&self, error: &SessionError, fallback: &str) {
        let message = error.user_message(fallback);
        warn!(message = %message, "Sign-in failed");

        self.emit(CoreEvent::Session(SessionEvent::SessionError {
            message: message.clone(),
            recoverable: true,
        }));
        self.emit(CoreEvent::Notice(NoticeEvent::Error { message }));
    }

    fn emit(&self, event: CoreEvent) {
        let _ = self.event_bus.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::{sample_user, MemorySecureStore, MemorySettingsStore};
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
    use bytes::Bytes;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    /// Scripted HTTP client: pops one canned response per request, with an
    /// optional delay to hold a request in flight.
    struct ScriptedHttpClient {
        responses: Mutex<Vec<(u16, String)>>,
        delay: Option<Duration>,
        calls: std::sync::atomic::AtomicUsize,
    }

    impl ScriptedHttpClient {
        fn new(responses: Vec<(u16, String)>) -> Self {
            Self {
                responses: Mutex::new(responses),
                delay: None,
                calls: std::sync::atomic::AtomicUsize::new(0),
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        fn call_count(&self) -> usize {
            self.calls.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HttpClient for ScriptedHttpClient {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            self.calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            let (status, body) = self
                .responses
                .lock()
                .await
                .pop()
                .expect("no scripted response left");

            Ok(HttpResponse {
                status,
                headers: HashMap::new(),
                body: Bytes::from(body),
            })
        }
    }

    const LOGIN_OK: &str = r#"{
        "token": "tok-abc",
        "user": {"id": 9, "name": "Mara", "email": "mara@example.com", "role": "artist"}
    }"#;

    fn manager_with(
        http: Arc<ScriptedHttpClient>,
    ) -> (Arc<SessionManager>, EventBus, SessionStore) {
        let backend = Arc::new(BackendClient::new(http, "https://api.shop.example.com"));
        let store = SessionStore::new(
            Arc::new(MemorySecureStore::default()),
            Arc::new(MemorySettingsStore::default()),
        );
        let event_bus = EventBus::new(100);
        let manager = Arc::new(SessionManager::new(
            backend,
            store.clone(),
            event_bus.clone(),
        ));
        (manager, event_bus, store)
    }

    fn credentials(password: &str) -> Credentials {
        Credentials {
            email: "mara@example.com".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_success_persists_and_emits() {
        let http = Arc::new(ScriptedHttpClient::new(vec![(200, LOGIN_OK.to_string())]));
        let (manager, event_bus, store) = manager_with(http);
        let mut events = event_bus.subscribe();

        let user = manager.login(credentials("hunter2")).await.unwrap();

        assert_eq!(user.id, 9);
        assert_eq!(manager.state().await, SessionState::SignedIn);
        assert_eq!(
            manager.bearer_token().await.unwrap().as_str(),
            "tok-abc"
        );
        assert!(store.has_session().await.unwrap());

        // SigningIn, SignedIn, then the success notice
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Session(SessionEvent::SigningIn)
        );
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Session(SessionEvent::SignedIn {
                user_id: 9,
                role: "artist".to_string(),
            })
        );
        match events.recv().await.unwrap() {
            CoreEvent::Notice(NoticeEvent::Success { message }) => {
                assert!(message.contains("Mara"));
            }
            other => panic!("Expected success notice, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login_rejection_surfaces_server_message() {
        let http = Arc::new(ScriptedHttpClient::new(vec![(
            401,
            r#"{"message": "Invalid credentials"}"#.to_string(),
        )]));
        let (manager, event_bus, store) = manager_with(http);
        let mut events = event_bus.subscribe();

        let error = manager.login(credentials("wrong")).await.unwrap_err();

        assert_eq!(error.user_message("fallback"), "Invalid credentials");
        assert_eq!(manager.state().await, SessionState::SignedOut);
        assert!(manager.current_user().await.is_none());
        assert!(!store.has_session().await.unwrap());

        // SigningIn, then the error on both channels
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Session(SessionEvent::SigningIn)
        );
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Session(SessionEvent::SessionError {
                message: "Invalid credentials".to_string(),
                recoverable: true,
            })
        );
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Notice(NoticeEvent::Error {
                message: "Invalid credentials".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_failed_login_leaves_existing_credential_untouched() {
        // First login succeeds, second (re-login attempt) is rejected
        let http = Arc::new(ScriptedHttpClient::new(vec![
            (401, r#"{"message": "Invalid credentials"}"#.to_string()),
            (200, LOGIN_OK.to_string()),
        ]));
        let (manager, _event_bus, store) = manager_with(http);

        manager.login(credentials("hunter2")).await.unwrap();
        let before = manager.bearer_token().await.unwrap();

        let result = manager.login(credentials("wrong")).await;
        assert!(result.is_err());

        // Both the in-memory and the persisted credential are unchanged
        assert_eq!(manager.bearer_token().await.unwrap(), before);
        let persisted = store.load().await.unwrap().unwrap();
        assert_eq!(persisted.token.as_str(), "tok-abc");
        assert_eq!(manager.current_user().await.unwrap().id, 9);
    }

    #[tokio::test]
    async fn test_concurrent_sign_in_rejected() {
        let http = Arc::new(
            ScriptedHttpClient::new(vec![(200, LOGIN_OK.to_string())])
                .with_delay(Duration::from_millis(100)),
        );
        let (manager, _event_bus, _store) = manager_with(http);

        let first = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.login(credentials("hunter2")).await })
        };

        // Give the first attempt time to take the guard
        tokio::time::sleep(Duration::from_millis(20)).await;

        let second = manager.login(credentials("hunter2")).await;
        assert!(matches!(
            second.unwrap_err(),
            SessionError::SignInInProgress
        ));
        assert_eq!(manager.state().await, SessionState::SigningIn);

        // The first attempt still completes normally
        let user = first.await.unwrap().unwrap();
        assert_eq!(user.id, 9);
    }

    #[tokio::test]
    async fn test_register_success() {
        let http = Arc::new(ScriptedHttpClient::new(vec![(
            200,
            r#"{
                "token": "tok-new",
                "user": {"id": 12, "name": "Nico", "email": "nico@example.com", "role": "client"}
            }"#
            .to_string(),
        )]));
        let (manager, _event_bus, store) = manager_with(http);

        let user = manager
            .register(Registration {
                name: "Nico".to_string(),
                email: "nico@example.com".to_string(),
                password: "hunter2".to_string(),
                role: None,
            })
            .await
            .unwrap();

        assert_eq!(user.id, 12);
        assert!(store.has_session().await.unwrap());
    }

    #[tokio::test]
    async fn test_logout_clears_and_is_idempotent() {
        let http = Arc::new(ScriptedHttpClient::new(vec![(200, LOGIN_OK.to_string())]));
        let (manager, event_bus, store) = manager_with(http);

        manager.login(credentials("hunter2")).await.unwrap();
        let mut events = event_bus.subscribe();

        manager.logout().await.unwrap();
        assert!(manager.current_user().await.is_none());
        assert!(!store.has_session().await.unwrap());
        assert_eq!(manager.state().await, SessionState::SignedOut);
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Session(SessionEvent::SignedOut)
        );

        // Second logout is a no-op, not an error
        manager.logout().await.unwrap();
    }

    #[tokio::test]
    async fn test_bootstrap_restores_persisted_session() {
        let http = Arc::new(ScriptedHttpClient::new(vec![]));
        let (manager, event_bus, store) = manager_with(http.clone());

        store
            .save(&BearerToken::new("tok-persisted"), &sample_user())
            .await
            .unwrap();

        let mut events = event_bus.subscribe();
        let restored = manager.bootstrap().await.unwrap().expect("session");

        assert_eq!(restored.id, 9);
        assert_eq!(
            manager.bearer_token().await.unwrap().as_str(),
            "tok-persisted"
        );
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Session(SessionEvent::SignedIn {
                user_id: 9,
                role: "artist".to_string(),
            })
        );

        // No network call happened
        assert_eq!(http.call_count(), 0);
    }

    #[tokio::test]
    async fn test_bootstrap_without_session() {
        let http = Arc::new(ScriptedHttpClient::new(vec![]));
        let (manager, _event_bus, _store) = manager_with(http);

        assert!(manager.bootstrap().await.unwrap().is_none());
        assert_eq!(manager.state().await, SessionState::SignedOut);
    }

    #[tokio::test]
    async fn test_require_token_when_signed_out() {
        let http = Arc::new(ScriptedHttpClient::new(vec![]));
        let (manager, _event_bus, _store) = manager_with(http);

        assert!(matches!(
            manager.require_token().await.unwrap_err(),
            SessionError::NotAuthenticated
        ));
    }

    #[tokio::test]
    async fn test_replace_user_updates_persisted_record() {
        let http = Arc::new(ScriptedHttpClient::new(vec![(200, LOGIN_OK.to_string())]));
        let (manager, _event_bus, store) = manager_with(http);

        manager.login(credentials("hunter2")).await.unwrap();

        let mut updated = sample_user();
        updated.name = "Mara V.".to_string();
        manager.replace_user(updated.clone()).await.unwrap();

        assert_eq!(manager.current_user().await.unwrap().name, "Mara V.");
        let persisted = store.load().await.unwrap().unwrap();
        assert_eq!(persisted.user.name, "Mara V.");
    }
}
