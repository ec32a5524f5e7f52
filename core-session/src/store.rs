//! Persisted Session Storage
//!
//! This module persists the two session keys: the bearer token (in the host's
//! secure store) and the serialized user record (in the settings store).
//!
//! ## Behavior
//!
//! - The token is never logged or exposed in error messages
//! - A corrupted user record is deleted on read and surfaced as an error
//! - Clearing is idempotent: a missing key is not an error
//!
//! ## Example
//!
//! ```no_run
//! use core_session::{BearerToken, SessionStore};
//! use std::sync::Arc;
//! # use bridge_traits::storage::{SecureStore, SettingsStore};
//! # async fn example(
//! #     secure_store: Arc<dyn SecureStore>,
//! #     settings_store: Arc<dyn SettingsStore>,
//! #     user: core_session::UserProfile,
//! # ) -> core_session::Result<()> {
//! let store = SessionStore::new(secure_store, settings_store);
//!
//! store.save(&BearerToken::new("tok"), &user).await?;
//! let restored = store.load().await?;
//! store.clear().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, SessionError};
use crate::types::BearerToken;
use bridge_traits::storage::{SecureStore, SettingsStore};
use provider_backend::types::UserProfile;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Secure-store key holding the bearer token.
const TOKEN_KEY: &str = "session_token";

/// Settings-store key holding the serialized user record.
const USER_KEY: &str = "session_user";

/// A restored session credential: token plus user record.
#[derive(Debug, Clone)]
pub struct PersistedSession {
    pub token: BearerToken,
    pub user: UserProfile,
}

/// Persistence for the session credential.
///
/// The token goes through the platform `SecureStore`; the user record, which
/// is not secret but must survive restarts, goes through the `SettingsStore`.
#[derive(Clone)]
pub struct SessionStore {
    secure_store: Arc<dyn SecureStore>,
    settings_store: Arc<dyn SettingsStore>,
}

impl SessionStore {
    /// Create a new session store over the injected storage bridges.
    pub fn new(
        secure_store: Arc<dyn SecureStore>,
        settings_store: Arc<dyn SettingsStore>,
    ) -> Self {
        debug!("Initializing SessionStore");
        Self {
            secure_store,
            settings_store,
        }
    }

    /// Persist the credential. Overwrites any previous session.
    pub async fn save(&self, token: &BearerToken, user: &UserProfile) -> Result<()> {
        let user_json = serde_json::to_string(user).map_err(|e| {
            warn!(user_id = user.id, error = %e, "Failed to serialize user record");
            SessionError::SerializationFailed(e.to_string())
        })?;

        self.secure_store
            .set_secret(TOKEN_KEY, token.as_str().as_bytes())
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to store session token");
                SessionError::SecureStorageUnavailable(e.to_string())
            })?;

        self.settings_store
            .set_string(USER_KEY, &user_json)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to store user record");
                SessionError::SecureStorageUnavailable(e.to_string())
            })?;

        info!(user_id = user.id, "Session persisted");
        Ok(())
    }

    /// Restore the persisted credential, if a complete one exists.
    ///
    /// Returns `Ok(None)` when either key is absent. A present but
    /// undecodable user record is deleted (along with the token) and
    /// surfaced as [`SessionError::RecordCorrupted`].
    pub async fn load(&self) -> Result<Option<PersistedSession>> {
        let token_bytes = self
            .secure_store
            .get_secret(TOKEN_KEY)
            .await
            .map_err(|e| SessionError::SecureStorageUnavailable(e.to_string()))?;

        let Some(token_bytes) = token_bytes else {
            debug!("No session token in storage");
            return Ok(None);
        };

        let token = String::from_utf8(token_bytes).map_err(|e| {
            warn!(error = %e, "Session token is not valid UTF-8");
            SessionError::RecordCorrupted(format!("token: {}", e))
        })?;

        let user_json = self
            .settings_store
            .get_string(USER_KEY)
            .await
            .map_err(|e| SessionError::SecureStorageUnavailable(e.to_string()))?;

        let Some(user_json) = user_json else {
            // A token with no user record is half a session; treat as absent.
            debug!("Session token present but user record missing");
            return Ok(None);
        };

        let user: UserProfile = match serde_json::from_str(&user_json) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "User record corrupted, clearing session");

                if let Err(clear_err) = self.clear().await {
                    warn!(error = %clear_err, "Failed to clear corrupted session");
                }

                return Err(SessionError::RecordCorrupted(e.to_string()));
            }
        };

        info!(user_id = user.id, role = %user.role, "Session restored from storage");

        Ok(Some(PersistedSession {
            token: BearerToken::new(token),
            user,
        }))
    }

    /// Remove both session keys. Idempotent.
    pub async fn clear(&self) -> Result<()> {
        self.secure_store
            .delete_secret(TOKEN_KEY)
            .await
            .map_err(|e| SessionError::SecureStorageUnavailable(e.to_string()))?;

        self.settings_store
            .delete(USER_KEY)
            .await
            .map_err(|e| SessionError::SecureStorageUnavailable(e.to_string()))?;

        info!("Session cleared");
        Ok(())
    }

    /// Check whether a token is present without restoring the session.
    pub async fn has_session(&self) -> Result<bool> {
        self.secure_store
            .has_secret(TOKEN_KEY)
            .await
            .map_err(|e| SessionError::SecureStorageUnavailable(e.to_string()))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{sample_user, MemorySecureStore, MemorySettingsStore};
    use super::*;

    fn store() -> (SessionStore, MemorySettingsStore) {
        let settings = MemorySettingsStore::default();
        let store = SessionStore::new(
            Arc::new(MemorySecureStore::default()),
            Arc::new(settings.clone()),
        );
        (store, settings)
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let (store, _) = store();
        let user = sample_user();

        store
            .save(&BearerToken::new("tok-abc"), &user)
            .await
            .unwrap();

        let restored = store.load().await.unwrap().expect("session present");
        assert_eq!(restored.token.as_str(), "tok-abc");
        assert_eq!(restored.user, user);
    }

    #[tokio::test]
    async fn test_load_without_session_is_none() {
        let (store, _) = store();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_token_without_user_record_is_none() {
        let (store, settings) = store();
        let user = sample_user();

        store.save(&BearerToken::new("tok"), &user).await.unwrap();
        settings.delete("session_user").await.unwrap();

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupted_user_record_cleared_and_errors() {
        let (store, settings) = store();
        let user = sample_user();

        store.save(&BearerToken::new("tok"), &user).await.unwrap();
        settings
            .set_string("session_user", "not valid json")
            .await
            .unwrap();

        let result = store.load().await;
        assert!(matches!(
            result.unwrap_err(),
            SessionError::RecordCorrupted(_)
        ));

        // The broken session must not survive
        assert!(!store.has_session().await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let (store, _) = store();

        store.clear().await.unwrap();
        store.clear().await.unwrap();

        assert!(!store.has_session().await.unwrap());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_session() {
        let (store, _) = store();
        let user = sample_user();

        store.save(&BearerToken::new("tok-1"), &user).await.unwrap();
        store.save(&BearerToken::new("tok-2"), &user).await.unwrap();

        let restored = store.load().await.unwrap().unwrap();
        assert_eq!(restored.token.as_str(), "tok-2");
    }
}
