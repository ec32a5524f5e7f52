//! Request-state slices, one per domain entity.
//!
//! Each slice owns its [`RequestState`](crate::request::RequestState) behind
//! an `RwLock`, a handle to the backend connector, the session manager (the
//! authentication gate), and the effect runner. Dispatchers never hold the
//! lock across an await on the network; generation tickets make interleaved
//! settlements safe.

use core_runtime::events::CoreEvent;
use core_session::{BearerToken, SessionManager};
use provider_backend::BackendClient;
use provider_media::MediaUploader;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::effects::{Effect, EffectRunner, Notice};
use crate::error::{Result, StoreError};
use crate::request::{RequestState, Ticket};

pub mod albums;
pub mod books;
pub mod cart;
pub mod categories;
pub mod notifications;
pub mod products;
pub mod profile;
pub mod roles;
pub mod shops;
pub mod tracks;
pub mod wishlist;

/// Shared handles injected into every slice.
#[derive(Clone)]
pub(crate) struct SliceContext {
    pub backend: Arc<BackendClient>,
    pub session: Arc<SessionManager>,
    pub media: Option<Arc<MediaUploader>>,
    pub effects: EffectRunner,
}

impl SliceContext {
    /// The authentication gate for mutating dispatches.
    ///
    /// When no token is present the dispatch rejects locally; no request is
    /// issued and the slice's data is untouched.
    pub async fn require_token(&self) -> Result<BearerToken> {
        self.session
            .bearer_token()
            .await
            .ok_or(StoreError::NotAuthenticated)
    }

    /// The media uploader, when uploads are configured.
    pub fn media(&self) -> Result<Arc<MediaUploader>> {
        self.media.clone().ok_or(StoreError::MediaUnavailable)
    }
}

/// Settle a dispatch successfully and run its effects.
///
/// The optional `follow_up` domain event fires only when the settlement
/// actually applied (a superseded ticket is dropped wholesale).
pub(crate) async fn settle_ok<T>(
    state: &RwLock<RequestState<T>>,
    runner: &EffectRunner,
    ticket: Ticket,
    data: T,
    notice: Option<Notice>,
    follow_up: Option<CoreEvent>,
) -> bool {
    let mut effects = {
        let mut guard = state.write().await;
        let applied = guard.is_current(ticket);
        let effects = guard.fulfill(ticket, data, notice);
        if !applied {
            return false;
        }
        effects
    };

    if let Some(event) = follow_up {
        effects.push(Effect::Emit(event));
    }

    runner.run(effects);
    true
}

/// Settle a dispatch with an error and run its effects.
///
/// Stores the user-facing message inline and announces it as a notice, then
/// hands the original error back for the caller to return.
pub(crate) async fn settle_err<T>(
    state: &RwLock<RequestState<T>>,
    runner: &EffectRunner,
    ticket: Ticket,
    error: StoreError,
    fallback: &str,
) -> StoreError {
    let message = error.user_message(fallback);
    let effects = state.write().await.reject(ticket, message);
    runner.run(effects);
    error
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures for slice tests: a scripted HTTP client, in-memory
    //! storage bridges, and context builders for signed-in/out sessions.

    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
    use bridge_traits::storage::{SecureStore, SettingsStore};
    use bytes::Bytes;
    use core_runtime::config::MediaUploadConfig;
    use core_runtime::events::EventBus;
    use core_session::{SessionStore, UserProfile, UserRole};
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    /// Scripted HTTP client: serves canned responses in order and records
    /// every request for assertions.
    pub struct ScriptedHttpClient {
        responses: StdMutex<VecDeque<(u16, String)>>,
        requests: StdMutex<Vec<HttpRequest>>,
        calls: AtomicUsize,
    }

    impl ScriptedHttpClient {
        pub fn new(responses: Vec<(u16, &str)>) -> Arc<Self> {
            Arc::new(Self {
                responses: StdMutex::new(
                    responses
                        .into_iter()
                        .map(|(status, body)| (status, body.to_string()))
                        .collect(),
                ),
                requests: StdMutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            })
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpClient for ScriptedHttpClient {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request);

            let (status, body) = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted response left");

            Ok(HttpResponse {
                status,
                headers: HashMap::new(),
                body: Bytes::from(body),
            })
        }
    }

    #[derive(Default)]
    pub struct MemorySecureStore {
        storage: StdMutex<HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl SecureStore for MemorySecureStore {
        async fn set_secret(&self, key: &str, value: &[u8]) -> BridgeResult<()> {
            self.storage
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn get_secret(&self, key: &str) -> BridgeResult<Option<Vec<u8>>> {
            Ok(self.storage.lock().unwrap().get(key).cloned())
        }

        async fn delete_secret(&self, key: &str) -> BridgeResult<()> {
            self.storage.lock().unwrap().remove(key);
            Ok(())
        }

        async fn list_keys(&self) -> BridgeResult<Vec<String>> {
            Ok(self.storage.lock().unwrap().keys().cloned().collect())
        }

        async fn clear_all(&self) -> BridgeResult<()> {
            self.storage.lock().unwrap().clear();
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MemorySettingsStore {
        storage: StdMutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl SettingsStore for MemorySettingsStore {
        async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
            self.storage
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
            Ok(self.storage.lock().unwrap().get(key).cloned())
        }

        async fn set_bool(&self, key: &str, value: bool) -> BridgeResult<()> {
            self.set_string(key, &value.to_string()).await
        }

        async fn get_bool(&self, key: &str) -> BridgeResult<Option<bool>> {
            Ok(self
                .storage
                .lock()
                .unwrap()
                .get(key)
                .and_then(|s| s.parse().ok()))
        }

        async fn set_i64(&self, key: &str, value: i64) -> BridgeResult<()> {
            self.set_string(key, &value.to_string()).await
        }

        async fn get_i64(&self, key: &str) -> BridgeResult<Option<i64>> {
            Ok(self
                .storage
                .lock()
                .unwrap()
                .get(key)
                .and_then(|s| s.parse().ok()))
        }

        async fn delete(&self, key: &str) -> BridgeResult<()> {
            self.storage.lock().unwrap().remove(key);
            Ok(())
        }

        async fn has_key(&self, key: &str) -> BridgeResult<bool> {
            Ok(self.storage.lock().unwrap().contains_key(key))
        }

        async fn list_keys(&self) -> BridgeResult<Vec<String>> {
            Ok(self.storage.lock().unwrap().keys().cloned().collect())
        }

        async fn clear_all(&self) -> BridgeResult<()> {
            self.storage.lock().unwrap().clear();
            Ok(())
        }
    }

    pub fn sample_user() -> UserProfile {
        UserProfile {
            id: 9,
            name: "Mara".to_string(),
            email: "mara@example.com".to_string(),
            role: UserRole::Artist,
            avatar_url: None,
        }
    }

    /// Build a slice context over a scripted HTTP client.
    ///
    /// With `signed_in`, a credential is pre-persisted and restored through
    /// the session manager's normal bootstrap path.
    pub async fn context(
        http: Arc<ScriptedHttpClient>,
        signed_in: bool,
    ) -> (SliceContext, EventBus) {
        let backend = Arc::new(BackendClient::new(
            http.clone(),
            "https://api.shop.example.com",
        ));

        let store = SessionStore::new(
            Arc::new(MemorySecureStore::default()),
            Arc::new(MemorySettingsStore::default()),
        );

        let event_bus = EventBus::new(100);
        let session = Arc::new(SessionManager::new(
            backend.clone(),
            store.clone(),
            event_bus.clone(),
        ));

        if signed_in {
            store
                .save(&BearerToken::new("tok-test"), &sample_user())
                .await
                .unwrap();
            session.bootstrap().await.unwrap();
        }

        let media = Some(Arc::new(MediaUploader::new(
            http,
            MediaUploadConfig::new("https://media.example.com/upload").with_preset("storefront"),
        )));

        let ctx = SliceContext {
            backend,
            session,
            media,
            effects: EffectRunner::new(event_bus.clone()),
        };

        (ctx, event_bus)
    }

    /// Drain all currently queued events from a subscriber.
    pub fn drain(
        receiver: &mut core_runtime::events::Receiver<CoreEvent>,
    ) -> Vec<CoreEvent> {
        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        events
    }
}
