//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, secure
//! storage, key-value storage) and the configured endpoints into a ready
//! storefront core: backend connector, session manager, optional media
//! uploader, event bus, and the application store. Native apps typically
//! enable the `native-shims` feature so a reqwest-backed HTTP client is
//! provided automatically; embedded hosts inject their own adapters.
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use core_service::CoreService;
//!
//! let config = CoreConfig::builder()
//!     .api_base_url("https://api.shop.example.com")
//!     .secure_store(secure_store)
//!     .settings_store(settings_store)
//!     .build()?;
//!
//! let core = CoreService::new(config)?;
//! core.bootstrap().await?;
//!
//! let mut events = core.events();
//! core.store().products.fetch(None).await?;
//! ```

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, Receiver};
use core_session::{SessionManager, SessionStore, UserProfile};
use core_state::AppStore;
use provider_backend::BackendClient;
use provider_media::MediaUploader;
use tracing::{info, warn};

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    event_bus: EventBus,
    session: Arc<SessionManager>,
    store: Arc<AppStore>,
}

impl CoreService {
    /// Wire a validated configuration into a ready core.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let http = config
            .http_client
            .clone()
            .ok_or_else(|| CoreError::InitializationFailed("No HTTP client resolved".to_string()))?;

        let event_bus = EventBus::new(config.event_buffer);

        let backend = Arc::new(BackendClient::new(http.clone(), config.api_base_url.clone()));

        let session_store = SessionStore::new(
            config.secure_store.clone(),
            config.settings_store.clone(),
        );
        let session = Arc::new(SessionManager::new(
            backend.clone(),
            session_store,
            event_bus.clone(),
        ));

        let media = config
            .media_upload
            .clone()
            .map(|media_config| Arc::new(MediaUploader::new(http, media_config)));

        let store = Arc::new(AppStore::new(
            backend,
            session.clone(),
            media,
            event_bus.clone(),
            config.features,
        ));

        info!(api_base_url = %config.api_base_url, "Storefront core initialized");

        Ok(Self {
            event_bus,
            session,
            store,
        })
    }

    /// Restore a persisted session, if any.
    ///
    /// Call once at startup. A corrupted persisted record has already been
    /// cleared by the session layer; it is reported here as a clean start
    /// rather than an error.
    pub async fn bootstrap(&self) -> Result<Option<UserProfile>> {
        match self.session.bootstrap().await {
            Ok(user) => Ok(user),
            Err(core_session::SessionError::RecordCorrupted(reason)) => {
                warn!(reason = %reason, "Persisted session was corrupted; starting signed out");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Subscribe to core events (session changes, catalog/commerce events,
    /// notices for the toast feed).
    pub fn events(&self) -> Receiver<CoreEvent> {
        self.event_bus.subscribe()
    }

    /// The application store holding every slice.
    pub fn store(&self) -> Arc<AppStore> {
        Arc::clone(&self.store)
    }

    /// The session manager.
    pub fn session(&self) -> Arc<SessionManager> {
        Arc::clone(&self.session)
    }
}
