//! # Core Configuration Module
//!
//! Provides configuration management for the storefront core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds all necessary dependencies and settings for the core
//! library. It enforces fail-fast validation to ensure all required bridges
//! are provided before initialization.
//!
//! ## Required Dependencies
//!
//! - `SecureStore` - Required for the persisted session token
//! - `SettingsStore` - Required for the persisted user record
//! - An API base URL, from the builder or the `STOREFRONT_API_URL`
//!   environment variable
//!
//! ## Optional Dependencies (with native defaults)
//!
//! - `HttpClient` - HTTP operations (native default: reqwest, behind the
//!   `native-shims` feature)
//! - `MediaUploadConfig` - Third-party media upload endpoint; required only
//!   when media upload is enabled
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .api_base_url("https://api.shop.example.com")
//!     .secure_store(Arc::new(MySecureStore))
//!     .settings_store(Arc::new(MySettingsStore))
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{HttpClient, SecureStore, SettingsStore};
use std::sync::Arc;

/// Environment variable consulted for the backend base URL when the builder
/// does not set one explicitly.
pub const API_URL_ENV: &str = "STOREFRONT_API_URL";

/// Core configuration for the storefront core.
///
/// This struct holds all dependencies and settings required to initialize
/// the core library. Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Base URL of the REST backend (no trailing slash)
    pub api_base_url: String,

    /// Media upload endpoint configuration (optional)
    pub media_upload: Option<MediaUploadConfig>,

    /// HTTP client for making API requests (optional with native default)
    pub http_client: Option<Arc<dyn HttpClient>>,

    /// Secure credential storage (required)
    pub secure_store: Arc<dyn SecureStore>,

    /// User record / preferences storage (required)
    pub settings_store: Arc<dyn SettingsStore>,

    /// Event bus buffer capacity
    pub event_buffer: usize,

    /// Feature flags
    pub features: FeatureFlags,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("api_base_url", &self.api_base_url)
            .field("media_upload", &self.media_upload)
            .field(
                "http_client",
                &self.http_client.as_ref().map(|_| "HttpClient { ... }"),
            )
            .field("secure_store", &"SecureStore { ... }")
            .field("settings_store", &"SettingsStore { ... }")
            .field("event_buffer", &self.event_buffer)
            .field("features", &self.features)
            .finish()
    }
}

/// Feature flags control optional functionality.
///
/// Features can be enabled during configuration to unlock additional
/// capabilities, but may require corresponding configuration to function
/// correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureFlags {
    /// Enable the admin surface (roles and permissions slice)
    pub enable_admin: bool,

    /// Enable media uploads (requires a `MediaUploadConfig`)
    pub enable_media_upload: bool,
}

/// Configuration for the third-party media upload endpoint.
///
/// The upload endpoint accepts a multipart POST and returns a durable URL
/// that is substituted into entity payloads before submission to the primary
/// backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUploadConfig {
    /// Full URL of the upload endpoint
    pub upload_url: String,

    /// Optional upload preset forwarded as a form field
    pub preset: Option<String>,
}

impl MediaUploadConfig {
    /// Creates a new media upload configuration.
    pub fn new(upload_url: impl Into<String>) -> Self {
        Self {
            upload_url: upload_url.into(),
            preset: None,
        }
    }

    /// Sets the upload preset form field.
    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.upload_url.is_empty() {
            return Err(Error::Config(
                "Media upload URL cannot be empty".to_string(),
            ));
        }
        if !self.upload_url.starts_with("http://") && !self.upload_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "Media upload URL must be absolute (got '{}')",
                self.upload_url
            )));
        }
        Ok(())
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The API base URL is an absolute HTTP(S) URL
    /// - The event buffer capacity is non-zero
    /// - Feature flags are consistent with available configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.is_empty() {
            return Err(Error::Config("API base URL cannot be empty".to_string()));
        }

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "API base URL must be absolute (got '{}')",
                self.api_base_url
            )));
        }

        if self.event_buffer == 0 {
            return Err(Error::Config(
                "Event buffer capacity must be greater than 0".to_string(),
            ));
        }

        if let Some(media) = &self.media_upload {
            media.validate()?;
        }

        if self.features.enable_media_upload && self.media_upload.is_none() {
            return Err(Error::Config(
                "Media upload enabled but no MediaUploadConfig provided. \
                 Disable the feature or set .media_upload() on the builder."
                    .to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(not(feature = "native-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required for backend access. \
                 Native: enable the 'native-shims' feature to use the default reqwest client. \
                 Embedded: inject a host HTTP adapter."
            .to_string(),
    })
}

#[cfg(feature = "native-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_native::ReqwestHttpClient;

    let client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    Ok(client)
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Use this builder to incrementally set configuration options and then
/// call [`build()`](CoreConfigBuilder::build) to create the final config.
/// The builder validates required dependencies and provides helpful error
/// messages.
#[derive(Default)]
pub struct CoreConfigBuilder {
    api_base_url: Option<String>,
    media_upload: Option<MediaUploadConfig>,
    http_client: Option<Arc<dyn HttpClient>>,
    secure_store: Option<Arc<dyn SecureStore>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    event_buffer: Option<usize>,
    features: FeatureFlags,
}

impl CoreConfigBuilder {
    /// Sets the backend base URL explicitly.
    ///
    /// When not set, `build()` falls back to the `STOREFRONT_API_URL`
    /// environment variable. A trailing slash is trimmed.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Sets the media upload endpoint configuration.
    pub fn media_upload(mut self, config: MediaUploadConfig) -> Self {
        self.media_upload = Some(config);
        self
    }

    /// Sets the HTTP client implementation.
    ///
    /// If not provided, the native default (reqwest-based) will be used when
    /// the `native-shims` feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the secure store implementation (required).
    ///
    /// The secure store holds the session bearer token. It must provide
    /// platform-appropriate security (Keychain on macOS/iOS, Keystore on
    /// Android, etc.).
    pub fn secure_store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.secure_store = Some(store);
        self
    }

    /// Sets the settings store implementation (required).
    ///
    /// The settings store holds the serialized user record and host
    /// preferences.
    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    /// Sets the event bus buffer capacity.
    ///
    /// Default: 100
    pub fn event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = Some(capacity);
        self
    }

    /// Enables or disables the admin surface.
    ///
    /// Default: false
    pub fn enable_admin(mut self, enabled: bool) -> Self {
        self.features.enable_admin = enabled;
        self
    }

    /// Enables or disables media uploads.
    ///
    /// Requires a `MediaUploadConfig` to be provided.
    ///
    /// Default: false
    pub fn enable_media_upload(mut self, enabled: bool) -> Self {
        self.features.enable_media_upload = enabled;
        self
    }

    /// Sets all feature flags at once.
    pub fn features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// This validates all required dependencies are provided and returns
    /// an error with an actionable message if anything is missing.
    ///
    /// # Returns
    ///
    /// Returns `Ok(CoreConfig)` on success, or an error if:
    /// - Required bridges are missing (SecureStore, SettingsStore)
    /// - Neither the builder nor the environment provides a base URL
    /// - Configuration values are invalid
    /// - Feature flags are inconsistent with available configuration
    pub fn build(self) -> Result<CoreConfig> {
        let api_base_url = match self.api_base_url {
            Some(url) => url,
            None => std::env::var(API_URL_ENV).map_err(|_| {
                Error::Config(format!(
                    "API base URL is required. Use .api_base_url() or set the {} \
                     environment variable.",
                    API_URL_ENV
                ))
            })?,
        };
        let api_base_url = api_base_url.trim_end_matches('/').to_string();

        let secure_store = self.secure_store.ok_or_else(|| Error::CapabilityMissing {
            capability: "SecureStore".to_string(),
            message: "SecureStore implementation is required for the session token. \
                     Native: inject bridge_native::KeyringSecureStore. \
                     Embedded: inject the host's secure storage adapter."
                .to_string(),
        })?;

        let settings_store = self.settings_store.ok_or_else(|| Error::CapabilityMissing {
            capability: "SettingsStore".to_string(),
            message: "SettingsStore implementation is required for the user record. \
                     Native: inject bridge_native::SqliteSettingsStore. \
                     Embedded: inject the host's key-value storage adapter."
                .to_string(),
        })?;

        let http_client = match self.http_client {
            Some(client) => Some(client),
            None => Some(provide_default_http_client()?),
        };

        // Create config with defaults
        let config = CoreConfig {
            api_base_url,
            media_upload: self.media_upload,
            http_client,
            secure_store,
            settings_store,
            event_buffer: self
                .event_buffer
                .unwrap_or(crate::events::DEFAULT_EVENT_BUFFER_SIZE),
            features: self.features,
        };

        // Validate the configuration
        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::{BridgeError, SecureStore, SettingsStore};
    use std::sync::Arc;

    // Mock implementations for testing
    struct MockSecureStore;

    #[async_trait]
    impl SecureStore for MockSecureStore {
        async fn set_secret(
            &self,
            _key: &str,
            _value: &[u8],
        ) -> std::result::Result<(), BridgeError> {
            Ok(())
        }

        async fn get_secret(
            &self,
            _key: &str,
        ) -> std::result::Result<Option<Vec<u8>>, BridgeError> {
            Ok(None)
        }

        async fn delete_secret(&self, _key: &str) -> std::result::Result<(), BridgeError> {
            Ok(())
        }

        async fn list_keys(&self) -> std::result::Result<Vec<String>, BridgeError> {
            Ok(Vec::new())
        }

        async fn clear_all(&self) -> std::result::Result<(), BridgeError> {
            Ok(())
        }
    }

    struct MockSettingsStore;

    #[async_trait]
    impl SettingsStore for MockSettingsStore {
        async fn set_string(
            &self,
            _key: &str,
            _value: &str,
        ) -> std::result::Result<(), BridgeError> {
            Ok(())
        }

        async fn get_string(&self, _key: &str) -> std::result::Result<Option<String>, BridgeError> {
            Ok(None)
        }

        async fn set_bool(&self, _key: &str, _value: bool) -> std::result::Result<(), BridgeError> {
            Ok(())
        }

        async fn get_bool(&self, _key: &str) -> std::result::Result<Option<bool>, BridgeError> {
            Ok(None)
        }

        async fn set_i64(&self, _key: &str, _value: i64) -> std::result::Result<(), BridgeError> {
            Ok(())
        }

        async fn get_i64(&self, _key: &str) -> std::result::Result<Option<i64>, BridgeError> {
            Ok(None)
        }

        async fn delete(&self, _key: &str) -> std::result::Result<(), BridgeError> {
            Ok(())
        }

        async fn has_key(&self, _key: &str) -> std::result::Result<bool, BridgeError> {
            Ok(false)
        }

        async fn list_keys(&self) -> std::result::Result<Vec<String>, BridgeError> {
            Ok(Vec::new())
        }

        async fn clear_all(&self) -> std::result::Result<(), BridgeError> {
            Ok(())
        }
    }

    struct MockHttpClient;

    #[async_trait]
    impl bridge_traits::HttpClient for MockHttpClient {
        async fn execute(
            &self,
            _request: bridge_traits::HttpRequest,
        ) -> std::result::Result<bridge_traits::HttpResponse, BridgeError> {
            Err(BridgeError::OperationFailed("not wired".to_string()))
        }
    }

    fn builder_with_bridges() -> CoreConfigBuilder {
        CoreConfig::builder()
            .secure_store(Arc::new(MockSecureStore))
            .settings_store(Arc::new(MockSettingsStore))
            .http_client(Arc::new(MockHttpClient))
    }

    #[test]
    fn test_builder_requires_base_url() {
        // Guard against ambient configuration leaking into the test
        std::env::remove_var(API_URL_ENV);

        let result = builder_with_bridges().build();

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("API base URL is required"));
    }

    #[test]
    fn test_builder_requires_secure_store() {
        let result = CoreConfig::builder()
            .api_base_url("https://api.shop.example.com")
            .settings_store(Arc::new(MockSettingsStore))
            .http_client(Arc::new(MockHttpClient))
            .build();

        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("SecureStore"));
        assert!(err_msg.contains("session token"));
    }

    #[test]
    fn test_builder_requires_settings_store() {
        let result = CoreConfig::builder()
            .api_base_url("https://api.shop.example.com")
            .secure_store(Arc::new(MockSecureStore))
            .http_client(Arc::new(MockHttpClient))
            .build();

        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("SettingsStore"));
        assert!(err_msg.contains("user record"));
    }

    #[test]
    fn test_builder_with_all_required_fields() {
        let result = builder_with_bridges()
            .api_base_url("https://api.shop.example.com")
            .build();

        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.api_base_url, "https://api.shop.example.com");
        assert_eq!(config.event_buffer, 100); // Default
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let config = builder_with_bridges()
            .api_base_url("https://api.shop.example.com/")
            .build()
            .unwrap();

        assert_eq!(config.api_base_url, "https://api.shop.example.com");
    }

    #[test]
    fn test_validate_rejects_relative_base_url() {
        let result = builder_with_bridges().api_base_url("api.shop").build();

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("absolute"));
    }

    #[test]
    fn test_validate_rejects_zero_event_buffer() {
        let result = builder_with_bridges()
            .api_base_url("https://api.shop.example.com")
            .event_buffer(0)
            .build();

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("must be greater than 0"));
    }

    #[test]
    fn test_feature_flags_default() {
        let flags = FeatureFlags::default();
        assert!(!flags.enable_admin);
        assert!(!flags.enable_media_upload);
    }

    #[test]
    fn test_validate_media_upload_requires_config() {
        let result = builder_with_bridges()
            .api_base_url("https://api.shop.example.com")
            .enable_media_upload(true)
            .build();

        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("Media upload enabled"));
        assert!(err_msg.contains("MediaUploadConfig"));
    }

    #[test]
    fn test_builder_with_media_upload() {
        let config = builder_with_bridges()
            .api_base_url("https://api.shop.example.com")
            .media_upload(
                MediaUploadConfig::new("https://media.example.com/upload")
                    .with_preset("storefront"),
            )
            .enable_media_upload(true)
            .build()
            .unwrap();

        assert!(config.features.enable_media_upload);
        let media = config.media_upload.unwrap();
        assert_eq!(media.upload_url, "https://media.example.com/upload");
        assert_eq!(media.preset.as_deref(), Some("storefront"));
    }

    #[test]
    fn test_media_upload_config_rejects_relative_url() {
        let config = MediaUploadConfig::new("media.example.com/upload");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_is_cloneable() {
        let config = builder_with_bridges()
            .api_base_url("https://api.shop.example.com")
            .build()
            .unwrap();

        let cloned = config.clone();
        assert_eq!(cloned.api_base_url, config.api_base_url);
        assert_eq!(cloned.event_buffer, config.event_buffer);
    }
}
