//! Backend connector plumbing
//!
//! `BackendClient` owns the base URL and the injected HTTP bridge, and funnels
//! every endpoint call through shared request/decode helpers.

use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{BackendError, Result};
use crate::types::ErrorEnvelope;

/// Per-request timeout applied to every backend call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Typed connector for the storefront REST backend.
///
/// # Example
///
/// ```ignore
/// use provider_backend::BackendClient;
///
/// let client = BackendClient::new(http_client, "https://api.shop.example.com");
/// let albums = client.list_albums().await?;
/// ```
pub struct BackendClient {
    /// HTTP bridge for API requests
    http: Arc<dyn HttpClient>,

    /// Backend base URL (no trailing slash)
    base_url: String,
}

impl BackendClient {
    /// Create a new backend connector.
    ///
    /// # Arguments
    ///
    /// * `http` - HTTP client implementation
    /// * `base_url` - Backend base URL; a trailing slash is trimmed
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// The configured backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_token(request: HttpRequest, token: Option<&str>) -> HttpRequest {
        match token {
            Some(token) => request.bearer_token(token),
            None => request,
        }
    }

    /// Execute a request and decode the error envelope on non-2xx statuses.
    ///
    /// The backend reports every failure as `{"message": "..."}`; when that
    /// envelope is decodable the message is carried verbatim so callers can
    /// surface it to the user.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.clone();
        let response = self.http.execute(request).await?;

        if response.is_success() {
            debug!(url = %url, status = response.status, "Backend request succeeded");
            return Ok(response);
        }

        let message = serde_json::from_slice::<ErrorEnvelope>(&response.body)
            .ok()
            .map(|envelope| envelope.message);

        warn!(
            url = %url,
            status = response.status,
            has_message = message.is_some(),
            "Backend request failed"
        );

        Err(BackendError::Api {
            status: response.status,
            message,
        })
    }

    fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
        serde_json::from_slice(&response.body).map_err(|e| BackendError::Parse(e.to_string()))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T> {
        let request = HttpRequest::new(HttpMethod::Get, self.url(path)).timeout(REQUEST_TIMEOUT);
        let response = self.send(Self::apply_token(request, token)).await?;
        Self::decode(&response)
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<T> {
        let request = HttpRequest::new(HttpMethod::Post, self.url(path))
            .json(body)?
            .timeout(REQUEST_TIMEOUT);
        let response = self.send(Self::apply_token(request, token)).await?;
        Self::decode(&response)
    }

    pub(crate) async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<T> {
        let request = HttpRequest::new(HttpMethod::Put, self.url(path))
            .json(body)?
            .timeout(REQUEST_TIMEOUT);
        let response = self.send(Self::apply_token(request, token)).await?;
        Self::decode(&response)
    }

    /// DELETE returning no body. The response payload, if any, is discarded.
    pub(crate) async fn delete(&self, path: &str, token: Option<&str>) -> Result<()> {
        let request = HttpRequest::new(HttpMethod::Delete, self.url(path)).timeout(REQUEST_TIMEOUT);
        self.send(Self::apply_token(request, token)).await?;
        Ok(())
    }
}
