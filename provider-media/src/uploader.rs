//! Media uploader implementation

use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use bytes::Bytes;
use core_runtime::config::MediaUploadConfig;
use core_runtime::logging::strip_path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::error::{MediaError, Result};
use crate::multipart::MultipartForm;
use crate::types::{MediaAsset, UploadResponse};

/// Uploads are large; give them more room than regular API calls.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Connector for the third-party media upload endpoint.
///
/// One multipart POST per asset; the endpoint responds with a durable URL.
pub struct MediaUploader {
    /// HTTP bridge for upload requests
    http: Arc<dyn HttpClient>,

    /// Endpoint URL and optional preset
    config: MediaUploadConfig,
}

impl MediaUploader {
    /// Create a new media uploader.
    pub fn new(http: Arc<dyn HttpClient>, config: MediaUploadConfig) -> Self {
        Self { http, config }
    }

    /// Upload one asset and return its durable URL.
    ///
    /// # Arguments
    ///
    /// * `data` - Raw asset bytes
    /// * `filename` - Original file name, forwarded in the form
    /// * `content_type` - Asset MIME type (e.g. `image/png`, `audio/mpeg`)
    ///
    /// # Errors
    ///
    /// - [`MediaError::UploadFailed`] for non-2xx responses
    /// - [`MediaError::MissingUrl`] when the endpoint reports success but no
    ///   URL
    #[instrument(skip(self, data), fields(file = %strip_path(filename), bytes = data.len()))]
    pub async fn upload(
        &self,
        data: Bytes,
        filename: &str,
        content_type: &str,
    ) -> Result<MediaAsset> {
        let mut form = MultipartForm::new();

        if let Some(preset) = &self.config.preset {
            form.text("upload_preset", preset);
        }
        form.file("file", filename, content_type, &data);

        let request = HttpRequest::new(HttpMethod::Post, self.config.upload_url.clone())
            .header("Content-Type", form.content_type())
            .body(form.finish())
            .timeout(UPLOAD_TIMEOUT);

        let response = self.http.execute(request).await?;

        if !response.is_success() {
            warn!(status = response.status, "Media upload rejected");
            return Err(MediaError::UploadFailed {
                status: response.status,
                message: String::from_utf8_lossy(&response.body).to_string(),
            });
        }

        let parsed: UploadResponse = serde_json::from_slice(&response.body)
            .map_err(|e| MediaError::ParseError(e.to_string()))?;

        let url = parsed.url.ok_or(MediaError::MissingUrl)?;

        info!(url = %url, "Asset uploaded");

        Ok(MediaAsset {
            url,
            resource_type: parsed.resource_type,
        })
    }
}
