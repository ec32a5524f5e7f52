//! Media upload wire types

use serde::{Deserialize, Serialize};

/// A durable asset reference returned by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAsset {
    /// The durable URL to substitute into entity payloads
    pub url: String,

    /// Asset kind as reported by the endpoint ("image", "video", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

/// Raw upload endpoint response.
///
/// Some deployments name the URL field `secure_url`; both spellings are
/// accepted.
#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    #[serde(alias = "secure_url")]
    pub url: Option<String>,

    #[serde(default)]
    pub resource_type: Option<String>,
}
