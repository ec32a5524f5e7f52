//! # Media Upload Provider
//!
//! Connector for the third-party media upload endpoint.
//!
//! ## Overview
//!
//! Image, audio, and video assets are not stored by the primary backend.
//! They are POSTed as `multipart/form-data` to a dedicated upload endpoint,
//! which responds with a durable URL. That URL is substituted into entity
//! payloads (album cover, track audio, profile avatar) before the entity is
//! submitted to the primary backend.
//!
//! ## Usage
//!
//! ```ignore
//! use provider_media::MediaUploader;
//! use core_runtime::config::MediaUploadConfig;
//!
//! let uploader = MediaUploader::new(
//!     http_client,
//!     MediaUploadConfig::new("https://media.example.com/upload").with_preset("storefront"),
//! );
//!
//! let asset = uploader.upload(bytes, "cover.png", "image/png").await?;
//! println!("Durable URL: {}", asset.url);
//! ```

pub mod error;
pub mod types;

mod multipart;
mod uploader;

pub use error::{MediaError, Result};
pub use types::MediaAsset;
pub use uploader::MediaUploader;
