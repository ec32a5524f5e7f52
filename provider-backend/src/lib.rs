//! # Backend Provider
//!
//! Typed connector for the storefront REST backend.
//!
//! ## Overview
//!
//! This module provides:
//! - One typed method per backend operation (catalog CRUD, cart, wishlist,
//!   notifications, profile, roles)
//! - Bearer-token authentication on protected endpoints
//! - Error envelope decoding that surfaces the server's `message` field
//!   verbatim
//! - Query-string encoding for list filters
//!
//! The connector performs no retries of its own beyond what the injected
//! [`HttpClient`](bridge_traits::http::HttpClient) applies; every call is
//! at-most-once from the caller's perspective.

pub mod error;
pub mod types;

mod account;
mod admin;
mod catalog;
mod client;
mod commerce;

pub use client::BackendClient;
pub use error::{BackendError, Result};
