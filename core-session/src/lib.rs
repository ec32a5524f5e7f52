//! # Session Management
//!
//! Session credential lifecycle for the storefront core.
//!
//! ## Overview
//!
//! The session is the one piece of state every slice reads before issuing a
//! request: an opaque bearer token plus the signed-in user record. This crate
//! owns:
//!
//! - [`SessionManager`] - login, registration, logout, and bootstrap restore
//! - [`SessionStore`] - persistence of the two session keys (token in the
//!   host's secure store, user record in the settings store)
//! - [`BearerToken`] / [`SessionState`] - credential and state types
//!
//! ## Persistence
//!
//! Exactly two keys are persisted (the local-storage contract of the original
//! application): the bearer token and the serialized user record. Both are
//! written on successful login/registration, read once at bootstrap, and
//! cleared on logout. A failed login never touches the persisted credential.
//!
//! ## Events
//!
//! State changes are announced on the shared
//! [`EventBus`](core_runtime::events::EventBus) as
//! [`SessionEvent`](core_runtime::events::SessionEvent)s so hosts can react
//! (navigation, badges) without polling.

pub mod error;
pub mod manager;
pub mod store;
pub mod types;

pub use error::{Result, SessionError};
pub use manager::SessionManager;
pub use store::{PersistedSession, SessionStore};
pub use types::{BearerToken, SessionState};

// Account wire types are defined by the backend connector; re-exported here
// so hosts interact with one session-facing crate.
pub use provider_backend::types::{Credentials, Registration, UserProfile, UserRole};
