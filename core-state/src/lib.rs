//! # Application State
//!
//! Request-state slices for the storefront core.
//!
//! ## Overview
//!
//! Every remote collection the application shows (albums, books, tracks,
//! categories, products, shops, cart, wishlist, notifications, profile,
//! roles) is held in a **slice**: a request-state container plus the
//! dispatchers that mutate it through the backend connector.
//!
//! The pieces:
//!
//! - [`RequestState`](request::RequestState) - the
//!   pending/fulfilled/rejected machine with generation tickets; stale
//!   settlements are dropped instead of applied
//! - [`Effect`](effects::Effect) / [`EffectRunner`](effects::EffectRunner) -
//!   transitions are pure and return the effects to perform; the runner is
//!   the shell that executes them against the event bus
//! - [`views`] - in-memory derived table views (filter, sort, paginate)
//! - [`AppStore`](store::AppStore) - the explicit application-state object
//!   owning every slice; hosts hold one and inject it where needed
//!
//! ## Dispatch contract
//!
//! Every dispatcher follows the same three-state transition:
//!
//! 1. `begin()` - loading set, previous error cleared
//! 2. the backend call (skipped entirely when a required token is absent -
//!    the slice layer is the authentication gate)
//! 3. exactly one of `fulfill` (data replaced wholesale) or `reject` (error
//!    stored inline and announced as a notice - the dual channel)

pub mod effects;
pub mod error;
pub mod request;
pub mod slices;
pub mod store;
pub mod views;

pub use effects::{Effect, EffectRunner, Notice, NoticeKind};
pub use error::{Result, StoreError};
pub use request::{RequestPhase, RequestState, Ticket};
pub use store::AppStore;
