//! # Request State Machine
//!
//! The request-state container shared by every slice: a tagged union of
//! {idle, pending, fulfilled, rejected} around the last fetched payload,
//! with generation tickets that drop stale settlements.
//!
//! ## Transitions
//!
//! ```text
//!          begin()                fulfill(ticket, data)
//! Idle ────────────> Pending ─────────────────────────> Fulfilled
//!                       │                                   │
//!                       │ reject(ticket, message)           │ begin()
//!                       v                                   v
//!                    Rejected ──────────────────────────> Pending
//!                                     begin()
//! ```
//!
//! Invariants:
//!
//! - `begin` always clears the previous error and reports loading
//! - exactly one terminal transition applies per winning ticket; loading is
//!   false in both terminal states
//! - `fulfill` replaces `data` wholesale; there is no merge
//! - a settlement carrying a superseded ticket is dropped: the state does
//!   not change and no effects are returned (latest dispatch wins)
//!
//! Transitions are pure: they return the [`Effect`]s to perform and touch
//! nothing outside the container.

use crate::effects::{Effect, Notice};

/// Phase of a request-state container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestPhase {
    /// No dispatch has happened yet
    #[default]
    Idle,
    /// A dispatch is in flight
    Pending,
    /// The last winning dispatch succeeded
    Fulfilled,
    /// The last winning dispatch failed
    Rejected,
}

/// A numbered claim on the next settlement.
///
/// Each `begin()` issues a fresh ticket and invalidates all earlier ones;
/// settling with an invalidated ticket is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Request-state container for one slice.
///
/// `data` always holds the last successfully fetched payload (or the
/// default before the first fulfillment); `error` holds the last rejection
/// message until the next dispatch clears it.
#[derive(Debug, Clone)]
pub struct RequestState<T> {
    phase: RequestPhase,
    data: T,
    error: Option<String>,
    generation: u64,
}

impl<T: Default> Default for RequestState<T> {
    fn default() -> Self {
        Self {
            phase: RequestPhase::Idle,
            data: T::default(),
            error: None,
            generation: 0,
        }
    }
}

impl<T> RequestState<T> {
    pub fn phase(&self) -> RequestPhase {
        self.phase
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True while a dispatch is in flight.
    pub fn is_loading(&self) -> bool {
        self.phase == RequestPhase::Pending
    }

    /// True when `ticket` is still the latest dispatch.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    /// Enter the pending phase for a new dispatch.
    ///
    /// Clears any prior error and invalidates all previously issued
    /// tickets.
    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.phase = RequestPhase::Pending;
        self.error = None;
        Ticket(self.generation)
    }

    /// Settle the dispatch successfully, replacing `data` wholesale.
    ///
    /// Returns the effects to perform; empty when `ticket` was superseded
    /// (the stale response is dropped).
    #[must_use]
    pub fn fulfill(&mut self, ticket: Ticket, data: T, notice: Option<Notice>) -> Vec<Effect> {
        if !self.is_current(ticket) {
            return Vec::new();
        }

        self.phase = RequestPhase::Fulfilled;
        self.data = data;
        self.error = None;

        notice.into_iter().map(Effect::Notify).collect()
    }

    /// Settle the dispatch with an error.
    ///
    /// The message is stored for inline display and also returned as an
    /// error notice (the dual user-facing channel). Returns no effects when
    /// `ticket` was superseded.
    #[must_use]
    pub fn reject(&mut self, ticket: Ticket, message: impl Into<String>) -> Vec<Effect> {
        if !self.is_current(ticket) {
            return Vec::new();
        }

        let message = message.into();
        self.phase = RequestPhase::Rejected;
        self.error = Some(message.clone());

        vec![Effect::Notify(Notice::error(message))]
    }
}
