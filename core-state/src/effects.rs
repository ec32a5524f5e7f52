//! Effects emitted by state transitions.
//!
//! Transitions in [`RequestState`](crate::request::RequestState) are pure:
//! they mutate the container and return a list of effects, but perform no
//! IO. The [`EffectRunner`] is the shell that executes those effects against
//! the event bus. Tests assert on state and returned effects without any
//! bus attached.

use core_runtime::events::{CoreEvent, EventBus, NoticeEvent};

/// Kind of user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient user-facing notice (rendered by hosts as a toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    fn into_event(self) -> NoticeEvent {
        match self.kind {
            NoticeKind::Success => NoticeEvent::Success {
                message: self.message,
            },
            NoticeKind::Error => NoticeEvent::Error {
                message: self.message,
            },
        }
    }
}

/// An effect a transition asks the shell to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Announce a user-facing notice
    Notify(Notice),
    /// Publish a domain event
    Emit(CoreEvent),
}

/// Executes effects against the event bus.
///
/// Emission is fire-and-forget: a bus with no subscribers is not an error.
#[derive(Clone)]
pub struct EffectRunner {
    event_bus: EventBus,
}

impl EffectRunner {
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }

    /// Perform a list of effects in order.
    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Notify(notice) => {
                    let _ = self.event_bus.emit(CoreEvent::Notice(notice.into_event()));
                }
                Effect::Emit(event) => {
                    let _ = self.event_bus.emit(event);
                }
            }
        }
    }
}
