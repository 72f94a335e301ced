#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for txflow
//!
//! Library crates never log or print. Everything observable about a
//! transaction is emitted as an [`AppEvent`] wrapped in an [`EventMessage`]
//! and sent over an unbounded channel; the CLI turns the messages into
//! `tracing` records and terminal output.
//!
//! ## Architecture
//!
//! - **Domain events**: grouped into general, transaction, lifecycle and progress
//! - **Unified `EventEmitter` trait**: one API whether you hold a raw sender or a struct that owns one
//! - **Tracing integration**: every event knows its own level and target

pub mod events;
pub mod meta;

pub use events::{
    AppEvent, FailureContext, GeneralEvent, LifecycleEvent, ProgressEvent, TransactionEvent,
};
pub use meta::{EventLevel, EventMeta, EventSource};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// An event together with its metadata envelope
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    #[must_use]
    pub fn new(meta: EventMeta, event: AppEvent) -> Self {
        Self { meta, event }
    }

    /// Wrap an event with metadata derived from the event itself.
    #[must_use]
    pub fn from_event(event: AppEvent) -> Self {
        Self {
            meta: EventMeta::for_event(&event),
            event,
        }
    }
}

/// Sending half of the event channel
pub type EventSender = UnboundedSender<EventMessage>;

/// Receiving half of the event channel
pub type EventReceiver = UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events
///
/// Sending never blocks, and a dropped receiver is silently ignored: a
/// transaction must not fail because nobody is listening.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event with explicit metadata
    fn emit_with_meta(&self, meta: EventMeta, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            let _ = sender.send(EventMessage::new(meta, event));
        }
    }

    /// Emit an event, deriving level, source and correlation from it
    fn emit(&self, event: AppEvent) {
        if self.event_sender().is_some() {
            let meta = EventMeta::for_event(&event);
            self.emit_with_meta(meta, event);
        }
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}
