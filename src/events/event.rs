//! # Lifecycle events emitted by the event manager.
//!
//! The [`EventKind`] enum classifies what observers can see:
//! - **Stream events**: opened, open failed, closed, disposed
//! - **Registration events**: subscription sent, handler removed, ready sent
//! - **Dispatch events**: handler completed, failed, missing
//! - **Diagnostics**: unknown inbound message, dropped outbound message
//!
//! The [`Event`] struct carries the metadata relevant to each kind.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use hookstream::{Event, EventKind, HandlerCategory};
//!
//! let ev = Event::new(EventKind::HandlerFailed)
//!     .with_event_name("predeploy")
//!     .with_service("api")
//!     .with_category(HandlerCategory::Service)
//!     .with_reason("boom")
//!     .with_elapsed(Duration::from_millis(42));
//!
//! assert_eq!(ev.kind, EventKind::HandlerFailed);
//! assert_eq!(ev.event_name.as_deref(), Some("predeploy"));
//! assert_eq!(ev.elapsed_ms, Some(42));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::handlers::HandlerCategory;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of manager events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum EventKind {
    // === Stream events ===
    /// The event stream was opened (first registration or receive).
    ///
    /// Sets:
    /// - `extension`: extension id
    /// - `reason`: transport name
    StreamOpened,

    /// Opening the event stream failed; the manager is terminated.
    ///
    /// Sets:
    /// - `extension`: extension id
    /// - `reason`: transport status
    StreamOpenFailed,

    /// The receive loop ended.
    ///
    /// Sets:
    /// - `extension`: extension id
    /// - `reason`: how the stream ended (host close, dispose, transport error)
    StreamClosed,

    /// `dispose()` was called for the first time.
    ///
    /// Sets:
    /// - `extension`: extension id
    Disposed,

    // === Registration events ===
    /// A subscription message was queued for a newly registered handler.
    ///
    /// Sets:
    /// - `event_name`, `category`
    Subscribed,

    /// A handler was removed from the local registry.
    ///
    /// Sets:
    /// - `event_name`, `category`
    HandlerRemoved,

    /// The ready message was queued by the receive loop.
    ReadySent,

    // === Dispatch events ===
    /// A handler returned successfully.
    ///
    /// Sets:
    /// - `event_name`, `category`, `elapsed_ms`
    /// - `service`: service name (service handlers only)
    HandlerCompleted,

    /// A handler returned an error or panicked.
    ///
    /// Sets:
    /// - `event_name`, `category`, `elapsed_ms`, `reason`
    /// - `service`: service name (service handlers only)
    HandlerFailed,

    /// An invoke arrived for an event name with no registered handler.
    ///
    /// Sets:
    /// - `event_name`, `category`
    HandlerMissing,

    // === Diagnostics ===
    /// An inbound message of an unsupported kind was ignored.
    ///
    /// Sets:
    /// - `reason`: message kind label
    UnknownMessage,

    /// An outbound message could not be queued.
    ///
    /// Sets:
    /// - `event_name`: affected event, when known
    /// - `reason`: message kind and enqueue error
    MessageDropped,
}

impl EventKind {
    /// Short stable label for logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::StreamOpened => "stream_opened",
            EventKind::StreamOpenFailed => "stream_open_failed",
            EventKind::StreamClosed => "stream_closed",
            EventKind::Disposed => "disposed",
            EventKind::Subscribed => "subscribed",
            EventKind::HandlerRemoved => "handler_removed",
            EventKind::ReadySent => "ready_sent",
            EventKind::HandlerCompleted => "handler_completed",
            EventKind::HandlerFailed => "handler_failed",
            EventKind::HandlerMissing => "handler_missing",
            EventKind::UnknownMessage => "unknown_message",
            EventKind::MessageDropped => "message_dropped",
        }
    }
}

/// Manager event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Extension id of the emitting manager.
    pub extension: Option<Arc<str>>,
    /// Lifecycle event name (e.g. `predeploy`).
    pub event_name: Option<Arc<str>>,
    /// Service name for service-scoped events.
    pub service: Option<Arc<str>>,
    /// Handler category.
    pub category: Option<HandlerCategory>,
    /// Human-readable reason (errors, transport status, etc.).
    pub reason: Option<Arc<str>>,
    /// Handler run time in milliseconds (compact).
    pub elapsed_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            extension: None,
            event_name: None,
            service: None,
            category: None,
            reason: None,
            elapsed_ms: None,
        }
    }

    /// Attaches the extension id.
    #[inline]
    pub fn with_extension(mut self, id: impl Into<Arc<str>>) -> Self {
        self.extension = Some(id.into());
        self
    }

    /// Attaches a lifecycle event name.
    #[inline]
    pub fn with_event_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.event_name = Some(name.into());
        self
    }

    /// Attaches a service name.
    #[inline]
    pub fn with_service(mut self, service: impl Into<Arc<str>>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Attaches a handler category.
    #[inline]
    pub fn with_category(mut self, category: HandlerCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a handler run time (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.elapsed_ms = Some(ms);
        self
    }

    /// True for handler outcomes (completed or failed).
    #[inline]
    pub fn is_handler_outcome(&self) -> bool {
        matches!(
            self.kind,
            EventKind::HandlerCompleted | EventKind::HandlerFailed
        )
    }
}
