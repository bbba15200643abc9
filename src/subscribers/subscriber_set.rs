//! # Non-blocking event fan-out to observers.
//!
//! Provides [`SubscriberSet`], which distributes manager events to every
//! observer without blocking the receive loop.
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► observer1.on_event()
//!     │    (bounded)         └──────► panic → warn!, keep going
//!     ├──► [queue 2] ──► worker 2 ──► observer2.on_event()
//!     │    (bounded)
//!     └──► [queue N] ──► worker N ──► observerN.on_event()
//!          (bounded)
//! ```
//!
//! ## Rules
//! - **No cross-observer ordering**: observer A may process event N while B processes N+5
//! - **Overflow**: event dropped for that observer only, logged at warn
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`)
//! - **Isolation**: a slow or panicking observer doesn't affect others
//! - **Per-observer FIFO**: each observer sees events in order
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if an observer uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::warn;

use crate::events::Event;
use crate::handlers::panic_message;
use crate::subscribers::Subscribe;

/// Per-observer channel metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Fan-out coordinator for observers.
#[derive(Default)]
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per observer.
    ///
    /// ### Per-observer setup
    /// - Bounded mpsc queue (capacity from [`Subscribe::queue_capacity`], min 1)
    /// - Dedicated worker task (runs until the set is shut down or dropped)
    /// - Panic isolation via `catch_unwind`
    ///
    /// Must be called inside a tokio runtime when `subs` is not empty.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = sub.on_event(ev.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await
                    {
                        warn!(
                            observer = name,
                            event = ev.kind.as_label(),
                            info = %panic_message(panic_err.as_ref()),
                            "observer panicked"
                        );
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }
        Self { channels, workers }
    }

    /// Returns true when there are no observers.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Emits an event to all observers (wraps it in `Arc`).
    pub fn emit(&self, event: Event) {
        if self.channels.is_empty() {
            return;
        }
        self.emit_arc(Arc::new(event));
    }

    /// Emits a pre-allocated `Arc<Event>` to all observers.
    ///
    /// - Uses `try_send` (non-blocking)
    /// - On queue full or closed: drops the event for that observer, logs at warn
    pub fn emit_arc(&self, event: Arc<Event>) {
        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(
                        observer = channel.name,
                        event = event.kind.as_label(),
                        "observer queue full, event dropped"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    warn!(
                        observer = channel.name,
                        event = event.kind.as_label(),
                        "observer worker closed, event dropped"
                    );
                }
            }
        }
    }

    /// Gracefully shuts down all observer workers.
    ///
    /// 1. Drops all channel senders (workers see channel closed)
    /// 2. Awaits all worker tasks, so queued events are delivered first
    pub async fn shutdown(self) {
        drop(self.channels);

        for h in self.workers {
            let _ = h.await;
        }
    }
}
