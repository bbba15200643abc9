//! # Observer trait
//!
//! `Subscribe` is the extension point for watching an event manager. Each
//! observer is driven by a dedicated worker loop fed by a bounded queue owned by
//! the [`SubscriberSet`](crate::subscribers::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching, retries); they do **not** block
//!   the receive loop nor other observers.
//! - Each observer **declares** its preferred queue capacity via
//!   [`Subscribe::queue_capacity`]. If a queue overflows, events for that
//!   observer are **dropped** (warn).
//!
//! ## Example
//! ```rust
//! use hookstream::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct FailureCounter(std::sync::atomic::AtomicUsize);
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::HandlerFailed {
//!             self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!         }
//!     }
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event manager observers.
///
/// Called from an observer-dedicated worker task. Implementations should avoid
/// blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this observer.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this observer's queue.
    ///
    /// On overflow, events for this observer are **dropped** (warn).
    fn queue_capacity(&self) -> usize {
        1024
    }
}
