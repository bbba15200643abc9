//! Manager lifecycle events.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//!
//! ## Quick reference
//! - **Publisher**: `EventManager` (stream lifecycle, registration, dispatch outcomes).
//! - **Consumers**: observers registered through
//!   [`EventManagerBuilder::with_subscribers`](crate::EventManagerBuilder::with_subscribers),
//!   fed by a [`SubscriberSet`](crate::subscribers::SubscriberSet).

mod event;

pub use event::{Event, EventKind};
