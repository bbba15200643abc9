//! # Observers for event manager lifecycle events.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   EventManager ── emit(Event) ──► SubscriberSet ──► per-observer queue + worker
//!                                                          │
//!                                                ┌─────────┼─────────┐
//!                                                ▼         ▼         ▼
//!                                            LogWriter  Metrics   Custom
//! ```
//!
//! Observers are passed at construction time; there is no global registry.

#[cfg(feature = "logging")]
mod log;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
