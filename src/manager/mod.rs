//! # Event manager.
//!
//! - [`EventManager`] - registration, receive loop and dispose
//! - [`EventManagerBuilder`] - wires transport, config and observers
//! - [`ManagerState`] - lifecycle state

mod builder;
#[allow(clippy::module_inception)]
mod manager;
mod state;

pub use builder::EventManagerBuilder;
pub use manager::EventManager;
pub use state::ManagerState;
