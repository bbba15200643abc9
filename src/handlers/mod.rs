//! # Event handlers.
//!
//! - [`EventHandler`] - trait for project/service lifecycle callbacks
//! - [`HandlerFn`] - closure-backed handler
//! - [`ProjectEventArgs`], [`ServiceEventArgs`] - typed invocation arguments
//! - [`HandlerRegistry`] - event name → handler map
//! - [`dispatch`] - panic-isolated invocation and status mapping

mod args;
pub mod dispatch;
mod handler;
mod handler_fn;
mod registry;

pub use args::{HandlerCategory, ProjectEventArgs, ServiceEventArgs, ServiceEventOptions};
pub(crate) use dispatch::panic_message;
pub use handler::{BoxHandlerFuture, EventHandler, ProjectHandlerRef, ServiceHandlerRef};
pub use handler_fn::HandlerFn;
pub use registry::HandlerRegistry;
