//! # Handler abstraction.
//!
//! An [`EventHandler`] runs once per invocation from the host. It receives a
//! [`CancellationToken`] (cancelled when the manager is disposed) and the
//! typed arguments for its category.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::error::HandlerError;
use crate::handlers::{ProjectEventArgs, ServiceEventArgs};

/// Future returned by a handler invocation.
pub type BoxHandlerFuture = BoxFuture<'static, Result<(), HandlerError>>;

/// Callback invoked for a subscribed lifecycle event.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use hookstream::{EventHandler, BoxHandlerFuture, ProjectEventArgs};
///
/// struct PrintName;
///
/// impl EventHandler<ProjectEventArgs> for PrintName {
///     fn call(&self, _ctx: CancellationToken, args: ProjectEventArgs) -> BoxHandlerFuture {
///         Box::pin(async move {
///             println!("project: {}", args.project.name);
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait EventHandler<A>: Send + Sync + 'static {
    /// Creates the future for one invocation.
    ///
    /// Implementations should watch `ctx` and return early once it is cancelled.
    fn call(&self, ctx: CancellationToken, args: A) -> BoxHandlerFuture;
}

/// Shared project handler.
pub type ProjectHandlerRef = Arc<dyn EventHandler<ProjectEventArgs>>;

/// Shared service handler.
pub type ServiceHandlerRef = Arc<dyn EventHandler<ServiceEventArgs>>;
