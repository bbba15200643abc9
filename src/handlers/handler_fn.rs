//! # Function-backed handler (`HandlerFn`)
//!
//! [`HandlerFn`] wraps a closure `F: Fn(CancellationToken, A) -> Fut`, producing a
//! fresh future per invocation. State shared between invocations must live in an
//! explicit `Arc<...>` captured by the closure.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use hookstream::{HandlerError, HandlerFn, ProjectEventArgs, ProjectHandlerRef};
//!
//! let h: ProjectHandlerRef = HandlerFn::arc(|_ctx: CancellationToken, args: ProjectEventArgs| async move {
//!     if args.project.name.is_empty() {
//!         return Err(HandlerError::fail("project has no name"));
//!     }
//!     Ok(())
//! });
//! # let _ = h;
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::HandlerError;
use crate::handlers::handler::{BoxHandlerFuture, EventHandler};

/// Function-backed handler implementation.
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a shared handle.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<A, F, Fut> EventHandler<A> for HandlerFn<F>
where
    A: Send + 'static,
    F: Fn(CancellationToken, A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    fn call(&self, ctx: CancellationToken, args: A) -> BoxHandlerFuture {
        Box::pin((self.f)(ctx, args))
    }
}
