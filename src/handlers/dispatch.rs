//! Runs a handler and turns its outcome into a wire status.
//!
//! A panic inside the handler (including inside `call` itself) is caught and
//! reported as a failure, so one bad handler cannot take down the receive loop.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::error::HandlerError;
use crate::handlers::EventHandler;
use crate::proto::{STATUS_COMPLETED, STATUS_FAILED};

/// Invokes `handler` with panic isolation.
pub async fn invoke<A>(
    handler: Arc<dyn EventHandler<A>>,
    ctx: CancellationToken,
    args: A,
) -> Result<(), HandlerError>
where
    A: Send + 'static,
{
    let fut = AssertUnwindSafe(async move { handler.call(ctx, args).await });
    match fut.catch_unwind().await {
        Ok(res) => res,
        Err(panic) => Err(HandlerError::Panicked {
            info: panic_message(panic.as_ref()),
        }),
    }
}

/// Maps a handler outcome to `(status, message)` for the status report.
pub fn outcome_status(res: &Result<(), HandlerError>) -> (&'static str, String) {
    match res {
        Ok(()) => (STATUS_COMPLETED, String::new()),
        Err(e) => (STATUS_FAILED, e.to_string()),
    }
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
