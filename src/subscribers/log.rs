//! # LogWriter: forwards events to `tracing`
//!
//! A minimal observer that writes every [`Event`] as a structured `tracing`
//! record under the `hookstream::events` target. Failures and drops log at
//! `warn`, everything else at `info`/`debug`.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO hookstream::events: stream opened extension="demo" transport="grpc"
//! INFO hookstream::events: subscribed event="predeploy" category=project
//! WARN hookstream::events: handler failed event="predeploy" service="api" elapsed_ms=12 err="boom"
//! INFO hookstream::events: stream closed extension="demo" reason="closed_by_host"
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

const TARGET: &str = "hookstream::events";

/// Event writer observer.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let event = e.event_name.as_deref().unwrap_or("");
        let service = e.service.as_deref().unwrap_or("");
        let reason = e.reason.as_deref().unwrap_or("");
        let category = e.category.map(|c| c.as_str()).unwrap_or("");

        match e.kind {
            EventKind::StreamOpened => {
                info!(
                    target: TARGET,
                    extension = ?e.extension,
                    transport = reason,
                    "stream opened"
                );
            }
            EventKind::StreamOpenFailed => {
                warn!(target: TARGET, extension = ?e.extension, err = reason, "stream open failed");
            }
            EventKind::StreamClosed => {
                info!(target: TARGET, extension = ?e.extension, reason, "stream closed");
            }
            EventKind::Disposed => {
                info!(target: TARGET, extension = ?e.extension, "disposed");
            }
            EventKind::Subscribed => {
                info!(target: TARGET, event, category, "subscribed");
            }
            EventKind::HandlerRemoved => {
                info!(target: TARGET, event, category, "handler removed");
            }
            EventKind::ReadySent => {
                debug!(target: TARGET, "ready sent");
            }
            EventKind::HandlerCompleted => {
                info!(
                    target: TARGET,
                    event,
                    service,
                    elapsed_ms = ?e.elapsed_ms,
                    "handler completed"
                );
            }
            EventKind::HandlerFailed => {
                warn!(
                    target: TARGET,
                    event,
                    service,
                    elapsed_ms = ?e.elapsed_ms,
                    err = reason,
                    "handler failed"
                );
            }
            EventKind::HandlerMissing => {
                warn!(target: TARGET, event, category, "no handler registered");
            }
            EventKind::UnknownMessage => {
                debug!(target: TARGET, kind = reason, "unsupported inbound message ignored");
            }
            EventKind::MessageDropped => {
                warn!(target: TARGET, event, reason, "outbound message dropped");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
