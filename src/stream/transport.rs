//! # Transport seam between the event manager and the wire.
//!
//! An [`EventTransport`] opens the single duplex call: it takes ownership of
//! the outbound message stream and returns the inbound one.

use async_trait::async_trait;
use futures::stream::BoxStream;
use tonic::Status;

use crate::proto::EventMessage;

/// Messages flowing from the extension to the host.
pub type OutboundStream = BoxStream<'static, EventMessage>;

/// Messages (or the terminal transport status) flowing from the host.
pub type InboundStream = BoxStream<'static, Result<EventMessage, Status>>;

/// Opens the bidirectional event stream.
///
/// ### Implementation requirements
/// - Drain `outbound` in order; it ends when the manager stops.
/// - End the inbound stream (or yield one `Err`) when the call terminates.
/// - Do not block until the host sends its first message: subscriptions are
///   only enqueued after `open` returns.
#[async_trait]
pub trait EventTransport: Send + Sync + 'static {
    /// Starts the call.
    async fn open(&self, outbound: OutboundStream) -> Result<InboundStream, Status>;

    /// Returns the transport name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
