//! gRPC transport for the event stream.
//!
//! The call is spawned onto its own task so `open` returns immediately: the
//! host only answers with headers once it has something to say, while the
//! extension must be able to queue subscriptions before that. Call setup
//! errors therefore surface as the first inbound item.
//!
//! Once the [`HostChannel`] is closed, `open` fails with `FailedPrecondition`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures::{StreamExt, stream};
use tokio::sync::oneshot;
use tonic::Status;
use tracing::debug;

use crate::channel::{AuthChannel, HostChannel};
use crate::error::ChannelError;
use crate::proto::EventServiceClient;
use crate::stream::{EventTransport, InboundStream, OutboundStream};

/// [`EventTransport`] over the authenticated host channel.
#[derive(Clone)]
pub struct GrpcTransport {
    client: EventServiceClient<AuthChannel>,
    closed: Arc<AtomicBool>,
}

impl GrpcTransport {
    /// Creates a transport from an open channel.
    pub fn new(channel: &HostChannel) -> Result<Self, ChannelError> {
        Ok(Self {
            client: channel.event_service()?,
            closed: channel.closed_flag(),
        })
    }
}

#[async_trait]
impl EventTransport for GrpcTransport {
    async fn open(&self, outbound: OutboundStream) -> Result<InboundStream, Status> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Status::failed_precondition("host channel is closed"));
        }
        let mut client = self.client.clone();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let response = client.event_stream(Outbound(outbound)).await;
            let _ = tx.send(response);
        });

        let inbound = stream::once(rx)
            .flat_map(|response| match response {
                Ok(Ok(response)) => {
                    debug!("event stream established");
                    response.into_inner().boxed()
                }
                Ok(Err(status)) => stream::once(async move { Err(status) }).boxed(),
                Err(_) => stream::once(async {
                    Err(Status::cancelled("event stream call was dropped"))
                })
                .boxed(),
            })
            .boxed();

        Ok(inbound)
    }

    fn name(&self) -> &'static str {
        "grpc"
    }
}

/// Concrete wrapper around [`OutboundStream`]; passing the boxed `dyn Stream`
/// directly trips a rustc higher-ranked lifetime error when proving the
/// spawned call `Send`.
struct Outbound(OutboundStream);

impl futures::Stream for Outbound {
    type Item = crate::proto::EventMessage;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        self.0.poll_next_unpin(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}
