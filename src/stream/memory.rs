//! # In-process transport.
//!
//! [`MemoryTransport`] stands in for the gRPC call in tests and local harnesses.
//! The paired [`MemoryHost`] plays the host: it injects inbound messages,
//! ends the stream (gracefully or with a status) and reads what the extension
//! sent, in order.
//!
//! ```text
//! EventManager ──open(outbound)──► MemoryTransport ──(oneshot)──► MemoryHost::next_outbound()
//! EventManager ◄──inbound──────── [unbounded mpsc] ◄──────────── MemoryHost::send()/fail()
//! ```
//!
//! The transport opens at most once, like a single-use host session.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tonic::Status;

use crate::proto::EventMessage;
use crate::stream::{EventTransport, InboundStream, OutboundStream};

type InboundItem = Result<EventMessage, Status>;

struct Pending {
    inbound: mpsc::UnboundedReceiver<InboundItem>,
    outbound: oneshot::Sender<OutboundStream>,
}

/// Transport half handed to the event manager.
pub struct MemoryTransport {
    pending: Mutex<Option<Pending>>,
    opened: AtomicUsize,
}

impl MemoryTransport {
    /// Creates a connected transport/host pair.
    pub fn pair() -> (Arc<Self>, MemoryHost) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = oneshot::channel();
        let transport = Arc::new(Self {
            pending: Mutex::new(Some(Pending {
                inbound: inbound_rx,
                outbound: outbound_tx,
            })),
            opened: AtomicUsize::new(0),
        });
        let host = MemoryHost {
            inbound: Some(inbound_tx),
            outbound: Outbound::Pending(outbound_rx),
        };
        (transport, host)
    }

    /// Number of `open` calls observed (successful or not).
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventTransport for MemoryTransport {
    async fn open(&self, outbound: OutboundStream) -> Result<InboundStream, Status> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| Status::failed_precondition("memory transport already opened"))?;

        let _ = pending.outbound.send(outbound);
        Ok(UnboundedReceiverStream::new(pending.inbound).boxed())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

enum Outbound {
    Pending(oneshot::Receiver<OutboundStream>),
    Open(OutboundStream),
    Closed,
}

/// Host half: drives the extension from the other end of the stream.
pub struct MemoryHost {
    inbound: Option<mpsc::UnboundedSender<InboundItem>>,
    outbound: Outbound,
}

impl MemoryHost {
    /// Sends one message to the extension. Returns false once closed.
    pub fn send(&self, msg: EventMessage) -> bool {
        self.push(Ok(msg))
    }

    /// Terminates the stream with a transport status.
    pub fn fail(&mut self, status: Status) -> bool {
        let sent = self.push(Err(status));
        self.inbound = None;
        sent
    }

    /// Closes the host side; the extension observes end-of-stream.
    pub fn close(&mut self) {
        self.inbound = None;
    }

    fn push(&self, item: InboundItem) -> bool {
        match &self.inbound {
            Some(tx) => tx.send(item).is_ok(),
            None => false,
        }
    }

    /// Next message the extension sent, or `None` once its send side ended.
    pub async fn next_outbound(&mut self) -> Option<EventMessage> {
        loop {
            match &mut self.outbound {
                Outbound::Pending(rx) => match rx.await {
                    Ok(stream) => self.outbound = Outbound::Open(stream),
                    Err(_) => {
                        self.outbound = Outbound::Closed;
                        return None;
                    }
                },
                Outbound::Open(stream) => {
                    let next = stream.next().await;
                    if next.is_none() {
                        self.outbound = Outbound::Closed;
                    }
                    return next;
                }
                Outbound::Closed => return None,
            }
        }
    }

    /// Like [`next_outbound`](Self::next_outbound) but gives up after `wait`.
    ///
    /// A timeout leaves the stream usable for later reads.
    pub async fn next_outbound_within(&mut self, wait: Duration) -> Option<EventMessage> {
        tokio::time::timeout(wait, self.next_outbound())
            .await
            .ok()
            .flatten()
    }

    /// Reads messages until none arrives within `wait`.
    pub async fn drain_outbound(&mut self, wait: Duration) -> Vec<EventMessage> {
        let mut out = Vec::new();
        while let Some(msg) = self.next_outbound_within(wait).await {
            out.push(msg);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::ProjectConfig;
    use futures::stream;

    #[tokio::test]
    async fn test_opens_once() {
        let (transport, _host) = MemoryTransport::pair();
        assert!(transport.open(stream::empty().boxed()).await.is_ok());
        let err = transport.open(stream::empty().boxed()).await.err().unwrap();
        assert_eq!(err.code(), tonic::Code::FailedPrecondition);
        assert_eq!(transport.open_count(), 2);
    }

    #[tokio::test]
    async fn test_duplex() {
        let (transport, mut host) = MemoryTransport::pair();
        let outbound = stream::iter(vec![EventMessage::ready()]).boxed();
        let mut inbound = transport.open(outbound).await.unwrap();

        assert_eq!(host.next_outbound().await, Some(EventMessage::ready()));
        assert_eq!(host.next_outbound().await, None);

        let invoke = EventMessage::invoke_project("predeploy", ProjectConfig::default());
        assert!(host.send(invoke.clone()));
        assert_eq!(inbound.next().await.unwrap().unwrap(), invoke);

        host.fail(Status::unavailable("bye"));
        let status = inbound.next().await.unwrap().unwrap_err();
        assert_eq!(status.code(), tonic::Code::Unavailable);
        assert!(inbound.next().await.is_none());
        assert!(!host.send(EventMessage::ready()));
    }

    #[tokio::test]
    async fn test_timeout_keeps_stream() {
        let (transport, mut host) = MemoryTransport::pair();
        let (tx, rx) = mpsc::unbounded_channel();
        let _inbound = transport
            .open(UnboundedReceiverStream::new(rx).boxed())
            .await
            .unwrap();

        assert_eq!(
            host.next_outbound_within(Duration::from_millis(10)).await,
            None
        );
        tx.send(EventMessage::ready()).unwrap();
        assert_eq!(
            host.next_outbound_within(Duration::from_secs(1)).await,
            Some(EventMessage::ready())
        );
    }
}
