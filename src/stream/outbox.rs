//! # Ordered outbound queue.
//!
//! [`Outbox`] is the single serialization point for everything the extension
//! sends: subscriptions from the registration path, the ready message and
//! status reports from the receive loop.
//!
//! ## Architecture
//! ```text
//! add_*_event_handler ──┐
//! receive (ready)     ──┼──► Outbox ──► [bounded mpsc] ──► OutboundStream ──► transport
//! dispatch (status)   ──┘                                   (ends on stop)
//! ```
//!
//! ## Rules
//! - **FIFO**: messages reach the transport in enqueue order.
//! - **Bounded wait**: an enqueue waits at most `grace` for space, then drops.
//! - **Stop**: once the token is cancelled, enqueues fail with `Stopped` and the
//!   outbound stream ends, so the transport half-closes its send side.
//! - Enqueue never panics and never outlives the stop token.

use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::error::EnqueueError;
use crate::proto::EventMessage;
use crate::stream::OutboundStream;

/// Cloneable producer handle for the outbound queue.
#[derive(Clone, Debug)]
pub struct Outbox {
    tx: mpsc::Sender<EventMessage>,
    grace: Option<Duration>,
    stop: CancellationToken,
}

impl Outbox {
    /// Creates the queue and the stream that drains it.
    ///
    /// - `capacity` is clamped to a minimum of 1.
    /// - `grace = None` waits for space without a bound.
    /// - The returned stream ends when `stop` is cancelled.
    pub fn channel(
        capacity: usize,
        grace: Option<Duration>,
        stop: CancellationToken,
    ) -> (Self, OutboundStream) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let outbound = ReceiverStream::new(rx)
            .take_until(stop.clone().cancelled_owned())
            .boxed();
        (Self { tx, grace, stop }, outbound)
    }

    /// Queues one message.
    ///
    /// A wait for space ends early with `Stopped` when the token is cancelled.
    pub async fn enqueue(&self, msg: EventMessage) -> Result<(), EnqueueError> {
        if self.stop.is_cancelled() {
            return Err(EnqueueError::Stopped);
        }
        let send = async {
            match self.grace {
                Some(grace) => self
                    .tx
                    .send_timeout(msg, grace)
                    .await
                    .map_err(|e| match e {
                        mpsc::error::SendTimeoutError::Timeout(_) => {
                            EnqueueError::Timeout { grace }
                        }
                        mpsc::error::SendTimeoutError::Closed(_) => EnqueueError::Closed,
                    }),
                None => self.tx.send(msg).await.map_err(|_| EnqueueError::Closed),
            }
        };
        tokio::select! {
            biased;
            _ = self.stop.cancelled() => Err(EnqueueError::Stopped),
            res = send => res,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(n: usize) -> EventMessage {
        EventMessage::project_handler_status(format!("event-{n}"), "completed", "")
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let (outbox, mut out) = Outbox::channel(8, None, CancellationToken::new());
        for n in 0..5 {
            outbox.enqueue(status(n)).await.unwrap();
        }
        for n in 0..5 {
            assert_eq!(out.next().await, Some(status(n)));
        }
    }

    #[tokio::test]
    async fn test_concurrent_producers_do_not_lose_messages() {
        let (outbox, out) = Outbox::channel(4, None, CancellationToken::new());
        let mut producers = Vec::new();
        for p in 0..4 {
            let outbox = outbox.clone();
            producers.push(tokio::spawn(async move {
                for n in 0..10 {
                    outbox.enqueue(status(p * 100 + n)).await.unwrap();
                }
            }));
        }
        let collected = tokio::spawn(out.take(40).collect::<Vec<_>>());
        for p in producers {
            p.await.unwrap();
        }
        let collected = collected.await.unwrap();
        assert_eq!(collected.len(), 40);

        // Per-producer order survives interleaving.
        for p in 0..4 {
            let names: Vec<String> = collected
                .iter()
                .filter_map(|m| match &m.message_type {
                    Some(crate::proto::event_message::MessageType::ProjectHandlerStatus(s)) => {
                        Some(s.event_name.clone())
                    }
                    _ => None,
                })
                .filter(|name| {
                    name.trim_start_matches("event-").parse::<usize>().unwrap() / 100 == p
                })
                .collect();
            let expected: Vec<String> = (0..10)
                .map(|n| format!("event-{}", p * 100 + n))
                .collect();
            assert_eq!(names, expected);
        }
    }

    #[tokio::test]
    async fn test_full_queue_times_out() {
        let grace = Duration::from_millis(20);
        let (outbox, _out) = Outbox::channel(1, Some(grace), CancellationToken::new());
        outbox.enqueue(status(0)).await.unwrap();
        let err = outbox.enqueue(status(1)).await.unwrap_err();
        assert_eq!(err, EnqueueError::Timeout { grace });
    }

    #[tokio::test]
    async fn test_closed_when_stream_dropped() {
        let (outbox, out) = Outbox::channel(4, None, CancellationToken::new());
        drop(out);
        assert_eq!(
            outbox.enqueue(status(0)).await.unwrap_err(),
            EnqueueError::Closed
        );
    }

    #[tokio::test]
    async fn test_stop_ends_stream_and_rejects_enqueue() {
        let stop = CancellationToken::new();
        let (outbox, mut out) = Outbox::channel(4, None, stop.clone());
        outbox.enqueue(status(0)).await.unwrap();
        stop.cancel();

        assert_eq!(
            outbox.enqueue(status(1)).await.unwrap_err(),
            EnqueueError::Stopped
        );
        assert_eq!(out.next().await, None);
    }

    #[tokio::test]
    async fn test_stop_unblocks_unbounded_wait() {
        let stop = CancellationToken::new();
        let (outbox, _out) = Outbox::channel(1, None, stop.clone());
        outbox.enqueue(status(0)).await.unwrap();

        let blocked = {
            let outbox = outbox.clone();
            tokio::spawn(async move { outbox.enqueue(status(1)).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!blocked.is_finished());

        stop.cancel();
        let res = tokio::time::timeout(Duration::from_secs(1), blocked)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(res.unwrap_err(), EnqueueError::Stopped);
    }
}
