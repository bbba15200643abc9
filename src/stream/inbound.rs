//! # Inbound message classification.
//!
//! Converts wire envelopes into [`InboundEvent`] and decides how the receive
//! loop reacts to a transport status.
//!
//! ## Rules
//! - Invoke messages map to their typed variant.
//! - Anything else the host sends (including an empty envelope) becomes
//!   [`InboundEvent::Unsupported`]; it is logged and dropped, never fatal.
//! - `Cancelled` and `Unavailable` end the loop gracefully; other codes end it
//!   with an error log.

use tonic::{Code, Status};

use crate::proto::event_message::MessageType;
use crate::proto::{EventMessage, InvokeProjectHandler, InvokeServiceHandler};

/// A message received from the host.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Run the project handler named in the message.
    InvokeProject(InvokeProjectHandler),
    /// Run the service handler named in the message.
    InvokeService(InvokeServiceHandler),
    /// A variant the extension does not handle; carries its label.
    Unsupported(&'static str),
}

impl From<EventMessage> for InboundEvent {
    fn from(msg: EventMessage) -> Self {
        match msg.message_type {
            Some(MessageType::InvokeProjectHandler(invoke)) => InboundEvent::InvokeProject(invoke),
            Some(MessageType::InvokeServiceHandler(invoke)) => InboundEvent::InvokeService(invoke),
            Some(other) => InboundEvent::Unsupported(other.as_label()),
            None => InboundEvent::Unsupported("empty"),
        }
    }
}

/// How the receive loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// The host closed the stream.
    Closed,
    /// The manager was disposed.
    Disposed,
    /// The call was cancelled or the host became unavailable.
    Interrupted(Code),
    /// Any other transport error.
    Failed(Code, String),
}

impl StreamEnd {
    /// Classifies a terminal transport status.
    pub fn from_status(status: &Status) -> Self {
        match status.code() {
            Code::Cancelled | Code::Unavailable => StreamEnd::Interrupted(status.code()),
            code => StreamEnd::Failed(code, status.message().to_string()),
        }
    }

    /// True for every ending except [`StreamEnd::Failed`].
    pub fn is_graceful(&self) -> bool {
        !matches!(self, StreamEnd::Failed(..))
    }

    /// Short stable label for logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            StreamEnd::Closed => "closed_by_host",
            StreamEnd::Disposed => "disposed",
            StreamEnd::Interrupted(_) => "interrupted",
            StreamEnd::Failed(..) => "transport_error",
        }
    }
}

impl std::fmt::Display for StreamEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamEnd::Closed => write!(f, "stream closed by host"),
            StreamEnd::Disposed => write!(f, "manager disposed"),
            StreamEnd::Interrupted(code) => write!(f, "stream interrupted ({code:?})"),
            StreamEnd::Failed(code, message) => write!(f, "stream failed ({code:?}): {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::ProjectConfig;

    #[test]
    fn test_invoke_project_maps() {
        let msg = EventMessage::invoke_project("preprovision", ProjectConfig::default());
        assert!(matches!(
            InboundEvent::from(msg),
            InboundEvent::InvokeProject(ref i) if i.event_name == "preprovision"
        ));
    }

    #[test]
    fn test_unexpected_variant_is_unsupported() {
        let msg = EventMessage::subscribe_project(vec!["x".into()]);
        assert_eq!(
            InboundEvent::from(msg),
            InboundEvent::Unsupported("subscribe_project_event")
        );
        assert_eq!(
            InboundEvent::from(EventMessage::default()),
            InboundEvent::Unsupported("empty")
        );
    }

    #[test]
    fn test_cancelled_and_unavailable_are_graceful() {
        for status in [Status::cancelled("bye"), Status::unavailable("gone")] {
            let end = StreamEnd::from_status(&status);
            assert!(end.is_graceful(), "{end}");
            assert_eq!(end.as_label(), "interrupted");
        }
    }

    #[test]
    fn test_other_codes_fail() {
        let end = StreamEnd::from_status(&Status::internal("kaput"));
        assert!(!end.is_graceful());
        assert_eq!(end, StreamEnd::Failed(Code::Internal, "kaput".into()));
    }
}
