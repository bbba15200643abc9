//! Event stream plumbing: the transport seam, the ordered outbound queue and
//! inbound classification.

mod grpc;
mod inbound;
mod memory;
mod outbox;
mod transport;

pub use grpc::GrpcTransport;
pub use inbound::{InboundEvent, StreamEnd};
pub use memory::{MemoryHost, MemoryTransport};
pub use outbox::Outbox;
pub use transport::{EventTransport, InboundStream, OutboundStream};
