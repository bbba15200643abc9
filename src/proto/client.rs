//! tonic client for `azdext.EventService`.
//!
//! Mirrors what `tonic-build` emits for the single bidirectional method, so the
//! crate builds without `protoc`.

use tonic::codegen::{Body, Bytes, GrpcMethod, StdError, http};

use super::EventMessage;

const SERVICE: &str = "azdext.EventService";
const EVENT_STREAM_PATH: &str = "/azdext.EventService/EventStream";

/// Client for the host's event service.
#[derive(Debug, Clone)]
pub struct EventServiceClient<T> {
    inner: tonic::client::Grpc<T>,
}

impl<T> EventServiceClient<T>
where
    T: tonic::client::GrpcService<tonic::body::Body>,
    T::Error: Into<StdError>,
    T::ResponseBody: Body<Data = Bytes> + Send + 'static,
    <T::ResponseBody as Body>::Error: Into<StdError> + Send,
{
    pub fn new(inner: T) -> Self {
        Self {
            inner: tonic::client::Grpc::new(inner),
        }
    }

    /// Opens the bidirectional event stream.
    ///
    /// Resolves once the host answers with response headers; the request
    /// stream is polled by the transport from the moment the call is issued.
    pub async fn event_stream(
        &mut self,
        request: impl tonic::IntoStreamingRequest<Message = EventMessage>,
    ) -> Result<tonic::Response<tonic::codec::Streaming<EventMessage>>, tonic::Status> {
        self.inner.ready().await.map_err(|e| {
            tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
        })?;
        let codec = tonic::codec::ProstCodec::default();
        let path = http::uri::PathAndQuery::from_static(EVENT_STREAM_PATH);
        let mut req = request.into_streaming_request();
        req.extensions_mut()
            .insert(GrpcMethod::new(SERVICE, "EventStream"));
        self.inner.streaming(req, path, codec).await
    }
}
