mod common;

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use common::*;
use futures::StreamExt;
use futures::stream::BoxStream;
use hookstream::proto::{EventMessage, ProjectConfig};
use hookstream::{Config, EventManager, GrpcTransport, HostChannel, ManagerState};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_stream::wrappers::{TcpListenerStream, UnboundedReceiverStream};
use tokio_util::sync::CancellationToken;
use tonic::codec::{ProstCodec, Streaming};
use tonic::codegen::{Body, BoxFuture, Context, Poll, Service, StdError, http};
use tonic::server::NamedService;
use tonic::{Code, Request, Response, Status};

const EVENT_STREAM_PATH: &str = "/azdext.EventService/EventStream";

type Reply = Result<EventMessage, Status>;

/// What the host saw when the call arrived.
#[derive(Debug)]
struct CallInfo {
    path: String,
    authorization: Vec<String>,
}

/// Host side of `azdext.EventService` backed by channels the test drives.
struct HostState {
    calls: mpsc::UnboundedSender<CallInfo>,
    messages: mpsc::UnboundedSender<EventMessage>,
    replies: Mutex<Option<mpsc::UnboundedReceiver<Reply>>>,
    refuse: Option<(Code, &'static str)>,
}

impl HostState {
    async fn accept(
        &self,
        request: Request<Streaming<EventMessage>>,
    ) -> Result<Response<BoxStream<'static, Reply>>, Status> {
        if let Some((code, message)) = self.refuse {
            return Err(Status::new(code, message));
        }

        // Response headers are held back until the first subscription arrives.
        let mut inbound = request.into_inner();
        let first = inbound
            .message()
            .await?
            .ok_or_else(|| Status::invalid_argument("stream closed before subscribing"))?;
        let _ = self.messages.send(first);

        let messages = self.messages.clone();
        tokio::spawn(async move {
            while let Ok(Some(msg)) = inbound.message().await {
                if messages.send(msg).is_err() {
                    break;
                }
            }
        });

        let replies = self
            .replies
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| Status::already_exists("event stream already open"))?;
        Ok(Response::new(UnboundedReceiverStream::new(replies).boxed()))
    }
}

struct EventStreamSvc(Arc<HostState>);

impl tonic::server::StreamingService<EventMessage> for EventStreamSvc {
    type Response = EventMessage;
    type ResponseStream = BoxStream<'static, Reply>;
    type Future = BoxFuture<Response<Self::ResponseStream>, Status>;

    fn call(&mut self, request: Request<Streaming<EventMessage>>) -> Self::Future {
        let state = Arc::clone(&self.0);
        Box::pin(async move { state.accept(request).await })
    }
}

#[derive(Clone)]
struct FakeHost(Arc<HostState>);

impl<B> Service<http::Request<B>> for FakeHost
where
    B: Body + Send + 'static,
    B::Error: Into<StdError> + Send + 'static,
{
    type Response = http::Response<tonic::body::Body>;
    type Error = Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let state = Arc::clone(&self.0);
        Box::pin(async move {
            let authorization = req
                .headers()
                .get_all("authorization")
                .iter()
                .filter_map(|v| v.to_str().ok().map(str::to_owned))
                .collect();
            let _ = state.calls.send(CallInfo {
                path: req.uri().path().to_string(),
                authorization,
            });

            let mut grpc = tonic::server::Grpc::new(ProstCodec::default());
            Ok(grpc.streaming(EventStreamSvc(state), req).await)
        })
    }
}

impl NamedService for FakeHost {
    const NAME: &'static str = "azdext.EventService";
}

struct Harness {
    addr: SocketAddr,
    shutdown: CancellationToken,
    calls: mpsc::UnboundedReceiver<CallInfo>,
    messages: mpsc::UnboundedReceiver<EventMessage>,
    replies: mpsc::UnboundedSender<Reply>,
}

impl Harness {
    async fn start(refuse: Option<(Code, &'static str)>) -> Self {
        let (calls_tx, calls) = mpsc::unbounded_channel();
        let (messages_tx, messages) = mpsc::unbounded_channel();
        let (replies, replies_rx) = mpsc::unbounded_channel();
        let host = FakeHost(Arc::new(HostState {
            calls: calls_tx,
            messages: messages_tx,
            replies: Mutex::new(Some(replies_rx)),
            refuse,
        }));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = CancellationToken::new();
        tokio::spawn(
            tonic::transport::Server::builder()
                .add_service(host)
                .serve_with_incoming_shutdown(
                    TcpListenerStream::new(listener),
                    shutdown.clone().cancelled_owned(),
                ),
        );

        Self {
            addr,
            shutdown,
            calls,
            messages,
            replies,
        }
    }

    fn config(&self) -> Config {
        let mut cfg = Config::new(self.addr.to_string(), "test-token");
        cfg.extension_id = "grpc-test".into();
        cfg
    }

    async fn next_message(&mut self) -> EventMessage {
        tokio::time::timeout(WAIT, self.messages.recv())
            .await
            .expect("host saw no message")
            .expect("host message channel closed")
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn connect(cfg: &Config) -> (HostChannel, Arc<EventManager>) {
    let channel = HostChannel::connect(cfg).await.unwrap();
    let transport = Arc::new(GrpcTransport::new(&channel).unwrap());
    let manager = EventManager::new(transport, cfg);
    (channel, manager)
}

#[tokio::test]
async fn stream_carries_token_and_serves_invocations() {
    let mut harness = Harness::start(None).await;
    let cfg = harness.config();
    let (channel, manager) = connect(&cfg).await;

    // The host only answers after the subscription, so registration must not
    // wait for response headers.
    tokio::time::timeout(
        WAIT,
        manager.add_project_event_handler("preprovision", noop_project()),
    )
    .await
    .expect("registration waited on response headers")
    .unwrap();

    let call = tokio::time::timeout(WAIT, harness.calls.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(call.path, EVENT_STREAM_PATH);
    assert_eq!(call.authorization, vec!["test-token".to_string()]);

    assert_eq!(
        harness.next_message().await,
        EventMessage::subscribe_project(vec!["preprovision".into()])
    );

    let receive = spawn_receive(&manager);
    assert!(is_ready(&harness.next_message().await));

    harness
        .replies
        .send(Ok(EventMessage::invoke_project(
            "preprovision",
            ProjectConfig {
                name: "demo".into(),
                ..Default::default()
            },
        )))
        .unwrap();
    assert_eq!(
        harness.next_message().await,
        EventMessage::project_handler_status("preprovision", "completed", "")
    );

    // A failing status from the host ends receive without an error.
    harness
        .replies
        .send(Err(Status::internal("host crashed")))
        .unwrap();
    tokio::time::timeout(WAIT, receive)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(manager.state(), ManagerState::Terminated);

    assert!(channel.close());
}

#[tokio::test]
async fn refused_stream_ends_receive_cleanly() {
    let harness = Harness::start(Some((Code::PermissionDenied, "bad token"))).await;
    let cfg = harness.config();
    let (_channel, manager) = connect(&cfg).await;

    manager
        .add_project_event_handler("preprovision", noop_project())
        .await
        .unwrap();
    tokio::time::timeout(WAIT, manager.receive())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(manager.state(), ManagerState::Terminated);
}
