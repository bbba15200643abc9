#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hookstream::proto::event_message::MessageType;
use hookstream::proto::EventMessage;
use hookstream::{
    Config, Event, EventKind, EventManager, HandlerError, HandlerFn, MemoryHost, MemoryTransport,
    ProjectEventArgs, ProjectHandlerRef, ServiceEventArgs, ServiceHandlerRef, Subscribe,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const WAIT: Duration = Duration::from_secs(2);
pub const QUIET: Duration = Duration::from_millis(100);

pub fn config() -> Config {
    let mut cfg = Config::new("127.0.0.1:50051", "test-token");
    cfg.extension_id = "test-extension".into();
    cfg
}

pub fn manager() -> (Arc<EventManager>, MemoryHost) {
    let (transport, host) = MemoryTransport::pair();
    (EventManager::new(transport, &config()), host)
}

pub fn spawn_receive(
    manager: &Arc<EventManager>,
) -> JoinHandle<Result<(), hookstream::ManagerError>> {
    let manager = Arc::clone(manager);
    tokio::spawn(async move { manager.receive().await })
}

/// Awaits the next outbound message, failing the test after [`WAIT`].
pub async fn next(host: &mut MemoryHost) -> EventMessage {
    host.next_outbound_within(WAIT)
        .await
        .expect("expected an outbound message")
}

/// `(event_name, service_name, status, message)` of a status report.
pub fn status_of(msg: &EventMessage) -> Option<(String, String, String, String)> {
    match &msg.message_type {
        Some(MessageType::ProjectHandlerStatus(s)) => Some((
            s.event_name.clone(),
            String::new(),
            s.status.clone(),
            s.message.clone(),
        )),
        Some(MessageType::ServiceHandlerStatus(s)) => Some((
            s.event_name.clone(),
            s.service_name.clone(),
            s.status.clone(),
            s.message.clone(),
        )),
        _ => None,
    }
}

pub fn is_ready(msg: &EventMessage) -> bool {
    matches!(&msg.message_type, Some(MessageType::ExtensionReadyEvent(r)) if r.status == "ready")
}

pub fn noop_project() -> ProjectHandlerRef {
    HandlerFn::arc(|_ctx: CancellationToken, _args: ProjectEventArgs| async { Ok(()) })
}

pub fn noop_service() -> ServiceHandlerRef {
    HandlerFn::arc(|_ctx: CancellationToken, _args: ServiceEventArgs| async { Ok(()) })
}

pub fn failing_project(message: &'static str) -> ProjectHandlerRef {
    HandlerFn::arc(move |_ctx: CancellationToken, _args: ProjectEventArgs| async move {
        Err(HandlerError::fail(message))
    })
}

/// Project handler that records the project name of every call.
pub fn recording_project(seen: Arc<Mutex<Vec<String>>>) -> ProjectHandlerRef {
    HandlerFn::arc(move |_ctx: CancellationToken, args: ProjectEventArgs| {
        let seen = Arc::clone(&seen);
        async move {
            seen.lock().unwrap().push(args.project.name);
            Ok(())
        }
    })
}

/// Observer that keeps every event kind it sees.
#[derive(Default)]
pub struct Recorder {
    pub events: Mutex<Vec<Event>>,
}

impl Recorder {
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().unwrap().iter().map(|e| e.kind).collect()
    }

    /// Polls until an event of `kind` was recorded or [`WAIT`] elapses.
    pub async fn wait_for(&self, kind: EventKind) -> bool {
        let deadline = tokio::time::Instant::now() + WAIT;
        while tokio::time::Instant::now() < deadline {
            if self.kinds().contains(&kind) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, event: &Event) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

/// Observer that panics on every event.
pub struct Panicky;

#[async_trait]
impl Subscribe for Panicky {
    async fn on_event(&self, _event: &Event) {
        panic!("observer failure");
    }

    fn name(&self) -> &'static str {
        "panicky"
    }
}
