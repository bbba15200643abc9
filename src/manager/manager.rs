//! # EventManager: subscriptions out, invocations in, statuses back.
//!
//! The [`EventManager`] owns one event stream to the host. Registration calls
//! enqueue subscriptions; [`EventManager::receive`] announces readiness and then
//! dispatches invocations to the registered handlers, one at a time, reporting
//! each outcome back to the host.
//!
//! ## Architecture
//! ```text
//! add_project_event_handler ──► registry + SubscribeProjectEvent ─┐
//! add_service_event_handler ──► registry + SubscribeServiceEvent ─┤
//!                                                                 ▼
//!                                 Outbox (single ordered queue) ──► transport ──► host
//!                                                                 ▲
//! receive():                                                      │
//!   ExtensionReadyEvent (once) ───────────────────────────────────┤
//!   loop inbound.next()                                           │
//!     ├─ InvokeProjectHandler → handler(ProjectEventArgs) → ProjectHandlerStatus
//!     ├─ InvokeServiceHandler → handler(ServiceEventArgs) → ServiceHandlerStatus
//!     ├─ no handler           → warn, no status
//!     └─ anything else        → debug, ignored
//!   ends on: host close, transport status, dispose()
//! ```
//!
//! ## Rules
//! - The stream is opened lazily, once; concurrent first callers share it.
//! - A failed open terminates the manager; it never reconnects.
//! - Handlers run sequentially; a handler error or panic only affects its own
//!   status report.
//! - After `dispose()` nothing more is sent and `receive()` returns promptly.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use futures::StreamExt;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{EnqueueError, HandlerError, ManagerError};
use crate::events::{Event, EventKind};
use crate::handlers::dispatch::{self, outcome_status};
use crate::handlers::{
    HandlerCategory, HandlerRegistry, ProjectEventArgs, ProjectHandlerRef, ServiceEventArgs,
    ServiceEventOptions, ServiceHandlerRef,
};
use crate::manager::state::{ManagerState, StateCell};
use crate::manager::EventManagerBuilder;
use crate::proto::{EventMessage, InvokeProjectHandler, InvokeServiceHandler};
use crate::stream::{EventTransport, InboundEvent, InboundStream, Outbox, StreamEnd};
use crate::subscribers::SubscriberSet;

/// The open event stream.
struct Session {
    outbox: Outbox,
    inbound: Mutex<Option<InboundStream>>,
}

impl Session {
    fn take_inbound(&self) -> Option<InboundStream> {
        self.inbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Client side of the host's event service for one extension.
pub struct EventManager {
    extension_id: Arc<str>,
    transport: Arc<dyn EventTransport>,
    outbound_capacity: usize,
    send_grace: Option<Duration>,

    project_handlers: HandlerRegistry<ProjectEventArgs>,
    service_handlers: HandlerRegistry<ServiceEventArgs>,

    session: OnceCell<Session>,
    state: StateCell,
    token: CancellationToken,
    observers: SubscriberSet,
}

impl EventManager {
    /// Starts building a manager over `transport`.
    pub fn builder(transport: Arc<dyn EventTransport>, cfg: &Config) -> EventManagerBuilder {
        EventManagerBuilder::new(transport, cfg.clone())
    }

    /// Creates a manager without observers.
    pub fn new(transport: Arc<dyn EventTransport>, cfg: &Config) -> Arc<Self> {
        Self::builder(transport, cfg).build()
    }

    pub(crate) fn new_internal(
        cfg: &Config,
        transport: Arc<dyn EventTransport>,
        observers: SubscriberSet,
    ) -> Self {
        Self {
            extension_id: Arc::from(cfg.extension_id.as_str()),
            transport,
            outbound_capacity: cfg.outbound_capacity_clamped(),
            send_grace: cfg.send_grace_limit(),
            project_handlers: HandlerRegistry::new(),
            service_handlers: HandlerRegistry::new(),
            session: OnceCell::new(),
            state: StateCell::new(),
            token: CancellationToken::new(),
            observers,
        }
    }

    /// Extension id used in logs and observer events.
    pub fn extension_id(&self) -> &str {
        &self.extension_id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ManagerState {
        self.state.get()
    }

    /// Registers `handler` for the project event `name` and subscribes to it.
    ///
    /// Registering the same name again replaces the handler and sends another
    /// subscription.
    pub async fn add_project_event_handler(
        &self,
        name: impl Into<String>,
        handler: ProjectHandlerRef,
    ) -> Result<(), ManagerError> {
        let name = name.into();
        let session = self.session().await?;

        self.project_handlers.insert(name.clone(), handler).await;
        let msg = EventMessage::subscribe_project(vec![name.clone()]);
        if self.send(&session.outbox, msg, Some(&name)).await {
            self.emit(
                Event::new(EventKind::Subscribed)
                    .with_event_name(name.as_str())
                    .with_category(HandlerCategory::Project),
            );
        }
        Ok(())
    }

    /// Registers `handler` for the service event `name` and subscribes to it.
    ///
    /// `options` narrows the subscription by host and language; `None` matches
    /// every service.
    pub async fn add_service_event_handler(
        &self,
        name: impl Into<String>,
        handler: ServiceHandlerRef,
        options: Option<ServiceEventOptions>,
    ) -> Result<(), ManagerError> {
        let name = name.into();
        let options = options.unwrap_or_default();
        let session = self.session().await?;

        self.service_handlers.insert(name.clone(), handler).await;
        let msg =
            EventMessage::subscribe_service(vec![name.clone()], options.host, options.language);
        if self.send(&session.outbox, msg, Some(&name)).await {
            self.emit(
                Event::new(EventKind::Subscribed)
                    .with_event_name(name.as_str())
                    .with_category(HandlerCategory::Service),
            );
        }
        Ok(())
    }

    /// Forgets the project handler for `name`. The host is not notified.
    pub async fn remove_project_event_handler(&self, name: &str) -> bool {
        let removed = self.project_handlers.remove(name).await;
        if removed {
            self.emit(
                Event::new(EventKind::HandlerRemoved)
                    .with_event_name(name)
                    .with_category(HandlerCategory::Project),
            );
        }
        removed
    }

    /// Forgets the service handler for `name`. The host is not notified.
    pub async fn remove_service_event_handler(&self, name: &str) -> bool {
        let removed = self.service_handlers.remove(name).await;
        if removed {
            self.emit(
                Event::new(EventKind::HandlerRemoved)
                    .with_event_name(name)
                    .with_category(HandlerCategory::Service),
            );
        }
        removed
    }

    /// Announces readiness and dispatches invocations until the stream ends.
    ///
    /// Returns `Ok(())` however the stream ends (host close, transport error,
    /// dispose). Fails if the stream cannot be opened, the manager is already
    /// terminated, or another `receive` call owns the stream.
    pub async fn receive(&self) -> Result<(), ManagerError> {
        let session = self.session().await?;
        let mut inbound = session
            .take_inbound()
            .ok_or(ManagerError::AlreadyListening)?;

        if !self
            .state
            .transition(ManagerState::Initializing, ManagerState::Listening)
        {
            debug!(extension = %self.extension_id, "disposed before listening");
            return Ok(());
        }

        if self.send(&session.outbox, EventMessage::ready(), None).await {
            self.emit(Event::new(EventKind::ReadySent));
        }

        let end = self.listen(session, &mut inbound).await;
        self.state.terminate();
        self.token.cancel();

        if !end.is_graceful() {
            error!(extension = %self.extension_id, reason = %end, "event stream failed");
        } else if end == StreamEnd::Disposed {
            debug!(extension = %self.extension_id, "event stream disposed");
        } else {
            info!(extension = %self.extension_id, reason = %end, "event stream ended");
        }
        self.emit(Event::new(EventKind::StreamClosed).with_reason(end.as_label()));
        Ok(())
    }

    /// Stops the manager: nothing more is sent and `receive` returns.
    ///
    /// Safe to call at any time, including before initialization and more than
    /// once.
    pub fn dispose(&self) {
        let prev = self.state.terminate();
        self.token.cancel();
        if prev != ManagerState::Terminated {
            debug!(extension = %self.extension_id, from = %prev, "disposed");
            self.emit(Event::new(EventKind::Disposed));
        }
    }

    async fn session(&self) -> Result<&Session, ManagerError> {
        if self.state.get() == ManagerState::Terminated {
            return Err(ManagerError::Terminated);
        }
        self.session.get_or_try_init(|| self.open_session()).await
    }

    async fn open_session(&self) -> Result<Session, ManagerError> {
        if !self
            .state
            .transition(ManagerState::Uninitialized, ManagerState::Initializing)
        {
            return Err(ManagerError::Terminated);
        }

        let (outbox, outbound) =
            Outbox::channel(self.outbound_capacity, self.send_grace, self.token.clone());

        match self.transport.open(outbound).await {
            Ok(inbound) => {
                debug!(
                    extension = %self.extension_id,
                    transport = self.transport.name(),
                    "event stream opened"
                );
                self.emit(
                    Event::new(EventKind::StreamOpened).with_reason(self.transport.name()),
                );
                if self.token.is_cancelled() {
                    return Err(ManagerError::Terminated);
                }
                Ok(Session {
                    outbox,
                    inbound: Mutex::new(Some(inbound)),
                })
            }
            Err(status) => {
                self.state.terminate();
                self.token.cancel();
                error!(
                    extension = %self.extension_id,
                    %status,
                    "failed to open event stream"
                );
                self.emit(
                    Event::new(EventKind::StreamOpenFailed).with_reason(status.to_string()),
                );
                Err(ManagerError::Open { source: status })
            }
        }
    }

    async fn listen(&self, session: &Session, inbound: &mut InboundStream) -> StreamEnd {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.token.cancelled() => return StreamEnd::Disposed,
                next = inbound.next() => next,
            };

            let msg = match next {
                None => return StreamEnd::Closed,
                Some(Err(status)) => return StreamEnd::from_status(&status),
                Some(Ok(msg)) => msg,
            };

            let reply = tokio::select! {
                biased;
                _ = self.token.cancelled() => return StreamEnd::Disposed,
                reply = self.dispatch(msg) => reply,
            };

            if let Some((status, event_name)) = reply {
                self.send(&session.outbox, status, Some(&event_name)).await;
            }
        }
    }

    /// Runs the handler for one inbound message; returns the status to report.
    async fn dispatch(&self, msg: EventMessage) -> Option<(EventMessage, String)> {
        match InboundEvent::from(msg) {
            InboundEvent::InvokeProject(invoke) => self.on_invoke_project(invoke).await,
            InboundEvent::InvokeService(invoke) => self.on_invoke_service(invoke).await,
            InboundEvent::Unsupported(label) => {
                debug!(
                    extension = %self.extension_id,
                    kind = label,
                    "ignoring unsupported message"
                );
                self.emit(Event::new(EventKind::UnknownMessage).with_reason(label));
                None
            }
        }
    }

    async fn on_invoke_project(
        &self,
        invoke: InvokeProjectHandler,
    ) -> Option<(EventMessage, String)> {
        let name = invoke.event_name.clone();
        let Some(handler) = self.project_handlers.get(&name).await else {
            self.report_missing(&name, HandlerCategory::Project);
            return None;
        };

        let started = Instant::now();
        let args = ProjectEventArgs::from(invoke);
        let res = dispatch::invoke(handler, self.token.child_token(), args).await;
        self.report_outcome(&name, None, HandlerCategory::Project, started.elapsed(), &res);

        let (status, message) = outcome_status(&res);
        Some((
            EventMessage::project_handler_status(name.as_str(), status, message),
            name,
        ))
    }

    async fn on_invoke_service(
        &self,
        invoke: InvokeServiceHandler,
    ) -> Option<(EventMessage, String)> {
        let name = invoke.event_name.clone();
        let Some(handler) = self.service_handlers.get(&name).await else {
            self.report_missing(&name, HandlerCategory::Service);
            return None;
        };

        let args = ServiceEventArgs::from(invoke);
        let service = args.service.name.clone();
        let started = Instant::now();
        let res = dispatch::invoke(handler, self.token.child_token(), args).await;
        self.report_outcome(
            &name,
            Some(service.as_str()),
            HandlerCategory::Service,
            started.elapsed(),
            &res,
        );

        let (status, message) = outcome_status(&res);
        Some((
            EventMessage::service_handler_status(name.as_str(), service, status, message),
            name,
        ))
    }

    fn report_missing(&self, name: &str, category: HandlerCategory) {
        warn!(extension = %self.extension_id, event = name, %category, "no handler registered");
        self.emit(
            Event::new(EventKind::HandlerMissing)
                .with_event_name(name)
                .with_category(category),
        );
    }

    fn report_outcome(
        &self,
        name: &str,
        service: Option<&str>,
        category: HandlerCategory,
        elapsed: Duration,
        res: &Result<(), HandlerError>,
    ) {
        let mut ev = match res {
            Ok(()) => {
                debug!(
                    extension = %self.extension_id,
                    event = name,
                    ?service,
                    ?elapsed,
                    "handler completed"
                );
                Event::new(EventKind::HandlerCompleted)
            }
            Err(e) => {
                warn!(
                    extension = %self.extension_id,
                    event = name,
                    ?service,
                    label = e.as_label(),
                    err = %e,
                    "handler failed"
                );
                Event::new(EventKind::HandlerFailed).with_reason(e.to_string())
            }
        };
        ev = ev
            .with_event_name(name)
            .with_category(category)
            .with_elapsed(elapsed);
        if let Some(service) = service {
            ev = ev.with_service(service);
        }
        self.emit(ev);
    }

    /// Enqueues `msg`; a failure is logged and reported, never returned.
    async fn send(&self, outbox: &Outbox, msg: EventMessage, event_name: Option<&str>) -> bool {
        let label = msg.label();
        match outbox.enqueue(msg).await {
            Ok(()) => true,
            Err(e) => {
                match e {
                    EnqueueError::Stopped => debug!(
                        extension = %self.extension_id,
                        kind = label,
                        "manager stopped, message not sent"
                    ),
                    _ => warn!(
                        extension = %self.extension_id,
                        kind = label,
                        err = %e,
                        "dropping outbound message"
                    ),
                }
                let mut ev =
                    Event::new(EventKind::MessageDropped).with_reason(format!("{label}: {e}"));
                if let Some(name) = event_name {
                    ev = ev.with_event_name(name);
                }
                self.emit(ev);
                false
            }
        }
    }

    fn emit(&self, ev: Event) {
        if self.observers.is_empty() {
            return;
        }
        self.observers
            .emit(ev.with_extension(Arc::clone(&self.extension_id)));
    }
}

impl Drop for EventManager {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
