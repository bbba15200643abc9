//! # hookstream
//!
//! **hookstream** lets a CLI-host *extension* subscribe to project and service
//! lifecycle events (`preprovision`, `predeploy`, `postpackage`, ...) over the
//! host's gRPC event service, run a handler when the host invokes it, and
//! report the outcome back.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   Config (AZD_SERVER / AZD_ACCESS_TOKEN / AZD_EXTENSION_ID)
//!      │
//!      ▼
//! ┌──────────────┐  authorization   ┌───────────────┐
//! │ HostChannel  │──── metadata ───►│ GrpcTransport │     MemoryTransport (tests)
//! └──────────────┘                  └───────┬───────┘             │
//!                                           └──────► EventTransport ◄──┘
//!                                                         │ open(outbound) → inbound
//! ┌───────────────────────────────────────────────────────┴───────────┐
//! │  EventManager                                                     │
//! │  - project / service HandlerRegistry                              │
//! │  - Outbox (single ordered outbound queue)                         │
//! │  - state: Uninitialized → Initializing → Listening → Terminated   │
//! │  - SubscriberSet (fans lifecycle events out to observers)         │
//! └──────┬──────────────────────────────────────────────┬─────────────┘
//!        │ add_*_event_handler → Subscribe*Event        │ receive():
//!        ▼                                              ▼   ready, then per invoke:
//!   ExtensionHost::run(token)                          handler(args) → *HandlerStatus
//!   (registers, receives, stops on token / signal)
//! ```
//!
//! ### Receive loop
//! ```text
//! receive()
//!   ├─► enqueue ExtensionReadyEvent{status: "ready"}        (once per manager)
//!   loop {
//!     ├─ InvokeProjectHandler ─► handler ─► ProjectHandlerStatus{completed | failed}
//!     ├─ InvokeServiceHandler ─► handler ─► ServiceHandlerStatus{completed | failed}
//!     ├─ no handler registered ─► warn, no status
//!     ├─ other message         ─► ignored
//!     └─ exit: host closed, transport status, dispose()
//!   }
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                              |
//! |-------------------|----------------------------------------------------------|-------------------------------------------------|
//! | **Manager**       | Subscribe, dispatch and report lifecycle events.         | [`EventManager`], [`ManagerState`]              |
//! | **Handlers**      | Typed project/service callbacks.                         | [`EventHandler`], [`HandlerFn`]                 |
//! | **Transport**     | Authenticated gRPC channel or in-process duplex.         | [`HostChannel`], [`GrpcTransport`], [`MemoryTransport`] |
//! | **Host**          | Declarative registration plus run loop.                  | [`ExtensionHost`]                               |
//! | **Observers**     | Hook into manager lifecycle events.                      | [`Subscribe`], [`Event`]                        |
//! | **Errors**        | Typed errors per layer.                                  | [`ManagerError`], [`HandlerError`], [`HostError`] |
//! | **Configuration** | Address, token and queue settings.                       | [`Config`]                                      |
//!
//! ## Optional features
//! - `logging` (default): exports the built-in [`LogWriter`] observer, which
//!   forwards events to `tracing`.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use hookstream::{
//!     Config, EventManager, ExtensionHost, GrpcTransport, HandlerFn, HostChannel,
//!     ProjectEventArgs,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::from_env()?;
//!     let channel = HostChannel::connect(&cfg).await?;
//!     let transport = Arc::new(GrpcTransport::new(&channel)?);
//!     let manager = EventManager::new(transport, &cfg);
//!
//!     let host = ExtensionHost::builder(manager)
//!         .with_project_event_handler(
//!             "preprovision",
//!             HandlerFn::arc(|_ctx: CancellationToken, args: ProjectEventArgs| async move {
//!                 println!("provisioning {}", args.project.name);
//!                 Ok(())
//!             }),
//!         )
//!         .build();
//!
//!     host.run(CancellationToken::new()).await?;
//!     channel.close();
//!     Ok(())
//! }
//! ```
mod channel;
mod config;
mod error;
mod events;
mod handlers;
mod host;
mod manager;
pub mod proto;
mod stream;
mod subscribers;

// ---- Public re-exports ----

pub use channel::{AUTHORIZATION, AuthChannel, AuthInterceptor, HostChannel};
pub use config::{Config, normalize_address};
pub use error::{ChannelError, ConfigError, EnqueueError, HandlerError, HostError, ManagerError};
pub use events::{Event, EventKind};
pub use handlers::{
    BoxHandlerFuture, EventHandler, HandlerCategory, HandlerFn, HandlerRegistry,
    ProjectEventArgs, ProjectHandlerRef, ServiceEventArgs, ServiceEventOptions, ServiceHandlerRef,
};
pub use host::{ExtensionHost, ExtensionHostBuilder, shutdown_requested};
pub use manager::{EventManager, EventManagerBuilder, ManagerState};
pub use stream::{
    EventTransport, GrpcTransport, InboundEvent, InboundStream, MemoryHost, MemoryTransport,
    OutboundStream, Outbox, StreamEnd,
};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: built-in observer that writes events through `tracing`.
// Enable with: `--features logging` (on by default).
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
