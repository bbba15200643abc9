//! # ExtensionHost: registers handlers and keeps the event stream alive.
//!
//! ```text
//! run(token):
//!   no handlers?           → return Ok
//!   add_*_event_handler    (in declaration order; first failure aborts)
//!   select! {
//!     receive()            → stream ended
//!     token.cancelled()    → dispose, wait for receive
//!     termination signal   → dispose, wait for receive
//!   }
//!   dispose()
//! ```
//!
//! Handlers are registered before `receive` starts, so every subscription is
//! queued ahead of the ready message.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{HostError, ManagerError};
use crate::handlers::{ProjectHandlerRef, ServiceEventOptions, ServiceHandlerRef};
use crate::manager::EventManager;

use super::shutdown::shutdown_requested;

/// One handler declared on the builder.
enum Registration {
    Project {
        name: String,
        handler: ProjectHandlerRef,
    },
    Service {
        name: String,
        handler: ServiceHandlerRef,
        options: Option<ServiceEventOptions>,
    },
}

impl Registration {
    fn name(&self) -> &str {
        match self {
            Registration::Project { name, .. } | Registration::Service { name, .. } => name,
        }
    }
}

/// Runs an extension's handlers against one [`EventManager`].
pub struct ExtensionHost {
    manager: Arc<EventManager>,
    registrations: Vec<Registration>,
    handle_signals: bool,
}

/// Builder for [`ExtensionHost`].
pub struct ExtensionHostBuilder {
    host: ExtensionHost,
}

impl ExtensionHostBuilder {
    /// Adds a project event handler.
    pub fn with_project_event_handler(
        mut self,
        name: impl Into<String>,
        handler: ProjectHandlerRef,
    ) -> Self {
        self.host.registrations.push(Registration::Project {
            name: name.into(),
            handler,
        });
        self
    }

    /// Adds a service event handler with optional host/language filters.
    pub fn with_service_event_handler(
        mut self,
        name: impl Into<String>,
        handler: ServiceHandlerRef,
        options: Option<ServiceEventOptions>,
    ) -> Self {
        self.host.registrations.push(Registration::Service {
            name: name.into(),
            handler,
            options,
        });
        self
    }

    /// Whether `run` also stops on OS termination signals (default: true).
    pub fn handle_signals(mut self, enabled: bool) -> Self {
        self.host.handle_signals = enabled;
        self
    }

    pub fn build(self) -> ExtensionHost {
        self.host
    }
}

impl ExtensionHost {
    pub fn builder(manager: Arc<EventManager>) -> ExtensionHostBuilder {
        ExtensionHostBuilder {
            host: ExtensionHost {
                manager,
                registrations: Vec::new(),
                handle_signals: true,
            },
        }
    }

    /// The manager driven by this host.
    pub fn manager(&self) -> &Arc<EventManager> {
        &self.manager
    }

    /// Registers every handler, then serves invocations until the stream ends,
    /// `token` is cancelled or a termination signal arrives.
    ///
    /// The manager is disposed on every exit path.
    pub async fn run(&self, token: CancellationToken) -> Result<(), HostError> {
        if self.registrations.is_empty() {
            info!(
                extension = self.manager.extension_id(),
                "no event handlers registered"
            );
            return Ok(());
        }

        let res = self.serve(token).await;
        self.manager.dispose();
        res
    }

    async fn serve(&self, token: CancellationToken) -> Result<(), HostError> {
        self.register().await?;

        let receive = self.manager.receive();
        tokio::pin!(receive);

        let (res, stopped) = tokio::select! {
            biased;
            res = &mut receive => (res, false),
            _ = token.cancelled() => {
                info!(
                    extension = self.manager.extension_id(),
                    "host cancelled, shutting down"
                );
                self.manager.dispose();
                (receive.await, true)
            }
            _ = shutdown_requested(self.handle_signals) => {
                info!(
                    extension = self.manager.extension_id(),
                    "termination signal received, shutting down"
                );
                self.manager.dispose();
                (receive.await, true)
            }
        };
        match res {
            // Stopped before the receive loop got going.
            Err(ManagerError::Terminated) if stopped => Ok(()),
            res => res.map_err(HostError::from),
        }
    }

    async fn register(&self) -> Result<(), HostError> {
        for reg in &self.registrations {
            let res = match reg {
                Registration::Project { name, handler } => {
                    self.manager
                        .add_project_event_handler(name.as_str(), Arc::clone(handler))
                        .await
                }
                Registration::Service {
                    name,
                    handler,
                    options,
                } => {
                    self.manager
                        .add_service_event_handler(
                            name.as_str(),
                            Arc::clone(handler),
                            options.clone(),
                        )
                        .await
                }
            };
            res.map_err(|source| HostError::Registration {
                event_name: reg.name().to_string(),
                source,
            })?;
            debug!(event = reg.name(), "handler registered");
        }
        Ok(())
    }
}
