//! Error types used by the channel, the event manager and handlers.
//!
//! - [`ConfigError`] - invalid or missing connection settings.
//! - [`ChannelError`] - failures of the authenticated transport to the host.
//! - [`ManagerError`] - lifecycle errors of the [`EventManager`](crate::EventManager).
//! - [`HandlerError`] - failures reported by (or caught around) user handlers.
//! - [`EnqueueError`] - an outbound message could not be queued.
//! - [`HostError`] - failures surfaced by [`ExtensionHost::run`](crate::ExtensionHost::run).
//!
//! Every type provides `as_label` (a stable snake_case name for logs/metrics).

use std::time::Duration;
use thiserror::Error;

/// # Invalid connection settings.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No host address was provided.
    #[error("host address is empty")]
    MissingAddress,

    /// No access token was provided.
    #[error("access token is empty")]
    MissingToken,

    /// The access token cannot be carried in request metadata.
    #[error("access token contains characters not allowed in metadata")]
    InvalidToken,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::MissingAddress => "config_missing_address",
            ConfigError::MissingToken => "config_missing_token",
            ConfigError::InvalidToken => "config_invalid_token",
        }
    }
}

/// # Failures of the authenticated channel.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Connection settings were rejected before dialing.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The endpoint could not be parsed or dialed.
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        /// Normalized endpoint URI.
        endpoint: String,
        #[source]
        source: tonic::transport::Error,
    },

    /// The channel was already closed.
    #[error("channel is closed")]
    Closed,
}

impl ChannelError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ChannelError::Config(e) => e.as_label(),
            ChannelError::Connect { .. } => "channel_connect_failed",
            ChannelError::Closed => "channel_closed",
        }
    }
}

/// # Lifecycle errors of the event manager.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ManagerError {
    /// The transport refused to open the event stream.
    #[error("failed to open event stream: {source}")]
    Open {
        #[source]
        source: tonic::Status,
    },

    /// The manager was disposed or its stream already ended; it cannot be reused.
    #[error("event manager is terminated")]
    Terminated,

    /// `receive` was already called on this manager.
    #[error("event manager is already listening")]
    AlreadyListening,
}

impl ManagerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ManagerError::Open { .. } => "manager_open_failed",
            ManagerError::Terminated => "manager_terminated",
            ManagerError::AlreadyListening => "manager_already_listening",
        }
    }
}

/// # Failure of a single handler invocation.
///
/// The `Display` output is sent to the host verbatim as the status `message`.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler returned an error.
    #[error("{error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The handler panicked; the panic was caught.
    #[error("handler panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl HandlerError {
    /// Builds a [`HandlerError::Fail`] from anything displayable.
    pub fn fail(error: impl std::fmt::Display) -> Self {
        HandlerError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Fail { .. } => "handler_failed",
            HandlerError::Panicked { .. } => "handler_panicked",
        }
    }
}

impl From<String> for HandlerError {
    fn from(error: String) -> Self {
        HandlerError::Fail { error }
    }
}

impl From<&str> for HandlerError {
    fn from(error: &str) -> Self {
        HandlerError::fail(error)
    }
}

/// # An outbound message was dropped before reaching the queue.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnqueueError {
    /// The manager was disposed; nothing more is sent.
    #[error("outbound queue stopped")]
    Stopped,

    /// The transport side of the queue is gone.
    #[error("outbound queue closed")]
    Closed,

    /// The queue stayed full for the whole grace period.
    #[error("outbound queue full for {grace:?}")]
    Timeout {
        /// The grace period that elapsed.
        grace: Duration,
    },
}

impl EnqueueError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            EnqueueError::Stopped => "enqueue_stopped",
            EnqueueError::Closed => "enqueue_closed",
            EnqueueError::Timeout { .. } => "enqueue_timeout",
        }
    }
}

/// # Failures surfaced by the extension host.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HostError {
    /// The receive loop could not start.
    #[error(transparent)]
    Manager(#[from] ManagerError),

    /// A handler could not be registered.
    #[error("failed to register handler for {event_name}: {source}")]
    Registration {
        /// Event name of the failed registration.
        event_name: String,
        #[source]
        source: ManagerError,
    },
}

impl HostError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HostError::Manager(e) => e.as_label(),
            HostError::Registration { .. } => "host_registration_failed",
        }
    }
}
