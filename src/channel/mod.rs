//! # Authenticated channel to the host process.
//!
//! [`HostChannel`] owns one tonic [`Channel`] to the host and hands out clients
//! whose every call passes through [`AuthInterceptor`].
//!
//! ## Rules
//! - The endpoint is normalized once (`http://` prepended when no scheme).
//! - The token is validated once; an empty token is a configuration error.
//! - No retries at this layer; transport errors reach the caller unchanged.
//! - [`HostChannel::close`] releases the transport exactly once; later calls
//!   to [`HostChannel::event_service`] fail with [`ChannelError::Closed`], and
//!   transports created from the channel refuse to open new streams.

mod auth;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tonic::service::interceptor::InterceptedService;
use tonic::transport::{Channel, Endpoint};
use tracing::debug;

use crate::config::Config;
use crate::error::ChannelError;
use crate::proto::EventServiceClient;

pub use auth::{AUTHORIZATION, AuthInterceptor};

/// A channel whose calls all carry the access token.
pub type AuthChannel = InterceptedService<Channel, AuthInterceptor>;

/// Authenticated transport to a single host process.
pub struct HostChannel {
    endpoint: String,
    auth: AuthInterceptor,
    channel: Mutex<Option<Channel>>,
    closed: Arc<AtomicBool>,
}

impl HostChannel {
    /// Dials the host and waits for the connection to be established.
    pub async fn connect(cfg: &Config) -> Result<Self, ChannelError> {
        let (endpoint, auth, builder) = Self::prepare(cfg)?;
        debug!("connecting to host at {}", endpoint);

        let channel = builder
            .connect()
            .await
            .map_err(|source| ChannelError::Connect {
                endpoint: endpoint.clone(),
                source,
            })?;

        debug!("connected to host at {}", endpoint);
        Ok(Self::from_parts(endpoint, auth, channel))
    }

    /// Builds a channel that connects on first use.
    ///
    /// Must be called within a tokio runtime.
    pub fn lazy(cfg: &Config) -> Result<Self, ChannelError> {
        let (endpoint, auth, builder) = Self::prepare(cfg)?;
        let channel = builder.connect_lazy();
        Ok(Self::from_parts(endpoint, auth, channel))
    }

    fn prepare(cfg: &Config) -> Result<(String, AuthInterceptor, Endpoint), ChannelError> {
        let endpoint = cfg.endpoint()?;
        let auth = AuthInterceptor::new(&cfg.access_token)?;
        let builder = Endpoint::from_shared(endpoint.clone())
            .map_err(|source| ChannelError::Connect {
                endpoint: endpoint.clone(),
                source,
            })?
            .tcp_nodelay(true)
            .connect_timeout(cfg.connect_timeout);
        Ok((endpoint, auth, builder))
    }

    fn from_parts(endpoint: String, auth: AuthInterceptor, channel: Channel) -> Self {
        Self {
            endpoint,
            auth,
            channel: Mutex::new(Some(channel)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Normalized endpoint URI.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns an authenticated channel for custom clients.
    pub fn authenticated(&self) -> Result<AuthChannel, ChannelError> {
        let guard = self.channel.lock().unwrap_or_else(PoisonError::into_inner);
        let channel = guard.as_ref().ok_or(ChannelError::Closed)?.clone();
        Ok(InterceptedService::new(channel, self.auth.clone()))
    }

    /// Returns a client for the event service.
    pub fn event_service(&self) -> Result<EventServiceClient<AuthChannel>, ChannelError> {
        self.authenticated().map(EventServiceClient::new)
    }

    /// Releases the transport.
    ///
    /// Returns `true` for the call that actually released it, `false` afterwards.
    /// Streams already open keep running until they end.
    pub fn close(&self) -> bool {
        let released = self
            .channel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.closed.store(true, Ordering::SeqCst);
        if released.is_some() {
            debug!("closed channel to {}", self.endpoint);
            true
        } else {
            false
        }
    }

    /// Returns true once [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Shared flag that flips when the channel is closed.
    pub(crate) fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }
}

impl std::fmt::Debug for HostChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostChannel")
            .field("endpoint", &self.endpoint)
            .field("closed", &self.is_closed())
            .finish()
    }
}
