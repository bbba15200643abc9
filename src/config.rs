//! # Connection and runtime configuration.
//!
//! Provides [`Config`] centralized settings for the channel and the event manager.
//!
//! Config is used in two ways:
//! 1. **Channel creation**: `HostChannel::connect(&config)` / `HostChannel::lazy(&config)`
//! 2. **Manager creation**: `EventManager::builder(transport, config)`
//!
//! The host process hands connection details to the extension through the
//! environment; [`Config::from_env`] reads them.
//!
//! ## Sentinel values
//! - `send_grace = 0s` → enqueue waits for queue space without a bound
//! - `outbound_capacity = 0` → clamped to 1

use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable holding the host address.
pub const ENV_SERVER: &str = "AZD_SERVER";
/// Environment variable holding the access token.
pub const ENV_ACCESS_TOKEN: &str = "AZD_ACCESS_TOKEN";
/// Environment variable holding the extension id (optional).
pub const ENV_EXTENSION_ID: &str = "AZD_EXTENSION_ID";

/// Configuration for the channel and the event manager.
///
/// ## Field semantics
/// - `address`: host address, with or without scheme (`http://` is assumed)
/// - `access_token`: bearer credential attached to every call
/// - `extension_id`: identifies this extension in logs and observer events
/// - `outbound_capacity`: size of the outbound message queue (min 1)
/// - `send_grace`: max wait for queue space per message (`0s` = unbounded)
/// - `connect_timeout`: dial timeout for the gRPC channel
#[derive(Clone)]
pub struct Config {
    /// Host address, e.g. `localhost:50051` or `http://127.0.0.1:50051`.
    pub address: String,

    /// Access token attached as `authorization` metadata.
    pub access_token: String,

    /// Extension identifier used in logs.
    pub extension_id: String,

    /// Capacity of the outbound queue shared by subscribe, ready and status messages.
    pub outbound_capacity: usize,

    /// Maximum time an enqueue waits for queue space before the message is dropped.
    pub send_grace: Duration,

    /// Timeout for establishing the connection.
    pub connect_timeout: Duration,
}

impl Config {
    /// Creates a configuration with defaults for everything but the connection details.
    pub fn new(address: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    /// Reads `AZD_SERVER`, `AZD_ACCESS_TOKEN` and optionally `AZD_EXTENSION_ID`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let address = lookup(ENV_SERVER)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingAddress)?;
        let access_token = lookup(ENV_ACCESS_TOKEN)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let mut cfg = Self::new(address, access_token);
        if let Some(id) = lookup(ENV_EXTENSION_ID).filter(|v| !v.is_empty()) {
            cfg.extension_id = id;
        }
        Ok(cfg)
    }

    /// Returns the endpoint URI with a scheme.
    ///
    /// `http://` is prepended when the address carries no scheme.
    pub fn endpoint(&self) -> Result<String, ConfigError> {
        normalize_address(&self.address)
    }

    /// Returns the send grace period as an `Option`.
    ///
    /// - `None` → wait for queue space without a bound
    /// - `Some(d)` → drop the message after `d`
    #[inline]
    pub fn send_grace_limit(&self) -> Option<Duration> {
        if self.send_grace == Duration::ZERO {
            None
        } else {
            Some(self.send_grace)
        }
    }

    /// Returns the outbound capacity clamped to a minimum of 1.
    #[inline]
    pub fn outbound_capacity_clamped(&self) -> usize {
        self.outbound_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `address = ""`, `access_token = ""` (must be set)
    /// - `extension_id = "extension"`
    /// - `outbound_capacity = 256`
    /// - `send_grace = 1s`
    /// - `connect_timeout = 5s`
    fn default() -> Self {
        Self {
            address: String::new(),
            access_token: String::new(),
            extension_id: "extension".to_string(),
            outbound_capacity: 256,
            send_grace: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("address", &self.address)
            .field("access_token", &"<redacted>")
            .field("extension_id", &self.extension_id)
            .field("outbound_capacity", &self.outbound_capacity)
            .field("send_grace", &self.send_grace)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Prepends `http://` to addresses without a scheme.
pub fn normalize_address(address: &str) -> Result<String, ConfigError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(ConfigError::MissingAddress);
    }
    if address.contains("://") {
        Ok(address.to_string())
    } else {
        Ok(format!("http://{address}"))
    }
}
