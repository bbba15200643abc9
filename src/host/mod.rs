//! Extension host: declarative handler registration plus a run loop with
//! cancellation and OS signal handling.

#[allow(clippy::module_inception)]
mod host;
mod shutdown;

pub use host::{ExtensionHost, ExtensionHostBuilder};
pub use shutdown::shutdown_requested;
