//! # OS termination signals.
//!
//! [`shutdown_requested`] completes when the extension process is asked to stop:
//! - **Unix**: `SIGINT`, `SIGTERM`, `SIGQUIT` or Ctrl-C
//! - **Other platforms**: Ctrl-C via [`tokio::signal::ctrl_c`]
//!
//! If listeners cannot be installed the failure is logged and the future never
//! completes, so the host keeps running until its token or stream ends.

use tracing::warn;

/// Completes on the first termination signal; pending forever when `enabled` is false.
pub async fn shutdown_requested(enabled: bool) {
    if !enabled {
        return std::future::pending().await;
    }
    if let Err(e) = wait_for_signal().await {
        warn!(err = %e, "cannot listen for termination signals");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        res = tokio::signal::ctrl_c() => res?,
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_disabled_never_completes() {
        let res =
            tokio::time::timeout(Duration::from_millis(20), shutdown_requested(false)).await;
        assert!(res.is_err());
    }
}
