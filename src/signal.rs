//! Process shutdown signals.

use crate::error::Result;
use tokio::signal;

/// Resolves once Ctrl+C (SIGINT) or, on unix, SIGTERM is received.
///
/// # Errors
///
/// Returns [`ManagerError::Io`](crate::ManagerError::Io) if a signal handler
/// cannot be installed.
pub async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            ctrl_c = signal::ctrl_c() => {
                ctrl_c?;
                tracing::info!(signal = "SIGINT", "Signal received");
            }
            _ = terminate.recv() => tracing::info!(signal = "SIGTERM", "Signal received"),
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        tracing::info!(signal = "ctrl-c", "Signal received");
    }

    Ok(())
}
