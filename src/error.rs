//! Error types.

use thiserror::Error;

/// Result alias for manager operations.
pub type Result<T> = std::result::Result<T, ManagerError>;

/// Errors returned by manager operations.
///
/// Extraction, reduction and reconciliation are total; only the hosts file
/// boundary, the cluster collaborator and the run loop produce these.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// Filesystem I/O failed (typically `PermissionDenied` on `/etc/hosts`).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The kubeconfig could not be loaded or turned into a client config.
    #[error("error building k8s rest config: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    /// Building the cluster client or listing services failed.
    #[error("k8s request failed: {0}")]
    Kube(#[from] kube::Error),

    /// Invalid configuration values.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The run loop task panicked or was aborted.
    #[error("run loop task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ManagerError {
    /// Returns `true` if the underlying I/O error is `PermissionDenied`.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied)
    }

    /// Returns `true` if the error came from the cluster side (config or request).
    #[must_use]
    pub const fn is_cluster_error(&self) -> bool {
        matches!(self, Self::Kubeconfig(_) | Self::Kube(_))
    }
}
