//! Manager configuration.

use crate::error::{ManagerError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Default hosts file.
pub const DEFAULT_HOSTS_FILE: &str = "/etc/hosts";

/// Trailing token that marks a hosts line as owned by this crate.
pub const DEFAULT_MARKER: &str = "# lb-hosts-manager";

/// Default delay between two reconciliation ticks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for a [`Manager`](crate::Manager).
///
/// # Example
///
/// ```
/// use lb_hosts_manager::ManagerConfig;
/// use std::time::Duration;
///
/// let config = ManagerConfig::new()
///     .with_hosts_file("/tmp/hosts")
///     .with_interval(Duration::from_secs(5))
///     .with_ignore_errors(false);
///
/// assert_eq!(config.interval, Duration::from_secs(5));
/// assert!(!config.ignore_errors);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Hosts file whose managed region is reconciled.
    pub hosts_file: PathBuf,

    /// Marker token appended to every managed line.
    pub marker: String,

    /// Delay between ticks. Never zero.
    pub interval: Duration,

    /// Log tick failures and keep running instead of stopping the loop.
    pub ignore_errors: bool,

    /// Explicit kubeconfig. `None` falls back to in-cluster / `KUBECONFIG`
    /// inference.
    pub kubeconfig: Option<PathBuf>,
}

impl ManagerConfig {
    /// Creates a config targeting `/etc/hosts`, ticking every second and
    /// tolerating tick errors.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hosts_file: PathBuf::from(DEFAULT_HOSTS_FILE),
            marker: DEFAULT_MARKER.to_string(),
            interval: DEFAULT_INTERVAL,
            ignore_errors: true,
            kubeconfig: None,
        }
    }

    /// Overrides the hosts file path.
    #[must_use]
    pub fn with_hosts_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.hosts_file = path.into();
        self
    }

    /// Overrides the marker token.
    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Overrides the tick interval. A zero interval is coerced to one second.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = if interval.is_zero() {
            DEFAULT_INTERVAL
        } else {
            interval
        };
        self
    }

    /// Sets whether tick failures are logged and skipped.
    #[must_use]
    pub const fn with_ignore_errors(mut self, ignore: bool) -> Self {
        self.ignore_errors = ignore;
        self
    }

    /// Sets an explicit kubeconfig path.
    #[must_use]
    pub fn with_kubeconfig(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.kubeconfig = path.map(Into::into);
        self
    }

    /// Checks values that would otherwise corrupt the hosts file.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::InvalidConfig`] if the marker is blank or
    /// contains a tab or newline, or if the hosts file path is empty.
    pub fn validate(&self) -> Result<()> {
        if self.marker.trim().is_empty() {
            return Err(ManagerError::InvalidConfig(
                "marker must not be empty".into(),
            ));
        }
        if self.marker.contains(['\t', '\n', '\r']) || self.marker.trim() != self.marker {
            return Err(ManagerError::InvalidConfig(format!(
                "marker {:?} must be a single trimmed field",
                self.marker
            )));
        }
        if self.hosts_file.as_os_str().is_empty() {
            return Err(ManagerError::InvalidConfig(
                "hosts file path must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sets_defaults() {
        let c = ManagerConfig::new();
        assert_eq!(c.hosts_file, PathBuf::from("/etc/hosts"));
        assert_eq!(c.marker, "# lb-hosts-manager");
        assert_eq!(c.interval, Duration::from_secs(1));
        assert!(c.ignore_errors);
        assert!(c.kubeconfig.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_interval_is_coerced() {
        let c = ManagerConfig::new().with_interval(Duration::ZERO);
        assert_eq!(c.interval, DEFAULT_INTERVAL);
    }

    #[test]
    fn with_kubeconfig() {
        let c = ManagerConfig::new().with_kubeconfig(Some("/root/.kube/config"));
        assert_eq!(c.kubeconfig, Some(PathBuf::from("/root/.kube/config")));

        let c = c.with_kubeconfig(None::<PathBuf>);
        assert!(c.kubeconfig.is_none());
    }

    #[test]
    fn rejects_bad_markers() {
        assert!(ManagerConfig::new().with_marker("").validate().is_err());
        assert!(ManagerConfig::new().with_marker("   ").validate().is_err());
        assert!(ManagerConfig::new().with_marker("# a\tb").validate().is_err());
        assert!(ManagerConfig::new().with_marker(" # padded").validate().is_err());
        assert!(ManagerConfig::new().with_marker("# mine").validate().is_ok());
    }

    #[test]
    fn rejects_empty_hosts_path() {
        let err = ManagerConfig::new().with_hosts_file("").validate().unwrap_err();
        assert!(matches!(err, ManagerError::InvalidConfig(_)));
    }
}
