//! Reconciliation tick and run loop.
//!
//! Each tick recomputes the desired state from scratch, so a failed tick
//! leaves nothing behind that the next one has to undo.

use crate::cluster::{KubeServiceSource, ServiceSource};
use crate::config::ManagerConfig;
use crate::error::Result;
use crate::hosts_file::{Change, HostsFile};
use crate::mapping::AddressMapping;
use crate::service::extract_candidates;
use crate::signal::shutdown_signal;
use tokio_util::sync::CancellationToken;

/// Keeps a hosts file in sync with a cluster's load-balanced services.
///
/// # Lifecycle
///
/// 1. [`run`](Self::run) ticks every `interval` until the token is cancelled.
/// 2. A tick lists services, reduces them to an address mapping and syncs
///    the hosts file.
/// 3. With `ignore_errors` a failed tick is logged and skipped; otherwise it
///    stops the loop and the error is returned.
///
/// # Example
///
/// ```rust,ignore
/// use lb_hosts_manager::{Manager, ManagerConfig};
///
/// let manager = Manager::new(ManagerConfig::new())?;
/// manager.run_until_signal().await?;
/// ```
pub struct Manager<S = KubeServiceSource> {
    config: ManagerConfig,
    source: S,
    hosts: HostsFile,
}

impl Manager<KubeServiceSource> {
    /// Creates a manager reading services from the configured cluster.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::InvalidConfig`](crate::ManagerError::InvalidConfig)
    /// if the config does not validate.
    pub fn new(config: ManagerConfig) -> Result<Self> {
        let source = KubeServiceSource::new(config.kubeconfig.clone());
        Self::with_source(config, source)
    }
}

impl<S: ServiceSource> Manager<S> {
    /// Creates a manager reading services from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::InvalidConfig`](crate::ManagerError::InvalidConfig)
    /// if the config does not validate.
    pub fn with_source(config: ManagerConfig, source: S) -> Result<Self> {
        config.validate()?;
        let hosts = HostsFile::with_path(&config.hosts_file).marker(&config.marker);
        Ok(Self {
            config,
            source,
            hosts,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &ManagerConfig {
        &self.config
    }

    #[must_use]
    pub const fn hosts_file(&self) -> &HostsFile {
        &self.hosts
    }

    /// Runs one fetch, extract, reduce and sync pass.
    ///
    /// # Errors
    ///
    /// Returns the first failure. Cluster errors happen before the hosts
    /// file is touched.
    pub async fn tick(&self) -> Result<Vec<Change>> {
        let records = self.source.list_services().await?;
        let candidates = extract_candidates(&records);
        let desired = AddressMapping::from_candidates(candidates);
        tracing::debug!(
            services = records.len(),
            addresses = desired.len(),
            "Computed desired hosts entries"
        );
        self.hosts.sync(&desired)
    }

    /// Ticks until `cancel` fires.
    ///
    /// Cancellation is observed between ticks and while sleeping, never in
    /// the middle of a tick.
    ///
    /// # Errors
    ///
    /// Returns the tick error that stopped the loop when `ignore_errors` is
    /// off. Cancellation is not an error.
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        tracing::info!(
            hosts_file = %self.hosts.path().display(),
            interval = ?self.config.interval,
            ignore_errors = self.config.ignore_errors,
            "Starting manager"
        );
        match &self.config.kubeconfig {
            Some(path) => tracing::info!(kubeconfig = %path.display(), "Using kubeconfig"),
            None => tracing::info!("Using inferred cluster config"),
        }

        loop {
            if cancel.is_cancelled() {
                tracing::info!("Manager received cancellation request");
                break;
            }

            if let Err(e) = self.tick().await {
                if !self.config.ignore_errors {
                    tracing::error!(error = %e, "Tick failed, stopping");
                    return Err(e);
                }
                tracing::error!(error = %e, "Tick failed");
            }

            tokio::select! {
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(self.config.interval) => {}
            }
        }

        tracing::info!("Stopped");
        Ok(())
    }
}

impl<S: ServiceSource + 'static> Manager<S> {
    /// Runs the loop on its own task until SIGINT/SIGTERM or until the loop
    /// stops by itself, then returns the loop's result.
    ///
    /// # Errors
    ///
    /// Returns the loop's error, a signal handler installation failure, or
    /// [`ManagerError::Task`](crate::ManagerError::Task) if the loop panicked.
    pub async fn run_until_signal(self) -> Result<()> {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let mut worker = tokio::spawn(async move { self.run(token).await });

        let signal = tokio::select! {
            joined = &mut worker => return joined?,
            signal = shutdown_signal() => signal,
        };

        tracing::info!("Cancelling manager");
        cancel.cancel();
        let outcome = worker.await?;
        signal.and(outcome)
    }
}
