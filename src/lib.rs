//! # lb-hosts-manager
//!
//! Keep a local hosts file in sync with the external addresses of a
//! Kubernetes cluster's `LoadBalancer` services.
//!
//! Every tick the manager lists services, keeps the load balancers that have
//! an ingress IP, and reconciles a managed region of the hosts file so it
//! holds exactly one line per address:
//!
//! ```text
//! 10.0.0.5	svc-a.ns.svc svc-b.ns.svc	# lb-hosts-manager
//! ```
//!
//! Lines without the trailing `# lb-hosts-manager` marker belong to somebody
//! else and are never modified or moved.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use lb_hosts_manager::{Manager, ManagerConfig};
//! use std::time::Duration;
//!
//! let config = ManagerConfig::new()
//!     .with_kubeconfig(Some("/home/me/.kube/config"))
//!     .with_interval(Duration::from_secs(5));
//!
//! // Runs until SIGINT / SIGTERM.
//! Manager::new(config)?.run_until_signal().await?;
//! ```
//!
//! ## Reconciliation only
//!
//! The diff engine is usable on its own:
//!
//! ```
//! use lb_hosts_manager::{AddressMapping, hosts_file::reconcile};
//!
//! let mut desired = AddressMapping::new();
//! desired.insert("10.0.0.1", "web.default.svc");
//!
//! let result = reconcile("", &desired, "# lb-hosts-manager");
//! assert_eq!(result.content, "10.0.0.1\tweb.default.svc\t# lb-hosts-manager");
//! ```
//!
//! ## Permissions
//!
//! Writing `/etc/hosts` requires root. The caller is responsible for
//! privilege elevation.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cluster;
pub mod config;
pub mod error;
pub mod hosts_file;
pub mod manager;
pub mod mapping;
pub mod service;
pub mod signal;

pub use cluster::{KubeServiceSource, ServiceSource};
pub use config::ManagerConfig;
pub use error::{ManagerError, Result};
pub use hosts_file::{Change, HostsFile, HostsLine, Reconciliation};
pub use manager::Manager;
pub use mapping::AddressMapping;
pub use service::{ExportCandidate, ServiceRecord, extract_candidates};
