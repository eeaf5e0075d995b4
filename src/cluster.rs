//! Cluster access.

use crate::error::Result;
use crate::service::ServiceRecord;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Service;
use kube::api::{Api, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::PathBuf;

/// Read-only source of service records.
#[async_trait]
pub trait ServiceSource: Send + Sync {
    /// Lists every service visible to the source.
    async fn list_services(&self) -> Result<Vec<ServiceRecord>>;
}

/// Lists services through the Kubernetes API.
///
/// A fresh client is built for every call, so credential rotation in the
/// kubeconfig is picked up and connection failures surface as tick errors.
#[derive(Debug, Clone, Default)]
pub struct KubeServiceSource {
    kubeconfig: Option<PathBuf>,
}

impl KubeServiceSource {
    /// `None` uses the default inference chain (`KUBECONFIG`, `~/.kube/config`,
    /// in-cluster service account).
    #[must_use]
    pub const fn new(kubeconfig: Option<PathBuf>) -> Self {
        Self { kubeconfig }
    }

    async fn client(&self) -> Result<Client> {
        let Some(path) = &self.kubeconfig else {
            return Ok(Client::try_default().await?);
        };
        let kubeconfig = Kubeconfig::read_from(path)?;
        let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;
        Ok(Client::try_from(config)?)
    }
}

#[async_trait]
impl ServiceSource for KubeServiceSource {
    async fn list_services(&self) -> Result<Vec<ServiceRecord>> {
        let client = self.client().await?;
        let services: Api<Service> = Api::all(client);
        let list = services.list(&ListParams::default()).await?;
        tracing::debug!(count = list.items.len(), "Listed cluster services");
        Ok(list.items.iter().map(ServiceRecord::from).collect())
    }
}
