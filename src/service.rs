//! Cluster service records and export candidate extraction.

use k8s_openapi::api::core::v1::Service;

/// Service type whose ingress addresses are published.
pub const LOAD_BALANCER: &str = "LoadBalancer";

/// Cluster-neutral view of a service object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceRecord {
    /// Declared service type (`ClusterIP`, `LoadBalancer`, ...).
    pub service_type: String,
    pub namespace: String,
    pub name: String,
    /// Ingress-assigned addresses, in the order the cluster reports them.
    pub ingress_addresses: Vec<String>,
}

impl ServiceRecord {
    #[must_use]
    pub fn new(
        service_type: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            service_type: service_type.into(),
            namespace: namespace.into(),
            name: name.into(),
            ingress_addresses: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_ingress(mut self, address: impl Into<String>) -> Self {
        self.ingress_addresses.push(address.into());
        self
    }
}

impl From<&Service> for ServiceRecord {
    /// Only ingress entries with a non-empty `ip` count as addresses;
    /// hostname-only entries are skipped.
    fn from(svc: &Service) -> Self {
        let service_type = svc
            .spec
            .as_ref()
            .and_then(|s| s.type_.clone())
            .unwrap_or_default();
        let ingress_addresses = svc
            .status
            .as_ref()
            .and_then(|s| s.load_balancer.as_ref())
            .and_then(|lb| lb.ingress.as_ref())
            .map(|ingress| {
                ingress
                    .iter()
                    .filter_map(|i| i.ip.clone())
                    .filter(|ip| !ip.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            service_type,
            namespace: svc.metadata.namespace.clone().unwrap_or_default(),
            name: svc.metadata.name.clone().unwrap_or_default(),
            ingress_addresses,
        }
    }
}

/// A `(name, address)` pair eligible for publication in the hosts file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportCandidate {
    pub name: String,
    pub address: String,
}

impl ExportCandidate {
    #[must_use]
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// Selects exportable services and derives their hosts names.
///
/// A record is exported iff it is a `LoadBalancer` with at least one ingress
/// address. Only the first address is used; the name is
/// `<name>.<namespace>.svc`.
#[must_use]
pub fn extract_candidates(records: &[ServiceRecord]) -> Vec<ExportCandidate> {
    records
        .iter()
        .filter(|r| r.service_type == LOAD_BALANCER)
        .filter_map(|r| {
            let address = r.ingress_addresses.first()?;
            Some(ExportCandidate::new(
                format!("{}.{}.svc", r.name, r.namespace),
                address.clone(),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{
        LoadBalancerIngress, LoadBalancerStatus, ServiceSpec, ServiceStatus,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn k8s_service(name: &str, type_: &str, ingress: Vec<LoadBalancerIngress>) -> Service {
        Service {
            metadata: ObjectMeta {
                name: Some(name.into()),
                namespace: Some("ns".into()),
                ..ObjectMeta::default()
            },
            spec: Some(ServiceSpec {
                type_: Some(type_.into()),
                ..ServiceSpec::default()
            }),
            status: Some(ServiceStatus {
                load_balancer: Some(LoadBalancerStatus {
                    ingress: Some(ingress),
                }),
                ..ServiceStatus::default()
            }),
        }
    }

    fn ip(ip: &str) -> LoadBalancerIngress {
        LoadBalancerIngress {
            ip: Some(ip.into()),
            ..LoadBalancerIngress::default()
        }
    }

    #[test]
    fn extracts_load_balancers_with_addresses() {
        let records = vec![
            ServiceRecord::new("LoadBalancer", "ns", "web").with_ingress("10.0.0.1"),
            ServiceRecord::new("ClusterIP", "ns", "internal").with_ingress("10.0.0.2"),
            ServiceRecord::new("LoadBalancer", "ns", "pending"),
        ];
        assert_eq!(
            extract_candidates(&records),
            vec![ExportCandidate::new("web.ns.svc", "10.0.0.1")]
        );
    }

    #[test]
    fn only_first_address_is_used() {
        let records = vec![
            ServiceRecord::new("LoadBalancer", "prod", "api")
                .with_ingress("10.0.0.7")
                .with_ingress("10.0.0.8"),
        ];
        assert_eq!(
            extract_candidates(&records),
            vec![ExportCandidate::new("api.prod.svc", "10.0.0.7")]
        );
    }

    #[test]
    fn type_match_is_exact() {
        let records = vec![ServiceRecord::new("loadbalancer", "ns", "a").with_ingress("10.0.0.1")];
        assert!(extract_candidates(&records).is_empty());
        assert!(extract_candidates(&[]).is_empty());
    }

    #[test]
    fn record_from_k8s_service() {
        let svc = k8s_service("web", "LoadBalancer", vec![ip("10.0.0.1"), ip("10.0.0.2")]);
        let record = ServiceRecord::from(&svc);
        assert_eq!(record.service_type, "LoadBalancer");
        assert_eq!(record.namespace, "ns");
        assert_eq!(record.name, "web");
        assert_eq!(record.ingress_addresses, vec!["10.0.0.1", "10.0.0.2"]);
    }

    #[test]
    fn hostname_only_ingress_is_skipped() {
        let hostname = LoadBalancerIngress {
            hostname: Some("lb.example.com".into()),
            ..LoadBalancerIngress::default()
        };
        let svc = k8s_service("web", "LoadBalancer", vec![hostname, ip("10.0.0.3")]);
        let record = ServiceRecord::from(&svc);
        assert_eq!(record.ingress_addresses, vec!["10.0.0.3"]);
    }

    #[test]
    fn record_from_bare_service() {
        let record = ServiceRecord::from(&Service::default());
        assert_eq!(record, ServiceRecord::default());
        assert!(extract_candidates(&[record]).is_empty());
    }
}
