//! Reduction of export candidates into an address-to-names mapping.

use crate::service::ExportCandidate;
use std::collections::{BTreeMap, BTreeSet};

/// Desired hosts state: every address maps to a non-empty set of names.
///
/// Ordered collections give the canonical serialization for free: iteration
/// is by address ascending and names are always sorted.
///
/// # Example
///
/// ```
/// use lb_hosts_manager::{AddressMapping, ExportCandidate};
///
/// let mapping: AddressMapping = vec![
///     ExportCandidate::new("svc-b.ns.svc", "10.0.0.5"),
///     ExportCandidate::new("svc-a.ns.svc", "10.0.0.5"),
///     ExportCandidate::new("svc-a.ns.svc", "10.0.0.5"),
/// ]
/// .into_iter()
/// .collect();
///
/// assert_eq!(mapping.len(), 1);
/// assert_eq!(
///     mapping.serialized_names("10.0.0.5").as_deref(),
///     Some("svc-a.ns.svc svc-b.ns.svc")
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressMapping {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl AddressMapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups candidates by address and deduplicates names.
    #[must_use]
    pub fn from_candidates(candidates: impl IntoIterator<Item = ExportCandidate>) -> Self {
        let mut mapping = Self::new();
        for candidate in candidates {
            mapping.insert(candidate.address, candidate.name);
        }
        mapping
    }

    /// Adds `name` under `address`. Returns `false` if the pair was already
    /// present or either side is empty.
    pub fn insert(&mut self, address: impl Into<String>, name: impl Into<String>) -> bool {
        let (address, name) = (address.into(), name.into());
        if address.is_empty() || name.is_empty() {
            tracing::debug!(address = %address, name = %name, "Skipping incomplete candidate");
            return false;
        }
        self.entries.entry(address).or_default().insert(name)
    }

    /// Sorted names for `address`.
    #[must_use]
    pub fn names(&self, address: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(address)
    }

    /// Canonical form of the names for `address`: sorted, space-joined.
    #[must_use]
    pub fn serialized_names(&self, address: &str) -> Option<String> {
        self.names(address).map(serialize_names)
    }

    #[must_use]
    pub fn contains(&self, address: &str) -> bool {
        self.entries.contains_key(address)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in ascending address order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.entries.iter().map(|(a, n)| (a.as_str(), n))
    }

    pub(crate) fn remove(&mut self, address: &str) -> Option<BTreeSet<String>> {
        self.entries.remove(address)
    }

    pub(crate) fn into_entries(self) -> impl Iterator<Item = (String, BTreeSet<String>)> {
        self.entries.into_iter()
    }
}

impl FromIterator<ExportCandidate> for AddressMapping {
    fn from_iter<I: IntoIterator<Item = ExportCandidate>>(iter: I) -> Self {
        Self::from_candidates(iter)
    }
}

/// Joins already-sorted names with a single space.
pub(crate) fn serialize_names(names: &BTreeSet<String>) -> String {
    names.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, address: &str) -> ExportCandidate {
        ExportCandidate::new(name, address)
    }

    #[test]
    fn empty_input_gives_empty_mapping() {
        let mapping = AddressMapping::from_candidates(Vec::new());
        assert!(mapping.is_empty());
        assert_eq!(mapping.len(), 0);
    }

    #[test]
    fn groups_by_address() {
        let mapping = AddressMapping::from_candidates(vec![
            candidate("a.ns.svc", "10.0.0.1"),
            candidate("b.ns.svc", "10.0.0.2"),
            candidate("c.ns.svc", "10.0.0.1"),
        ]);
        assert_eq!(mapping.len(), 2);
        assert_eq!(
            mapping.serialized_names("10.0.0.1").as_deref(),
            Some("a.ns.svc c.ns.svc")
        );
        assert_eq!(mapping.serialized_names("10.0.0.2").as_deref(), Some("b.ns.svc"));
        assert!(mapping.serialized_names("10.0.0.3").is_none());
    }

    #[test]
    fn duplicates_collapse() {
        let one = AddressMapping::from_candidates(vec![candidate("a.ns.svc", "10.0.0.1")]);
        let many = AddressMapping::from_candidates(vec![candidate("a.ns.svc", "10.0.0.1"); 5]);
        assert_eq!(one, many);
    }

    #[test]
    fn order_independent() {
        let forward = AddressMapping::from_candidates(vec![
            candidate("b.ns.svc", "10.0.0.1"),
            candidate("a.ns.svc", "10.0.0.1"),
            candidate("z.ns.svc", "10.0.0.9"),
        ]);
        let backward = AddressMapping::from_candidates(vec![
            candidate("z.ns.svc", "10.0.0.9"),
            candidate("a.ns.svc", "10.0.0.1"),
            candidate("b.ns.svc", "10.0.0.1"),
        ]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn names_are_case_sensitive() {
        let mapping = AddressMapping::from_candidates(vec![
            candidate("Web.ns.svc", "10.0.0.1"),
            candidate("web.ns.svc", "10.0.0.1"),
        ]);
        assert_eq!(mapping.names("10.0.0.1").map(BTreeSet::len), Some(2));
        assert_eq!(
            mapping.serialized_names("10.0.0.1").as_deref(),
            Some("Web.ns.svc web.ns.svc")
        );
    }

    #[test]
    fn incomplete_candidates_are_skipped() {
        let mut mapping = AddressMapping::new();
        assert!(!mapping.insert("", "a.ns.svc"));
        assert!(!mapping.insert("10.0.0.1", ""));
        assert!(mapping.is_empty());
        assert!(mapping.insert("10.0.0.1", "a.ns.svc"));
        assert!(!mapping.insert("10.0.0.1", "a.ns.svc"));
    }

    #[test]
    fn iterates_by_address() {
        let mapping: AddressMapping = vec![
            candidate("c.ns.svc", "10.0.0.3"),
            candidate("a.ns.svc", "10.0.0.1"),
            candidate("b.ns.svc", "10.0.0.2"),
        ]
        .into_iter()
        .collect();
        let addresses: Vec<_> = mapping.iter().map(|(a, _)| a).collect();
        assert_eq!(addresses, vec!["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
    }
}
