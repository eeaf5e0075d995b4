//! Hosts file reconciliation.
//!
//! Lines written by this module end with a marker token. Only those lines
//! are ever rewritten or removed; every other line is copied through
//! byte-for-byte, in its original position.

use crate::config::{DEFAULT_HOSTS_FILE, DEFAULT_MARKER};
use crate::error::Result;
use crate::mapping::{AddressMapping, serialize_names};
use std::fmt;
use std::path::{Path, PathBuf};

/// One line of the hosts file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostsLine<'a> {
    /// A line this crate does not own. Preserved verbatim.
    Unmanaged(&'a str),
    /// `address<TAB>names<TAB>marker`.
    Managed {
        address: &'a str,
        names: &'a str,
        raw: &'a str,
    },
}

impl<'a> HostsLine<'a> {
    /// Classifies `raw`.
    ///
    /// A line carrying the marker but not exactly three tab-separated fields
    /// (or with an empty address) is treated as unmanaged, so hand-edited
    /// lines are kept rather than rejected.
    #[must_use]
    pub fn parse(raw: &'a str, marker: &str) -> Self {
        let trimmed = raw.trim();
        if !trimmed.ends_with(marker) {
            return Self::Unmanaged(raw);
        }

        let mut fields = trimmed.split('\t');
        match (fields.next(), fields.next(), fields.next(), fields.next()) {
            (Some(address), Some(names), Some(tag), None) if !address.is_empty() && tag == marker => {
                Self::Managed {
                    address,
                    names,
                    raw,
                }
            }
            _ => {
                tracing::debug!(line = %raw, "Marker found on malformed line, leaving untouched");
                Self::Unmanaged(raw)
            }
        }
    }
}

/// Formats a managed line.
#[must_use]
pub fn format_managed_line(address: &str, names: &str, marker: &str) -> String {
    format!("{address}\t{names}\t{marker}")
}

/// One edit performed on the managed region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Added { address: String, names: String },
    Updated { address: String, names: String },
    Removed { address: String },
}

impl Change {
    #[must_use]
    pub fn address(&self) -> &str {
        match self {
            Self::Added { address, .. }
            | Self::Updated { address, .. }
            | Self::Removed { address } => address,
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added { address, names } => write!(f, "adding entry: {address} ({names})"),
            Self::Updated { address, names } => write!(f, "updating entry: {address} ({names})"),
            Self::Removed { address } => write!(f, "removing entry: {address}"),
        }
    }
}

/// Output of [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Full replacement file content.
    pub content: String,
    /// Edits applied, in file order (updates and removals first, then additions).
    pub changes: Vec<Change>,
}

impl Reconciliation {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Rewrites the managed region of `content` so it describes exactly `desired`.
///
/// Managed lines whose address is gone are dropped, stale ones are
/// regenerated, up-to-date ones are kept as-is, and addresses with no line
/// yet are appended in ascending address order. A trailing newline on the
/// input is kept.
///
/// ```
/// use lb_hosts_manager::{AddressMapping, hosts_file::reconcile};
///
/// let mut desired = AddressMapping::new();
/// desired.insert("10.0.0.1", "a.ns.svc");
///
/// let result = reconcile("127.0.0.1\tlocalhost\n", &desired, "# lb-hosts-manager");
/// assert_eq!(
///     result.content,
///     "127.0.0.1\tlocalhost\n10.0.0.1\ta.ns.svc\t# lb-hosts-manager\n"
/// );
/// ```
#[must_use]
pub fn reconcile(content: &str, desired: &AddressMapping, marker: &str) -> Reconciliation {
    let (body, trailing_newline) = match content.strip_suffix('\n') {
        Some(body) => (body, true),
        None => (content, false),
    };

    let mut remaining = desired.clone();
    let mut lines: Vec<String> = Vec::new();
    let mut changes = Vec::new();

    // `"".split('\n')` yields one empty line; an empty file has none.
    let existing = (!content.is_empty()).then(|| body.split('\n'));
    for raw in existing.into_iter().flatten() {
        let (address, stored) = match HostsLine::parse(raw, marker) {
            HostsLine::Unmanaged(raw) => {
                lines.push(raw.to_string());
                continue;
            }
            HostsLine::Managed { address, names, .. } => (address, names),
        };

        let Some(names) = remaining.remove(address) else {
            changes.push(Change::Removed {
                address: address.to_string(),
            });
            continue;
        };

        let names = serialize_names(&names);
        if names == stored {
            lines.push(raw.to_string());
            continue;
        }
        lines.push(format_managed_line(address, &names, marker));
        changes.push(Change::Updated {
            address: address.to_string(),
            names,
        });
    }

    for (address, names) in remaining.into_entries() {
        let names = serialize_names(&names);
        lines.push(format_managed_line(&address, &names, marker));
        changes.push(Change::Added { address, names });
    }

    let mut content = lines.join("\n");
    if trailing_newline && !lines.is_empty() {
        content.push('\n');
    }

    Reconciliation { content, changes }
}

/// Owns the managed region of a hosts file.
///
/// # Example
///
/// ```rust,ignore
/// use lb_hosts_manager::{AddressMapping, HostsFile};
///
/// let hosts = HostsFile::new();
/// let mut desired = AddressMapping::new();
/// desired.insert("10.0.0.1", "web.default.svc");
/// let changes = hosts.sync(&desired)?;
/// ```
pub struct HostsFile {
    path: PathBuf,
    marker: String,
}

impl HostsFile {
    /// Targets `/etc/hosts` with the default marker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_HOSTS_FILE),
            marker: DEFAULT_MARKER.to_string(),
        }
    }

    /// Targets a custom path (useful for testing).
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::new()
        }
    }

    /// Overrides the marker token.
    #[must_use]
    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn marker_token(&self) -> &str {
        &self.marker
    }

    /// Reads the file. A missing file reads as empty.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Io`](crate::ManagerError::Io) for any failure
    /// other than `NotFound`.
    pub fn read(&self) -> Result<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Hosts file does not exist, treating as empty");
                Ok(String::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces the whole file with `content`, mode `0644`.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Io`](crate::ManagerError::Io) if the file
    /// cannot be written.
    pub fn write(&self, content: &str) -> Result<()> {
        std::fs::write(&self.path, content)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o644))?;
        }
        Ok(())
    }

    /// Reconciles the file against `desired` and returns what changed.
    ///
    /// The file is only rewritten when its content actually changes.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Io`](crate::ManagerError::Io) if the file
    /// cannot be read or written.
    pub fn sync(&self, desired: &AddressMapping) -> Result<Vec<Change>> {
        let current = self.read()?;
        let result = reconcile(&current, desired, &self.marker);

        for change in &result.changes {
            match change {
                Change::Added { address, names } => {
                    tracing::info!(address = %address, names = %names, "Adding hosts entry");
                }
                Change::Updated { address, names } => {
                    tracing::info!(address = %address, names = %names, "Updating hosts entry");
                }
                Change::Removed { address } => {
                    tracing::info!(address = %address, "Removing hosts entry");
                }
            }
        }

        if result.content == current {
            tracing::trace!(path = %self.path.display(), "Hosts file up to date");
            return Ok(result.changes);
        }

        self.write(&result.content)?;
        tracing::debug!(
            path = %self.path.display(),
            changes = result.changes.len(),
            "Wrote hosts file"
        );
        Ok(result.changes)
    }

    /// Lists managed entries currently in the file as `(address, names)`.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Io`](crate::ManagerError::Io) if the file
    /// cannot be read.
    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        let content = self.read()?;
        Ok(content
            .lines()
            .filter_map(|line| match HostsLine::parse(line, &self.marker) {
                HostsLine::Managed { address, names, .. } => {
                    Some((address.to_string(), names.to_string()))
                }
                HostsLine::Unmanaged(_) => None,
            })
            .collect())
    }
}

impl Default for HostsFile {
    fn default() -> Self {
        Self::new()
    }
}
