//! Identity classification for installed components
//!
//! The install-time identity of a component tells who put it there:
//! - `update@<relative-path>`: installed by this reconciler
//! - `initial@<symbolic-or-path>`: provisioned by the host's bootstrap list
//! - anything else: installed by some other mechanism, never touched

use crate::domain::ComponentRecord;

/// Marker prefix for components this reconciler installs
pub const SELF_MANAGED_PREFIX: &str = "update@";

/// Marker prefix for components provisioned by the host bootstrap
pub const BOOTSTRAP_PREFIX: &str = "initial@";

/// Who owns an installed component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    /// Installed by this reconciler from the given relative archive path
    SelfManaged(&'a str),
    /// Provisioned by the bootstrap mechanism
    BootstrapProvisioned(&'a str),
    /// Managed by some other mechanism
    Other,
}

/// Classify an install-time identity by its marker prefix
pub fn classify(identity: &str) -> Classification<'_> {
    if let Some(path) = identity.strip_prefix(SELF_MANAGED_PREFIX) {
        Classification::SelfManaged(path)
    } else if let Some(rest) = identity.strip_prefix(BOOTSTRAP_PREFIX) {
        Classification::BootstrapProvisioned(rest)
    } else {
        Classification::Other
    }
}

/// Build the identity under which an archive path gets installed
pub fn self_managed_identity(path: &str) -> String {
    format!("{SELF_MANAGED_PREFIX}{path}")
}

/// Whether a record may ever be installed or uninstalled by the reconciler.
///
/// The runtime's root component and the orchestrator itself are excluded no
/// matter what their identity looks like.
pub fn is_manageable(record: &ComponentRecord, orchestrator_name: &str) -> bool {
    !record.is_root() && !record.has_symbolic_name(orchestrator_name)
}

/// Relative archive path of a manageable, self-managed record
pub fn managed_path<'a>(record: &'a ComponentRecord, orchestrator_name: &str) -> Option<&'a str> {
    if !is_manageable(record, orchestrator_name) {
        return None;
    }
    match classify(&record.identity) {
        Classification::SelfManaged(path) => Some(path),
        _ => None,
    }
}

/// Symbolic names of all bootstrap-provisioned records
pub fn bootstrap_symbolic_names(records: &[ComponentRecord]) -> Vec<&str> {
    records
        .iter()
        .filter(|r| matches!(classify(&r.identity), Classification::BootstrapProvisioned(_)))
        .filter_map(|r| r.symbolic_name.as_deref())
        .collect()
}
