//! Bootstrap specification matching
//!
//! The host process may be told to load some components itself, through a
//! comma-separated bootstrap list of `[reference:file:]path[@startLevel]`
//! tokens. An install failure for an archive on that list is expected (the
//! host got there first), so the orchestrator stays quiet about it.

use std::path::Path;

/// Prefix of bootstrap tokens that reference an archive file by path
pub const FILE_REFERENCE_PREFIX: &str = "reference:file:";

/// Parsed bootstrap list plus the marker of the host's own core component
#[derive(Debug, Clone, Default)]
pub struct BootstrapSpec {
    core_marker: String,
    tokens: Vec<String>,
}

impl BootstrapSpec {
    /// Parse a bootstrap list. Empty tokens are skipped and `@startLevel`
    /// suffixes are dropped.
    pub fn new(core_marker: impl Into<String>, spec: Option<&str>) -> Self {
        let tokens = spec
            .map(|spec| {
                spec.split(',')
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(|token| token.split_once('@').map_or(token, |(path, _)| path))
                    .filter(|token| !token.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            core_marker: core_marker.into(),
            tokens,
        }
    }

    /// Whether the host already loads the archive at `path` on its own
    pub fn is_already_provisioned(&self, path: &str) -> bool {
        if !self.core_marker.is_empty() && path.contains(&self.core_marker) {
            return true;
        }

        self.tokens.iter().any(|token| token_matches(token, path))
    }
}

fn token_matches(token: &str, path: &str) -> bool {
    match token.strip_prefix(FILE_REFERENCE_PREFIX) {
        Some(reference) => Path::new(reference)
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| path.contains(name)),
        None => path.contains(token),
    }
}
