//! Candidate archive discovery
//!
//! Lists the component archives sitting directly in the plugins directory.
//! Subdirectories are not descended into and only regular files whose name
//! ends in the archive extension count. Entries are recorded relative to the
//! install root, always `/`-separated, which is the form identities carry.
//!
//! Only a plugins directory that is missing or cannot be read fails the scan.
//! A single entry that cannot be inspected (a dangling symlink, say) is
//! skipped with a warning.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Result, scan as scan_error};

/// Relative archive paths discovered in one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    paths: BTreeSet<String>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// List candidate archives under `<install_root>/<plugins_dir>`
pub fn scan(install_root: &Path, plugins_dir: &str, extension: &str) -> Result<CandidateSet> {
    let dir = install_root.join(plugins_dir);
    if !dir.is_dir() {
        return Err(scan_error::failed(
            dir.display().to_string(),
            "not a directory",
        ));
    }

    let suffix = format!(".{}", extension.trim_start_matches('.'));
    let mut paths = BTreeSet::new();

    for entry in WalkDir::new(&dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            // Depth 0 is the plugins directory itself.
            Err(e) if e.depth() == 0 => {
                return Err(scan_error::failed(dir.display().to_string(), e.to_string()));
            }
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            debug!("Skipping non UTF-8 archive name: {}", entry.path().display());
            continue;
        };

        if name.ends_with(&suffix) {
            paths.insert(format!("{plugins_dir}/{name}"));
        }
    }

    debug!("Found {} candidate archive(s) in {}", paths.len(), dir.display());
    Ok(CandidateSet { paths })
}
