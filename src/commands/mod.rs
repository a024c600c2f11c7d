//! Command implementations for the autoconfigurator CLI

pub mod run;
pub mod status;

use std::path::{Path, PathBuf};

use autoconfigurator::error::{Result, fs as fs_error};

/// Directory under the install root holding the component table
pub const STATE_DIR: &str = ".autoconfigurator";

/// Explicit directory, or the current directory
fn base_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => std::env::current_dir()
            .map_err(|e| fs_error::io_error(format!("Failed to get current directory: {}", e))),
    }
}

fn default_state_dir(install_root: &Path) -> PathBuf {
    install_root.join(STATE_DIR)
}
