//! Common test utilities for autoconfigurator integration tests

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use autoconfigurator::config::{CasePolicy, Config};
use autoconfigurator::runtime::FileRuntime;
use tempfile::TempDir;

/// An install root with a plugins directory and a state directory
#[allow(dead_code)]
pub struct TestInstall {
    /// Temporary directory
    pub temp: TempDir,
    /// Path to the install root
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestInstall {
    /// Create an install root with an empty plugins directory
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        std::fs::create_dir_all(path.join("plugins")).expect("Failed to create plugins directory");
        Self { temp, path }
    }

    /// Drop an archive into the plugins directory
    pub fn add_archive(&self, name: &str, content: &[u8]) {
        std::fs::write(self.path.join("plugins").join(name), content)
            .expect("Failed to write archive");
    }

    pub fn remove_archive(&self, name: &str) {
        std::fs::remove_file(self.path.join("plugins").join(name))
            .expect("Failed to remove archive");
    }

    pub fn remove_plugins_dir(&self) {
        std::fs::remove_dir_all(self.path.join("plugins"))
            .expect("Failed to remove plugins directory");
    }

    /// Write `autoconfigurator.yaml` at the install root
    pub fn write_config(&self, yaml: &str) {
        std::fs::write(self.path.join("autoconfigurator.yaml"), yaml)
            .expect("Failed to write config");
    }

    pub fn state_dir(&self) -> PathBuf {
        self.path.join(".autoconfigurator")
    }

    /// Open the file-backed runtime over this install's state directory
    pub fn runtime(&self) -> FileRuntime {
        FileRuntime::open(&self.state_dir()).expect("Failed to open runtime")
    }

    /// Configuration rooted here, case-sensitive, with a short refresh timeout
    pub fn config(&self) -> Config {
        Config {
            install_root: self.path.clone(),
            case_policy: CasePolicy::Sensitive,
            refresh_timeout: 10,
            ..Config::default()
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The autoconfigurator binary, with inherited configuration variables cleared
#[allow(dead_code)]
pub fn autoconfigurator_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_autoconfigurator"));
    for var in [
        "AUTOCONFIGURATOR_DEBUG",
        "AUTOCONFIGURATOR_INSTALL_ROOT",
        "AUTOCONFIGURATOR_STATE_DIR",
        "AUTOCONFIGURATOR_CONFIG",
        "AUTOCONFIGURATOR_REFRESH_TIMEOUT",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}
