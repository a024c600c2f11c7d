//! Configuration handling for the autoconfigurator
//!
//! Configuration is process-wide and read once at startup, from an optional
//! `autoconfigurator.yaml`. Every field has a default, so an empty file (or
//! no file at all) yields a working configuration. The harness applies CLI
//! and environment overrides on top.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bootstrap::BootstrapSpec;
use crate::domain::StartLevel;
use crate::error::{Result, config as config_error};

/// Default configuration filename
pub const CONFIG_FILE: &str = "autoconfigurator.yaml";

/// How archive paths are compared against installed identities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CasePolicy {
    /// `A.jar` and `a.jar` are distinct paths
    Sensitive,
    /// Paths also match after lower-casing
    Fold,
}

impl CasePolicy {
    /// Policy matching the file system conventions of the target platform
    pub fn for_platform() -> Self {
        if cfg!(windows) {
            CasePolicy::Fold
        } else {
            CasePolicy::Sensitive
        }
    }

    pub fn folds(self) -> bool {
        self == CasePolicy::Fold
    }
}

impl Default for CasePolicy {
    fn default() -> Self {
        Self::for_platform()
    }
}

/// What a run does when the plugins directory cannot be listed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanFailurePolicy {
    /// Continue with no candidates, uninstalling every self-managed component
    #[default]
    TreatAsEmpty,
    /// Fail the run before touching the runtime
    Abort,
}

/// Start level as written in the configuration file, either `5` or `"5"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StartLevelSetting {
    Number(i64),
    Text(String),
}

/// Autoconfigurator configuration (`autoconfigurator.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the installation; archives live under `<install_root>/<plugins_dir>`
    pub install_root: PathBuf,

    /// Directory name, relative to the install root, holding component archives
    pub plugins_dir: String,

    /// File extension of component archives, without the dot
    pub archive_extension: String,

    /// Start level for newly installed components
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_level: Option<StartLevelSetting>,

    /// Comma-separated list of components the host loads on its own
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap: Option<String>,

    /// Verbose tracing, no behavioural effect
    pub debug: bool,

    pub case_policy: CasePolicy,

    /// Seconds to wait for a refresh to complete, `0` waits forever
    pub refresh_timeout: u64,

    pub scan_failure: ScanFailurePolicy,

    /// Symbolic name of the orchestrator itself, never installed or uninstalled
    pub orchestrator_name: String,

    /// Marker found in the archive name of the host runtime's core component
    pub host_core_marker: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            install_root: PathBuf::from("."),
            plugins_dir: "plugins".to_string(),
            archive_extension: "jar".to_string(),
            start_level: None,
            bootstrap: None,
            debug: false,
            case_policy: CasePolicy::for_platform(),
            refresh_timeout: 300,
            scan_failure: ScanFailurePolicy::TreatAsEmpty,
            orchestrator_name: "autoconfigurator".to_string(),
            host_core_marker: "host.runtime.core".to_string(),
        }
    }
}

impl Config {
    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load configuration from an explicit file, which must exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(config_error::not_found(path.display().to_string()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| config_error::read_failed(path.display().to_string(), e.to_string()))?;

        Self::from_yaml(&content).map_err(|e| match e {
            crate::error::AutoconfError::ConfigParseFailed { reason, .. } => {
                config_error::parse_failed(path.display().to_string(), reason)
            }
            other => other,
        })
    }

    /// Load `autoconfigurator.yaml` from a directory, falling back to defaults
    /// when the file does not exist
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// Check invariants serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.plugins_dir.trim().is_empty() {
            return Err(config_error::invalid("plugins_dir must not be empty"));
        }
        if self.plugins_dir.contains(['/', '\\']) {
            return Err(config_error::invalid(format!(
                "plugins_dir must be a single directory name, got '{}'",
                self.plugins_dir
            )));
        }
        if self.archive_extension.trim_start_matches('.').is_empty() {
            return Err(config_error::invalid("archive_extension must not be empty"));
        }
        if self.orchestrator_name.is_empty() {
            return Err(config_error::invalid("orchestrator_name must not be empty"));
        }
        Ok(())
    }

    /// Effective start level for newly installed components
    pub fn start_level(&self) -> StartLevel {
        match &self.start_level {
            None => StartLevel::DEFAULT,
            Some(StartLevelSetting::Number(n)) => StartLevel::resolve(Some(&n.to_string())),
            Some(StartLevelSetting::Text(text)) => StartLevel::resolve(Some(text)),
        }
    }

    pub fn bootstrap_spec(&self) -> BootstrapSpec {
        BootstrapSpec::new(self.host_core_marker.clone(), self.bootstrap.as_deref())
    }

    /// Refresh wait bound, `None` when waiting forever
    pub fn refresh_timeout(&self) -> Option<Duration> {
        (self.refresh_timeout > 0).then(|| Duration::from_secs(self.refresh_timeout))
    }

    /// Extension without any leading dot
    pub fn archive_extension(&self) -> &str {
        self.archive_extension.trim_start_matches('.')
    }
}
