//! Error types and handling for the autoconfigurator
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`scan`]: Archive directory listing errors
//! - [`component`]: Per-component install/uninstall/start errors
//! - [`refresh`]: Refresh barrier errors
//! - [`config`]: Configuration errors
//! - [`runtime`]: Host runtime and component table errors
//! - [`fs`]: File system errors
//!
//! Per-component errors are never fatal to a run; the orchestrator logs them
//! and moves on. Everything else aborts the remaining sequence.

pub mod component;
pub mod config;
pub mod fs;
pub mod refresh;
pub mod runtime;
pub mod scan;


use miette::Diagnostic;
use thiserror::Error;

/// Main error type for autoconfigurator operations
#[derive(Error, Diagnostic, Debug)]
pub enum AutoconfError {
    // Scan errors
    #[error("Failed to list component archives in '{path}': {reason}")]
    #[diagnostic(
        code(autoconfigurator::scan::failed),
        help("Check that the plugins directory exists under the install root and is readable")
    )]
    ScanFailed { path: String, reason: String },

    // Component errors
    #[error("Could not install component {identity}: {reason}")]
    #[diagnostic(code(autoconfigurator::component::install_failed))]
    InstallFailed { identity: String, reason: String },

    #[error("Could not uninstall component {identity}: {reason}")]
    #[diagnostic(code(autoconfigurator::component::uninstall_failed))]
    UninstallFailed { identity: String, reason: String },

    #[error("Could not start component {identity}: {reason}")]
    #[diagnostic(code(autoconfigurator::component::start_failed))]
    StartFailed { identity: String, reason: String },

    // Refresh errors
    #[error("Refresh did not complete within {seconds}s")]
    #[diagnostic(
        code(autoconfigurator::refresh::timeout),
        help("Raise refresh_timeout, or set it to 0 to wait indefinitely")
    )]
    RefreshTimeout { seconds: u64 },

    #[error("Refresh failed: {reason}")]
    #[diagnostic(code(autoconfigurator::refresh::failed))]
    RefreshFailed { reason: String },

    // Runtime errors
    #[error("Host runtime unavailable: {reason}")]
    #[diagnostic(code(autoconfigurator::runtime::unavailable))]
    RuntimeUnavailable { reason: String },

    #[error("Failed to read component table: {path}")]
    #[diagnostic(
        code(autoconfigurator::runtime::state_read_failed),
        help("Delete the component table to start from a clean runtime")
    )]
    StateReadFailed { path: String, reason: String },

    #[error("Failed to write component table: {path}")]
    #[diagnostic(code(autoconfigurator::runtime::state_write_failed))]
    StateWriteFailed { path: String, reason: String },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(code(autoconfigurator::config::not_found))]
    ConfigNotFound { path: String },

    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(autoconfigurator::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}")]
    #[diagnostic(code(autoconfigurator::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(autoconfigurator::config::invalid))]
    ConfigInvalid { message: String },

    // File system errors
    #[error("IO error: {message}")]
    #[diagnostic(code(autoconfigurator::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for AutoconfError {
    fn from(err: std::io::Error) -> Self {
        AutoconfError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for AutoconfError {
    fn from(err: serde_yaml::Error) -> Self {
        AutoconfError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, AutoconfError>;
