//! Autoconfigurator - keeps a module host in sync with a plugins directory
//!
//! Every archive dropped into `<install_root>/plugins` is installed into the
//! host runtime, every self-managed component whose archive disappeared is
//! uninstalled, and the result is refreshed and lazily started. Components
//! provisioned by the host's own bootstrap are left alone.
//!
//! The host is reached through [`runtime::HostRuntime`]; [`runtime::FileRuntime`]
//! keeps the component table on disk.

pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod error;
pub mod identity;
pub mod logging;
pub mod orchestrator;
pub mod reconcile;
pub mod refresh;
pub mod runtime;
pub mod scanner;

#[cfg(test)]
pub mod test_fixtures;

pub use config::Config;
pub use error::{AutoconfError, Result};
pub use orchestrator::{Orchestrator, RunReport};
pub use runtime::{FileRuntime, HostRuntime};
