//! Run command implementation
//!
//! Resolves the configuration (file, then CLI/env overrides), sets up logging
//! from it, opens the file-backed runtime and drives a single reconciliation
//! run.

use std::path::PathBuf;

use autoconfigurator::config::Config;
use autoconfigurator::error::Result;
use autoconfigurator::logging;
use autoconfigurator::orchestrator::Orchestrator;
use autoconfigurator::runtime::FileRuntime;

use super::{base_dir, default_state_dir};
use crate::cli::RunArgs;

/// Run once. `Ok(false)` means the run itself failed and was logged.
///
/// Logging is initialised here, once the configured debug flag is known.
pub fn run(args: RunArgs, debug: bool) -> Result<bool> {
    let explicit_root = args.install_root.is_some();
    let base = base_dir(args.install_root)?;

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_from_dir(&base)?,
    };
    apply_overrides(&mut config, base, explicit_root, args.refresh_timeout, debug);
    logging::init(config.debug);

    let state_dir = args
        .state_dir
        .unwrap_or_else(|| default_state_dir(&config.install_root));
    let runtime = FileRuntime::open(&state_dir)?;

    Ok(Orchestrator::new(&runtime, &config).run())
}

/// CLI and environment values win over the configuration file
fn apply_overrides(
    config: &mut Config,
    base: PathBuf,
    explicit_root: bool,
    refresh_timeout: Option<u64>,
    debug: bool,
) {
    if explicit_root || config.install_root.is_relative() {
        config.install_root = if explicit_root {
            base
        } else {
            base.join(&config.install_root)
        };
    }
    if let Some(seconds) = refresh_timeout {
        config.refresh_timeout = seconds;
    }
    config.debug |= debug;
}
