//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Autoconfigurator - keeps a module host in sync with its plugins directory
#[derive(Parser, Debug)]
#[command(
    name = "autoconfigurator",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Install, uninstall and start components from a plugins directory",
    long_about = "Autoconfigurator reconciles the components installed in a module host with the \
                  archives found in <install-root>/plugins: new archives are installed, components \
                  whose archive disappeared are uninstalled, and everything resolved is started lazily. \
                  Components provisioned by the host's own bootstrap are never touched.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  autoconfigurator run --install-root /opt/app\n    \
                  autoconfigurator run --refresh-timeout 60 --debug\n    \
                  autoconfigurator status --state-dir /opt/app/.autoconfigurator"
)]
pub struct Cli {
    /// Verbose per-component tracing
    #[arg(long, short = 'd', global = true, env = "AUTOCONFIGURATOR_DEBUG")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile installed components with the plugins directory once
    Run(RunArgs),

    /// Print the component table
    Status(StatusArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Reconcile the current directory:\n    autoconfigurator run\n\n\
                  Use an explicit configuration file:\n    autoconfigurator run --config ./autoconfigurator.yaml\n\n\
                  Wait at most a minute for the refresh:\n    autoconfigurator run --refresh-timeout 60")]
pub struct RunArgs {
    /// Installation root holding the plugins directory (defaults to current directory)
    #[arg(long, short = 'r', env = "AUTOCONFIGURATOR_INSTALL_ROOT")]
    pub install_root: Option<PathBuf>,

    /// Directory holding the component table (defaults to <install-root>/.autoconfigurator)
    #[arg(long, env = "AUTOCONFIGURATOR_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Configuration file (defaults to <install-root>/autoconfigurator.yaml when present)
    #[arg(long, short = 'c', env = "AUTOCONFIGURATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seconds to wait for the refresh, 0 waits forever
    #[arg(long, value_name = "SECS", env = "AUTOCONFIGURATOR_REFRESH_TIMEOUT")]
    pub refresh_timeout: Option<u64>,
}

/// Arguments for the status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Directory holding the component table (defaults to ./.autoconfigurator)
    #[arg(long, env = "AUTOCONFIGURATOR_STATE_DIR")]
    pub state_dir: Option<PathBuf>,
}
