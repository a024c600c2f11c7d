//! Lifecycle orchestration for one reconciliation run
//!
//! A run goes through fixed phases, strictly in order:
//!
//! 1. Collect components still waiting for resolution
//! 2. Uninstall self-managed components whose archive is gone
//! 3. Install archives not yet installed
//! 4. Drop bootstrap-provisioned components from the refresh set
//! 5. Refresh, blocking until the runtime is done
//! 6. Lazily start everything that is now resolved
//!
//! Failures of a single component are logged and the run carries on. Anything
//! else aborts the remaining phases; what was already applied stays applied.

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use crate::bootstrap::BootstrapSpec;
use crate::config::{Config, ScanFailurePolicy};
use crate::domain::{Activation, ComponentRecord, ComponentState, StartLevel};
use crate::error::{AutoconfError, Result, component as component_error};
use crate::identity;
use crate::reconcile::{ReconciliationPlan, SetReconciler};
use crate::refresh::RefreshBarrier;
use crate::runtime::HostRuntime;
use crate::scanner::{self, CandidateSet};

/// Components to hand to the refresh, de-duplicated by id, in insertion order
#[derive(Debug, Clone, Default)]
pub struct RefreshSet {
    records: Vec<ComponentRecord>,
    ids: HashSet<u64>,
}

impl RefreshSet {
    /// Seed with every record still in `Installed` state
    pub fn unresolved(records: &[ComponentRecord]) -> Self {
        let mut set = Self::default();
        for record in records.iter().filter(|r| r.state == ComponentState::Installed) {
            set.push(record.clone());
        }
        set
    }

    pub fn push(&mut self, record: ComponentRecord) {
        if self.ids.insert(record.id) {
            self.records.push(record);
        }
    }

    /// Remove every record carrying one of the given symbolic names
    pub fn exclude_symbolic_names(&mut self, names: &[&str]) {
        if names.is_empty() {
            return;
        }
        self.records.retain(|record| {
            !record
                .symbolic_name
                .as_deref()
                .is_some_and(|name| names.contains(&name))
        });
        self.ids = self.records.iter().map(|r| r.id).collect();
    }

    pub fn records(&self) -> &[ComponentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Lifecycle phase a component failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninstall,
    Install,
    Start,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Uninstall => "uninstall",
            Phase::Install => "install",
            Phase::Start => "start",
        };
        f.write_str(name)
    }
}

/// A logged, non-fatal failure of a single component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentFailure {
    pub identity: String,
    pub phase: Phase,
    pub message: String,
}

/// What one run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Archives found in the plugins directory
    pub candidates: usize,
    pub uninstalled: Vec<String>,
    pub installed: Vec<String>,
    /// Size of the refresh set, `None` when the refresh was skipped
    pub refreshed: Option<usize>,
    pub started: Vec<String>,
    /// Failures that were logged
    pub failures: Vec<ComponentFailure>,
    /// Identities whose failure was expected and therefore not logged
    pub suppressed: Vec<String>,
}

impl RunReport {
    pub fn summary(&self) -> String {
        format!(
            "{} candidate(s): installed {}, uninstalled {}, refreshed {}, started {}, {} failure(s)",
            self.candidates,
            self.installed.len(),
            self.uninstalled.len(),
            self.refreshed.unwrap_or(0),
            self.started.len(),
            self.failures.len()
        )
    }
}

/// Drives one reconciliation run against a host runtime
pub struct Orchestrator<'a, R: HostRuntime + ?Sized> {
    runtime: &'a R,
    install_root: PathBuf,
    plugins_dir: String,
    archive_extension: String,
    start_level: StartLevel,
    bootstrap: BootstrapSpec,
    reconciler: SetReconciler,
    barrier: RefreshBarrier,
    scan_failure: ScanFailurePolicy,
    debug: bool,
}

impl<'a, R: HostRuntime + ?Sized> Orchestrator<'a, R> {
    pub fn new(runtime: &'a R, config: &Config) -> Self {
        Self {
            runtime,
            install_root: config.install_root.clone(),
            plugins_dir: config.plugins_dir.clone(),
            archive_extension: config.archive_extension().to_string(),
            start_level: config.start_level(),
            bootstrap: config.bootstrap_spec(),
            reconciler: SetReconciler::new(config.case_policy, config.orchestrator_name.clone()),
            barrier: RefreshBarrier::new(config.refresh_timeout()),
            scan_failure: config.scan_failure,
            debug: config.debug,
        }
    }

    /// Run once, logging the outcome. Returns whether the run succeeded.
    pub fn run(&self) -> bool {
        self.trace(format_args!("Reconciling components..."));
        match self.execute() {
            Ok(report) => {
                info!("{}", report.summary());
                true
            }
            Err(e) => {
                error!("Reconciliation aborted: {}", e);
                false
            }
        }
    }

    /// Run once and report what happened.
    ///
    /// Per-component failures end up in the report; only failures outside
    /// them (listing, scan abort, refresh) are returned as `Err`.
    pub fn execute(&self) -> Result<RunReport> {
        let snapshot = self.runtime.list_installed()?;
        let candidates = self.discover()?;
        let plan = self.reconciler.reconcile(&candidates, &snapshot);
        self.trace(format_args!(
            "Plan: {} to install, {} to uninstall",
            plan.to_install.len(),
            plan.to_uninstall.len()
        ));

        let mut report = RunReport {
            candidates: candidates.len(),
            ..RunReport::default()
        };

        let mut refresh_set = RefreshSet::unresolved(&snapshot);
        self.uninstall_stale(&plan, &mut refresh_set, &mut report);
        self.install_new(&plan, &mut refresh_set, &mut report);

        refresh_set.exclude_symbolic_names(&identity::bootstrap_symbolic_names(&snapshot));

        if refresh_set.is_empty() {
            self.trace(format_args!("Nothing to refresh"));
        } else {
            self.trace(format_args!("Refreshing {} component(s)", refresh_set.len()));
            self.barrier.refresh(self.runtime, refresh_set.records())?;
            report.refreshed = Some(refresh_set.len());
        }

        self.activate_resolved(&mut report)?;
        Ok(report)
    }

    fn discover(&self) -> Result<CandidateSet> {
        match scanner::scan(&self.install_root, &self.plugins_dir, &self.archive_extension) {
            Ok(candidates) => Ok(candidates),
            Err(e) => match self.scan_failure {
                ScanFailurePolicy::TreatAsEmpty => {
                    warn!(
                        "{}; continuing without archives, self-managed components will be uninstalled",
                        e
                    );
                    Ok(CandidateSet::new())
                }
                ScanFailurePolicy::Abort => Err(e),
            },
        }
    }

    fn uninstall_stale(
        &self,
        plan: &ReconciliationPlan,
        refresh_set: &mut RefreshSet,
        report: &mut RunReport,
    ) {
        for record in &plan.to_uninstall {
            self.trace(format_args!("Uninstalling {}", record.identity));
            // Even a failed uninstall changes what the runtime has to re-link.
            refresh_set.push(record.clone());

            match self.runtime.uninstall(record) {
                Ok(()) => report.uninstalled.push(record.identity.clone()),
                Err(e) => Self::record_failure(report, Phase::Uninstall, &record.identity, &e),
            }
        }
    }

    fn install_new(
        &self,
        plan: &ReconciliationPlan,
        refresh_set: &mut RefreshSet,
        report: &mut RunReport,
    ) {
        for path in &plan.to_install {
            let identity = identity::self_managed_identity(path);
            self.trace(format_args!("Installing {}", identity));

            match self.install_archive(&identity, path, refresh_set) {
                Ok(record) => report.installed.push(record.identity),
                Err(e) if self.bootstrap.is_already_provisioned(path) => {
                    self.trace(format_args!(
                        "Ignoring install failure of {}, bootstrap provides it: {}",
                        path, e
                    ));
                    report.suppressed.push(identity);
                }
                Err(e) => Self::record_failure(report, Phase::Install, &identity, &e),
            }
        }
    }

    fn install_archive(
        &self,
        identity: &str,
        path: &str,
        refresh_set: &mut RefreshSet,
    ) -> Result<ComponentRecord> {
        let archive_path = self.install_root.join(path);
        let file = File::open(&archive_path).map_err(|e| {
            component_error::install_failed(
                identity,
                format!("cannot open {}: {}", archive_path.display(), e),
            )
        })?;

        let record = self.runtime.install(identity, Box::new(BufReader::new(file)))?;
        refresh_set.push(record.clone());
        self.runtime.set_start_level(&record, self.start_level)?;
        Ok(record)
    }

    fn activate_resolved(&self, report: &mut RunReport) -> Result<()> {
        let resolved: Vec<ComponentRecord> = self
            .runtime
            .list_installed()?
            .into_iter()
            .filter(|record| record.state == ComponentState::Resolved)
            .collect();

        for record in resolved {
            match self.runtime.start(&record, Activation::Lazy) {
                Ok(()) => report.started.push(record.identity),
                Err(e) if self.runtime.state(&record) != ComponentState::Resolved => {
                    self.trace(format_args!(
                        "Ignoring start failure of {}, its state changed: {}",
                        record.identity, e
                    ));
                    report.suppressed.push(record.identity);
                }
                Err(e) => Self::record_failure(report, Phase::Start, &record.identity, &e),
            }
        }
        Ok(())
    }

    fn record_failure(report: &mut RunReport, phase: Phase, identity: &str, err: &AutoconfError) {
        warn!("{}", err);
        report.failures.push(ComponentFailure {
            identity: identity.to_string(),
            phase,
            message: err.to_string(),
        });
    }

    /// Verbose per-step tracing, only with the debug flag set
    fn trace(&self, args: fmt::Arguments<'_>) {
        if self.debug {
            debug!("{}", args);
        }
    }
}
