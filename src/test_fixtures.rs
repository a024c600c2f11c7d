//! Test fixtures and utilities for reducing test setup duplication.
//!
//! This module provides an in-memory [`FakeRuntime`] whose failures and
//! refresh behaviour can be scripted per test, helpers that lay out an
//! install root with archives on disk, and [`capture_logs`] for asserting on
//! log output.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::{FakeRuntime, create_install_root};
//!
//! #[test]
//! fn my_test() {
//!     let root = create_install_root(&[("a.jar", b"a")]);
//!     let runtime = FakeRuntime::new().with_installed("update@plugins/old.jar");
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

use crate::domain::{Activation, ComponentRecord, ComponentState, StartLevel};
use crate::error::{
    Result, component as component_error, refresh as refresh_error, runtime as runtime_error,
};
use crate::runtime::{ArchiveStream, HostRuntime, RefreshCallback};

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Create an install root with `plugins/` holding the given archives.
///
/// # Panics
///
/// Panics if any file cannot be created.
#[must_use]
pub fn create_install_root(archives: &[(&str, &[u8])]) -> TempDir {
    let temp = create_temp_dir();
    let plugins = temp.path().join("plugins");
    std::fs::create_dir_all(&plugins).expect("Failed to create plugins directory");
    for (name, content) in archives {
        std::fs::write(plugins.join(name), content).expect("Failed to write archive");
    }
    temp
}

/// In-memory sink for formatted log lines
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with a debug-level subscriber on this thread and return what it logged.
///
/// Events from other threads are not captured.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock()).into_owned();
    (result, logs)
}

/// How [`FakeRuntime`] answers a refresh request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Resolve and call back on the requesting thread
    Inline,
    /// Resolve and call back from another thread after a delay
    Threaded(Duration),
    /// Keep the callback and never call it
    Hang,
    /// Drop the callback without calling it
    Drop,
    /// Refuse the request
    Refuse,
}

#[derive(Default)]
struct FakeState {
    next_id: u64,
    records: Vec<ComponentRecord>,
    start_levels: HashMap<u64, StartLevel>,
    installed: Vec<String>,
    uninstalled: Vec<u64>,
    started: Vec<(u64, Activation)>,
    refreshed: Vec<Vec<u64>>,
    parked_callbacks: Vec<RefreshCallback>,
}

/// In-memory host runtime with scriptable failures
pub struct FakeRuntime {
    state: Arc<Mutex<FakeState>>,
    refresh_mode: RefreshMode,
    fail_listing: bool,
    failing_installs: HashSet<String>,
    failing_uninstalls: HashSet<String>,
    failing_starts: HashMap<String, Option<ComponentState>>,
    unresolvable: HashSet<String>,
}

impl Default for FakeRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRuntime {
    /// A runtime holding only its root component
    pub fn new() -> Self {
        let root = ComponentRecord::new(0, "host:root", ComponentState::Active)
            .with_symbolic_name("host.runtime.core");
        Self {
            state: Arc::new(Mutex::new(FakeState {
                next_id: 1,
                records: vec![root],
                ..FakeState::default()
            })),
            refresh_mode: RefreshMode::Inline,
            fail_listing: false,
            failing_installs: HashSet::new(),
            failing_uninstalls: HashSet::new(),
            failing_starts: HashMap::new(),
            unresolvable: HashSet::new(),
        }
    }

    /// Pre-install a component in `Resolved` state, symbolic name from its file stem
    #[must_use]
    pub fn with_installed(self, identity: &str) -> Self {
        let name = stem(identity);
        self.with_record(identity, Some(&name), ComponentState::Resolved)
    }

    /// Pre-install a component with explicit symbolic name and state
    #[must_use]
    pub fn with_record(
        self,
        identity: &str,
        symbolic_name: Option<&str>,
        state: ComponentState,
    ) -> Self {
        {
            let mut inner = self.state.lock();
            let mut record = ComponentRecord::new(inner.next_id, identity, state);
            record.symbolic_name = symbolic_name.map(str::to_string);
            inner.next_id += 1;
            inner.records.push(record);
        }
        self
    }

    #[must_use]
    pub fn with_refresh_mode(mut self, mode: RefreshMode) -> Self {
        self.refresh_mode = mode;
        self
    }

    #[must_use]
    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Make installs of this identity fail
    #[must_use]
    pub fn failing_install(mut self, identity: &str) -> Self {
        self.failing_installs.insert(identity.to_string());
        self
    }

    #[must_use]
    pub fn failing_uninstall(mut self, identity: &str) -> Self {
        self.failing_uninstalls.insert(identity.to_string());
        self
    }

    /// Make starts of this identity fail, optionally moving the component to
    /// `state_after` first (a concurrent state change)
    #[must_use]
    pub fn failing_start(mut self, identity: &str, state_after: Option<ComponentState>) -> Self {
        self.failing_starts.insert(identity.to_string(), state_after);
        self
    }

    /// Keep this identity in `Installed` state across refreshes
    #[must_use]
    pub fn unresolvable(mut self, identity: &str) -> Self {
        self.unresolvable.insert(identity.to_string());
        self
    }

    pub fn records(&self) -> Vec<ComponentRecord> {
        self.state.lock().records.clone()
    }

    pub fn record(&self, identity: &str) -> Option<ComponentRecord> {
        self.state
            .lock()
            .records
            .iter()
            .find(|r| r.identity == identity)
            .cloned()
    }

    /// Identities passed to successful installs, in call order
    pub fn installed(&self) -> Vec<String> {
        self.state.lock().installed.clone()
    }

    /// Ids passed to successful uninstalls, in call order
    pub fn uninstalled(&self) -> Vec<u64> {
        self.state.lock().uninstalled.clone()
    }

    pub fn started(&self) -> Vec<(u64, Activation)> {
        self.state.lock().started.clone()
    }

    /// Ids of each refresh request, in call order
    pub fn refreshed(&self) -> Vec<Vec<u64>> {
        self.state.lock().refreshed.clone()
    }

    pub fn refresh_calls(&self) -> usize {
        self.state.lock().refreshed.len()
    }

    pub fn start_level(&self, id: u64) -> Option<StartLevel> {
        self.state.lock().start_levels.get(&id).copied()
    }

    fn resolve_all(state: &Mutex<FakeState>, unresolvable: &HashSet<String>) {
        let mut inner = state.lock();
        for record in &mut inner.records {
            if record.state == ComponentState::Installed
                && !unresolvable.contains(&record.identity)
            {
                record.state = ComponentState::Resolved;
            }
        }
    }
}

fn stem(identity: &str) -> String {
    let file_name = identity.rsplit('/').next().unwrap_or(identity);
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
        .to_string()
}

impl HostRuntime for FakeRuntime {
    fn list_installed(&self) -> Result<Vec<ComponentRecord>> {
        if self.fail_listing {
            return Err(runtime_error::unavailable("listing disabled"));
        }
        Ok(self.records())
    }

    fn install(&self, identity: &str, mut archive: ArchiveStream) -> Result<ComponentRecord> {
        let mut bytes = Vec::new();
        archive
            .read_to_end(&mut bytes)
            .map_err(|e| component_error::install_failed(identity, e.to_string()))?;

        if self.failing_installs.contains(identity) {
            return Err(component_error::install_failed(identity, "scripted failure"));
        }

        let mut inner = self.state.lock();
        let record = ComponentRecord::new(inner.next_id, identity, ComponentState::Installed)
            .with_symbolic_name(stem(identity));
        inner.next_id += 1;
        inner.records.push(record.clone());
        inner.installed.push(identity.to_string());
        Ok(record)
    }

    fn uninstall(&self, record: &ComponentRecord) -> Result<()> {
        if self.failing_uninstalls.contains(&record.identity) {
            return Err(component_error::uninstall_failed(
                &record.identity,
                "scripted failure",
            ));
        }
        let mut inner = self.state.lock();
        inner.records.retain(|r| r.id != record.id);
        inner.uninstalled.push(record.id);
        Ok(())
    }

    fn set_start_level(&self, record: &ComponentRecord, level: StartLevel) -> Result<()> {
        self.state.lock().start_levels.insert(record.id, level);
        Ok(())
    }

    fn start(&self, record: &ComponentRecord, activation: Activation) -> Result<()> {
        let mut inner = self.state.lock();
        if let Some(state_after) = self.failing_starts.get(&record.identity) {
            if let Some(state_after) = state_after {
                if let Some(r) = inner.records.iter_mut().find(|r| r.id == record.id) {
                    r.state = *state_after;
                }
            }
            return Err(component_error::start_failed(&record.identity, "scripted failure"));
        }

        if let Some(r) = inner.records.iter_mut().find(|r| r.id == record.id) {
            r.state = match activation {
                Activation::Lazy => ComponentState::Starting,
                Activation::Eager => ComponentState::Active,
            };
        }
        inner.started.push((record.id, activation));
        Ok(())
    }

    fn state(&self, record: &ComponentRecord) -> ComponentState {
        self.state
            .lock()
            .records
            .iter()
            .find(|r| r.id == record.id)
            .map_or(ComponentState::Uninstalled, |r| r.state)
    }

    fn request_refresh(
        &self,
        records: &[ComponentRecord],
        on_complete: RefreshCallback,
    ) -> Result<()> {
        if self.refresh_mode == RefreshMode::Refuse {
            return Err(refresh_error::failed("scripted refusal"));
        }
        self.state
            .lock()
            .refreshed
            .push(records.iter().map(|r| r.id).collect());

        match self.refresh_mode {
            RefreshMode::Inline => {
                Self::resolve_all(&self.state, &self.unresolvable);
                on_complete();
            }
            RefreshMode::Threaded(delay) => {
                let state = Arc::clone(&self.state);
                let unresolvable = self.unresolvable.clone();
                thread::spawn(move || {
                    thread::sleep(delay);
                    Self::resolve_all(&state, &unresolvable);
                    on_complete();
                });
            }
            RefreshMode::Hang => self.state.lock().parked_callbacks.push(on_complete),
            RefreshMode::Drop => drop(on_complete),
            RefreshMode::Refuse => {}
        }
        Ok(())
    }
}
