//! File-backed host runtime
//!
//! Keeps the component table as JSON in `<state_dir>/components.lock` and
//! persists it after every mutation. Resolution is deliberately simple: any
//! component with a non-empty archive resolves on refresh, an empty archive
//! never does. Refreshes run on their own thread and report completion
//! through the callback, like a real module host would.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ArchiveStream, HostRuntime, RefreshCallback};
use crate::bootstrap::FILE_REFERENCE_PREFIX;
use crate::domain::{Activation, ComponentRecord, ComponentState, ROOT_COMPONENT_ID, StartLevel};
use crate::error::{
    Result, component as component_error, refresh as refresh_error, runtime as runtime_error,
};

/// Component table filename
pub const STATE_FILE: &str = "components.lock";

/// Identity of the root component in a fresh table
const ROOT_IDENTITY: &str = "host:root";

/// A component as persisted in the table
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredComponent {
    id: u64,
    identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    symbolic_name: Option<String>,
    state: ComponentState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_level: Option<StartLevel>,
    /// blake3 digest of the archive contents
    #[serde(default)]
    digest: String,
    #[serde(default)]
    size: u64,
}

impl StoredComponent {
    fn record(&self) -> ComponentRecord {
        ComponentRecord {
            id: self.id,
            identity: self.identity.clone(),
            symbolic_name: self.symbolic_name.clone(),
            state: self.state,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ComponentTable {
    next_id: u64,
    components: Vec<StoredComponent>,
}

impl ComponentTable {
    fn fresh(root_symbolic_name: &str) -> Self {
        Self {
            next_id: ROOT_COMPONENT_ID + 1,
            components: vec![StoredComponent {
                id: ROOT_COMPONENT_ID,
                identity: ROOT_IDENTITY.to_string(),
                symbolic_name: Some(root_symbolic_name.to_string()),
                state: ComponentState::Active,
                start_level: None,
                digest: String::new(),
                size: 0,
            }],
        }
    }

    fn find(&self, id: u64) -> Option<&StoredComponent> {
        self.components.iter().find(|c| c.id == id)
    }

    fn find_mut(&mut self, id: u64) -> Option<&mut StoredComponent> {
        self.components.iter_mut().find(|c| c.id == id)
    }
}

#[derive(Debug)]
struct Inner {
    table_path: PathBuf,
    table: Mutex<ComponentTable>,
}

impl Inner {
    /// Write the table atomically (temp file + rename)
    fn persist(&self, table: &ComponentTable) -> Result<()> {
        let path = &self.table_path;
        let content = serde_json::to_string_pretty(table).map_err(|e| {
            runtime_error::state_write_failed(path.display().to_string(), e.to_string())
        })?;

        let tmp_path = path.with_extension("lock.tmp");
        fs::write(&tmp_path, content).map_err(|e| {
            runtime_error::state_write_failed(tmp_path.display().to_string(), e.to_string())
        })?;
        fs::rename(&tmp_path, path).map_err(|e| {
            runtime_error::state_write_failed(path.display().to_string(), e.to_string())
        })
    }

    fn resolve_installed(&self) -> Result<usize> {
        let mut table = self.table.lock();
        let mut resolved = 0;
        for component in &mut table.components {
            if component.state == ComponentState::Installed && component.size > 0 {
                component.state = ComponentState::Resolved;
                resolved += 1;
            }
        }
        self.persist(&table)?;
        Ok(resolved)
    }
}

/// Host runtime whose component table lives in a state directory
#[derive(Debug, Clone)]
pub struct FileRuntime {
    inner: Arc<Inner>,
}

impl FileRuntime {
    /// Symbolic name given to the root component of a fresh table
    pub const ROOT_SYMBOLIC_NAME: &'static str = "host.runtime.core";

    /// Open the component table in `state_dir`, creating a fresh one if needed
    pub fn open(state_dir: &Path) -> Result<Self> {
        fs::create_dir_all(state_dir).map_err(|e| {
            runtime_error::state_write_failed(state_dir.display().to_string(), e.to_string())
        })?;

        let table_path = state_dir.join(STATE_FILE);
        let table = if table_path.exists() {
            let content = fs::read_to_string(&table_path).map_err(|e| {
                runtime_error::state_read_failed(table_path.display().to_string(), e.to_string())
            })?;
            serde_json::from_str(&content).map_err(|e| {
                runtime_error::state_read_failed(table_path.display().to_string(), e.to_string())
            })?
        } else {
            ComponentTable::fresh(Self::ROOT_SYMBOLIC_NAME)
        };

        let runtime = Self {
            inner: Arc::new(Inner {
                table_path,
                table: Mutex::new(table),
            }),
        };
        {
            let table = runtime.inner.table.lock();
            runtime.inner.persist(&table)?;
        }
        Ok(runtime)
    }

    /// Start level recorded for a component, if one was set
    pub fn start_level_of(&self, record: &ComponentRecord) -> Option<StartLevel> {
        self.inner.table.lock().find(record.id).and_then(|c| c.start_level)
    }

    /// blake3 digest of the archive a component was installed from
    pub fn digest_of(&self, record: &ComponentRecord) -> Option<String> {
        self.inner
            .table
            .lock()
            .find(record.id)
            .map(|c| c.digest.clone())
    }
}

/// Symbolic name from the last path segment: file stem up to the first `_`.
///
/// `plugins/org.example.jobs_1.2.0.jar` declares `org.example.jobs`.
fn symbolic_name_from_identity(identity: &str) -> Option<String> {
    let location = identity.split_once('@').map_or(identity, |(_, rest)| rest);
    let location = location
        .strip_prefix(FILE_REFERENCE_PREFIX)
        .unwrap_or(location);
    let file_name = location.rsplit(['/', '\\']).next()?;
    let stem = Path::new(file_name).file_stem()?.to_str()?;
    let name = stem.split('_').next().unwrap_or(stem);
    (!name.is_empty()).then(|| name.to_string())
}

impl HostRuntime for FileRuntime {
    fn list_installed(&self) -> Result<Vec<ComponentRecord>> {
        let table = self.inner.table.lock();
        Ok(table.components.iter().map(StoredComponent::record).collect())
    }

    fn install(&self, identity: &str, mut archive: ArchiveStream) -> Result<ComponentRecord> {
        let mut bytes = Vec::new();
        archive
            .read_to_end(&mut bytes)
            .map_err(|e| component_error::install_failed(identity, e.to_string()))?;

        let mut table = self.inner.table.lock();
        if let Some(existing) = table.components.iter().find(|c| c.identity == identity) {
            debug!("{} is already installed as [{}]", identity, existing.id);
            return Ok(existing.record());
        }

        let component = StoredComponent {
            id: table.next_id,
            identity: identity.to_string(),
            symbolic_name: symbolic_name_from_identity(identity),
            state: ComponentState::Installed,
            start_level: None,
            digest: blake3::hash(&bytes).to_hex().to_string(),
            size: bytes.len() as u64,
        };
        table.next_id += 1;

        let record = component.record();
        table.components.push(component);
        self.inner
            .persist(&table)
            .map_err(|e| component_error::install_failed(identity, e.to_string()))?;
        Ok(record)
    }

    fn uninstall(&self, record: &ComponentRecord) -> Result<()> {
        if record.is_root() {
            return Err(component_error::uninstall_failed(
                &record.identity,
                "the root component cannot be uninstalled",
            ));
        }

        let mut table = self.inner.table.lock();
        let before = table.components.len();
        table.components.retain(|c| c.id != record.id);
        if table.components.len() == before {
            return Err(component_error::uninstall_failed(
                &record.identity,
                "not installed",
            ));
        }

        self.inner
            .persist(&table)
            .map_err(|e| component_error::uninstall_failed(&record.identity, e.to_string()))
    }

    fn set_start_level(&self, record: &ComponentRecord, level: StartLevel) -> Result<()> {
        let mut table = self.inner.table.lock();
        let Some(component) = table.find_mut(record.id) else {
            return Err(component_error::install_failed(
                &record.identity,
                "cannot set start level of a component that is not installed",
            ));
        };
        component.start_level = Some(level);

        self.inner
            .persist(&table)
            .map_err(|e| component_error::install_failed(&record.identity, e.to_string()))
    }

    fn start(&self, record: &ComponentRecord, activation: Activation) -> Result<()> {
        let mut table = self.inner.table.lock();
        let Some(component) = table.find_mut(record.id) else {
            return Err(component_error::start_failed(&record.identity, "not installed"));
        };

        component.state = match (component.state, activation) {
            (ComponentState::Active, _) => ComponentState::Active,
            (ComponentState::Resolved | ComponentState::Starting, Activation::Lazy) => {
                ComponentState::Starting
            }
            (ComponentState::Resolved | ComponentState::Starting, Activation::Eager) => {
                ComponentState::Active
            }
            (state, _) => {
                return Err(component_error::start_failed(
                    &record.identity,
                    format!("cannot start a component in state {state}"),
                ));
            }
        };

        self.inner
            .persist(&table)
            .map_err(|e| component_error::start_failed(&record.identity, e.to_string()))
    }

    fn state(&self, record: &ComponentRecord) -> ComponentState {
        self.inner
            .table
            .lock()
            .find(record.id)
            .map_or(ComponentState::Uninstalled, |c| c.state)
    }

    fn request_refresh(
        &self,
        records: &[ComponentRecord],
        on_complete: RefreshCallback,
    ) -> Result<()> {
        let inner = Arc::clone(&self.inner);
        let requested = records.len();

        thread::Builder::new()
            .name("component-refresh".to_string())
            .spawn(move || {
                match inner.resolve_installed() {
                    Ok(resolved) => debug!(
                        "Refreshed {} component(s), {} newly resolved",
                        requested, resolved
                    ),
                    Err(e) => warn!("Refresh could not persist the component table: {}", e),
                }
                on_complete();
            })
            .map(|_| ())
            .map_err(|e| refresh_error::failed(e.to_string()))
    }
}
