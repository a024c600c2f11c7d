//! Host runtime capability
//!
//! The orchestrator only ever talks to the module host through
//! [`HostRuntime`]. Adapters wrap a concrete runtime; [`FileRuntime`] is the
//! one shipped with the crate.

mod file;

pub use file::{FileRuntime, STATE_FILE};

use std::io::Read;

use crate::domain::{Activation, ComponentRecord, ComponentState, StartLevel};
use crate::error::Result;

/// One-shot notification fired by the runtime once a refresh has completed
pub type RefreshCallback = Box<dyn FnOnce() + Send + 'static>;

/// Archive contents handed to [`HostRuntime::install`]
pub type ArchiveStream = Box<dyn Read + Send>;

/// Component table operations of a module host.
///
/// Implementations are shared with runtime-internal threads, hence `Sync`.
pub trait HostRuntime: Send + Sync {
    /// Snapshot of every installed component, root component included
    fn list_installed(&self) -> Result<Vec<ComponentRecord>>;

    /// Install a component from an archive under the given identity
    fn install(&self, identity: &str, archive: ArchiveStream) -> Result<ComponentRecord>;

    fn uninstall(&self, record: &ComponentRecord) -> Result<()>;

    fn set_start_level(&self, record: &ComponentRecord, level: StartLevel) -> Result<()>;

    fn start(&self, record: &ComponentRecord, activation: Activation) -> Result<()>;

    /// Current state, [`ComponentState::Uninstalled`] for unknown records
    fn state(&self, record: &ComponentRecord) -> ComponentState;

    /// Re-link the given components asynchronously.
    ///
    /// `on_complete` must be invoked exactly once when the refresh is done.
    /// An `Err` means the refresh was never started and the callback is dropped.
    fn request_refresh(
        &self,
        records: &[ComponentRecord],
        on_complete: RefreshCallback,
    ) -> Result<()>;
}
