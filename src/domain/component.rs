//! Component domain types
//!
//! A component is an installable unit managed by the host runtime: an
//! archive on disk before install, a [`ComponentRecord`] afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Id the host runtime assigns to its own root component
pub const ROOT_COMPONENT_ID: u64 = 0;

/// Lifecycle state of an installed component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentState {
    /// Installed but dependencies not (yet) satisfied
    Installed,
    /// Dependencies satisfied, not running
    Resolved,
    /// Started with lazy activation, waiting for first use
    Starting,
    /// Running
    Active,
    /// Removed from the runtime
    Uninstalled,
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentState::Installed => "installed",
            ComponentState::Resolved => "resolved",
            ComponentState::Starting => "starting",
            ComponentState::Active => "active",
            ComponentState::Uninstalled => "uninstalled",
        };
        f.write_str(name)
    }
}

/// A component as known to the host runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// Runtime-assigned id, [`ROOT_COMPONENT_ID`] for the runtime itself
    pub id: u64,

    /// Install-time location token (e.g. `update@plugins/a.jar`)
    pub identity: String,

    /// Symbolic name declared by the component, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbolic_name: Option<String>,

    /// State at the time the record was read
    pub state: ComponentState,
}

impl ComponentRecord {
    pub fn new(id: u64, identity: impl Into<String>, state: ComponentState) -> Self {
        Self {
            id,
            identity: identity.into(),
            symbolic_name: None,
            state,
        }
    }

    #[must_use]
    pub fn with_symbolic_name(mut self, name: impl Into<String>) -> Self {
        self.symbolic_name = Some(name.into());
        self
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_COMPONENT_ID
    }

    pub fn has_symbolic_name(&self, name: &str) -> bool {
        self.symbolic_name.as_deref() == Some(name)
    }
}

impl fmt::Display for ComponentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.symbolic_name {
            Some(name) => write!(f, "{} [{}] {}", self.identity, self.id, name),
            None => write!(f, "{} [{}]", self.identity, self.id),
        }
    }
}

/// How a start request activates a component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Defer initialization to first use
    Lazy,
    /// Run initialization immediately
    Eager,
}

/// Start level assigned to every component installed in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StartLevel(u32);

impl StartLevel {
    pub const DEFAULT: StartLevel = StartLevel(4);

    /// Resolve a configured start level.
    ///
    /// Absent, non-numeric, non-positive and out of `i32` range values fall
    /// back to [`StartLevel::DEFAULT`].
    pub fn resolve(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.trim().parse::<i32>().ok())
            .filter(|level| *level >= 1)
            .and_then(|level| u32::try_from(level).ok())
            .map_or(Self::DEFAULT, StartLevel)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for StartLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for StartLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_level_absent_uses_default() {
        assert_eq!(StartLevel::resolve(None), StartLevel::DEFAULT);
    }

    #[test]
    fn test_start_level_parses_positive_value() {
        assert_eq!(StartLevel::resolve(Some("7")).get(), 7);
        assert_eq!(StartLevel::resolve(Some(" 2 ")).get(), 2);
    }

    #[test]
    fn test_start_level_accepts_i32_max() {
        assert_eq!(StartLevel::resolve(Some("2147483647")).get(), 2_147_483_647);
    }

    #[test]
    fn test_start_level_rejects_invalid_values() {
        for raw in ["", "abc", "0", "-3", "4.5", "99999999999", "2147483648", "4294967295"] {
            assert_eq!(
                StartLevel::resolve(Some(raw)),
                StartLevel::DEFAULT,
                "{raw:?} should fall back to the default"
            );
        }
    }

    #[test]
    fn test_record_display_includes_symbolic_name() {
        let record = ComponentRecord::new(3, "update@plugins/a.jar", ComponentState::Resolved)
            .with_symbolic_name("a");
        assert_eq!(record.to_string(), "update@plugins/a.jar [3] a");
        assert!(!record.is_root());
        assert!(record.has_symbolic_name("a"));
    }

    #[test]
    fn test_state_serializes_lowercase() {
        let json = serde_json::to_string(&ComponentState::Resolved).unwrap();
        assert_eq!(json, "\"resolved\"");
    }
}
