//! Set reconciliation between archives on disk and installed components
//!
//! Only manageable, self-managed records take part: the runtime's root
//! component, the orchestrator itself and anything without the self-managed
//! marker are invisible here. A path present on both sides (exactly, or after
//! case folding under [`CasePolicy::Fold`]) is left alone.

use std::collections::{BTreeSet, HashSet};

use crate::config::CasePolicy;
use crate::domain::ComponentRecord;
use crate::identity;
use crate::scanner::CandidateSet;

/// Install/uninstall decisions for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationPlan {
    /// Relative archive paths to install
    pub to_install: BTreeSet<String>,
    /// Installed records whose archive is gone
    pub to_uninstall: Vec<ComponentRecord>,
}

impl ReconciliationPlan {
    pub fn is_empty(&self) -> bool {
        self.to_install.is_empty() && self.to_uninstall.is_empty()
    }
}

/// Computes a [`ReconciliationPlan`] under a fixed case policy
#[derive(Debug, Clone)]
pub struct SetReconciler {
    case_policy: CasePolicy,
    orchestrator_name: String,
}

impl SetReconciler {
    pub fn new(case_policy: CasePolicy, orchestrator_name: impl Into<String>) -> Self {
        Self {
            case_policy,
            orchestrator_name: orchestrator_name.into(),
        }
    }

    pub fn reconcile(
        &self,
        candidates: &CandidateSet,
        installed: &[ComponentRecord],
    ) -> ReconciliationPlan {
        let managed: Vec<(&ComponentRecord, &str)> = installed
            .iter()
            .filter_map(|record| {
                identity::managed_path(record, &self.orchestrator_name).map(|path| (record, path))
            })
            .collect();

        ReconciliationPlan {
            to_install: self.paths_to_install(candidates, &managed),
            to_uninstall: self.records_to_uninstall(candidates, &managed),
        }
    }

    fn paths_to_install(
        &self,
        candidates: &CandidateSet,
        managed: &[(&ComponentRecord, &str)],
    ) -> BTreeSet<String> {
        let cached = self.folded_set(managed.iter().map(|(_, path)| *path));

        candidates
            .iter()
            .filter(|path| !self.contains(&cached, path))
            .filter(|path| !path.contains(self.orchestrator_name.as_str()))
            .map(str::to_string)
            .collect()
    }

    fn records_to_uninstall(
        &self,
        candidates: &CandidateSet,
        managed: &[(&ComponentRecord, &str)],
    ) -> Vec<ComponentRecord> {
        let available = self.folded_set(candidates.iter());
        let mut seen = HashSet::new();

        managed
            .iter()
            .filter(|(_, path)| !self.contains(&available, path))
            .filter(|(record, _)| seen.insert(record.id))
            .map(|(record, _)| (*record).clone())
            .collect()
    }

    /// The given paths, plus their lower-cased forms when folding
    fn folded_set<'a>(&self, paths: impl Iterator<Item = &'a str>) -> HashSet<String> {
        let mut set = HashSet::new();
        for path in paths {
            if self.case_policy.folds() {
                set.insert(path.to_lowercase());
            }
            set.insert(path.to_string());
        }
        set
    }

    fn contains(&self, set: &HashSet<String>, path: &str) -> bool {
        set.contains(path) || (self.case_policy.folds() && set.contains(&path.to_lowercase()))
    }
}
