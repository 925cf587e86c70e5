//! Side-effect-free projection of a migration run.
//!
//! The planner uses the same [`plan_migrations`] the executor runs, so what
//! it reports is exactly what a real run would apply.

use crate::catalog::MigrationCatalog;
use crate::error::MigrationResult;
use crate::plan::{plan_migrations, MigrationPlan};
use crate::version::CurrentVersion;
use serde::Serialize;

/// A migration a run would apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMigration {
    pub version: u32,
    pub description: String,
}

/// What a run would do from the current version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationPlanReport {
    pub current_version: CurrentVersion,
    pub target_version: CurrentVersion,
    /// A fresh database gets the baseline first.
    pub applies_baseline: bool,
    /// Versioned migrations, ascending.
    pub pending: Vec<PlannedMigration>,
    /// Whether a real run would first demand a pre-migration backup.
    pub backup_required: bool,
}

impl MigrationPlanReport {
    pub fn is_up_to_date(&self) -> bool {
        !self.applies_baseline && self.pending.is_empty()
    }

    pub fn pending_versions(&self) -> Vec<u32> {
        self.pending.iter().map(|m| m.version).collect()
    }
}

impl From<&MigrationPlan<'_>> for MigrationPlanReport {
    fn from(plan: &MigrationPlan<'_>) -> Self {
        Self {
            current_version: plan.current(),
            target_version: plan.target_version(),
            applies_baseline: plan.baseline().is_some(),
            pending: plan
                .migrations()
                .iter()
                .map(|m| PlannedMigration {
                    version: m.version,
                    description: m.description.to_string(),
                })
                .collect(),
            backup_required: plan.requires_backup(),
        }
    }
}

/// Reports pending migrations without touching any database or backup.
#[derive(Debug, Clone, Copy)]
pub struct DryRunPlanner<'a> {
    catalog: &'a MigrationCatalog,
}

impl<'a> DryRunPlanner<'a> {
    pub fn new(catalog: &'a MigrationCatalog) -> Self {
        Self { catalog }
    }

    /// What a run from `current` would do.
    pub fn plan(&self, current: CurrentVersion) -> MigrationResult<MigrationPlanReport> {
        let plan = plan_migrations(self.catalog, current)?;
        Ok(MigrationPlanReport::from(&plan))
    }
}
