//! Summary of a migration run.

use crate::backup::BackupStatus;
use crate::state::{MigrationState, RunState};
use crate::version::CurrentVersion;
use serde::Serialize;

/// A migration that committed during the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedMigration {
    pub version: u32,
    pub description: String,
    /// Timestamp written to `schema_version`.
    pub migrated_at: String,
    pub duration_ms: u64,
}

/// The migration that stopped the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HaltedMigration {
    pub version: u32,
    pub description: String,
    pub reason: String,
}

/// Final state of one planned migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationOutcome {
    pub version: u32,
    pub description: String,
    pub state: MigrationState,
}

/// What a run did.
///
/// A halted run is still a report: it names the step that failed and leaves
/// every later step `Pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub starting_version: CurrentVersion,
    pub ending_version: CurrentVersion,
    pub baseline_applied: bool,
    /// Committed steps in order, including the baseline when it ran.
    pub applied: Vec<AppliedMigration>,
    pub halted: Option<HaltedMigration>,
    pub backup: BackupStatus,
    pub state: RunState,
    /// One entry per planned step, in plan order.
    pub outcomes: Vec<MigrationOutcome>,
}

impl MigrationReport {
    pub fn is_complete(&self) -> bool {
        self.state == RunState::Completed
    }

    /// Versions committed during the run, ascending.
    pub fn applied_versions(&self) -> Vec<u32> {
        self.applied.iter().map(|m| m.version).collect()
    }

    /// Whether the run changed nothing.
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty() && self.halted.is_none()
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        match &self.halted {
            Some(halt) => format!(
                "halted at v{} ({}): {}; database left at {}",
                halt.version, halt.description, halt.reason, self.ending_version
            ),
            None if self.is_noop() => {
                format!("schema up to date at {}", self.ending_version)
            }
            None => format!(
                "migrated {} -> {} ({} step{})",
                self.starting_version,
                self.ending_version,
                self.applied.len(),
                if self.applied.len() == 1 { "" } else { "s" }
            ),
        }
    }
}
