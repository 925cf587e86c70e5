//! Applies a migration plan, one transaction per step.

use crate::audit;
use crate::backup::{BackupGuard, BackupStatus};
use crate::catalog::{MigrationCatalog, MigrationDefinition};
use crate::error::{MigrationError, MigrationResult};
use crate::plan::plan_migrations;
use crate::report::{AppliedMigration, HaltedMigration, MigrationOutcome, MigrationReport};
use crate::state::{MigrationState, RunState, RunTracker};
use crate::validator::validate;
use crate::version::CurrentVersion;
use duckdb::Connection;
use hearth_db::{DbError, LocalDb};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use thiserror::Error;

/// Why a single step was rolled back.
#[derive(Error, Debug)]
enum StepError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("migration procedure panicked: {0}")]
    Panicked(String),
}

/// Runs pending migrations against a database.
///
/// Every step (the baseline, then each versioned migration) runs in its own
/// transaction together with its `schema_version` row, so a step is either
/// fully committed or leaves no trace. The first failing step halts the run.
#[derive(Debug, Clone, Copy)]
pub struct MigrationExecutor<'a> {
    catalog: &'a MigrationCatalog,
    backup: &'a BackupGuard,
}

impl<'a> MigrationExecutor<'a> {
    pub fn new(catalog: &'a MigrationCatalog, backup: &'a BackupGuard) -> Self {
        Self { catalog, backup }
    }

    /// Bring `db`, currently at `current`, up to the newest catalog version.
    ///
    /// Returns `Ok` for completed and halted runs alike; check
    /// [`MigrationReport::halted`]. Errors mean nothing was attempted: an
    /// invalid catalog, an unsupported `current`, or a missing backup.
    pub fn run(&self, db: &mut LocalDb, current: CurrentVersion) -> MigrationResult<MigrationReport> {
        let mut tracker = RunTracker::new();

        tracker.advance(RunState::Validating);
        validate(self.catalog)?;
        let plan = plan_migrations(self.catalog, current)?;

        let backup = if plan.requires_backup() {
            match self.backup.verify() {
                Ok(path) => BackupStatus::Verified(path),
                Err(source) => {
                    log::error!(
                        "Refusing to migrate from {current}: {source}; no migration was attempted"
                    );
                    return Err(MigrationError::NoBackup { current, source });
                }
            }
        } else {
            BackupStatus::NotRequired
        };
        tracker.advance(RunState::BackupChecked);

        tracker.advance(RunState::Executing);
        let steps: Vec<(&MigrationDefinition, bool)> = plan
            .baseline()
            .map(|baseline| (baseline, true))
            .into_iter()
            .chain(plan.migrations().iter().map(|m| (*m, false)))
            .collect();

        let mut outcomes: Vec<MigrationOutcome> = steps
            .iter()
            .map(|(m, _)| MigrationOutcome {
                version: m.version,
                description: m.description.to_string(),
                state: MigrationState::Pending,
            })
            .collect();
        let mut applied = Vec::new();
        let mut halted = None;
        let mut ending_version = current;
        let mut baseline_applied = false;

        if steps.is_empty() {
            log::debug!("Schema already at {current}; nothing to apply");
        }

        for (outcome, (migration, is_baseline)) in outcomes.iter_mut().zip(&steps) {
            outcome.state = MigrationState::Applying;
            log::debug!("Applying v{} ({})", migration.version, migration.description);
            let started = Instant::now();

            match apply_step(db, migration, *is_baseline) {
                Ok(migrated_at) => {
                    outcome.state = MigrationState::Committed;
                    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                    log::info!(
                        "Applied migration v{} ({}) in {duration_ms}ms",
                        migration.version,
                        migration.description
                    );
                    ending_version = CurrentVersion::At(migration.version);
                    baseline_applied |= *is_baseline;
                    applied.push(AppliedMigration {
                        version: migration.version,
                        description: migration.description.to_string(),
                        migrated_at,
                        duration_ms,
                    });
                }
                Err(err) => {
                    outcome.state = MigrationState::RolledBack;
                    log::error!(
                        "Migration v{} ({}) failed and was rolled back: {err}",
                        migration.version,
                        migration.description
                    );
                    halted = Some(HaltedMigration {
                        version: migration.version,
                        description: migration.description.to_string(),
                        reason: err.to_string(),
                    });
                    break;
                }
            }
        }

        tracker.advance(if halted.is_some() {
            RunState::Halted
        } else {
            RunState::Completed
        });

        Ok(MigrationReport {
            starting_version: current,
            ending_version,
            baseline_applied,
            applied,
            halted,
            backup,
            state: tracker.state(),
            outcomes,
        })
    }
}

/// Apply one step and record it, in a single transaction.
fn apply_step(
    db: &mut LocalDb,
    migration: &MigrationDefinition,
    is_baseline: bool,
) -> Result<String, StepError> {
    db.transaction(|conn| {
        if is_baseline {
            audit::ensure_version_table(conn)?;
        }
        apply_guarded(migration, conn)?;
        Ok(audit::record_applied(
            conn,
            migration.version,
            migration.description,
        )?)
    })
}

/// Run the procedure, turning a panic into a step failure so the
/// transaction is rolled back explicitly.
fn apply_guarded(migration: &MigrationDefinition, conn: &Connection) -> Result<(), StepError> {
    match panic::catch_unwind(AssertUnwindSafe(|| migration.apply(conn))) {
        Ok(result) => Ok(result?),
        Err(payload) => Err(StepError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
