//! hearth-migrate - Schema migration engine for Hearth
//!
//! Evolves the on-disk schema of the local database across app versions
//! without an operator present. A run validates the compiled-in catalog,
//! resolves the persisted schema version, refuses to touch an existing
//! database unless a pre-migration backup exists, and then applies each
//! pending migration in its own transaction, recording it in the
//! `schema_version` audit table. A failed migration is rolled back and halts
//! the run; nothing is retried.
//!
//! [`MigrationEngine`] is the entry point for the application shell:
//! [`MigrationEngine::initialize`] once at startup and
//! [`MigrationEngine::dry_run`] from diagnostics.

pub mod audit;
pub mod backup;
pub mod catalog;
pub mod dry_run;
pub mod engine;
pub mod error;
pub mod executor;
pub mod plan;
pub mod report;
pub mod resolver;
pub mod state;
pub mod validator;
pub mod version;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use audit::SchemaVersionRecord;
pub use backup::{BackupConvention, BackupGuard, BackupStatus, NoBackupFound};
pub use catalog::{ApplyFn, MigrationCatalog, MigrationDefinition, Procedure};
pub use dry_run::{DryRunPlanner, MigrationPlanReport, PlannedMigration};
pub use engine::MigrationEngine;
pub use error::{MigrationError, MigrationResult};
pub use executor::MigrationExecutor;
pub use plan::{plan_migrations, MigrationPlan};
pub use report::{AppliedMigration, HaltedMigration, MigrationOutcome, MigrationReport};
pub use state::{MigrationState, RunState};
pub use validator::{validate, SequenceError};
pub use version::CurrentVersion;
