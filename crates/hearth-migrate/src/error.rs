//! Error types for the migration engine.

use crate::backup::{BackupStatus, NoBackupFound};
use crate::report::MigrationReport;
use crate::validator::SequenceError;
use crate::version::CurrentVersion;
use hearth_db::DbError;
use thiserror::Error;

/// Migration engine errors.
///
/// Every variant is terminal for the current startup attempt. The host must
/// not hand the database to the rest of the app after receiving one.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// The compiled-in catalog is inconsistent (MG001)
    #[error("[MG001] Migration catalog is invalid: {0}")]
    Catalog(#[from] SequenceError),

    /// The database was written by a newer build (MG002)
    #[error("[MG002] Database schema v{persisted} is newer than this build supports (newest known: v{known_max})")]
    FutureSchema { persisted: u32, known_max: u32 },

    /// The database predates the supported baseline (MG003)
    #[error("[MG003] Database schema v{persisted} predates the supported baseline v{baseline}")]
    BelowBaseline { persisted: u32, baseline: u32 },

    /// No pre-migration backup, so no schema change was attempted (MG004)
    #[error("[MG004] Cannot safely upgrade the local database from {current}: {source}")]
    NoBackup {
        current: CurrentVersion,
        #[source]
        source: NoBackupFound,
    },

    /// A migration failed and was rolled back; the run halted (MG005)
    #[error("[MG005] Migration v{version} ({description}) failed and was rolled back: {cause}")]
    MigrationFailed {
        version: u32,
        description: String,
        cause: String,
        report: Box<MigrationReport>,
    },

    /// The database could not be read or written (MG006)
    #[error("[MG006] Local database error: {0}")]
    Database(#[from] DbError),
}

/// Result type alias for [`MigrationError`].
pub type MigrationResult<T> = Result<T, MigrationError>;

impl MigrationError {
    /// The newest schema version known to be intact.
    ///
    /// `None` when the failure happened before the database was read, or
    /// when reading it failed.
    pub fn last_good_version(&self) -> Option<CurrentVersion> {
        match self {
            MigrationError::FutureSchema { persisted, .. }
            | MigrationError::BelowBaseline { persisted, .. } => {
                Some(CurrentVersion::At(*persisted))
            }
            MigrationError::NoBackup { current, .. } => Some(*current),
            MigrationError::MigrationFailed { report, .. } => Some(report.ending_version),
            MigrationError::Catalog(_) | MigrationError::Database(_) => None,
        }
    }

    /// What is known about the pre-migration backup.
    ///
    /// `None` when the run stopped before the backup gate was reached.
    pub fn backup_status(&self) -> Option<BackupStatus> {
        match self {
            MigrationError::NoBackup { .. } => Some(BackupStatus::Missing),
            MigrationError::MigrationFailed { report, .. } => Some(report.backup.clone()),
            _ => None,
        }
    }

    /// Packaging defect that only a new release can fix.
    pub fn is_catalog_defect(&self) -> bool {
        matches!(self, MigrationError::Catalog(_))
    }

    /// The user can resolve this without a new release, by creating a
    /// backup and restarting.
    pub fn is_user_recoverable(&self) -> bool {
        matches!(self, MigrationError::NoBackup { .. })
    }
}
