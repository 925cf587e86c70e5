//! Opening the local database behind the migration gate.

use crate::ddl::catalog;
use crate::error::StoreResult;
use duckdb::Connection;
use hearth_core::Config;
use hearth_db::LocalDb;
use hearth_migrate::{
    audit, validate, BackupGuard, CurrentVersion, DryRunPlanner, MigrationEngine,
    MigrationPlanReport, MigrationReport, SchemaVersionRecord,
};
use std::path::{Path, PathBuf};

/// The application's database, at the newest schema version.
///
/// Only [`Store::open`] constructs one, so nothing can reach the data before
/// migrations have run.
pub struct Store {
    db: LocalDb,
    report: MigrationReport,
}

impl Store {
    /// Open the configured database and migrate it.
    ///
    /// `root` is the directory relative paths in `config` resolve against.
    pub fn open(config: &Config, root: &Path) -> StoreResult<Self> {
        let mut db = LocalDb::from_config(&config.database, root)?;
        let report = engine(config, root).initialize(&mut db)?;
        Ok(Self { db, report })
    }

    /// Borrow the migrated connection.
    pub fn conn(&self) -> &Connection {
        self.db.conn()
    }

    /// Database file, `None` when in memory.
    pub fn path(&self) -> Option<&Path> {
        self.db.path()
    }

    /// What the startup migration did.
    pub fn migration_report(&self) -> &MigrationReport {
        &self.report
    }

    /// The `schema_version` audit trail.
    pub fn history(&self) -> StoreResult<Vec<SchemaVersionRecord>> {
        Ok(audit::history(self.db.conn())?)
    }
}

/// Dry run against the configured database.
///
/// A database file that does not exist yet is reported as fresh without
/// being created; an existing one is opened read-only.
pub fn inspect(config: &Config, root: &Path) -> StoreResult<MigrationPlanReport> {
    let engine = engine(config, root);
    match existing_file(config, root) {
        Some(path) => {
            let db = LocalDb::open_read_only(&path)?;
            Ok(engine.dry_run(&db)?)
        }
        None => {
            validate(engine.catalog()).map_err(hearth_migrate::MigrationError::from)?;
            Ok(DryRunPlanner::new(engine.catalog()).plan(CurrentVersion::Fresh)?)
        }
    }
}

/// The audit trail of the configured database, read-only.
///
/// Empty when the database does not exist yet.
pub fn history(config: &Config, root: &Path) -> StoreResult<Vec<SchemaVersionRecord>> {
    match existing_file(config, root) {
        Some(path) => {
            let db = LocalDb::open_read_only(&path)?;
            Ok(audit::history(db.conn())?)
        }
        None => Ok(Vec::new()),
    }
}

fn engine(config: &Config, root: &Path) -> MigrationEngine {
    MigrationEngine::new(catalog(), BackupGuard::from_config(&config.backup, root))
}

/// The configured database file, if it exists. In-memory databases never do.
fn existing_file(config: &Config, root: &Path) -> Option<PathBuf> {
    config
        .database
        .path_absolute(root)
        .filter(|path| path.exists())
}
