//! Startup entry point tying validation, resolution, backup gating, and
//! execution together.

use crate::audit::{self, SchemaVersionRecord};
use crate::backup::BackupGuard;
use crate::catalog::MigrationCatalog;
use crate::dry_run::{DryRunPlanner, MigrationPlanReport};
use crate::error::{MigrationError, MigrationResult};
use crate::executor::MigrationExecutor;
use crate::report::MigrationReport;
use crate::resolver::resolve;
use crate::validator::validate;
use hearth_db::LocalDb;

/// Owns the catalog and backup policy for one application process.
#[derive(Debug, Clone)]
pub struct MigrationEngine {
    catalog: MigrationCatalog,
    backup: BackupGuard,
}

impl MigrationEngine {
    pub fn new(catalog: MigrationCatalog, backup: BackupGuard) -> Self {
        Self { catalog, backup }
    }

    pub fn catalog(&self) -> &MigrationCatalog {
        &self.catalog
    }

    pub fn backup(&self) -> &BackupGuard {
        &self.backup
    }

    /// Bring `db` to the newest schema before anything else may use it.
    ///
    /// Call once per process, before any other component touches the
    /// database. Any error, including a halted run, means the database must
    /// not be used.
    pub fn initialize(&self, db: &mut LocalDb) -> MigrationResult<MigrationReport> {
        let result = self.run(db);
        match &result {
            Ok(report) => log::info!("Local database ready: {}", report.summary()),
            Err(err) => log_fatal(err),
        }
        result
    }

    fn run(&self, db: &mut LocalDb) -> MigrationResult<MigrationReport> {
        // Catalog defects are reported before the database is read.
        validate(&self.catalog)?;
        let current = resolve(db.conn(), &self.catalog)?;
        let report = MigrationExecutor::new(&self.catalog, &self.backup).run(db, current)?;

        match report.halted.clone() {
            None => Ok(report),
            Some(halt) => Err(MigrationError::MigrationFailed {
                version: halt.version,
                description: halt.description,
                cause: halt.reason,
                report: Box::new(report),
            }),
        }
    }

    /// What [`initialize`](Self::initialize) would do right now, without
    /// writing anything or checking for a backup.
    pub fn dry_run(&self, db: &LocalDb) -> MigrationResult<MigrationPlanReport> {
        let result = validate(&self.catalog)
            .map_err(MigrationError::from)
            .and_then(|()| resolve(db.conn(), &self.catalog))
            .and_then(|current| DryRunPlanner::new(&self.catalog).plan(current));
        if let Err(err) = &result {
            log::error!("Dry run failed: {err}");
        }
        result
    }

    /// The `schema_version` audit trail, ascending.
    pub fn history(&self, db: &LocalDb) -> MigrationResult<Vec<SchemaVersionRecord>> {
        Ok(audit::history(db.conn())?)
    }
}

fn log_fatal(err: &MigrationError) {
    let last_good = err
        .last_good_version()
        .map_or_else(|| "unknown".to_string(), |v| v.to_string());
    let backup = match err.backup_status() {
        Some(status) if status.exists() => "present",
        Some(_) => "absent",
        None => "not checked",
    };
    log::error!("Schema migration aborted: {err} (last good version: {last_good}; backup: {backup})");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::BackupStatus;
    use crate::test_utils::*;
    use crate::version::CurrentVersion;

    #[test]
    fn test_initialize_twice_is_noop() {
        let engine = MigrationEngine::new(scenario_catalog(), guard_nowhere());
        let mut db = LocalDb::open_memory().unwrap();

        let first = engine.initialize(&mut db).unwrap();
        let rows = version_rows(db.conn());
        let second = engine.initialize(&mut db).unwrap();

        assert_eq!(first.applied_versions(), vec![29, 30, 31]);
        assert!(second.is_noop());
        assert_eq!(second.backup, BackupStatus::NotRequired);
        assert_eq!(version_rows(db.conn()), rows);
    }

    #[test]
    fn test_halt_becomes_error() {
        let catalog = catalog_of(&[ADD_X_COLUMN, ADD_Y_TABLE_FAILING]);
        let mut db = db_at(&catalog, 29);
        let (_dir, guard) = guard_with_backup();
        let engine = MigrationEngine::new(catalog, guard);

        let err = engine.initialize(&mut db).unwrap_err();

        match &err {
            MigrationError::MigrationFailed {
                version,
                description,
                report,
                ..
            } => {
                assert_eq!(*version, 31);
                assert_eq!(description, "add Y table");
                assert_eq!(report.applied_versions(), vec![30]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.last_good_version(), Some(CurrentVersion::At(30)));
        assert!(err.backup_status().is_some_and(|s| s.exists()));
    }

    #[test]
    fn test_future_schema_leaves_database_alone() {
        let newer = catalog_with_versions(29, &(30..=99).collect::<Vec<_>>());
        let mut db = db_at(&newer, 99);
        let before = snapshot(db.conn());
        let engine = MigrationEngine::new(scenario_catalog(), guard_nowhere());

        let err = engine.initialize(&mut db).unwrap_err();

        assert!(matches!(
            err,
            MigrationError::FutureSchema {
                persisted: 99,
                known_max: 31
            }
        ));
        assert_eq!(err.last_good_version(), Some(CurrentVersion::At(99)));
        assert!(engine.dry_run(&db).is_err());
        assert_eq!(snapshot(db.conn()), before);
    }

    #[test]
    fn test_invalid_catalog_checked_before_database() {
        let engine = MigrationEngine::new(catalog_with_versions(29, &[30, 30]), guard_nowhere());
        let mut db = LocalDb::open_memory().unwrap();
        let err = engine.initialize(&mut db).unwrap_err();
        assert!(err.is_catalog_defect());
        assert_eq!(err.last_good_version(), None);
    }

    #[test]
    fn test_dry_run_and_history() {
        let catalog = scenario_catalog();
        let db = db_at(&catalog, 30);
        let engine = MigrationEngine::new(catalog, guard_nowhere());

        let plan = engine.dry_run(&db).unwrap();
        assert_eq!(plan.current_version, CurrentVersion::At(30));
        assert_eq!(plan.pending_versions(), vec![31]);
        assert!(plan.backup_required);

        let history = engine.history(&db).unwrap();
        assert_eq!(
            history.iter().map(|r| r.version).collect::<Vec<_>>(),
            vec![29, 30]
        );
    }
}
