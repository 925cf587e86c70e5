use super::*;
use crate::test_utils::*;
use crate::catalog::Procedure;
use hearth_db::introspect::{column_exists, table_exists};

fn run(
    catalog: &MigrationCatalog,
    guard: &BackupGuard,
    db: &mut LocalDb,
    current: CurrentVersion,
) -> MigrationReport {
    MigrationExecutor::new(catalog, guard).run(db, current).unwrap()
}

#[test]
fn test_fresh_database_gets_baseline_and_all_migrations() {
    let catalog = scenario_catalog();
    let mut db = LocalDb::open_memory().unwrap();

    let report = run(&catalog, &guard_nowhere(), &mut db, CurrentVersion::Fresh);

    assert!(report.is_complete());
    assert!(report.baseline_applied);
    assert_eq!(report.applied_versions(), vec![29, 30, 31]);
    assert_eq!(report.ending_version, CurrentVersion::At(31));
    assert_eq!(report.backup, BackupStatus::NotRequired);
    assert_eq!(
        version_rows(db.conn()),
        vec![
            (29, "baseline schema".to_string()),
            (30, "add X column".to_string()),
            (31, "add Y table".to_string()),
        ]
    );
}

#[test]
fn test_happy_path_from_29() {
    let catalog = scenario_catalog();
    let mut db = db_at(&catalog, 29);
    let (_dir, guard) = guard_with_backup();

    let report = run(&catalog, &guard, &mut db, CurrentVersion::At(29));

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(report.applied_versions(), vec![30, 31]);
    assert!(!report.baseline_applied);
    assert!(report.halted.is_none());
    assert!(report.backup.exists());
    assert!(column_exists(db.conn(), "contacts", "x").unwrap());
    assert!(table_exists(db.conn(), "y").unwrap());
    assert_eq!(
        version_rows(db.conn()).iter().map(|(v, _)| *v).collect::<Vec<_>>(),
        vec![29, 30, 31]
    );
    assert!(report
        .outcomes
        .iter()
        .all(|o| o.state == MigrationState::Committed));
}

#[test]
fn test_mid_failure_keeps_earlier_migration() {
    let catalog = catalog_of(&[ADD_X_COLUMN, ADD_Y_TABLE_FAILING]);
    let mut db = db_at(&catalog, 29);
    let (_dir, guard) = guard_with_backup();

    let report = run(&catalog, &guard, &mut db, CurrentVersion::At(29));

    assert_eq!(report.state, RunState::Halted);
    assert_eq!(report.applied_versions(), vec![30]);
    assert_eq!(report.ending_version, CurrentVersion::At(30));
    let halted = report.halted.as_ref().unwrap();
    assert_eq!(halted.version, 31);
    assert_eq!(halted.description, "add Y table");
    assert!(halted.reason.contains("simulated failure"));

    assert!(column_exists(db.conn(), "contacts", "x").unwrap());
    assert!(!table_exists(db.conn(), "y").unwrap());
    assert!(!column_exists(db.conn(), "contacts", "y_ref").unwrap());
    assert_eq!(contact_names(db.conn()), vec!["Ada", "Brook"]);
    assert_eq!(
        version_rows(db.conn()).last().map(|(v, _)| *v),
        Some(30)
    );
    assert_eq!(report.outcomes[1].state, MigrationState::RolledBack);
}

#[test]
fn test_failure_stops_later_migrations() {
    fn fail(_: &Connection) -> hearth_db::DbResult<()> {
        Err(DbError::ExecutionError("broken".to_string()))
    }
    let catalog = catalog_of(&[
        MigrationDefinition::rust(30, "add X column", fail),
        ADD_Y_TABLE,
    ]);
    let mut db = db_at(&catalog, 29);
    let (_dir, guard) = guard_with_backup();

    let report = run(&catalog, &guard, &mut db, CurrentVersion::At(29));

    assert_eq!(report.halted.as_ref().map(|h| h.version), Some(30));
    assert!(report.applied.is_empty());
    assert_eq!(report.ending_version, CurrentVersion::At(29));
    assert!(!table_exists(db.conn(), "y").unwrap());
    assert_eq!(report.outcomes[0].state, MigrationState::RolledBack);
    assert_eq!(report.outcomes[1].state, MigrationState::Pending);
}

#[test]
fn test_failed_migration_leaves_no_trace() {
    for failing in [ADD_Y_TABLE_FAILING, ADD_Y_TABLE_BAD_SQL, ADD_Y_TABLE_PANICKING] {
        let catalog = catalog_of(&[ADD_X_COLUMN, failing]);
        let mut db = db_at(&catalog, 30);
        let (_dir, guard) = guard_with_backup();
        let before = snapshot(db.conn());

        let report = run(&catalog, &guard, &mut db, CurrentVersion::At(30));

        assert_eq!(report.halted.as_ref().map(|h| h.version), Some(31));
        assert_eq!(snapshot(db.conn()), before, "{:?} left a trace", failing.procedure);
        assert_eq!(contact_names(db.conn()), vec!["Ada", "Brook"]);
    }
}

#[test]
fn test_panic_is_reported_as_halt() {
    let catalog = catalog_of(&[ADD_X_COLUMN, ADD_Y_TABLE_PANICKING]);
    let mut db = db_at(&catalog, 30);
    let (_dir, guard) = guard_with_backup();

    let report = run(&catalog, &guard, &mut db, CurrentVersion::At(30));

    let reason = &report.halted.as_ref().unwrap().reason;
    assert!(reason.starts_with("migration procedure panicked:"), "{reason}");
    assert!(reason.contains("simulated panic"));
}

#[test]
fn test_missing_backup_blocks_every_write() {
    let catalog = scenario_catalog();
    let mut db = db_at(&catalog, 29);
    let (_dir, guard) = guard_without_backup();
    let before = snapshot(db.conn());

    let err = MigrationExecutor::new(&catalog, &guard)
        .run(&mut db, CurrentVersion::At(29))
        .unwrap_err();

    assert!(matches!(
        err,
        MigrationError::NoBackup {
            current: CurrentVersion::At(29),
            ..
        }
    ));
    assert_eq!(err.backup_status(), Some(BackupStatus::Missing));
    assert_eq!(snapshot(db.conn()), before);
}

#[test]
fn test_fresh_database_needs_no_backup() {
    let catalog = scenario_catalog();
    let mut db = LocalDb::open_memory().unwrap();
    let (_dir, guard) = guard_without_backup();

    let report = run(&catalog, &guard, &mut db, CurrentVersion::Fresh);

    assert!(report.is_complete());
    assert_eq!(report.backup, BackupStatus::NotRequired);
}

#[test]
fn test_up_to_date_needs_no_backup() {
    let catalog = scenario_catalog();
    let mut db = db_at(&catalog, 31);
    let before = snapshot(db.conn());

    let report = run(&catalog, &guard_nowhere(), &mut db, CurrentVersion::At(31));

    assert!(report.is_noop());
    assert!(report.outcomes.is_empty());
    assert_eq!(report.state, RunState::Completed);
    assert_eq!(snapshot(db.conn()), before);
}

#[test]
fn test_applies_in_ascending_order() {
    fn needs_x(conn: &Connection) -> hearth_db::DbResult<()> {
        conn.execute_batch("UPDATE contacts SET x = 'seen';")?;
        Ok(())
    }
    // 31 depends on 30, declared first.
    let catalog = catalog_of(&[
        MigrationDefinition::rust(31, "use X column", needs_x),
        ADD_X_COLUMN,
    ]);
    let mut db = db_at(&catalog, 29);
    let (_dir, guard) = guard_with_backup();

    let report = run(&catalog, &guard, &mut db, CurrentVersion::At(29));

    assert!(report.is_complete(), "{:?}", report.halted);
    assert_eq!(report.applied_versions(), vec![30, 31]);
}

#[test]
fn test_invalid_catalog_is_rejected_before_any_write() {
    let catalog = catalog_with_versions(29, &[30, 32]);
    let mut db = LocalDb::open_memory().unwrap();

    let err = MigrationExecutor::new(&catalog, &guard_nowhere())
        .run(&mut db, CurrentVersion::Fresh)
        .unwrap_err();

    assert!(err.is_catalog_defect());
    assert!(!table_exists(db.conn(), "schema_version").unwrap());
}

#[test]
fn test_future_version_is_rejected() {
    let catalog = scenario_catalog();
    let mut db = db_at(&catalog, 31);

    let err = MigrationExecutor::new(&catalog, &guard_nowhere())
        .run(&mut db, CurrentVersion::At(99))
        .unwrap_err();

    assert!(matches!(err, MigrationError::FutureSchema { persisted: 99, .. }));
}

#[test]
fn test_baseline_failure_leaves_database_fresh() {
    let catalog = MigrationCatalog::new(
        29,
        Procedure::Sql("CREATE TABLE contacts (id VARCHAR); SELECT * FROM missing_table;"),
        [ADD_X_COLUMN],
    );
    let mut db = LocalDb::open_memory().unwrap();

    let report = run(&catalog, &guard_nowhere(), &mut db, CurrentVersion::Fresh);

    assert_eq!(report.halted.as_ref().map(|h| h.version), Some(29));
    assert!(!report.baseline_applied);
    assert_eq!(report.ending_version, CurrentVersion::Fresh);
    assert!(!table_exists(db.conn(), "schema_version").unwrap());
    assert!(!table_exists(db.conn(), "contacts").unwrap());
}

#[test]
fn test_read_only_database_halts_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hearth.duckdb");
    {
        let mut db = LocalDb::open(&path).unwrap();
        migrate_to(&mut db, &scenario_catalog(), 30);
    }
    let mut db = LocalDb::open_read_only(&path).unwrap();
    let (_backups, guard) = guard_with_backup();

    let report = run(&scenario_catalog(), &guard, &mut db, CurrentVersion::At(30));

    assert_eq!(report.halted.as_ref().map(|h| h.version), Some(31));
    assert!(!table_exists(db.conn(), "y").unwrap());
}

#[test]
fn test_panic_message_extraction() {
    assert_eq!(panic_message(&"static"), "static");
    assert_eq!(panic_message(&String::from("owned")), "owned");
    assert_eq!(panic_message(&42u8), "non-string panic payload");
}
