//! Shared test utilities for hearth-migrate
//!
//! Synthetic catalogs modelled on a database whose baseline is v29, with
//! migrations 30 ("add X column") and 31 ("add Y table").

use crate::audit;
use crate::backup::{BackupConvention, BackupGuard};
use crate::catalog::{MigrationCatalog, MigrationDefinition, Procedure};
use crate::executor::MigrationExecutor;
use crate::version::CurrentVersion;
use duckdb::Connection;
use hearth_db::introspect::{schema_snapshot, ColumnSnapshot};
use hearth_db::{DbError, DbResult, LocalDb};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Baseline version used by the synthetic catalogs.
pub const BASELINE_VERSION: u32 = 29;

/// Baseline schema used by the synthetic catalogs.
pub const BASELINE_SQL: &str = "
CREATE TABLE IF NOT EXISTS contacts (
    id           VARCHAR NOT NULL,
    display_name VARCHAR NOT NULL
);
INSERT INTO contacts VALUES ('c1', 'Ada'), ('c2', 'Brook');
";

/// Migration 30: adds column `x` to `contacts`.
pub const ADD_X_COLUMN: MigrationDefinition = MigrationDefinition::sql(
    30,
    "add X column",
    "ALTER TABLE contacts ADD COLUMN x VARCHAR;",
);

/// Migration 31: creates table `y`.
pub const ADD_Y_TABLE: MigrationDefinition = MigrationDefinition::sql(
    31,
    "add Y table",
    "CREATE TABLE y (id INTEGER, label VARCHAR);",
);

/// Migration 31 that does several statements' worth of work and then fails.
pub const ADD_Y_TABLE_FAILING: MigrationDefinition =
    MigrationDefinition::rust(31, "add Y table", add_y_table_then_fail);

/// Migration 31 whose SQL batch fails on its second statement.
pub const ADD_Y_TABLE_BAD_SQL: MigrationDefinition = MigrationDefinition::sql(
    31,
    "add Y table",
    "CREATE TABLE y (id INTEGER, label VARCHAR);
     INSERT INTO table_that_does_not_exist VALUES (1);",
);

/// Migration 31 whose procedure panics after partial work.
pub const ADD_Y_TABLE_PANICKING: MigrationDefinition =
    MigrationDefinition::rust(31, "add Y table", add_y_table_then_panic);

fn add_y_table_then_fail(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "CREATE TABLE y (id INTEGER, label VARCHAR);
         INSERT INTO y VALUES (1, 'partial');
         ALTER TABLE contacts ADD COLUMN y_ref INTEGER;
         UPDATE contacts SET display_name = 'overwritten';",
    )?;
    Err(DbError::ExecutionError(
        "simulated failure after partial work".to_string(),
    ))
}

fn add_y_table_then_panic(conn: &Connection) -> DbResult<()> {
    conn.execute_batch("CREATE TABLE y (id INTEGER, label VARCHAR);")?;
    panic!("simulated panic inside migration procedure");
}

/// A no-op migration at `version`.
pub fn noop(version: u32) -> MigrationDefinition {
    MigrationDefinition::sql(version, "noop", "SELECT 1;")
}

/// Catalog with no-op migrations at exactly `versions`, in the order given.
pub fn catalog_with_versions(baseline: u32, versions: &[u32]) -> MigrationCatalog {
    MigrationCatalog::new(
        baseline,
        Procedure::Sql(BASELINE_SQL),
        versions.iter().map(|&v| noop(v)),
    )
}

/// Baseline v29 plus the given migrations.
pub fn catalog_of(migrations: &[MigrationDefinition]) -> MigrationCatalog {
    MigrationCatalog::new(
        BASELINE_VERSION,
        Procedure::Sql(BASELINE_SQL),
        migrations.iter().copied(),
    )
}

/// Baseline v29 with migrations 30 and 31.
pub fn scenario_catalog() -> MigrationCatalog {
    catalog_of(&[ADD_X_COLUMN, ADD_Y_TABLE])
}

/// `catalog` restricted to migrations at or below `version`.
pub fn truncated(catalog: &MigrationCatalog, version: u32) -> MigrationCatalog {
    MigrationCatalog::new(
        catalog.baseline_version(),
        catalog.baseline().procedure,
        catalog
            .migrations()
            .iter()
            .filter(|m| m.version <= version)
            .copied(),
    )
}

/// File name that satisfies the default backup convention.
pub const BACKUP_FILE_NAME: &str = "pre-migration-v29.duckdb";

/// A backup guard over a temp directory holding one pre-migration snapshot.
pub fn guard_with_backup() -> (TempDir, BackupGuard) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(BACKUP_FILE_NAME), b"snapshot").unwrap();
    let guard = BackupGuard::new(dir.path(), BackupConvention::default());
    (dir, guard)
}

/// A backup guard over an empty temp directory.
pub fn guard_without_backup() -> (TempDir, BackupGuard) {
    let dir = tempfile::tempdir().unwrap();
    let guard = BackupGuard::new(dir.path(), BackupConvention::default());
    (dir, guard)
}

/// A guard pointing at a directory that does not exist.
pub fn guard_nowhere() -> BackupGuard {
    BackupGuard::new(
        PathBuf::from("/nonexistent/hearth/backups"),
        BackupConvention::default(),
    )
}

/// An in-memory database migrated with `catalog` up to `version`.
///
/// Passing the baseline version yields a database holding only the baseline.
pub fn db_at(catalog: &MigrationCatalog, version: u32) -> LocalDb {
    let mut db = LocalDb::open_memory().unwrap();
    migrate_to(&mut db, catalog, version);
    db
}

/// Migrate an existing fresh `db` with `catalog` up to `version`.
pub fn migrate_to(db: &mut LocalDb, catalog: &MigrationCatalog, version: u32) {
    let partial = truncated(catalog, version);
    let report = MigrationExecutor::new(&partial, &guard_nowhere())
        .run(db, CurrentVersion::Fresh)
        .unwrap();
    assert!(report.is_complete(), "fixture migration halted: {report:?}");
}

/// `(version, description)` rows of `schema_version`, ascending.
pub fn version_rows(conn: &Connection) -> Vec<(u32, String)> {
    audit::history(conn)
        .unwrap()
        .into_iter()
        .map(|r| (r.version, r.description))
        .collect()
}

/// Schema plus version table, for before/after comparisons.
pub fn snapshot(conn: &Connection) -> (Vec<ColumnSnapshot>, Vec<(u32, String)>) {
    (schema_snapshot(conn).unwrap(), version_rows(conn))
}

/// Every `display_name` in `contacts`, sorted.
pub fn contact_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT display_name FROM contacts ORDER BY display_name")
        .unwrap();
    let names: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    names
}

/// Write a file named `name` into `dir`.
pub fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"").unwrap();
    path
}
