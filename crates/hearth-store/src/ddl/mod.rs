//! The application's schema history.
//!
//! The baseline and SQL migrations are numbered `.sql` files embedded via
//! `include_str!`. Changes that need to inspect existing state first are
//! Rust procedures. New migrations are appended with the next version.

use duckdb::Connection;
use hearth_db::introspect::column_exists;
use hearth_db::DbResult;
use hearth_migrate::{MigrationCatalog, MigrationDefinition, Procedure};

/// Oldest schema version this build can start from.
pub const BASELINE_VERSION: u32 = 29;

const BASELINE_SQL: &str = include_str!("v029_baseline.sql");

const MIGRATIONS: [MigrationDefinition; 3] = [
    MigrationDefinition::sql(
        30,
        "add contact nickname",
        include_str!("v030_contact_nickname.sql"),
    ),
    MigrationDefinition::sql(
        31,
        "add import run log",
        include_str!("v031_import_runs.sql"),
    ),
    MigrationDefinition::rust(32, "backfill contact sort key", add_contact_sort_key),
];

/// The catalog compiled into this build.
pub fn catalog() -> MigrationCatalog {
    MigrationCatalog::new(BASELINE_VERSION, Procedure::Sql(BASELINE_SQL), MIGRATIONS)
}

/// v32: some builds shipped the `sort_key` column ahead of the migration, so
/// only add it where missing, then fill it for every existing contact.
fn add_contact_sort_key(conn: &Connection) -> DbResult<()> {
    if !column_exists(conn, "contacts", "sort_key")? {
        conn.execute_batch("ALTER TABLE contacts ADD COLUMN sort_key VARCHAR;")?;
    }
    conn.execute_batch(
        "UPDATE contacts SET sort_key = lower(trim(display_name)) WHERE sort_key IS NULL;",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_db::LocalDb;

    #[test]
    fn test_catalog_is_valid() {
        let catalog = catalog();
        assert_eq!(hearth_migrate::validate(&catalog), Ok(()));
        assert_eq!(catalog.baseline_version(), BASELINE_VERSION);
        assert_eq!(catalog.max_version(), 32);
    }

    #[test]
    fn test_sort_key_backfill_tolerates_existing_column() {
        let db = LocalDb::open_memory().unwrap();
        db.conn().execute_batch(BASELINE_SQL).unwrap();
        db.conn()
            .execute_batch(
                "ALTER TABLE contacts ADD COLUMN sort_key VARCHAR;
                 INSERT INTO contacts (contact_id, display_name, sort_key)
                 VALUES ('c1', ' Ada ', NULL), ('c2', 'Brook', 'custom');",
            )
            .unwrap();

        add_contact_sort_key(db.conn()).unwrap();

        let mut stmt = db
            .conn()
            .prepare("SELECT sort_key FROM contacts ORDER BY contact_id")
            .unwrap();
        let keys: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(keys, vec!["ada", "custom"]);
    }
}
