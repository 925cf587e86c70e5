//! The `schema_version` audit table.
//!
//! One row per applied migration (plus one for the baseline). Rows are only
//! ever inserted, in the same transaction as the change they describe, so the
//! highest version in the table is the schema version of the database.

use chrono::{SecondsFormat, Utc};
use duckdb::Connection;
use hearth_db::introspect::table_exists;
use hearth_db::{DbError, DbResult};
use serde::Serialize;

/// Name of the audit table.
pub const VERSION_TABLE: &str = "schema_version";

/// One row of `schema_version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaVersionRecord {
    pub version: u32,
    pub description: String,
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub migrated_at: String,
}

/// Create `schema_version` if it does not exist yet.
pub(crate) fn ensure_version_table(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
             version     INTEGER PRIMARY KEY,
             description TEXT NOT NULL,
             migrated_at TEXT NOT NULL
         );",
    )
    .map_err(|e| {
        DbError::ExecutionError(format!("failed to create schema_version table: {e}"))
    })?;
    Ok(())
}

/// Highest recorded version, or `None` when the table is missing or empty.
pub fn max_version(conn: &Connection) -> DbResult<Option<u32>> {
    if !table_exists(conn, VERSION_TABLE)? {
        return Ok(None);
    }

    let max: Option<i64> = conn
        .query_row("SELECT CAST(MAX(version) AS BIGINT) FROM schema_version", [], |row| {
            row.get(0)
        })
        .map_err(|e| DbError::ExecutionError(format!("failed to read schema version: {e}")))?;

    max.map(|v| {
        u32::try_from(v).map_err(|_| {
            DbError::ExecutionError(format!("schema_version holds out-of-range version {v}"))
        })
    })
    .transpose()
}

/// Insert the audit row for `version`, returning the recorded timestamp.
pub(crate) fn record_applied(
    conn: &Connection,
    version: u32,
    description: &str,
) -> DbResult<String> {
    let migrated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    conn.execute(
        "INSERT INTO schema_version (version, description, migrated_at) VALUES (?, ?, ?)",
        duckdb::params![version, description, migrated_at],
    )
    .map_err(|e| {
        DbError::ExecutionError(format!("failed to record migration v{version}: {e}"))
    })?;
    Ok(migrated_at)
}

/// Every recorded row, ascending by version. Empty when the table is missing.
pub fn history(conn: &Connection) -> DbResult<Vec<SchemaVersionRecord>> {
    if !table_exists(conn, VERSION_TABLE)? {
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare(
        "SELECT CAST(version AS BIGINT), description, migrated_at
         FROM schema_version ORDER BY version",
    )?;
    let rows = stmt.query_map([], |row| {
        let version: i64 = row.get(0)?;
        Ok((version, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (version, description, migrated_at) = row?;
        let version = u32::try_from(version).map_err(|_| {
            DbError::ExecutionError(format!(
                "schema_version holds out-of-range version {version}"
            ))
        })?;
        records.push(SchemaVersionRecord {
            version,
            description,
            migrated_at,
        });
    }
    Ok(records)
}
