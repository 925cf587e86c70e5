//! Catalog introspection over DuckDB's `information_schema`.

use crate::error::DbResult;
use duckdb::Connection;

/// Schema that holds the app's tables.
pub const DEFAULT_SCHEMA: &str = "main";

/// One column as seen by `information_schema.columns`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSnapshot {
    pub table: String,
    pub column: String,
    pub data_type: String,
}

/// Check whether a base table or view named `table` exists.
pub fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM information_schema.tables
         WHERE table_schema = ? AND table_name = ?",
        duckdb::params![DEFAULT_SCHEMA, table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Check whether `table` has a column named `column`.
pub fn column_exists(conn: &Connection, table: &str, column: &str) -> DbResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM information_schema.columns
         WHERE table_schema = ? AND table_name = ? AND column_name = ?",
        duckdb::params![DEFAULT_SCHEMA, table, column],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// List base tables, sorted by name.
pub fn list_tables(conn: &Connection) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT table_name FROM information_schema.tables
         WHERE table_schema = ? AND table_type = 'BASE TABLE'
         ORDER BY table_name",
    )?;
    let rows = stmt.query_map(duckdb::params![DEFAULT_SCHEMA], |row| row.get(0))?;
    let mut tables = Vec::new();
    for row in rows {
        tables.push(row?);
    }
    Ok(tables)
}

/// Count rows in `table`.
///
/// `table` is interpolated as an identifier; callers pass names from
/// [`list_tables`] or compiled-in constants, never user input.
pub fn row_count(conn: &Connection, table: &str) -> DbResult<i64> {
    let count = conn.query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| {
        row.get(0)
    })?;
    Ok(count)
}

/// Every column of every table and view, ordered by table then position.
///
/// Two snapshots compare equal exactly when the visible schema is the same.
pub fn schema_snapshot(conn: &Connection) -> DbResult<Vec<ColumnSnapshot>> {
    let mut stmt = conn.prepare(
        "SELECT table_name, column_name, data_type FROM information_schema.columns
         WHERE table_schema = ?
         ORDER BY table_name, ordinal_position",
    )?;
    let rows = stmt.query_map(duckdb::params![DEFAULT_SCHEMA], |row| {
        Ok(ColumnSnapshot {
            table: row.get(0)?,
            column: row.get(1)?,
            data_type: row.get(2)?,
        })
    })?;
    let mut columns = Vec::new();
    for row in rows {
        columns.push(row?);
    }
    Ok(columns)
}
