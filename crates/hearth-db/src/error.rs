//! Error types for hearth-db

use thiserror::Error;

/// Local database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not found (D003)
    #[error("[D003] Table or view not found: {0}")]
    TableNotFound(String),

    /// Transaction management error (D004)
    #[error("[D004] Transaction failed: {0}")]
    TransactionError(String),

    /// DuckDB driver error with preserved source chain (D005)
    #[error("[D005] DuckDB error: {0}")]
    DuckDb(#[source] duckdb::Error),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured variants for catalog
        // errors, so missing relations are recognised by message.
        let msg = err.to_string();
        if msg.contains("Table with name")
            || msg.contains("View with name")
            || msg.contains("Table or view with name")
            || (msg.contains("Catalog Error") && msg.contains("Table") && msg.contains("not found"))
        {
            DbError::TableNotFound(msg)
        } else {
            DbError::DuckDb(err)
        }
    }
}
