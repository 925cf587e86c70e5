//! Local database connection wrapper.
//!
//! [`LocalDb`] owns the DuckDB [`Connection`] for the app's data file and
//! provides the transaction guard used by schema migrations.

use crate::error::{DbError, DbResult};
use duckdb::{AccessMode, Config as DriverConfig, Connection};
use hearth_core::DatabaseConfig;
use std::path::{Path, PathBuf};

/// Wrapper around the DuckDB connection to the local data file.
///
/// Single-threaded: migrations run during a dedicated startup phase, so no
/// `Mutex` is needed around the connection.
pub struct LocalDb {
    conn: Connection,
    path: Option<PathBuf>,
    read_only: bool,
}

impl LocalDb {
    /// Open (or create) the database at `path` with driver defaults.
    pub fn open(path: &Path) -> DbResult<Self> {
        Self::connect(Some(path), &DatabaseConfig::default(), false)
    }

    /// Open an existing database file without write access.
    ///
    /// Write transactions are refused, and DuckDB itself rejects any
    /// statement that would modify the file.
    pub fn open_read_only(path: &Path) -> DbResult<Self> {
        if !path.exists() {
            return Err(DbError::ConnectionError(format!(
                "database file does not exist: {}",
                path.display()
            )));
        }
        Self::connect(Some(path), &DatabaseConfig::default(), true)
    }

    /// Create an in-memory database.
    ///
    /// Useful for unit tests that don't need persistence.
    pub fn open_memory() -> DbResult<Self> {
        Self::connect(None, &DatabaseConfig::default(), false)
    }

    /// Open the database described by `config`, resolving relative paths
    /// against `root` and creating the parent directory if needed.
    pub fn from_config(config: &DatabaseConfig, root: &Path) -> DbResult<Self> {
        let Some(path) = config.path_absolute(root) else {
            return Self::connect(None, config, false);
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DbError::ConnectionError(format!(
                    "failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        Self::connect(Some(&path), config, false)
    }

    fn connect(path: Option<&Path>, config: &DatabaseConfig, read_only: bool) -> DbResult<Self> {
        let settings = driver_config(config, read_only)?;
        let conn = match path {
            Some(path) => Connection::open_with_flags(path, settings)
                .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?,
            None => Connection::open_in_memory_with_flags(settings)
                .map_err(|e| DbError::ConnectionError(e.to_string()))?,
        };
        log::debug!(
            "Opened local database {}{}",
            path.map_or_else(|| ":memory:".to_string(), |p| p.display().to_string()),
            if read_only { " (read-only)" } else { "" }
        );
        Ok(Self {
            conn,
            path: path.map(Path::to_path_buf),
            read_only,
        })
    }

    /// Borrow the underlying DuckDB connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// File backing this database, `None` when in memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether the database was opened with [`LocalDb::open_read_only`].
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Execute `body` within a single transaction.
    ///
    /// Commits when `body` returns `Ok` and rolls back when it returns `Err`.
    /// If `body` panics, the driver's transaction guard rolls back while
    /// unwinding, so no partial effects survive either way.
    pub fn transaction<F, T, E>(&mut self, body: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<DbError>,
    {
        if self.read_only {
            return Err(DbError::TransactionError(
                "database was opened read-only".to_string(),
            )
            .into());
        }

        let tx = self
            .conn
            .transaction()
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;

        let outcome = body(&tx);
        match outcome {
            Ok(value) => {
                tx.commit()
                    .map_err(|e| DbError::TransactionError(format!("COMMIT failed: {e}")))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    log::error!("ROLLBACK failed: {rollback_err}");
                }
                Err(err)
            }
        }
    }
}

fn driver_config(config: &DatabaseConfig, read_only: bool) -> DbResult<DriverConfig> {
    let invalid = |e: duckdb::Error| DbError::ConnectionError(format!("invalid setting: {e}"));

    let mut settings = DriverConfig::default();
    if read_only {
        settings = settings.access_mode(AccessMode::ReadOnly).map_err(invalid)?;
    }
    if let Some(threads) = config.threads {
        settings = settings.threads(i64::from(threads)).map_err(invalid)?;
    }
    if let Some(max_memory) = &config.max_memory {
        settings = settings.max_memory(max_memory).map_err(invalid)?;
    }
    Ok(settings)
}

#[cfg(test)]
#[path = "connection_test.rs"]
mod tests;
