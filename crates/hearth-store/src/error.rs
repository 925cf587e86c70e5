//! Error types for hearth-store

use hearth_core::CoreError;
use hearth_db::DbError;
use hearth_migrate::MigrationError;
use thiserror::Error;

/// Errors raised while opening or inspecting the local database
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Config(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Migration(#[from] MigrationError),
}

/// Result type alias for StoreError
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// The migration failure behind this error, if any
    pub fn as_migration(&self) -> Option<&MigrationError> {
        match self {
            StoreError::Migration(err) => Some(err),
            _ => None,
        }
    }
}
