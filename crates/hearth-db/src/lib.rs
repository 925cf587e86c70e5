//! hearth-db - Local database layer for Hearth
//!
//! Wraps the single-file DuckDB database behind the desktop app and provides
//! the transaction guard and `information_schema` helpers the migration
//! engine builds on.

pub mod connection;
pub mod error;
pub mod introspect;

pub use connection::LocalDb;
pub use error::{DbError, DbResult};
