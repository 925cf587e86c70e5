//! hearth-core - Core library for Hearth
//!
//! This crate provides the `hearth.yml` configuration types and the shared
//! error type used by the local database layer, the migration engine, and
//! the CLI.

pub mod config;
pub mod error;
pub(crate) mod serde_helpers;

pub use config::{BackupConfig, Config, DatabaseConfig};
pub use error::{CoreError, CoreResult};
