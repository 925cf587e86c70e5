//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use hearth_core::Config;
use hearth_migrate::{BackupStatus, MigrationError};
use hearth_store::StoreError;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that destructors (and the database connection) close cleanly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) u8);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; the command has already reported the failure.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// The compiled-in catalog is broken.
pub(crate) const EXIT_CATALOG: u8 = 2;
/// No pre-migration backup; create one and retry.
pub(crate) const EXIT_NO_BACKUP: u8 = 3;
/// A migration failed and was rolled back.
pub(crate) const EXIT_MIGRATION_FAILED: u8 = 4;
/// The database schema is outside the range this build supports.
pub(crate) const EXIT_UNSUPPORTED_SCHEMA: u8 = 5;

/// Exit code for a migration failure.
pub(crate) fn exit_code_for(err: &MigrationError) -> u8 {
    match err {
        MigrationError::Catalog(_) => EXIT_CATALOG,
        MigrationError::NoBackup { .. } => EXIT_NO_BACKUP,
        MigrationError::MigrationFailed { .. } => EXIT_MIGRATION_FAILED,
        MigrationError::FutureSchema { .. } | MigrationError::BelowBaseline { .. } => {
            EXIT_UNSUPPORTED_SCHEMA
        }
        MigrationError::Database(_) => 1,
    }
}

/// Load `hearth.yml` and apply command-line overrides.
///
/// Returns the config and the directory its relative paths resolve against.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<(Config, PathBuf)> {
    let (mut config, root) = match &global.config {
        Some(path) => {
            let path = Path::new(path);
            let config = Config::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            let root = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            (config, root)
        }
        None => {
            let root = PathBuf::from(&global.project_dir);
            let config = Config::load_from_dir_or_default(&root).context("Failed to load config")?;
            (config, root)
        }
    };

    if let Some(database) = &global.database {
        config.database.path = database.clone();
        config.validate().context("Invalid --database override")?;
    }
    log::debug!("Using database {} (root {})", config.database.path, root.display());
    Ok((config, root))
}

/// Machine-readable form of a fatal migration error.
#[derive(Debug, Serialize)]
pub(crate) struct FailureOutput {
    pub error: String,
    pub last_good_version: Option<hearth_migrate::CurrentVersion>,
    pub backup: Option<BackupStatus>,
    pub report: Option<hearth_migrate::MigrationReport>,
}

impl From<&MigrationError> for FailureOutput {
    fn from(err: &MigrationError) -> Self {
        let report = match err {
            MigrationError::MigrationFailed { report, .. } => Some(report.as_ref().clone()),
            _ => None,
        };
        Self {
            error: err.to_string(),
            last_good_version: err.last_good_version(),
            backup: err.backup_status(),
            report,
        }
    }
}

/// Report a store error and turn it into the matching exit code.
///
/// Migration failures are printed with the last good version and the
/// backup situation so the user knows how to recover. Other errors are
/// returned with `context` attached.
pub(crate) fn fail(err: StoreError, json: bool, context: &str) -> anyhow::Error {
    let StoreError::Migration(err) = err else {
        return anyhow::Error::new(err).context(context.to_string());
    };

    if json {
        match serde_json::to_string_pretty(&FailureOutput::from(&err)) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("Error: {err} (JSON output failed: {e})"),
        }
    } else {
        eprintln!("Error: {err}");
        if let Some(version) = err.last_good_version() {
            eprintln!("  Last good schema version: {version}");
        }
        match err.backup_status() {
            Some(BackupStatus::Verified(path)) => {
                eprintln!("  Pre-migration backup: {}", path.display());
            }
            Some(BackupStatus::Missing) => {
                eprintln!("  Pre-migration backup: none found; create one and retry");
            }
            Some(BackupStatus::NotRequired) | None => {}
        }
    }
    ExitCode(exit_code_for(&err)).into()
}

/// Print `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}
