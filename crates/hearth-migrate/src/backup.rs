//! Pre-migration backup gate.
//!
//! The engine never creates or inspects backups. It only checks that a file
//! following the pre-migration naming convention exists before it lets
//! migrations touch an existing database.

use hearth_core::BackupConfig;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File naming convention of a pre-migration snapshot:
/// `<prefix>*.<extension>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupConvention {
    prefix: String,
    extension: String,
}

impl BackupConvention {
    pub fn new(prefix: impl Into<String>, extension: impl AsRef<str>) -> Self {
        Self {
            prefix: prefix.into(),
            extension: extension.as_ref().trim_start_matches('.').to_string(),
        }
    }

    /// Whether `file_name` names a pre-migration snapshot.
    pub fn matches(&self, file_name: &str) -> bool {
        if !file_name.starts_with(&self.prefix) {
            return false;
        }
        if self.extension.is_empty() {
            return true;
        }
        file_name
            .strip_suffix(&self.extension)
            .and_then(|stem| stem.strip_suffix('.'))
            .is_some_and(|stem| stem.len() >= self.prefix.len())
    }

    /// Glob-style rendering for messages, e.g. `pre-migration*.duckdb`.
    pub fn pattern(&self) -> String {
        if self.extension.is_empty() {
            format!("{}*", self.prefix)
        } else {
            format!("{}*.{}", self.prefix, self.extension)
        }
    }
}

impl Default for BackupConvention {
    fn default() -> Self {
        let config = BackupConfig::default();
        Self::new(config.prefix, config.extension)
    }
}

/// No pre-migration snapshot was found (MG020)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[MG020] No pre-migration backup matching `{pattern}` in {}", .location.display())]
pub struct NoBackupFound {
    pub location: PathBuf,
    pub pattern: String,
}

/// Outcome of the backup gate for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "path", rename_all = "snake_case")]
pub enum BackupStatus {
    /// Nothing to protect: fresh database or no pending migrations.
    NotRequired,
    /// A snapshot exists at this path.
    Verified(PathBuf),
    /// A snapshot was required and none exists.
    Missing,
}

impl BackupStatus {
    /// Whether a backup is known to exist.
    pub fn exists(&self) -> bool {
        matches!(self, BackupStatus::Verified(_))
    }
}

/// Refuses to let migrations run against an existing database unless a
/// pre-migration snapshot is present.
#[derive(Debug, Clone)]
pub struct BackupGuard {
    location: PathBuf,
    convention: BackupConvention,
}

impl BackupGuard {
    pub fn new(location: impl Into<PathBuf>, convention: BackupConvention) -> Self {
        Self {
            location: location.into(),
            convention,
        }
    }

    /// Build from `hearth.yml` settings, resolving the directory against
    /// `root`.
    pub fn from_config(config: &BackupConfig, root: &Path) -> Self {
        Self::new(
            config.dir_absolute(root),
            BackupConvention::new(config.prefix.clone(), config.extension()),
        )
    }

    /// Directory searched for snapshots.
    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn convention(&self) -> &BackupConvention {
        &self.convention
    }

    /// Confirm a snapshot exists, returning its path.
    ///
    /// A missing or unreadable directory counts as no snapshot.
    pub fn verify(&self) -> Result<PathBuf, NoBackupFound> {
        match self.find_artifact() {
            Some(path) => {
                log::debug!("Pre-migration backup found: {}", path.display());
                Ok(path)
            }
            None => Err(NoBackupFound {
                location: self.location.clone(),
                pattern: self.convention.pattern(),
            }),
        }
    }

    /// The lexicographically greatest matching regular file, if any.
    pub fn find_artifact(&self) -> Option<PathBuf> {
        let entries = match std::fs::read_dir(&self.location) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!(
                    "Cannot read backup directory {}: {e}",
                    self.location.display()
                );
                return None;
            }
        };

        entries
            .filter_map(Result::ok)
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| self.convention.matches(name))
            })
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .max()
    }
}

#[cfg(test)]
#[path = "backup_test.rs"]
mod tests;
