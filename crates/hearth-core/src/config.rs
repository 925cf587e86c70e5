//! Configuration types and parsing for hearth.yml

use crate::error::{CoreError, CoreResult};
use crate::serde_helpers::{
    default_backup_dir, default_backup_extension, default_backup_prefix, default_db_path,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File names searched, in order, by [`Config::load_from_dir`].
pub const CONFIG_FILE_NAMES: [&str; 2] = ["hearth.yml", "hearth.yaml"];

/// Path value that selects an in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Main configuration from hearth.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Local database settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Where pre-migration snapshots are expected
    #[serde(default)]
    pub backup: BackupConfig,
}

/// Local database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database file path (relative to the config directory) or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,

    /// DuckDB worker threads (driver default when unset)
    #[serde(default)]
    pub threads: Option<u32>,

    /// DuckDB memory limit, e.g. `512MB` (driver default when unset)
    #[serde(default)]
    pub max_memory: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            threads: None,
            max_memory: None,
        }
    }
}

impl DatabaseConfig {
    /// Whether this configuration selects an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY_PATH
    }

    /// Resolve the database path against `root`.
    ///
    /// Returns `None` for an in-memory database.
    pub fn path_absolute(&self, root: &Path) -> Option<PathBuf> {
        if self.is_in_memory() {
            None
        } else {
            Some(resolve_path(root, &self.path))
        }
    }
}

/// Pre-migration backup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackupConfig {
    /// Directory holding pre-migration snapshots
    #[serde(default = "default_backup_dir")]
    pub dir: String,

    /// File name prefix a snapshot must start with
    #[serde(default = "default_backup_prefix")]
    pub prefix: String,

    /// File extension a snapshot must carry (with or without leading dot)
    #[serde(default = "default_backup_extension")]
    pub extension: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            dir: default_backup_dir(),
            prefix: default_backup_prefix(),
            extension: default_backup_extension(),
        }
    }
}

impl BackupConfig {
    /// Resolve the backup directory against `root`
    pub fn dir_absolute(&self, root: &Path) -> PathBuf {
        resolve_path(root, &self.dir)
    }

    /// Extension without any leading dot
    pub fn extension(&self) -> &str {
        self.extension.trim_start_matches('.')
    }
}

fn resolve_path(root: &Path, value: &str) -> PathBuf {
    let path = Path::new(value);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `hearth.yml` or `hearth.yaml` in `dir`
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        match Self::find_in_dir(dir) {
            Some(path) => Self::load(&path),
            None => Err(CoreError::ConfigNotFound {
                path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
            }),
        }
    }

    /// Like [`Config::load_from_dir`], but falls back to defaults when no
    /// config file exists. Parse and validation errors are still returned.
    pub fn load_from_dir_or_default(dir: &Path) -> CoreResult<Self> {
        match Self::find_in_dir(dir) {
            Some(path) => Self::load(&path),
            None => {
                log::debug!("No config file in {}, using defaults", dir.display());
                Ok(Self::default())
            }
        }
    }

    fn find_in_dir(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Check values serde cannot reject on its own
    pub fn validate(&self) -> CoreResult<()> {
        if self.database.path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path must not be empty".to_string(),
            });
        }
        if self.database.threads == Some(0) {
            return Err(CoreError::ConfigInvalid {
                message: "database.threads must be at least 1".to_string(),
            });
        }
        if self.backup.dir.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "backup.dir must not be empty".to_string(),
            });
        }
        if self.backup.prefix.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "backup.prefix must not be empty; an empty prefix would accept any file as a snapshot".to_string(),
            });
        }
        if self.backup.prefix.contains(['/', '\\']) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "backup.prefix '{}' must be a file name prefix, not a path",
                    self.backup.prefix
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
