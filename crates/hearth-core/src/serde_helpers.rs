//! Shared serde default functions for configuration fields.

/// Default database file, relative to the config directory.
pub fn default_db_path() -> String {
    "data/hearth.duckdb".to_string()
}

/// Default directory searched for pre-migration snapshots.
pub fn default_backup_dir() -> String {
    "backups".to_string()
}

/// Default file name prefix of a pre-migration snapshot.
pub fn default_backup_prefix() -> String {
    "pre-migration".to_string()
}

/// Default file extension of a pre-migration snapshot.
pub fn default_backup_extension() -> String {
    "duckdb".to_string()
}
