use super::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_parse_empty_config_uses_defaults() {
    let config: Config = serde_yaml::from_str("{}").unwrap();
    assert_eq!(config.database.path, "data/hearth.duckdb");
    assert_eq!(config.database.threads, None);
    assert_eq!(config.backup.dir, "backups");
    assert_eq!(config.backup.prefix, "pre-migration");
    assert_eq!(config.backup.extension(), "duckdb");
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
database:
  path: store/app.duckdb
  threads: 2
  max_memory: 256MB
backup:
  dir: snapshots
  prefix: before-upgrade
  extension: .bak
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    config.validate().unwrap();
    assert_eq!(config.database.threads, Some(2));
    assert_eq!(config.database.max_memory.as_deref(), Some("256MB"));
    assert_eq!(config.backup.prefix, "before-upgrade");
    assert_eq!(config.backup.extension(), "bak");
}

#[test]
fn test_unknown_fields_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("database:\n  busy_timeout: 5\n");
    assert!(result.is_err());
}

#[test]
fn test_paths_resolve_against_root() {
    let config = Config::default();
    let root = Path::new("/opt/hearth");
    assert_eq!(
        config.database.path_absolute(root),
        Some(PathBuf::from("/opt/hearth/data/hearth.duckdb"))
    );
    assert_eq!(
        config.backup.dir_absolute(root),
        PathBuf::from("/opt/hearth/backups")
    );
}

#[test]
fn test_absolute_paths_are_kept() {
    let yaml = "database:\n  path: /var/lib/hearth.duckdb\nbackup:\n  dir: /var/backups\n";
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    let root = Path::new("/elsewhere");
    assert_eq!(
        config.database.path_absolute(root),
        Some(PathBuf::from("/var/lib/hearth.duckdb"))
    );
    assert_eq!(
        config.backup.dir_absolute(root),
        PathBuf::from("/var/backups")
    );
}

#[test]
fn test_in_memory_has_no_path() {
    let config: Config = serde_yaml::from_str("database:\n  path: \":memory:\"\n").unwrap();
    assert!(config.database.is_in_memory());
    assert_eq!(config.database.path_absolute(Path::new("/tmp")), None);
}

#[test]
fn test_validate_rejects_zero_threads() {
    let config: Config = serde_yaml::from_str("database:\n  threads: 0\n").unwrap();
    assert!(matches!(
        config.validate(),
        Err(CoreError::ConfigInvalid { .. })
    ));
}

#[test]
fn test_validate_rejects_empty_prefix() {
    let config: Config = serde_yaml::from_str("backup:\n  prefix: \"\"\n").unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("backup.prefix"));
}

#[test]
fn test_validate_rejects_path_like_prefix() {
    let config: Config = serde_yaml::from_str("backup:\n  prefix: a/b\n").unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_load_from_dir_prefers_yml() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("hearth.yml"), "backup:\n  dir: from_yml\n").unwrap();
    fs::write(dir.path().join("hearth.yaml"), "backup:\n  dir: from_yaml\n").unwrap();

    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.backup.dir, "from_yml");
}

#[test]
fn test_load_from_dir_accepts_yaml_extension() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("hearth.yaml"), "backup:\n  dir: from_yaml\n").unwrap();

    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.backup.dir, "from_yaml");
}

#[test]
fn test_load_from_dir_missing_file() {
    let dir = tempdir().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_load_from_dir_or_default_without_file() {
    let dir = tempdir().unwrap();
    let config = Config::load_from_dir_or_default(dir.path()).unwrap();
    assert_eq!(config.database.path, "data/hearth.duckdb");
}

#[test]
fn test_load_from_dir_or_default_still_reports_parse_errors() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("hearth.yml"), "database: [not, a, map]\n").unwrap();

    let err = Config::load_from_dir_or_default(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigParseError { .. }));
}

#[test]
fn test_load_validates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hearth.yml");
    fs::write(&path, "database:\n  path: \"  \"\n").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));
}
