//! Migrate command implementation

use anyhow::Result;
use hearth_migrate::{BackupStatus, MigrationReport};
use hearth_store::Store;

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::{self, load_config};

/// Execute the migrate command
pub(crate) fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let (config, root) = load_config(global)?;

    let store = Store::open(&config, &root)
        .map_err(|err| common::fail(err, args.json, "Failed to open local database"))?;
    let report = store.migration_report();

    if args.json {
        return common::print_json(report);
    }
    print_report(report);
    Ok(())
}

fn print_report(report: &MigrationReport) {
    for applied in &report.applied {
        println!(
            "  v{:<4} {:<32} {}ms",
            applied.version, applied.description, applied.duration_ms
        );
    }
    if let BackupStatus::Verified(path) = &report.backup {
        println!("Pre-migration backup: {}", path.display());
    }
    println!("{}", capitalize(&report.summary()));
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
