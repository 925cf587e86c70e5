//! Status command implementation

use anyhow::{Context, Result};
use hearth_migrate::{CurrentVersion, SchemaVersionRecord};
use serde::Serialize;

use crate::cli::{GlobalArgs, StatusArgs};
use crate::commands::common::{self, load_config};

/// How the database relates to this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum SchemaState {
    Fresh,
    UpToDate,
    Behind,
    Newer,
    Unsupported,
}

#[derive(Debug, Serialize)]
struct StatusOutput {
    database: String,
    current_version: CurrentVersion,
    baseline_version: u32,
    newest_known_version: u32,
    state: SchemaState,
    history: Vec<SchemaVersionRecord>,
}

/// Execute the status command
pub(crate) fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let (config, root) = load_config(global)?;
    let catalog = hearth_store::catalog();

    let history = hearth_store::history(&config, &root)
        .context("Failed to read schema history")?;
    let current = CurrentVersion::from(history.iter().map(|r| r.version).max());

    let output = StatusOutput {
        database: config
            .database
            .path_absolute(&root)
            .map_or_else(|| config.database.path.clone(), |p| p.display().to_string()),
        current_version: current,
        baseline_version: catalog.baseline_version(),
        newest_known_version: catalog.max_version(),
        state: classify(current, catalog.baseline_version(), catalog.max_version()),
        history,
    };

    if args.json {
        return common::print_json(&output);
    }
    print_status(&output);
    Ok(())
}

fn classify(current: CurrentVersion, baseline: u32, newest: u32) -> SchemaState {
    match current {
        CurrentVersion::Fresh => SchemaState::Fresh,
        CurrentVersion::At(v) if v > newest => SchemaState::Newer,
        CurrentVersion::At(v) if v < baseline => SchemaState::Unsupported,
        CurrentVersion::At(v) if v == newest => SchemaState::UpToDate,
        CurrentVersion::At(_) => SchemaState::Behind,
    }
}

fn print_status(output: &StatusOutput) {
    println!("Database:        {}", output.database);
    println!("Schema version:  {}", output.current_version);
    println!("Newest known:    v{}", output.newest_known_version);
    let state = match output.state {
        SchemaState::Fresh => "not created yet",
        SchemaState::UpToDate => "up to date",
        SchemaState::Behind => "migrations pending",
        SchemaState::Newer => "written by a newer build; refusing to use it",
        SchemaState::Unsupported => "older than the supported baseline",
    };
    println!("State:           {state}");

    if output.history.is_empty() {
        return;
    }
    println!();
    for record in &output.history {
        println!(
            "  v{:<4} {:<32} {}",
            record.version, record.description, record.migrated_at
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify(CurrentVersion::Fresh, 29, 32), SchemaState::Fresh);
        assert_eq!(classify(CurrentVersion::At(32), 29, 32), SchemaState::UpToDate);
        assert_eq!(classify(CurrentVersion::At(30), 29, 32), SchemaState::Behind);
        assert_eq!(classify(CurrentVersion::At(99), 29, 32), SchemaState::Newer);
        assert_eq!(classify(CurrentVersion::At(3), 29, 32), SchemaState::Unsupported);
    }
}
