//! Plan command implementation

use anyhow::Result;
use hearth_migrate::MigrationPlanReport;

use crate::cli::{GlobalArgs, PlanArgs};
use crate::commands::common::{self, load_config};

/// Execute the plan command
pub(crate) fn execute(args: &PlanArgs, global: &GlobalArgs) -> Result<()> {
    let (config, root) = load_config(global)?;

    let plan = hearth_store::inspect(&config, &root)
        .map_err(|err| common::fail(err, args.json, "Failed to inspect local database"))?;

    if args.json {
        return common::print_json(&plan);
    }
    print_plan(&plan);
    Ok(())
}

fn print_plan(plan: &MigrationPlanReport) {
    println!("Current schema: {}", plan.current_version);
    if plan.is_up_to_date() {
        println!("Up to date; nothing to apply.");
        return;
    }
    if plan.applies_baseline {
        println!("  baseline  (new database)");
    }
    for pending in &plan.pending {
        println!("  v{:<4} {}", pending.version, pending.description);
    }
    println!("Target schema: {}", plan.target_version);
    if plan.backup_required {
        println!("A pre-migration backup must exist before these migrations run.");
    }
}
