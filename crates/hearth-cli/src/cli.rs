//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// Hearth - manage the schema of the local app database
#[derive(Parser, Debug)]
#[command(name = "hearth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding hearth.yml
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true, env = "HEARTH_CONFIG")]
    pub config: Option<String>,

    /// Override the database path from the config
    #[arg(long, global = true)]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bring the database to the newest schema version
    Migrate(MigrateArgs),

    /// Show which migrations would run, without running them
    Plan(PlanArgs),

    /// Show the current schema version and the audit trail
    Status(StatusArgs),

    /// Validate the compiled-in migration catalog
    Check,
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Print the migration report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print status as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
