//! Hearth CLI - schema migrations for the local app database

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{check, migrate, plan, status};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let result: Result<()> = match &cli.command {
        cli::Commands::Migrate(args) => migrate::execute(args, &cli.global),
        cli::Commands::Plan(args) => plan::execute(args, &cli.global),
        cli::Commands::Status(args) => status::execute(args, &cli.global),
        cli::Commands::Check => check::execute(&cli.global),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(code) => std::process::ExitCode::from(code.0),
            None => {
                eprintln!("Error: {err:#}");
                std::process::ExitCode::FAILURE
            }
        },
    }
}

/// Route `log` records from the library crates to stderr.
///
/// `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}
