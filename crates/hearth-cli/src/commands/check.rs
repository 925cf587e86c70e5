//! Check command implementation

use anyhow::Result;
use hearth_migrate::validate;

use crate::cli::GlobalArgs;
use crate::commands::common::{ExitCode, EXIT_CATALOG};

/// Validate the compiled-in catalog; touches no database.
pub(crate) fn execute(_global: &GlobalArgs) -> Result<()> {
    let catalog = hearth_store::catalog();

    if let Err(err) = validate(&catalog) {
        eprintln!("Error: {err}");
        return Err(ExitCode(EXIT_CATALOG).into());
    }

    println!(
        "Catalog OK: baseline v{}, {} migration{}, newest v{}",
        catalog.baseline_version(),
        catalog.len(),
        if catalog.len() == 1 { "" } else { "s" },
        catalog.max_version()
    );
    Ok(())
}
