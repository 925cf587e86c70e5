//! Reads the persisted schema version and checks it against the catalog.

use crate::audit;
use crate::catalog::MigrationCatalog;
use crate::error::{MigrationError, MigrationResult};
use crate::version::CurrentVersion;
use duckdb::Connection;

/// Resolve the schema version of the database behind `conn`.
///
/// A missing or empty `schema_version` table means the database is fresh.
/// A version newer than the catalog knows, or older than its baseline, is an
/// error; the database is never modified here.
pub fn resolve(conn: &Connection, catalog: &MigrationCatalog) -> MigrationResult<CurrentVersion> {
    let current = CurrentVersion::from(audit::max_version(conn)?);
    check_supported(catalog, current)?;
    log::debug!("Resolved local schema version: {current}");
    Ok(current)
}

/// Reject versions this build cannot migrate from.
pub(crate) fn check_supported(
    catalog: &MigrationCatalog,
    current: CurrentVersion,
) -> MigrationResult<()> {
    let CurrentVersion::At(persisted) = current else {
        return Ok(());
    };

    let known_max = catalog.max_version();
    if persisted > known_max {
        return Err(MigrationError::FutureSchema {
            persisted,
            known_max,
        });
    }

    let baseline = catalog.baseline_version();
    if persisted < baseline {
        return Err(MigrationError::BelowBaseline { persisted, baseline });
    }
    Ok(())
}
