//! Selects and orders the migrations a run would apply.

use crate::catalog::{MigrationCatalog, MigrationDefinition};
use crate::error::MigrationResult;
use crate::resolver::check_supported;
use crate::version::CurrentVersion;

/// Ordered work for one run, borrowed from the catalog.
#[derive(Debug, Clone)]
pub struct MigrationPlan<'c> {
    current: CurrentVersion,
    baseline: Option<&'c MigrationDefinition>,
    migrations: Vec<&'c MigrationDefinition>,
}

impl<'c> MigrationPlan<'c> {
    /// Version the plan starts from.
    pub fn current(&self) -> CurrentVersion {
        self.current
    }

    /// The baseline step, present only for a fresh database.
    pub fn baseline(&self) -> Option<&'c MigrationDefinition> {
        self.baseline
    }

    /// Pending migrations, ascending by version.
    pub fn migrations(&self) -> &[&'c MigrationDefinition] {
        &self.migrations
    }

    /// Nothing to do: the database is at the newest known version.
    pub fn is_empty(&self) -> bool {
        self.baseline.is_none() && self.migrations.is_empty()
    }

    /// Whether a pre-migration backup must exist before this plan runs.
    ///
    /// A fresh database holds nothing to lose, and an up-to-date one is not
    /// touched.
    pub fn requires_backup(&self) -> bool {
        !self.current.is_fresh() && !self.migrations.is_empty()
    }

    /// Version the database will be at if every step succeeds.
    pub fn target_version(&self) -> CurrentVersion {
        self.migrations
            .last()
            .or(self.baseline.as_ref())
            .map_or(self.current, |m| CurrentVersion::At(m.version))
    }

    /// Pending migration versions, ascending.
    pub fn versions(&self) -> Vec<u32> {
        self.migrations.iter().map(|m| m.version).collect()
    }
}

/// Plan the migrations needed to bring a database at `current` up to the
/// newest version in `catalog`.
///
/// A fresh database gets the baseline followed by every migration. The
/// result is ascending by version regardless of declaration order.
pub fn plan_migrations(
    catalog: &MigrationCatalog,
    current: CurrentVersion,
) -> MigrationResult<MigrationPlan<'_>> {
    check_supported(catalog, current)?;

    let baseline = current.is_fresh().then(|| catalog.baseline());
    let mut migrations: Vec<&MigrationDefinition> = catalog
        .migrations()
        .iter()
        .filter(|m| current.is_pending(m.version))
        .collect();
    migrations.sort_by_key(|m| m.version);

    Ok(MigrationPlan {
        current,
        baseline,
        migrations,
    })
}
