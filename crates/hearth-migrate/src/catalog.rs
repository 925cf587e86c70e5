//! The compiled-in list of known schema migrations.
//!
//! A [`MigrationCatalog`] is an ordinary value built by the application and
//! passed into the engine. Nothing here is global, so tests can build
//! catalogs with deliberate gaps or duplicates.

use duckdb::Connection;
use hearth_db::{DbError, DbResult};
use std::fmt;

/// Rust procedure that performs a schema change on the transactional handle.
pub type ApplyFn = fn(&Connection) -> DbResult<()>;

/// How a migration changes the schema.
#[derive(Clone, Copy)]
pub enum Procedure {
    /// A batch of SQL statements executed as-is.
    Sql(&'static str),
    /// Rust code, for changes that must inspect existing state first.
    Rust(ApplyFn),
}

impl Procedure {
    fn apply(&self, conn: &Connection) -> DbResult<()> {
        match self {
            Procedure::Sql(sql) => conn.execute_batch(sql).map_err(DbError::from),
            Procedure::Rust(apply) => apply(conn),
        }
    }
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Procedure::Sql(sql) => write!(f, "Sql({} bytes)", sql.len()),
            Procedure::Rust(_) => write!(f, "Rust(fn)"),
        }
    }
}

/// A single versioned, forward-only schema change.
#[derive(Debug, Clone, Copy)]
pub struct MigrationDefinition {
    /// Schema version this migration produces.
    pub version: u32,
    /// Short human-readable summary, copied into `schema_version`.
    pub description: &'static str,
    /// The change itself.
    pub procedure: Procedure,
}

impl MigrationDefinition {
    /// A migration expressed as a SQL batch.
    pub const fn sql(version: u32, description: &'static str, sql: &'static str) -> Self {
        Self {
            version,
            description,
            procedure: Procedure::Sql(sql),
        }
    }

    /// A migration expressed as a Rust procedure.
    pub const fn rust(version: u32, description: &'static str, apply: ApplyFn) -> Self {
        Self {
            version,
            description,
            procedure: Procedure::Rust(apply),
        }
    }

    /// Run the procedure against `conn`.
    ///
    /// The executor only ever calls this inside a transaction scoped to this
    /// migration, at most once per run.
    pub fn apply(&self, conn: &Connection) -> DbResult<()> {
        self.procedure.apply(conn)
    }
}

/// Description recorded for the baseline row of `schema_version`.
pub const BASELINE_DESCRIPTION: &str = "baseline schema";

/// The full set of migrations known to this build, plus the baseline schema
/// they start from.
#[derive(Debug, Clone)]
pub struct MigrationCatalog {
    baseline: MigrationDefinition,
    migrations: Vec<MigrationDefinition>,
}

impl MigrationCatalog {
    /// Build a catalog from a baseline and its migrations.
    ///
    /// Migrations are kept in the order given; consistency is checked by
    /// [`crate::validator::validate`], not here.
    pub fn new(
        baseline_version: u32,
        baseline: Procedure,
        migrations: impl IntoIterator<Item = MigrationDefinition>,
    ) -> Self {
        Self {
            baseline: MigrationDefinition {
                version: baseline_version,
                description: BASELINE_DESCRIPTION,
                procedure: baseline,
            },
            migrations: migrations.into_iter().collect(),
        }
    }

    /// The baseline schema, applied once when the database is fresh.
    pub fn baseline(&self) -> &MigrationDefinition {
        &self.baseline
    }

    /// Schema version produced by the baseline.
    pub fn baseline_version(&self) -> u32 {
        self.baseline.version
    }

    /// Versioned migrations in declaration order.
    pub fn migrations(&self) -> &[MigrationDefinition] {
        &self.migrations
    }

    /// Number of versioned migrations (the baseline is not counted).
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// Whether the catalog holds no versioned migrations.
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Highest schema version this build knows how to produce.
    pub fn max_version(&self) -> u32 {
        self.migrations
            .iter()
            .map(|m| m.version)
            .max()
            .map_or(self.baseline.version, |v| v.max(self.baseline.version))
    }

    /// Look up a migration by version.
    pub fn get(&self, version: u32) -> Option<&MigrationDefinition> {
        self.migrations.iter().find(|m| m.version == version)
    }
}
