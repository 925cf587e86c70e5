//! The database's current schema version.

use serde::Serialize;
use std::fmt;

/// Schema version of the database as read from `schema_version`.
///
/// `Fresh` orders before every `At(_)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrentVersion {
    /// No version table, or an empty one: nothing has ever been applied.
    Fresh,
    /// Highest version recorded in `schema_version`.
    At(u32),
}

impl CurrentVersion {
    /// The numeric version, `None` when fresh.
    pub fn version(self) -> Option<u32> {
        match self {
            CurrentVersion::Fresh => None,
            CurrentVersion::At(v) => Some(v),
        }
    }

    pub fn is_fresh(self) -> bool {
        matches!(self, CurrentVersion::Fresh)
    }

    /// Whether a migration producing `version` has yet to be applied.
    pub fn is_pending(self, version: u32) -> bool {
        match self {
            CurrentVersion::Fresh => true,
            CurrentVersion::At(current) => version > current,
        }
    }
}

impl From<Option<u32>> for CurrentVersion {
    fn from(version: Option<u32>) -> Self {
        version.map_or(CurrentVersion::Fresh, CurrentVersion::At)
    }
}

impl fmt::Display for CurrentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrentVersion::Fresh => write!(f, "fresh"),
            CurrentVersion::At(v) => write!(f, "v{v}"),
        }
    }
}
