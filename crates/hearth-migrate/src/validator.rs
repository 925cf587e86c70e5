//! Catalog consistency checks, run before any database I/O.

use crate::catalog::MigrationCatalog;
use thiserror::Error;

/// Packaging defects in the migration catalog.
///
/// All of these are fatal: the catalog is compiled in, so only a new
/// release can fix them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// The same version is declared more than once (MG010)
    #[error("[MG010] Duplicate migration versions: {}", version_list(.versions))]
    DuplicateVersion { versions: Vec<u32> },

    /// A migration does not sit above the baseline (MG011)
    #[error("[MG011] Migration v{version} is not above baseline v{baseline}")]
    NotAboveBaseline { version: u32, baseline: u32 },

    /// A version is missing from the sequence (MG012)
    #[error("[MG012] Gap in migration sequence: expected v{expected} after v{found_prev}, found v{found_next}")]
    SequenceGap {
        expected: u32,
        found_prev: u32,
        found_next: u32,
    },
}

fn version_list(versions: &[u32]) -> String {
    versions
        .iter()
        .map(|v| format!("v{v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check that the catalog's versions are unique and form the contiguous
/// sequence `baseline+1, baseline+2, ...`.
///
/// Pure function over the catalog. An empty catalog is valid.
pub fn validate(catalog: &MigrationCatalog) -> Result<(), SequenceError> {
    let mut versions: Vec<u32> = catalog.migrations().iter().map(|m| m.version).collect();
    versions.sort_unstable();

    let mut duplicates: Vec<u32> = versions
        .windows(2)
        .filter(|pair| pair[0] == pair[1])
        .map(|pair| pair[0])
        .collect();
    duplicates.dedup();
    if !duplicates.is_empty() {
        return Err(SequenceError::DuplicateVersion {
            versions: duplicates,
        });
    }

    let baseline = catalog.baseline_version();
    if let Some(&first) = versions.first() {
        if first <= baseline {
            return Err(SequenceError::NotAboveBaseline {
                version: first,
                baseline,
            });
        }
    }

    // Sorted, unique, and above the baseline, so `prev < next` throughout.
    let mut prev = baseline;
    for &next in &versions {
        if next != prev + 1 {
            return Err(SequenceError::SequenceGap {
                expected: prev + 1,
                found_prev: prev,
                found_next: next,
            });
        }
        prev = next;
    }
    Ok(())
}

#[cfg(test)]
#[path = "validator_test.rs"]
mod tests;
