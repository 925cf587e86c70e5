//! Run and per-migration state machines.

use serde::Serialize;
use std::fmt;

/// Lifecycle of one migration run.
///
/// `NotStarted -> Validating -> BackupChecked -> Executing -> {Completed | Halted}`.
/// There is no retry state: a halted run needs a new process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    NotStarted,
    Validating,
    BackupChecked,
    Executing,
    Completed,
    Halted,
}

impl RunState {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (NotStarted, Validating)
                | (Validating, BackupChecked)
                | (BackupChecked, Executing)
                | (Executing, Completed)
                | (Executing, Halted)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Completed | RunState::Halted)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::NotStarted => "not started",
            RunState::Validating => "validating",
            RunState::BackupChecked => "backup checked",
            RunState::Executing => "executing",
            RunState::Completed => "completed",
            RunState::Halted => "halted",
        };
        f.write_str(s)
    }
}

/// Lifecycle of one migration within a run.
///
/// `Pending -> Applying -> {Committed | RolledBack}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationState {
    Pending,
    Applying,
    Committed,
    RolledBack,
}

impl MigrationState {
    pub fn can_advance_to(self, next: MigrationState) -> bool {
        use MigrationState::*;
        matches!(
            (self, next),
            (Pending, Applying) | (Applying, Committed) | (Applying, RolledBack)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, MigrationState::Committed | MigrationState::RolledBack)
    }
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MigrationState::Pending => "pending",
            MigrationState::Applying => "applying",
            MigrationState::Committed => "committed",
            MigrationState::RolledBack => "rolled back",
        };
        f.write_str(s)
    }
}

/// Tracks the run state inside the executor.
#[derive(Debug)]
pub(crate) struct RunTracker {
    state: RunState,
}

impl RunTracker {
    pub(crate) fn new() -> Self {
        Self {
            state: RunState::NotStarted,
        }
    }

    pub(crate) fn state(&self) -> RunState {
        self.state
    }

    pub(crate) fn advance(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal run transition {} -> {next}",
            self.state
        );
        log::debug!("Migration run: {} -> {next}", self.state);
        self.state = next;
    }
}
