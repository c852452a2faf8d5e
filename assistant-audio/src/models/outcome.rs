//! Per-track decisions and terminal states

use serde::Serialize;

/// Which computed fields differ from the stored tags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub bpm: bool,
    pub initial_key: bool,
}

/// Result of reconciling stored tags with computed audio data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReconciliationOutcome {
    /// Track exceeds the length limit; never analyzed
    SkippedTooLong,
    /// Tempo and key already present and skipping was requested; never analyzed
    SkippedAlreadyCalculated,
    /// Computed data equals the stored tags
    SkippedUnchanged { mismatch: Mismatch },
    /// Computed data differs and will be written back
    Updated { mismatch: Mismatch },
    /// Computed data differs but writing is disabled
    CalculatedOnly { mismatch: Mismatch },
}

impl ReconciliationOutcome {
    /// Mismatch flags, present only for analyzed tracks
    pub fn mismatch(&self) -> Option<Mismatch> {
        match self {
            ReconciliationOutcome::SkippedTooLong
            | ReconciliationOutcome::SkippedAlreadyCalculated => None,
            ReconciliationOutcome::SkippedUnchanged { mismatch }
            | ReconciliationOutcome::Updated { mismatch }
            | ReconciliationOutcome::CalculatedOnly { mismatch } => Some(*mismatch),
        }
    }
}

/// Terminal state of one enumerated track file
///
/// Every file ends in exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileResult {
    /// Reconciliation finished (and the write, if any, succeeded)
    Completed(ReconciliationOutcome),
    /// The analysis backend failed
    BackendFailed,
    /// Reading or writing tags failed
    ///
    /// Carries mismatch flags when the failure happened after reconciliation.
    TagsFailed { mismatch: Option<Mismatch> },
}

impl FileResult {
    pub fn mismatch(&self) -> Option<Mismatch> {
        match self {
            FileResult::Completed(outcome) => outcome.mismatch(),
            FileResult::BackendFailed => None,
            FileResult::TagsFailed { mismatch } => *mismatch,
        }
    }
}
