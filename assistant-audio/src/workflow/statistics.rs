//! Run statistics
//!
//! One [`RunStats`] per pipeline run, owned by the driver. Recording never
//! fails, so the snapshot is always available at the end of a run.

use crate::models::{FileResult, ReconciliationOutcome};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedStats {
    pub file: usize,
    pub dir: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MismatchStats {
    pub initial_key: usize,
    pub bpm: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedStats {
    pub too_long: usize,
    pub already_calculated: usize,
    pub same_data: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorStats {
    pub backend: usize,
    pub tags: usize,
}

/// Counters for one pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub processed: ProcessedStats,
    /// Tracks whose tags were rewritten
    pub updated: usize,
    /// Tracks analyzed with writing disabled
    pub calculated: usize,
    pub mismatch: MismatchStats,
    pub skipped: SkippedStats,
    pub error: ErrorStats,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a visited directory
    pub fn record_directory(&mut self) {
        self.processed.dir += 1;
    }

    /// Count the terminal state of one file
    ///
    /// Increments `processed.file`, exactly one outcome counter, and the
    /// mismatch counters the result carries.
    pub fn record(&mut self, result: &FileResult) {
        self.processed.file += 1;

        match result {
            FileResult::Completed(outcome) => match outcome {
                ReconciliationOutcome::SkippedTooLong => self.skipped.too_long += 1,
                ReconciliationOutcome::SkippedAlreadyCalculated => {
                    self.skipped.already_calculated += 1
                }
                ReconciliationOutcome::SkippedUnchanged { .. } => self.skipped.same_data += 1,
                ReconciliationOutcome::Updated { .. } => self.updated += 1,
                ReconciliationOutcome::CalculatedOnly { .. } => self.calculated += 1,
            },
            FileResult::BackendFailed => self.error.backend += 1,
            FileResult::TagsFailed { .. } => self.error.tags += 1,
        }

        if let Some(mismatch) = result.mismatch() {
            if mismatch.initial_key {
                self.mismatch.initial_key += 1;
            }
            if mismatch.bpm {
                self.mismatch.bpm += 1;
            }
        }
    }

    /// Sum of all outcome counters; equals `processed.file`
    pub fn outcome_total(&self) -> usize {
        self.skipped.too_long
            + self.skipped.already_calculated
            + self.skipped.same_data
            + self.updated
            + self.calculated
            + self.error.backend
            + self.error.tags
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files in {} directories: {} updated, {} calculated, \
             {} skipped (too long {}, already calculated {}, same data {}), \
             {} errors (backend {}, tags {}), mismatches (bpm {}, initial key {})",
            self.processed.file,
            self.processed.dir,
            self.updated,
            self.calculated,
            self.skipped.too_long + self.skipped.already_calculated + self.skipped.same_data,
            self.skipped.too_long,
            self.skipped.already_calculated,
            self.skipped.same_data,
            self.error.backend + self.error.tags,
            self.error.backend,
            self.error.tags,
            self.mismatch.bpm,
            self.mismatch.initial_key,
        )
    }
}
