//! Reconciliation of stored tags with computed audio data
//!
//! Two comparisons are applied to the same pair of fields and they are
//! intentionally different:
//! - *same data*: both tags present, bpm equal in string form, key equal
//! - *mismatch*: per field, strict value comparison (a stored `"128"` text
//!   differs from a computed integer `128`), a missing tag always mismatches

use crate::models::{AudioData, Mismatch, ReconciliationOutcome, TrackMetadata};
use assistant_common::config::DEFAULT_MAX_TRACK_MINUTES;

/// Decision policy for one run
#[derive(Debug, Clone)]
pub struct ReconcilePolicy {
    /// Never analyze tracks longer than `max_track_minutes`
    pub skip_too_long: bool,
    pub max_track_minutes: u64,
    /// Never analyze tracks that already carry bpm and initial key
    pub skip_already_calculated: bool,
    /// Persist computed data when it differs
    pub write_data: bool,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            skip_too_long: true,
            max_track_minutes: DEFAULT_MAX_TRACK_MINUTES,
            skip_already_calculated: false,
            write_data: false,
        }
    }
}

/// Applies a [`ReconcilePolicy`] to tracks
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    policy: ReconcilePolicy,
}

impl Reconciler {
    pub fn new(policy: ReconcilePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ReconcilePolicy {
        &self.policy
    }

    /// Skip decisions that only need stored metadata
    ///
    /// `Some` means the backend must not be called for this track.
    pub fn screen(&self, metadata: &TrackMetadata) -> Option<ReconciliationOutcome> {
        if self.is_too_long(metadata) {
            return Some(ReconciliationOutcome::SkippedTooLong);
        }

        if self.policy.skip_already_calculated && metadata.is_calculated() {
            return Some(ReconciliationOutcome::SkippedAlreadyCalculated);
        }

        None
    }

    /// Full decision for a track whose audio data was computed
    pub fn reconcile(&self, metadata: &TrackMetadata, audio_data: &AudioData) -> ReconciliationOutcome {
        if let Some(outcome) = self.screen(metadata) {
            return outcome;
        }

        // Counted for every analyzed track, unchanged ones included
        let mismatch = detect_mismatch(metadata, audio_data);

        if has_same_data(metadata, audio_data) {
            ReconciliationOutcome::SkippedUnchanged { mismatch }
        } else if self.policy.write_data {
            ReconciliationOutcome::Updated { mismatch }
        } else {
            ReconciliationOutcome::CalculatedOnly { mismatch }
        }
    }

    fn is_too_long(&self, metadata: &TrackMetadata) -> bool {
        self.policy.skip_too_long
            && metadata.duration_minutes() > self.policy.max_track_minutes as f64
    }
}

/// Stored tags already hold the computed data
pub fn has_same_data(metadata: &TrackMetadata, audio_data: &AudioData) -> bool {
    match (&metadata.bpm, &metadata.initial_key) {
        (Some(bpm), Some(initial_key)) => {
            bpm.as_tag_text() == audio_data.bpm.as_tag_text()
                && *initial_key == audio_data.initial_key
        }
        _ => false,
    }
}

/// Per-field strict differences between stored tags and computed data
pub fn detect_mismatch(metadata: &TrackMetadata, audio_data: &AudioData) -> Mismatch {
    Mismatch {
        bpm: metadata.bpm.as_ref() != Some(&audio_data.bpm),
        initial_key: metadata.initial_key.as_deref() != Some(audio_data.initial_key.as_str()),
    }
}
