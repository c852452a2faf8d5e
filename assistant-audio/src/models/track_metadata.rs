//! Tag metadata currently stored in a track file

use crate::models::BpmValue;
use serde::Serialize;
use std::time::Duration;

/// Tags read from a track file before analysis
///
/// Read once per file and never modified; reconciliation compares it
/// against freshly computed [`AudioData`](crate::models::AudioData).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackMetadata {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub year: Option<u32>,
    pub genre: Option<String>,
    pub publisher: Option<String>,
    /// Tempo as stored in the tag (usually text)
    pub bpm: Option<BpmValue>,
    /// Key as stored in the tag
    pub initial_key: Option<String>,
    /// Audio duration
    #[serde(serialize_with = "serialize_seconds")]
    pub duration: Duration,
}

impl TrackMetadata {
    /// Both tempo and key are already present
    pub fn is_calculated(&self) -> bool {
        self.bpm.is_some() && self.initial_key.is_some()
    }

    /// Duration in minutes, as used by the length limit
    pub fn duration_minutes(&self) -> f64 {
        self.duration.as_secs_f64() / 60.0
    }
}

fn serialize_seconds<S: serde::Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(duration.as_secs_f64())
}
