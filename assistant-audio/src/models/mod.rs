//! Value types flowing through the audio-data pipeline

pub mod audio_data;
pub mod outcome;
pub mod track_file;
pub mod track_metadata;

pub use audio_data::{AudioData, BpmValue};
pub use outcome::{FileResult, Mismatch, ReconciliationOutcome};
pub use track_file::{CollectionEntry, TrackFile};
pub use track_metadata::TrackMetadata;
