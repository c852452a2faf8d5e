//! In-memory stand-ins for the tag store and the analysis backend

use assistant_audio::error::{BackendError, BackendErrorKind, TagError};
use assistant_audio::models::{AudioData, BpmValue, TrackMetadata};
use assistant_audio::services::{AudioAnalyzer, TagStore, WriteReport};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Metadata for a five minute track with the given stored tags
pub fn track_metadata(bpm: Option<BpmValue>, initial_key: Option<&str>) -> TrackMetadata {
    TrackMetadata {
        artist: Some("Artist".to_string()),
        title: Some("Song".to_string()),
        bpm,
        initial_key: initial_key.map(str::to_string),
        duration: Duration::from_secs(5 * 60),
        ..Default::default()
    }
}

/// Tag store over a map of track metadata
///
/// Writes are applied to the map the way a tag file stores them (bpm as
/// text) and recorded for inspection.
#[derive(Default)]
pub struct InMemoryTagStore {
    tracks: Mutex<HashMap<PathBuf, TrackMetadata>>,
    unreadable: Mutex<HashSet<PathBuf>>,
    writes: Mutex<Vec<(PathBuf, AudioData)>>,
    write_warnings: Mutex<Vec<String>>,
    write_errors: Mutex<Vec<String>>,
}

impl InMemoryTagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_track(self, path: impl Into<PathBuf>, metadata: TrackMetadata) -> Self {
        self.tracks.lock().unwrap().insert(path.into(), metadata);
        self
    }

    pub fn with_unreadable(self, path: impl Into<PathBuf>) -> Self {
        self.unreadable.lock().unwrap().insert(path.into());
        self
    }

    /// Every write succeeds with these warnings
    pub fn with_write_warnings(self, warnings: &[&str]) -> Self {
        *self.write_warnings.lock().unwrap() = warnings.iter().map(|w| w.to_string()).collect();
        self
    }

    /// Every write fails with these errors
    pub fn with_write_errors(self, errors: &[&str]) -> Self {
        *self.write_errors.lock().unwrap() = errors.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn writes(&self) -> Vec<(PathBuf, AudioData)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn metadata(&self, path: &Path) -> Option<TrackMetadata> {
        self.tracks.lock().unwrap().get(path).cloned()
    }
}

#[async_trait]
impl TagStore for InMemoryTagStore {
    async fn read_tags(&self, path: &Path) -> Result<TrackMetadata, TagError> {
        if self.unreadable.lock().unwrap().contains(path) {
            return Err(TagError::Read {
                path: path.to_path_buf(),
                message: "corrupt header".to_string(),
            });
        }

        self.tracks
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| TagError::Read {
                path: path.to_path_buf(),
                message: "no such track".to_string(),
            })
    }

    async fn write_tags(&self, path: &Path, audio_data: &AudioData) -> Result<WriteReport, TagError> {
        let report = WriteReport {
            warnings: self.write_warnings.lock().unwrap().clone(),
            errors: self.write_errors.lock().unwrap().clone(),
        };

        if !report.is_ok() {
            return Ok(report);
        }

        if let Some(metadata) = self.tracks.lock().unwrap().get_mut(path) {
            metadata.bpm = Some(BpmValue::Text(audio_data.bpm.as_tag_text()));
            metadata.initial_key = Some(audio_data.initial_key.clone());
        }
        self.writes
            .lock()
            .unwrap()
            .push((path.to_path_buf(), audio_data.clone()));

        Ok(report)
    }
}

/// Analyzer answering from a per-path script
///
/// Unknown paths answer with a 404 service error.
#[derive(Default)]
pub struct ScriptedAnalyzer {
    responses: Mutex<HashMap<PathBuf, Result<AudioData, BackendError>>>,
    calls: Mutex<Vec<PathBuf>>,
    cancel_on_call: Mutex<Option<CancellationToken>>,
}

impl ScriptedAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, relative_path: impl Into<PathBuf>, audio_data: AudioData) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(relative_path.into(), Ok(audio_data));
        self
    }

    pub fn with_failure(self, relative_path: impl Into<PathBuf>, error: BackendError) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(relative_path.into(), Err(error));
        self
    }

    /// Cancel `token` from inside the first request
    pub fn cancelling(self, token: CancellationToken) -> Self {
        *self.cancel_on_call.lock().unwrap() = Some(token);
        self
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl AudioAnalyzer for ScriptedAnalyzer {
    async fn compute_audio_data(&self, relative_path: &Path) -> Result<AudioData, BackendError> {
        self.calls.lock().unwrap().push(relative_path.to_path_buf());

        if let Some(token) = self.cancel_on_call.lock().unwrap().take() {
            token.cancel();
        }

        self.responses
            .lock()
            .unwrap()
            .get(relative_path)
            .cloned()
            .unwrap_or_else(|| {
                Err(BackendError::new(
                    BackendErrorKind::Service,
                    format!("analyze: unknown track {}", relative_path.display()),
                    404,
                ))
            })
    }
}
