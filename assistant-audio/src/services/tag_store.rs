//! Tag metadata reader/writer
//!
//! Reads the tags the pipeline reconciles against and persists computed
//! tempo and key. Writer output distinguishes warnings (advisory) from
//! errors (the write did not happen).

use crate::error::TagError;
use crate::models::{AudioData, BpmValue, TrackMetadata};
use async_trait::async_trait;
use lofty::config::WriteOptions;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag};
use std::path::{Path, PathBuf};

/// Outcome of a tag write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl WriteReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Reads and writes track tag metadata
#[async_trait]
pub trait TagStore: Send + Sync {
    async fn read_tags(&self, path: &Path) -> Result<TrackMetadata, TagError>;

    /// Persist bpm and initial key
    ///
    /// `Err` is reserved for failures outside the writer itself; writer
    /// problems are reported through [`WriteReport`].
    async fn write_tags(&self, path: &Path, audio_data: &AudioData) -> Result<WriteReport, TagError>;
}

/// [`TagStore`] backed by lofty
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTagStore;

impl LoftyTagStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TagStore for LoftyTagStore {
    async fn read_tags(&self, path: &Path) -> Result<TrackMetadata, TagError> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || read_metadata(&path))
            .await
            .map_err(|e| TagError::Task(e.to_string()))?
    }

    async fn write_tags(&self, path: &Path, audio_data: &AudioData) -> Result<WriteReport, TagError> {
        let path = path.to_path_buf();
        let audio_data = audio_data.clone();
        tokio::task::spawn_blocking(move || write_audio_data(&path, &audio_data))
            .await
            .map_err(|e| TagError::Task(e.to_string()))
    }
}

fn read_error(path: &Path, e: impl ToString) -> TagError {
    TagError::Read {
        path: PathBuf::from(path),
        message: e.to_string(),
    }
}

fn read_metadata(path: &Path) -> Result<TrackMetadata, TagError> {
    let tagged_file = Probe::open(path)
        .map_err(|e| read_error(path, e))?
        .read()
        .map_err(|e| read_error(path, e))?;

    let duration = tagged_file.properties().duration();

    let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
        tracing::debug!(file = %path.display(), "No tags found in audio file");
        return Ok(TrackMetadata {
            duration,
            ..Default::default()
        });
    };

    let bpm = tag
        .get_string(&ItemKey::IntegerBpm)
        .or_else(|| tag.get_string(&ItemKey::Bpm))
        .map(BpmValue::from);

    Ok(TrackMetadata {
        artist: tag.artist().map(|s| s.to_string()),
        title: tag.title().map(|s| s.to_string()),
        album: tag.album().map(|s| s.to_string()),
        year: tag.year(),
        genre: tag.genre().map(|s| s.to_string()),
        publisher: tag.get_string(&ItemKey::Label).map(str::to_string),
        bpm,
        initial_key: tag.get_string(&ItemKey::InitialKey).map(str::to_string),
        duration,
    })
}

fn write_audio_data(path: &Path, audio_data: &AudioData) -> WriteReport {
    let mut report = WriteReport::default();

    let mut tagged_file = match Probe::open(path).and_then(|probe| probe.read()) {
        Ok(file) => file,
        Err(e) => {
            report.errors.push(format!("Failed to open file for tagging: {}", e));
            return report;
        }
    };

    let tag_type = tagged_file.primary_tag_type();

    if tagged_file.tag(tag_type).is_none() {
        tagged_file.insert_tag(Tag::new(tag_type));
        report
            .warnings
            .push(format!("File had no {:?} tag, a new one was created", tag_type));
    }

    let Some(tag) = tagged_file.tag_mut(tag_type) else {
        report
            .errors
            .push(format!("File does not support {:?} tags", tag_type));
        return report;
    };

    let bpm = audio_data.bpm.as_tag_text();
    if !tag.insert_text(ItemKey::IntegerBpm, bpm.clone()) && !tag.insert_text(ItemKey::Bpm, bpm) {
        report
            .warnings
            .push(format!("{:?} tag cannot hold a BPM value", tag_type));
    }

    if !tag.insert_text(ItemKey::InitialKey, audio_data.initial_key.clone()) {
        report
            .warnings
            .push(format!("{:?} tag cannot hold an initial key", tag_type));
    }

    if let Err(e) = tagged_file.save_to_path(path, WriteOptions::default()) {
        report.errors.push(format!("Failed to save tags: {}", e));
    }

    report
}
