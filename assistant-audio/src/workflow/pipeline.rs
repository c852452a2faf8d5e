//! Audio-data pipeline driver
//!
//! Per track file:
//! read tags → screen (too long / already calculated) → backend call →
//! reconcile → optional write-back → record.
//!
//! Every failure is caught here, logged with its context and counted; the
//! run always continues with the next file. Cancellation is checked between
//! files only, so a started file always reaches a terminal state.

use crate::error::TagError;
use crate::models::{
    AudioData, CollectionEntry, FileResult, ReconciliationOutcome, TrackFile, TrackMetadata,
};
use crate::services::{AudioAnalyzer, Reconciler, TagStore};
use crate::workflow::RunStats;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Result of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// The run stopped early on request
    pub cancelled: bool,
    pub stats: RunStats,
}

/// Orchestrates the per-file workflow over a collection traversal
pub struct Pipeline {
    analyzer: Arc<dyn AudioAnalyzer>,
    tag_store: Arc<dyn TagStore>,
    reconciler: Reconciler,
    concurrency: usize,
    cancel: CancellationToken,
}

impl Pipeline {
    pub fn new(
        analyzer: Arc<dyn AudioAnalyzer>,
        tag_store: Arc<dyn TagStore>,
        reconciler: Reconciler,
    ) -> Self {
        Self {
            analyzer,
            tag_store,
            reconciler,
            concurrency: 1,
            cancel: CancellationToken::new(),
        }
    }

    /// Process up to `concurrency` files at once (1 keeps strict enumeration order)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Stop pulling new files once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run over every entry and return the final statistics
    pub async fn run<I>(&self, entries: I) -> RunSummary
    where
        I: IntoIterator<Item = CollectionEntry>,
    {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut stats = RunStats::new();

        debug!(%run_id, concurrency = self.concurrency, "Pipeline run started");

        let cancel = self.cancel.clone();
        let mut results = stream::iter(entries)
            .take_while(move |_| futures::future::ready(!cancel.is_cancelled()))
            .map(|entry| async move {
                match entry {
                    CollectionEntry::Directory(path) => {
                        debug!(path = %path.display(), "Directory visited");
                        None
                    }
                    CollectionEntry::File(file) => Some(self.process_file(&file).await),
                }
            })
            .buffer_unordered(self.concurrency);

        while let Some(result) = results.next().await {
            match result {
                Some(file_result) => stats.record(&file_result),
                None => stats.record_directory(),
            }
        }

        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            warn!(%run_id, "Run cancelled, remaining tracks were not processed");
        }

        info!(
            %run_id,
            processed_file = stats.processed.file,
            processed_dir = stats.processed.dir,
            updated = stats.updated,
            calculated = stats.calculated,
            mismatch_initial_key = stats.mismatch.initial_key,
            mismatch_bpm = stats.mismatch.bpm,
            skipped_too_long = stats.skipped.too_long,
            skipped_already_calculated = stats.skipped.already_calculated,
            skipped_same_data = stats.skipped.same_data,
            error_backend = stats.error.backend,
            error_tags = stats.error.tags,
            cancelled,
            "Task finished"
        );

        RunSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            cancelled,
            stats,
        }
    }

    /// Take one track file to its terminal state
    pub async fn process_file(&self, file: &TrackFile) -> FileResult {
        let pathname = file.path().display();

        info!(pathname = %pathname, "Processing track");

        let metadata = match self.tag_store.read_tags(file.path()).await {
            Ok(metadata) => metadata,
            Err(e) => {
                error!(pathname = %pathname, error = %e, "Failed to read track metadata");
                return FileResult::TagsFailed { mismatch: None };
            }
        };

        if let Some(outcome) = self.reconciler.screen(&metadata) {
            match outcome {
                ReconciliationOutcome::SkippedTooLong => info!(
                    length = metadata.duration_minutes(),
                    "Track is too long, skipping..."
                ),
                ReconciliationOutcome::SkippedAlreadyCalculated => info!(
                    bpm = ?metadata.bpm,
                    initial_key = ?metadata.initial_key,
                    "Track is already calculated (bpm and initial_key exists), skipping"
                ),
                _ => {}
            }
            return FileResult::Completed(outcome);
        }

        let audio_data = match self.analyzer.compute_audio_data(file.relative_path()).await {
            Ok(audio_data) => audio_data,
            Err(e) => {
                error!(
                    pathname = %pathname,
                    metadata = ?metadata,
                    kind = ?e.kind,
                    code = e.code,
                    "{}",
                    e.message
                );
                return FileResult::BackendFailed;
            }
        };

        let outcome = self.reconciler.reconcile(&metadata, &audio_data);

        match outcome {
            ReconciliationOutcome::SkippedUnchanged { .. } => {
                info!(
                    bpm = %audio_data.bpm,
                    initial_key = %audio_data.initial_key,
                    "Track has the same audio data, update is not necessary"
                );
                return FileResult::Completed(outcome);
            }
            ReconciliationOutcome::CalculatedOnly { .. } => {
                log_audio_data("Calculated track audio data", &metadata, &audio_data);
            }
            ReconciliationOutcome::Updated { mismatch } => {
                log_audio_data("Updating track audio data", &metadata, &audio_data);

                if let Err(e) = self.write_back(file, &audio_data).await {
                    let (writer_errors, writer_warnings) = match &e {
                        TagError::Write {
                            errors, warnings, ..
                        } => (errors.clone(), warnings.clone()),
                        _ => (Vec::new(), Vec::new()),
                    };
                    error!(
                        pathname = %pathname,
                        metadata = ?metadata,
                        audio_data = ?audio_data,
                        writer_errors = ?writer_errors,
                        writer_warnings = ?writer_warnings,
                        "{}",
                        e
                    );
                    return FileResult::TagsFailed {
                        mismatch: Some(mismatch),
                    };
                }
            }
            ReconciliationOutcome::SkippedTooLong
            | ReconciliationOutcome::SkippedAlreadyCalculated => {
                return FileResult::Completed(outcome);
            }
        }

        info!(pathname = %pathname, "Track processing completed successfully");
        FileResult::Completed(outcome)
    }

    async fn write_back(&self, file: &TrackFile, audio_data: &AudioData) -> Result<(), TagError> {
        let report = self.tag_store.write_tags(file.path(), audio_data).await?;

        if !report.is_ok() {
            return Err(TagError::Write {
                path: file.path().to_path_buf(),
                errors: report.errors,
                warnings: report.warnings,
            });
        }

        if !report.warnings.is_empty() {
            warn!(
                pathname = %file.path().display(),
                warnings = ?report.warnings,
                "Track metadata saved with warnings"
            );
        }

        Ok(())
    }
}

fn log_audio_data(message: &str, metadata: &TrackMetadata, audio_data: &AudioData) {
    info!(
        computed_bpm = %audio_data.bpm,
        computed_initial_key = %audio_data.initial_key,
        stored_bpm = ?metadata.bpm,
        stored_initial_key = ?metadata.initial_key,
        "{}",
        message
    );
}
