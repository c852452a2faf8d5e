//! Error types for assistant-audio
//!
//! Per-file failures ([`BackendError`], [`TagError`]) are caught by the
//! pipeline, logged, counted and never abort a run. [`SetupError`] covers
//! everything that must stop the run before the first file is touched.

use std::path::PathBuf;
use thiserror::Error;

/// Classification of analysis backend failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Connection, DNS or TLS failure
    Transport,
    /// The request exceeded the configured timeout
    Timeout,
    /// The service answered with an error status
    Service,
    /// The service answered 2xx with an unusable body
    InvalidResponse,
}

/// Analysis backend failure
#[derive(Debug, Clone, Error)]
#[error("{message} (code {code})")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
    /// HTTP status when one was received, 500 otherwise
    pub code: u16,
}

impl BackendError {
    /// Status used when the transport gives no HTTP status
    pub const FALLBACK_CODE: u16 = 500;

    pub fn new(kind: BackendErrorKind, message: impl Into<String>, code: u16) -> Self {
        Self {
            kind,
            message: message.into(),
            code,
        }
    }

    /// Build from a reqwest failure, keeping the transport's own text
    pub fn from_transport(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            BackendErrorKind::Timeout
        } else {
            BackendErrorKind::Transport
        };
        let code = err
            .status()
            .map(|s| s.as_u16())
            .unwrap_or(Self::FALLBACK_CODE);

        Self::new(kind, err.to_string(), code)
    }
}

/// Tag store failures
#[derive(Debug, Clone, Error)]
pub enum TagError {
    /// Tags could not be read from the file
    #[error("Failed to read tags from {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    /// The tag writer reported hard errors; nothing was persisted
    #[error("Failed to write tags to {}: {}", path.display(), errors.join("; "))]
    Write {
        path: PathBuf,
        errors: Vec<String>,
        warnings: Vec<String>,
    },

    /// Blocking tag task could not be joined
    #[error("Tag task failed: {0}")]
    Task(String),
}

/// Fatal errors raised before processing starts
#[derive(Debug, Error)]
pub enum SetupError {
    /// The enumeration target does not exist
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// The configured collection root does not exist
    #[error("Collection root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// The analysis backend client could not be built
    #[error("Backend client setup failed: {0}")]
    Backend(String),

    /// Configuration or output preparation failed
    #[error(transparent)]
    Common(#[from] assistant_common::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::new(BackendErrorKind::Service, "keyfinder: no audio stream", 422);
        assert_eq!(err.to_string(), "keyfinder: no audio stream (code 422)");
    }

    #[test]
    fn test_write_error_lists_every_writer_error() {
        let err = TagError::Write {
            path: PathBuf::from("/lib/a.mp3"),
            errors: vec!["disk full".into(), "file locked".into()],
            warnings: vec![],
        };
        assert_eq!(
            err.to_string(),
            "Failed to write tags to /lib/a.mp3: disk full; file locked"
        );
    }
}
