//! assistant-audio library
//!
//! Recomputes tempo (BPM) and musical key for audio tracks through an
//! external analysis backend, reconciles the results with the stored tags,
//! optionally writes them back and reports per-run statistics.

pub mod error;
pub mod models;
pub mod services;
pub mod workflow;

pub use error::{BackendError, BackendErrorKind, SetupError, TagError};
pub use workflow::{Pipeline, RunStats, RunSummary};
