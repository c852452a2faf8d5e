//! Run orchestration and statistics

pub mod pipeline;
pub mod statistics;

pub use pipeline::{Pipeline, RunSummary};
pub use statistics::RunStats;
