//! Shared helpers for assistant-common integration tests

#![allow(dead_code)]

pub mod log_capture;

pub use log_capture::LogCapture;
