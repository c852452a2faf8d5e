//! Test Helper Utilities
//!
//! Shared fakes and fixtures for assistant-audio integration tests

#![allow(dead_code)]

pub mod audio_generator;
pub mod fakes;

pub use audio_generator::{generate_test_wav, AudioConfig};
pub use fakes::{track_metadata, InMemoryTagStore, ScriptedAnalyzer};
