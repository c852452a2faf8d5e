//! # Assistant Common Library
//!
//! Shared code for the music-collection assistant tools:
//! - Error types
//! - Bootstrap configuration (TOML file, collection root resolution)
//! - Collection ignore settings (`IgnoreConfig`); the traversal rules that
//!   apply them live in assistant-audio

pub mod config;
pub mod error;

pub use error::{Error, Result};
