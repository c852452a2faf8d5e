//! Common error types for the assistant tools

use thiserror::Error;

/// Common result type for assistant operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by every assistant crate
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested path or resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or command-line parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
