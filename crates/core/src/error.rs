//! Error types for the Toron workspace.
//!
//! The pipeline itself is total and never returns these. They cover the
//! ambient surfaces: configuration, transcript reading and parsing, and JSON
//! output.

use thiserror::Error;

/// The top-level error type for all fallible Toron operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Transcript errors ---
    #[error("Transcript error on line {line}: {reason}")]
    Transcript { line: usize, reason: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- I/O ---
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;
