//! Custom error types for rustwos.
//!
//! Integrity violations (UID or guess collisions, malformed input) are fatal
//! and abort the run. References that simply do not resolve are never errors.

use crate::record::Record;
use crate::uid::Uid;
use thiserror::Error;

/// Main error type for rustwos operations.
#[derive(Debug, Error)]
pub enum WosError {
    /// Continuation line with no field line before it in the same block
    #[error("Malformed line {line_number}: continuation line without a preceding tag: {line:?}")]
    MalformedLine {
        /// 1-based line number within the source
        line_number: usize,
        /// The offending line
        line: String,
    },

    /// Two distinct paper records produced the same UID
    #[error("UID collision on {uid}: two paper records share it")]
    UidCollision {
        uid: Uid,
        first: Box<Record>,
        second: Box<Record>,
    },

    /// Two distinct papers synthesized the same constructed guess
    #[error("Guess collision on {guess:?}: {first} and {second}")]
    GuessCollision { guess: String, first: Uid, second: Uid },

    /// A paper lacks a field that guess construction needs
    #[error("Paper {uid} has no {tag} field")]
    MissingField { uid: Uid, tag: &'static str },

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias using `WosError`
pub type Result<T> = std::result::Result<T, WosError>;
