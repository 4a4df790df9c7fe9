//! Error types for chordlab-theory.

use thiserror::Error;

/// Result type alias for theory operations.
pub type Result<T> = std::result::Result<T, TheoryError>;

/// Errors that can occur when parsing musical input.
///
/// Harmony derivation itself is infallible over well-formed enum inputs;
/// errors only arise at the text boundary.
#[derive(Debug, Error)]
pub enum TheoryError {
    /// A note name that is not one of the 12 pitch classes.
    #[error("Unknown pitch class: {0}")]
    InvalidPitch(String),

    /// A mode name other than "major" or "minor".
    #[error("Unknown mode: {0}")]
    InvalidMode(String),
}
