//! Error types for chordlab-playback.

use thiserror::Error;

/// Result type alias for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Errors from timeline edits.
///
/// Playback control itself never errors: `play`/`pause`/`stop` decline
/// silently when their preconditions do not hold.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No block with the given id exists on the timeline.
    #[error("Unknown chord block: {0}")]
    UnknownBlock(u64),

    /// Block durations must be positive.
    #[error("Invalid block duration: {0}")]
    InvalidDuration(f64),

    /// Reorder indices must address existing blocks.
    #[error("Block index out of range: {0}")]
    IndexOutOfRange(usize),
}
