//! Chord progression playback.
//!
//! This crate schedules chord-block timelines against an audio clock:
//!
//! - [`clock`]: clock abstraction, tempo, and fixed-point grid time
//! - [`timeline`]: chord blocks on an eighth-note grid
//! - [`scheduler`]: the lookahead scheduler state machine
//! - [`runner`]: background thread driving the scheduler in real time
//!
//! Positions and durations are measured in eighth-note units, converted
//! to seconds through the current [`clock::Tempo`]. The scheduler is
//! instrument-agnostic: anything implementing [`scheduler::NoteSink`]
//! (including plain closures) receives `(frequency, start, duration)`
//! triggers ahead of their audible time.

pub mod clock;
pub mod errors;
pub mod runner;
pub mod scheduler;
pub mod timeline;

pub use clock::{AudioClock, GridTime, SystemClock, Tempo, VirtualClock};
pub use errors::{PlaybackError, Result};
pub use runner::PlaybackRunner;
pub use scheduler::{
    NoteSink, PlaybackEvent, PlaybackScheduler, PlaybackState, LOOKAHEAD_SECONDS,
    SCHEDULE_INTERVAL_MS,
};
pub use timeline::{ChordBlock, Timeline};
