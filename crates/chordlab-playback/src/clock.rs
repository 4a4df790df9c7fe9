//! Timing primitives for playback.
//!
//! This module provides the timing types used by the scheduler:
//!
//! - [`AudioClock`] - The externally supplied monotonic clock
//! - [`SystemClock`] / [`VirtualClock`] - Wall-clock and manual impls
//! - [`Tempo`] - BPM with eighth-note grid conversion
//! - [`GridTime`] - Fixed-point position on the eighth-note grid

use std::sync::{Arc, Mutex};
use std::time::Instant;

/// A monotonically increasing clock measured in seconds.
///
/// Playback is always positioned against this clock; the scheduler never
/// consults wall time directly. In a deployment this is the audio
/// backend's clock, in tests and offline rendering a [`VirtualClock`].
pub trait AudioClock {
    /// Current time in seconds. Must never decrease.
    fn now(&self) -> f64;
}

/// Wall-clock implementation backed by [`Instant`].
#[derive(Clone, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioClock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Manually advanced clock for tests and offline rendering.
///
/// Clones share the same underlying time, so a driver can advance the
/// clock it handed to the scheduler.
#[derive(Clone, Debug, Default)]
pub struct VirtualClock {
    seconds: Arc<Mutex<f64>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by `seconds`.
    pub fn advance(&self, seconds: f64) {
        let mut t = self.seconds.lock().expect("clock lock poisoned");
        *t += seconds.max(0.0);
    }
}

impl AudioClock for VirtualClock {
    fn now(&self) -> f64 {
        *self.seconds.lock().expect("clock lock poisoned")
    }
}

/// Playback tempo in beats per minute, clamped to 60..=180.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tempo {
    bpm: f64,
}

impl Tempo {
    pub fn new(bpm: f64) -> Self {
        Self { bpm: bpm.clamp(60.0, 180.0) }
    }

    pub fn bpm(self) -> f64 {
        self.bpm
    }

    /// Seconds per eighth note: `(60 / bpm) / 2`.
    pub fn seconds_per_eighth(self) -> f64 {
        (60.0 / self.bpm) / 2.0
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::new(120.0)
    }
}

/// Fixed-point position on the eighth-note grid, with 16 fractional bits.
///
/// Grid positions key the scheduled-event registry, so they need exact
/// equality and hashing; fixed point gives that without floating-point
/// drift.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridTime {
    eighths: i64,
}

impl GridTime {
    const SCALE: i64 = 65_536;

    /// Zero grid time constant.
    pub const ZERO: GridTime = GridTime { eighths: 0 };

    /// Create a GridTime from a floating-point eighth-note position.
    #[inline]
    pub fn from_float(value: f64) -> Self {
        Self { eighths: (value * Self::SCALE as f64).round() as i64 }
    }

    /// Convert back to a floating-point position.
    #[inline]
    pub fn to_float(self) -> f64 {
        self.eighths as f64 / Self::SCALE as f64
    }
}
