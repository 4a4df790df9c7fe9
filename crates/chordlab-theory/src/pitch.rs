//! Chromatic pitch-class space and equal-temperament frequency math.
//!
//! This module provides the fundamental pitch types used throughout Chordlab:
//!
//! - [`PitchClass`] - One of the 12 chromatic pitch classes
//! - MIDI note / frequency conversions in twelve-tone equal temperament

use crate::errors::TheoryError;
use std::fmt;
use std::str::FromStr;

/// Reference tuning frequency (A4).
pub const A4_HZ: f64 = 440.0;

/// MIDI note number of A4.
pub const A4_MIDI: i32 = 69;

/// One of the 12 chromatic pitch classes.
///
/// Variants are named by their sharp spelling; key-aware flat spellings
/// live in the [`crate::spelling`] module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PitchClass {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl PitchClass {
    /// All 12 pitch classes in chromatic order, starting at C.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Chromatic index of this pitch class (C = 0 .. B = 11).
    pub fn chromatic_index(self) -> i32 {
        self as i32
    }

    /// Pitch class for a chromatic index. Any integer is accepted and
    /// wrapped into 0..12.
    pub fn from_index(index: i32) -> Self {
        Self::ALL[index.rem_euclid(12) as usize]
    }

    /// Pitch class transposed up by `semitones` (wraps at the octave).
    pub fn transpose(self, semitones: i32) -> Self {
        Self::from_index(self.chromatic_index() + semitones)
    }

    /// True for the five black keys on a piano keyboard.
    pub fn is_black_key(self) -> bool {
        matches!(
            self,
            PitchClass::Cs | PitchClass::Ds | PitchClass::Fs | PitchClass::Gs | PitchClass::As
        )
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        };
        f.write_str(name)
    }
}

impl FromStr for PitchClass {
    type Err = TheoryError;

    /// Parse a note name. Both sharp and flat spellings are accepted
    /// ("C#" and "Db" name the same pitch class).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pc = match s {
            "C" => PitchClass::C,
            "C#" | "Db" => PitchClass::Cs,
            "D" => PitchClass::D,
            "D#" | "Eb" => PitchClass::Ds,
            "E" | "Fb" => PitchClass::E,
            "F" | "E#" => PitchClass::F,
            "F#" | "Gb" => PitchClass::Fs,
            "G" => PitchClass::G,
            "G#" | "Ab" => PitchClass::Gs,
            "A" => PitchClass::A,
            "A#" | "Bb" => PitchClass::As,
            "B" | "Cb" => PitchClass::B,
            other => return Err(TheoryError::InvalidPitch(other.to_string())),
        };
        Ok(pc)
    }
}

/// MIDI note number for a pitch class and octave (C4 = 60, A4 = 69).
pub fn note_to_midi(pitch: PitchClass, octave: i32) -> i32 {
    (octave + 1) * 12 + pitch.chromatic_index()
}

/// Pitch class and octave for a MIDI note number (MIDI 21 = A0).
pub fn midi_to_note(midi: i32) -> (PitchClass, i32) {
    let pitch = PitchClass::from_index((midi - 12).rem_euclid(12));
    let octave = (midi - 12).div_euclid(12);
    (pitch, octave)
}

/// Frequency in Hz for a MIDI note number.
///
/// Equal temperament: `f = 440 * 2^((midi - 69) / 12)`.
pub fn midi_to_frequency(midi: i32) -> f64 {
    A4_HZ * 2.0_f64.powf((midi - A4_MIDI) as f64 / 12.0)
}

/// Frequency in Hz for a pitch class and octave.
pub fn frequency(pitch: PitchClass, octave: i32) -> f64 {
    midi_to_frequency(note_to_midi(pitch, octave))
}

/// Nearest MIDI note number for a frequency in Hz.
pub fn frequency_to_midi(hz: f64) -> i32 {
    (A4_MIDI as f64 + 12.0 * (hz / A4_HZ).log2()).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chromatic_index_roundtrip() {
        for (i, pc) in PitchClass::ALL.iter().enumerate() {
            assert_eq!(pc.chromatic_index(), i as i32);
            assert_eq!(PitchClass::from_index(i as i32), *pc);
        }
        assert_eq!(PitchClass::from_index(-1), PitchClass::B);
        assert_eq!(PitchClass::from_index(12), PitchClass::C);
    }

    #[test]
    fn test_parse_enharmonic_names() {
        assert_eq!("C#".parse::<PitchClass>().unwrap(), PitchClass::Cs);
        assert_eq!("Db".parse::<PitchClass>().unwrap(), PitchClass::Cs);
        assert_eq!("Bb".parse::<PitchClass>().unwrap(), PitchClass::As);
        assert!("H".parse::<PitchClass>().is_err());
    }

    #[test]
    fn test_reference_frequencies() {
        assert!((frequency(PitchClass::A, 4) - 440.0).abs() < 1e-9);
        assert!((frequency(PitchClass::C, 4) - 261.6256).abs() < 0.001);
        assert!((midi_to_frequency(60) - 261.6256).abs() < 0.001);
    }

    #[test]
    fn test_frequency_to_midi_nearest() {
        assert_eq!(frequency_to_midi(440.0), 69);
        assert_eq!(frequency_to_midi(261.63), 60);
        // A little sharp of A4 still rounds to 69
        assert_eq!(frequency_to_midi(445.0), 69);
    }

    #[test]
    fn test_midi_roundtrip_all_piano_keys() {
        // MIDI 21 (A0) through 108 (C8): the 88 standard piano keys
        for midi in 21..=108 {
            let (pitch, octave) = midi_to_note(midi);
            assert_eq!(note_to_midi(pitch, octave), midi);
        }
        assert_eq!(midi_to_note(21), (PitchClass::A, 0));
        assert_eq!(midi_to_note(108), (PitchClass::C, 8));
    }
}
