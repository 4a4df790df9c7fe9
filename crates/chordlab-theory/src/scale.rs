//! Scale derivation and scale-degree labelling.
//!
//! Scales are derived from fixed semitone interval tables:
//!
//! - Major: `[0, 2, 4, 5, 7, 9, 11]`
//! - Natural minor: `[0, 2, 3, 5, 7, 8, 10]`

use crate::errors::TheoryError;
use crate::pitch::PitchClass;
use std::fmt;
use std::str::FromStr;

/// Major or natural minor mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    /// Semitone offsets of the 7 scale degrees from the tonic.
    pub fn intervals(self) -> &'static [i32; 7] {
        match self {
            Mode::Major => &[0, 2, 4, 5, 7, 9, 11],
            Mode::Minor => &[0, 2, 3, 5, 7, 8, 10],
        }
    }

    /// The parallel mode (same tonic, opposite quality).
    pub fn parallel(self) -> Mode {
        match self {
            Mode::Major => Mode::Minor,
            Mode::Minor => Mode::Major,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Major => f.write_str("major"),
            Mode::Minor => f.write_str("minor"),
        }
    }
}

impl FromStr for Mode {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "major" | "maj" => Ok(Mode::Major),
            "minor" | "min" => Ok(Mode::Minor),
            other => Err(TheoryError::InvalidMode(other.to_string())),
        }
    }
}

/// The 7 ordered scale notes for a tonic and mode.
pub fn scale_notes(tonic: PitchClass, mode: Mode) -> [PitchClass; 7] {
    let mut notes = [PitchClass::C; 7];
    for (slot, interval) in notes.iter_mut().zip(mode.intervals()) {
        *slot = tonic.transpose(*interval);
    }
    notes
}

/// Whether a note belongs to the given scale.
pub fn is_in_scale(note: PitchClass, scale: &[PitchClass; 7]) -> bool {
    scale.contains(&note)
}

/// Scale-degree label for a chromatic position relative to a key.
///
/// Diatonic notes yield "1".."7". Chromatic notes yield an accidental
/// label following standard conventions, e.g. in C major E♭ (position 3)
/// is "♭3" and in A minor G♯ (interval 11) is "7" (the leading tone).
pub fn scale_degree_label(chromatic_position: i32, tonic: PitchClass, mode: Mode) -> String {
    let interval = (chromatic_position - tonic.chromatic_index()).rem_euclid(12);
    let scale = mode.intervals();

    if let Some(degree) = scale.iter().position(|&i| i == interval) {
        return (degree + 1).to_string();
    }

    let chromatic = match mode {
        Mode::Major => match interval {
            1 => Some("♭2"),
            3 => Some("♭3"),
            6 => Some("♭5"),
            8 => Some("♭6"),
            10 => Some("♭7"),
            _ => None,
        },
        Mode::Minor => match interval {
            1 => Some("♭2"),
            4 => Some("3"),
            6 => Some("♭5"),
            9 => Some("6"),
            11 => Some("7"),
            _ => None,
        },
    };

    match chromatic {
        Some(label) => label.to_string(),
        None => format!("♯{}", nearest_lower_degree(interval, scale)),
    }
}

/// 1-based index of the closest diatonic degree below `interval`, or 1 if
/// none is lower.
fn nearest_lower_degree(interval: i32, scale: &[i32; 7]) -> usize {
    for (i, &step) in scale.iter().enumerate().rev() {
        if step < interval {
            return i + 1;
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use PitchClass::*;

    #[test]
    fn test_c_major_scale() {
        assert_eq!(scale_notes(C, Mode::Major), [C, D, E, F, G, A, B]);
    }

    #[test]
    fn test_a_minor_scale() {
        assert_eq!(scale_notes(A, Mode::Minor), [A, B, C, D, E, F, G]);
    }

    #[test]
    fn test_all_keys_have_seven_distinct_notes() {
        for tonic in PitchClass::ALL {
            for mode in [Mode::Major, Mode::Minor] {
                let scale = scale_notes(tonic, mode);
                for i in 0..7 {
                    for j in (i + 1)..7 {
                        assert_ne!(scale[i], scale[j], "{tonic} {mode}");
                    }
                }
                assert_eq!(scale[0], tonic);
            }
        }
    }

    #[test]
    fn test_is_in_scale() {
        let scale = scale_notes(C, Mode::Major);
        assert!(is_in_scale(E, &scale));
        assert!(!is_in_scale(Fs, &scale));
    }

    #[test]
    fn test_diatonic_degree_labels() {
        assert_eq!(scale_degree_label(0, C, Mode::Major), "1");
        assert_eq!(scale_degree_label(2, C, Mode::Major), "2");
        assert_eq!(scale_degree_label(11, C, Mode::Major), "7");
        // Relative to a non-C tonic
        assert_eq!(scale_degree_label(9, D, Mode::Major), "5");
    }

    #[test]
    fn test_chromatic_degree_labels_major() {
        assert_eq!(scale_degree_label(3, C, Mode::Major), "♭3");
        assert_eq!(scale_degree_label(6, C, Mode::Major), "♭5");
        assert_eq!(scale_degree_label(10, C, Mode::Major), "♭7");
    }

    #[test]
    fn test_chromatic_degree_labels_minor() {
        // In A minor: C# is the raised 3rd, G# the leading tone
        assert_eq!(scale_degree_label(1, A, Mode::Minor), "3");
        assert_eq!(scale_degree_label(8, A, Mode::Minor), "7");
        assert_eq!(scale_degree_label(10, A, Mode::Minor), "♭2");
    }

    #[test]
    fn test_nearest_lower_degree_fallback() {
        assert_eq!(nearest_lower_degree(6, Mode::Major.intervals()), 4);
        assert_eq!(nearest_lower_degree(0, Mode::Major.intervals()), 1);
    }
}
