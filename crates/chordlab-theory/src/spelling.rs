//! Key-aware enharmonic spelling.
//!
//! Each of the 12 tonics has a fixed 7-note letter spelling per mode,
//! following standard key-signature convention (each letter name used
//! exactly once per scale). The tables are literal data, not derived,
//! so they stay bit-exact with conventional spelling.

use crate::pitch::PitchClass;
use crate::scale::Mode;

/// Major-scale spellings, indexed by the tonic's chromatic index.
///
/// Black-key tonics use their conventional key: C# is spelled as Db major
/// (5 flats), D# as Eb major, G# as Ab major, A# as Bb major.
const MAJOR_SPELLINGS: [[&str; 7]; 12] = [
    ["C", "D", "E", "F", "G", "A", "B"],
    ["Db", "Eb", "F", "Gb", "Ab", "Bb", "C"],
    ["D", "E", "F#", "G", "A", "B", "C#"],
    ["Eb", "F", "G", "Ab", "Bb", "C", "D"],
    ["E", "F#", "G#", "A", "B", "C#", "D#"],
    ["F", "G", "A", "Bb", "C", "D", "E"],
    ["F#", "G#", "A#", "B", "C#", "D#", "E#"],
    ["G", "A", "B", "C", "D", "E", "F#"],
    ["Ab", "Bb", "C", "Db", "Eb", "F", "G"],
    ["A", "B", "C#", "D", "E", "F#", "G#"],
    ["Bb", "C", "D", "Eb", "F", "G", "A"],
    ["B", "C#", "D#", "E", "F#", "G#", "A#"],
];

/// Natural-minor spellings, indexed by the tonic's chromatic index.
///
/// Minor keys carry the key signature of their relative major.
const MINOR_SPELLINGS: [[&str; 7]; 12] = [
    ["C", "D", "Eb", "F", "G", "Ab", "Bb"],
    ["C#", "D#", "E", "F#", "G#", "A", "B"],
    ["D", "E", "F", "G", "A", "Bb", "C"],
    ["Eb", "F", "Gb", "Ab", "Bb", "Cb", "Db"],
    ["E", "F#", "G", "A", "B", "C", "D"],
    ["F", "G", "Ab", "Bb", "C", "Db", "Eb"],
    ["F#", "G#", "A", "B", "C#", "D", "E"],
    ["G", "A", "Bb", "C", "D", "Eb", "F"],
    ["G#", "A#", "B", "C#", "D#", "E", "F#"],
    ["A", "B", "C", "D", "E", "F", "G"],
    ["Bb", "C", "Db", "Eb", "F", "Gb", "Ab"],
    ["B", "C#", "D", "E", "F#", "G", "A"],
];

/// Sharp spelling of each chromatic index.
const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Flat spelling of each chromatic index.
const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Whether a tonic sits on the sharp side of the circle of fifths.
fn is_sharp_key(tonic: PitchClass) -> bool {
    matches!(
        tonic,
        PitchClass::C
            | PitchClass::G
            | PitchClass::D
            | PitchClass::A
            | PitchClass::E
            | PitchClass::B
            | PitchClass::Fs
    )
}

/// Whether a tonic sits on the flat side of the circle of fifths.
///
/// The black-key tonics here are played as A#/D#/G#/C# but named
/// Bb/Eb/Ab/Db.
fn is_flat_key(tonic: PitchClass) -> bool {
    matches!(
        tonic,
        PitchClass::F | PitchClass::As | PitchClass::Ds | PitchClass::Gs | PitchClass::Cs
    )
}

/// Letter-name spelling of a chromatic position in the given key context.
///
/// Diatonic notes take their scale spelling from the key's table.
/// Chromatic passing tones are spelled sharp in sharp keys and flat in
/// flat keys, defaulting to sharp.
pub fn spelling(chromatic_index: i32, tonic: PitchClass, mode: Mode) -> &'static str {
    let index = chromatic_index.rem_euclid(12);
    let row = match mode {
        Mode::Major => &MAJOR_SPELLINGS[tonic.chromatic_index() as usize],
        Mode::Minor => &MINOR_SPELLINGS[tonic.chromatic_index() as usize],
    };

    let root = tonic.chromatic_index();
    for (degree, interval) in mode.intervals().iter().enumerate() {
        if (root + interval).rem_euclid(12) == index {
            return row[degree];
        }
    }

    if is_flat_key(tonic) && !is_sharp_key(tonic) {
        FLAT_NAMES[index as usize]
    } else {
        SHARP_NAMES[index as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PitchClass::*;

    #[test]
    fn test_diatonic_spellings() {
        assert_eq!(spelling(1, Cs, Mode::Major), "Db");
        assert_eq!(spelling(10, F, Mode::Major), "Bb");
        assert_eq!(spelling(6, D, Mode::Major), "F#");
        // Eb minor spells B as Cb
        assert_eq!(spelling(11, Ds, Mode::Minor), "Cb");
    }

    #[test]
    fn test_chromatic_spellings_follow_key_signature() {
        // Eb in G major (sharp key) is spelled D#
        assert_eq!(spelling(3, G, Mode::Major), "D#");
        // F# in F major (flat key) is spelled Gb
        assert_eq!(spelling(6, F, Mode::Major), "Gb");
        // C defaults to sharp
        assert_eq!(spelling(1, C, Mode::Major), "C#");
    }

    #[test]
    fn test_each_letter_used_once_per_row() {
        for table in [&MAJOR_SPELLINGS, &MINOR_SPELLINGS] {
            for row in table.iter() {
                let mut letters: Vec<u8> = row.iter().map(|s| s.as_bytes()[0]).collect();
                letters.sort_unstable();
                letters.dedup();
                assert_eq!(letters.len(), 7, "row {row:?}");
            }
        }
    }

    #[test]
    fn test_rows_agree_with_chromatic_positions() {
        // Every spelled name must denote the pitch class at its scale slot
        for tonic in PitchClass::ALL {
            for mode in [Mode::Major, Mode::Minor] {
                for (degree, interval) in mode.intervals().iter().enumerate() {
                    let expected = tonic.transpose(*interval);
                    let name = spelling(expected.chromatic_index(), tonic, mode);
                    let parsed: PitchClass = name.parse().unwrap();
                    assert_eq!(parsed, expected, "{tonic} {mode} degree {degree}");
                }
            }
        }
    }
}
