//! Diatonic, seventh, and borrowed chord derivation.
//!
//! Chords are built by zipping the scale notes of a key against fixed
//! per-mode quality tables. Borrowed (modal-interchange) chords come from
//! a fixed recipe over the parallel mode rather than from the scale.

use crate::pitch::{self, PitchClass};
use crate::scale::{scale_notes, Mode};
use std::fmt;

/// Chord quality, covering triads and the common seventh chords.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChordQuality {
    Maj,
    Min,
    Dim,
    Maj7,
    Min7,
    Dom7,
    HalfDim7,
}

impl ChordQuality {
    /// Semitone intervals of this quality from the chord root.
    pub fn intervals(self) -> &'static [i32] {
        match self {
            ChordQuality::Maj => &[0, 4, 7],
            ChordQuality::Min => &[0, 3, 7],
            ChordQuality::Dim => &[0, 3, 6],
            ChordQuality::Maj7 => &[0, 4, 7, 11],
            ChordQuality::Min7 => &[0, 3, 7, 10],
            ChordQuality::Dom7 => &[0, 4, 7, 10],
            ChordQuality::HalfDim7 => &[0, 3, 6, 10],
        }
    }

    /// Quality recognized from an interval set, defaulting to major.
    pub fn from_intervals(intervals: &[i32]) -> Self {
        match intervals {
            [0, 4, 7] => ChordQuality::Maj,
            [0, 3, 7] => ChordQuality::Min,
            [0, 3, 6] => ChordQuality::Dim,
            [0, 4, 7, 11] => ChordQuality::Maj7,
            [0, 3, 7, 10] => ChordQuality::Min7,
            [0, 4, 7, 10] => ChordQuality::Dom7,
            [0, 3, 6, 10] => ChordQuality::HalfDim7,
            _ => ChordQuality::Maj,
        }
    }

    /// Chord-symbol suffix for this quality ("m", "°", "maj7", ...).
    pub fn suffix(self) -> &'static str {
        match self {
            ChordQuality::Maj => "",
            ChordQuality::Min => "m",
            ChordQuality::Dim => "°",
            ChordQuality::Maj7 => "maj7",
            ChordQuality::Min7 => "m7",
            ChordQuality::Dom7 => "7",
            ChordQuality::HalfDim7 => "ø7",
        }
    }
}

impl fmt::Display for ChordQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChordQuality::Maj => "maj",
            ChordQuality::Min => "min",
            ChordQuality::Dim => "dim",
            ChordQuality::Maj7 => "maj7",
            ChordQuality::Min7 => "min7",
            ChordQuality::Dom7 => "dom7",
            ChordQuality::HalfDim7 => "half-dim7",
        };
        f.write_str(name)
    }
}

/// A chord rooted on a concrete pitch class.
#[derive(Clone, Debug, PartialEq)]
pub struct ChordDefinition {
    /// Roman-numeral label within its key ("ii", "bVI", ...).
    pub numeral: String,
    /// Chord quality.
    pub quality: ChordQuality,
    /// Root pitch class.
    pub root: PitchClass,
    /// Semitone offsets from the root, strictly ascending, deduplicated.
    pub intervals: Vec<i32>,
}

impl ChordDefinition {
    /// Create a chord definition, normalizing the interval set.
    pub fn new(
        numeral: impl Into<String>,
        quality: ChordQuality,
        root: PitchClass,
        intervals: &[i32],
    ) -> Self {
        let mut intervals = intervals.to_vec();
        intervals.sort_unstable();
        intervals.dedup();
        Self {
            numeral: numeral.into(),
            quality,
            root,
            intervals,
        }
    }

    /// Chord symbol, e.g. "Dm" or "G7".
    pub fn symbol(&self) -> String {
        chord_symbol(self.root, self.quality)
    }
}

/// Numeral and quality of each diatonic triad, per mode.
const MAJOR_TRIADS: [(&str, ChordQuality); 7] = [
    ("I", ChordQuality::Maj),
    ("ii", ChordQuality::Min),
    ("iii", ChordQuality::Min),
    ("IV", ChordQuality::Maj),
    ("V", ChordQuality::Maj),
    ("vi", ChordQuality::Min),
    ("vii°", ChordQuality::Dim),
];

const MINOR_TRIADS: [(&str, ChordQuality); 7] = [
    ("i", ChordQuality::Min),
    ("ii°", ChordQuality::Dim),
    ("III", ChordQuality::Maj),
    ("iv", ChordQuality::Min),
    ("v", ChordQuality::Min),
    ("VI", ChordQuality::Maj),
    ("VII", ChordQuality::Maj),
];

/// Numeral and quality of each diatonic seventh chord, per mode.
const MAJOR_SEVENTHS: [(&str, ChordQuality); 7] = [
    ("Imaj7", ChordQuality::Maj7),
    ("ii7", ChordQuality::Min7),
    ("iii7", ChordQuality::Min7),
    ("IVmaj7", ChordQuality::Maj7),
    ("V7", ChordQuality::Dom7),
    ("vi7", ChordQuality::Min7),
    ("viiø7", ChordQuality::HalfDim7),
];

const MINOR_SEVENTHS: [(&str, ChordQuality); 7] = [
    ("i7", ChordQuality::Min7),
    ("iiø7", ChordQuality::HalfDim7),
    ("IIImaj7", ChordQuality::Maj7),
    ("iv7", ChordQuality::Min7),
    ("v7", ChordQuality::Min7),
    ("VImaj7", ChordQuality::Maj7),
    ("VII7", ChordQuality::Dom7),
];

fn triad_table(mode: Mode) -> &'static [(&'static str, ChordQuality); 7] {
    match mode {
        Mode::Major => &MAJOR_TRIADS,
        Mode::Minor => &MINOR_TRIADS,
    }
}

fn seventh_table(mode: Mode) -> &'static [(&'static str, ChordQuality); 7] {
    match mode {
        Mode::Major => &MAJOR_SEVENTHS,
        Mode::Minor => &MINOR_SEVENTHS,
    }
}

fn build_chords(
    tonic: PitchClass,
    mode: Mode,
    table: &'static [(&'static str, ChordQuality); 7],
) -> [ChordDefinition; 7] {
    let notes = scale_notes(tonic, mode);
    std::array::from_fn(|i| {
        let (numeral, quality) = table[i];
        ChordDefinition::new(numeral, quality, notes[i], quality.intervals())
    })
}

/// The 7 diatonic triads of a key.
pub fn scale_chords(tonic: PitchClass, mode: Mode) -> [ChordDefinition; 7] {
    build_chords(tonic, mode, triad_table(mode))
}

/// The 7 diatonic seventh chords of a key.
pub fn seventh_chords(tonic: PitchClass, mode: Mode) -> [ChordDefinition; 7] {
    build_chords(tonic, mode, seventh_table(mode))
}

/// The four common borrowed chords of a key (modal interchange).
///
/// A major key borrows iv, bVI, bVII, and bIII from its parallel minor;
/// a minor key borrows IV, VI, VII, and III from its parallel major.
/// Root offsets and qualities are a fixed recipe, not scale-derived.
pub fn borrowed_chords(tonic: PitchClass, mode: Mode) -> [ChordDefinition; 4] {
    let recipe: [(&str, i32, ChordQuality); 4] = match mode {
        Mode::Major => [
            ("iv", 5, ChordQuality::Min),
            ("bVI", 8, ChordQuality::Maj),
            ("bVII", 10, ChordQuality::Maj),
            ("bIII", 3, ChordQuality::Maj),
        ],
        Mode::Minor => [
            ("IV", 5, ChordQuality::Maj),
            ("VI", 9, ChordQuality::Maj),
            ("VII", 11, ChordQuality::Maj),
            ("III", 3, ChordQuality::Maj),
        ],
    };
    recipe.map(|(numeral, offset, quality)| {
        ChordDefinition::new(numeral, quality, tonic.transpose(offset), quality.intervals())
    })
}

/// Roman numeral for a chord inside a key, or "?" if the root and quality
/// match no diatonic triad or seventh chord.
pub fn roman_numeral(
    chord_root: PitchClass,
    chord_intervals: &[i32],
    tonic: PitchClass,
    mode: Mode,
) -> String {
    let quality = ChordQuality::from_intervals(chord_intervals);
    let notes = scale_notes(tonic, mode);

    for table in [triad_table(mode), seventh_table(mode)] {
        for (degree, (numeral, table_quality)) in table.iter().enumerate() {
            if notes[degree] == chord_root && *table_quality == quality {
                return (*numeral).to_string();
            }
        }
    }

    "?".to_string()
}

/// Triad numeral of a diatonic note's scale degree, e.g. in C major the
/// note D maps to "ii". Returns None for out-of-scale notes.
pub fn scale_degree_numeral(note: PitchClass, tonic: PitchClass, mode: Mode) -> Option<&'static str> {
    let notes = scale_notes(tonic, mode);
    let degree = notes.iter().position(|&n| n == note)?;
    Some(triad_table(mode)[degree].0)
}

/// Chord symbol for a root and quality, e.g. "F#m7".
pub fn chord_symbol(root: PitchClass, quality: ChordQuality) -> String {
    format!("{}{}", root, quality.suffix())
}

/// Chord symbol with the quality inferred from an interval set.
pub fn full_chord_name(root: PitchClass, intervals: &[i32]) -> String {
    chord_symbol(root, ChordQuality::from_intervals(intervals))
}

/// Equal-temperament frequencies of a chord's tones.
///
/// Intervals that cross the octave boundary carry into the next octave.
pub fn chord_frequencies(root: PitchClass, intervals: &[i32], octave: i32) -> Vec<f64> {
    let root_index = root.chromatic_index();
    intervals
        .iter()
        .map(|interval| {
            let midi = pitch::note_to_midi(
                PitchClass::from_index(root_index + interval),
                octave + (root_index + interval).div_euclid(12),
            );
            pitch::midi_to_frequency(midi)
        })
        .collect()
}
