//! Chordlab Theory - Harmony engine for the Chordlab workspace.
//!
//! This crate derives everything Chordlab knows about tonal harmony from
//! a tonic and a mode:
//!
//! - **Pitch** - Chromatic pitch classes, MIDI and equal-temperament math
//! - **Scale** - Scale notes and scale-degree labels
//! - **Spelling** - Key-aware enharmonic letter names
//! - **Chords** - Diatonic, seventh, and borrowed chords, Roman numerals
//! - **Modifiers** - Chord variations (7ths, extensions, suspensions)
//!
//! All derivation is pure: values are recomputed on demand from the key
//! context and carry no lifecycle beyond the call.

pub mod chords;
pub mod errors;
pub mod modifiers;
pub mod pitch;
pub mod scale;
pub mod spelling;

pub use chords::{
    borrowed_chords, chord_frequencies, chord_symbol, full_chord_name, roman_numeral,
    scale_chords, scale_degree_numeral, seventh_chords, ChordDefinition, ChordQuality,
};
pub use errors::TheoryError;
pub use modifiers::{
    display_name, resolve, rule_for, ModifierKind, ModifierRule, ModifierStack, CHORD_MODIFIERS,
};
pub use pitch::{
    frequency, frequency_to_midi, midi_to_frequency, midi_to_note, note_to_midi, PitchClass,
};
pub use scale::{is_in_scale, scale_degree_label, scale_notes, Mode};
pub use spelling::spelling;
