//! ChordLab CLI - The `chordlab` command.
//!
//! This is the main entry point for exploring keys and rendering chord
//! progressions.
//!
//! # Architecture
//!
//! The CLI binary orchestrates the following modular crates:
//!
//! - **chordlab-theory**: pitches, scales, enharmonic spelling, chords, modifiers
//! - **chordlab-playback**: chord-block timeline and lookahead scheduler

mod config;
mod render;

use anyhow::{anyhow, Context, Result};
use chordlab_theory::{
    borrowed_chords, chord_frequencies, display_name, resolve, rule_for, scale_chords,
    scale_degree_label, scale_notes, seventh_chords, spelling, ChordDefinition, Mode,
    ModifierStack, PitchClass,
};
use clap::{Parser, Subcommand};
use config::Config;
use std::path::PathBuf;

/// ChordLab - tonal harmony workbench
#[derive(Parser, Debug)]
#[command(name = "chordlab")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Explore keys, chords, and chord progressions", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the notes of a key with correct enharmonic spelling
    Scale {
        /// Tonic, e.g. C, F#, Bb
        tonic: Option<String>,

        /// Mode: major or minor
        #[arg(short, long)]
        mode: Option<String>,
    },

    /// List the chords of a key
    Chords {
        /// Tonic, e.g. C, F#, Bb
        tonic: Option<String>,

        /// Mode: major or minor
        #[arg(short, long)]
        mode: Option<String>,

        /// Include diatonic seventh chords
        #[arg(long)]
        sevenths: bool,

        /// Include chords borrowed from the parallel mode
        #[arg(long)]
        borrowed: bool,
    },

    /// Name a chord after applying modifiers
    Name {
        /// Roman numeral inside the key, e.g. ii or V
        numeral: String,

        /// Tonic, e.g. C, F#, Bb
        #[arg(short, long)]
        tonic: Option<String>,

        /// Mode: major or minor
        #[arg(short, long)]
        mode: Option<String>,

        /// Comma-separated modifier labels, e.g. 7,sus4
        #[arg(long, value_delimiter = ',')]
        mods: Vec<String>,
    },

    /// Render a chord progression to a WAV file
    Render {
        /// Roman numerals or chord symbols, e.g. I V vi IV or C G Am F
        #[arg(required = true)]
        numerals: Vec<String>,

        /// Tonic, e.g. C, F#, Bb
        #[arg(short, long)]
        tonic: Option<String>,

        /// Mode: major or minor
        #[arg(short, long)]
        mode: Option<String>,

        /// Tempo in BPM
        #[arg(long)]
        bpm: Option<f64>,

        /// Duration of each chord in eighth-note units
        #[arg(long)]
        duration: Option<f64>,

        /// Output WAV file
        #[arg(short, long, default_value = "progression.wav")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = Config::load_or_default();

    match args.command {
        Commands::Scale { tonic, mode } => {
            let (tonic, mode) = resolve_key(&config, tonic, mode)?;
            print_scale(tonic, mode);
            Ok(())
        }
        Commands::Chords {
            tonic,
            mode,
            sevenths,
            borrowed,
        } => {
            let (tonic, mode) = resolve_key(&config, tonic, mode)?;
            print_chords(tonic, mode, sevenths, borrowed);
            Ok(())
        }
        Commands::Name {
            numeral,
            tonic,
            mode,
            mods,
        } => {
            let (tonic, mode) = resolve_key(&config, tonic, mode)?;
            print_chord_name(tonic, mode, &numeral, &mods)
        }
        Commands::Render {
            numerals,
            tonic,
            mode,
            bpm,
            duration,
            output,
        } => {
            let (tonic, mode) = resolve_key(&config, tonic, mode)?;
            let chords = render::resolve_progression(tonic, mode, &numerals)?;
            render::render_progression(
                &chords,
                bpm.unwrap_or(config.playback.bpm),
                duration.unwrap_or(config.playback.chord_duration),
                &config.render,
                &output,
            )?;
            println!("Wrote {}", output.display());
            Ok(())
        }
    }
}

/// Combine command-line key flags with configured defaults.
fn resolve_key(
    config: &Config,
    tonic: Option<String>,
    mode: Option<String>,
) -> Result<(PitchClass, Mode)> {
    let tonic_name = tonic.unwrap_or_else(|| config.theory.key.clone());
    let mode_name = mode.unwrap_or_else(|| config.theory.mode.clone());
    let tonic = tonic_name
        .parse::<PitchClass>()
        .map_err(|e| anyhow!("{e}"))?;
    let mode = mode_name.parse::<Mode>().map_err(|e| anyhow!("{e}"))?;
    Ok((tonic, mode))
}

fn print_scale(tonic: PitchClass, mode: Mode) {
    println!("{tonic} {mode}:");
    for note in scale_notes(tonic, mode) {
        let index = note.chromatic_index();
        println!(
            "  {:<3} {}",
            scale_degree_label(index, tonic, mode),
            spelling(index, tonic, mode)
        );
    }
}

fn print_chords(tonic: PitchClass, mode: Mode, sevenths: bool, borrowed: bool) {
    println!("Diatonic triads in {tonic} {mode}:");
    for chord in scale_chords(tonic, mode) {
        print_chord_row(tonic, mode, &chord);
    }
    if sevenths {
        println!("\nDiatonic sevenths:");
        for chord in seventh_chords(tonic, mode) {
            print_chord_row(tonic, mode, &chord);
        }
    }
    if borrowed {
        println!("\nBorrowed from {tonic} {}:", mode.parallel());
        for chord in borrowed_chords(tonic, mode) {
            print_chord_row(tonic, mode, &chord);
        }
    }
}

fn print_chord_row(tonic: PitchClass, mode: Mode, chord: &ChordDefinition) {
    let tones: Vec<&str> = chord
        .intervals
        .iter()
        .map(|offset| spelling(chord.root.transpose(*offset).chromatic_index(), tonic, mode))
        .collect();
    println!(
        "  {:<6} {:<8} {}",
        chord.numeral,
        chord.symbol(),
        tones.join(" ")
    );
}

fn print_chord_name(tonic: PitchClass, mode: Mode, numeral: &str, mods: &[String]) -> Result<()> {
    let chord = scale_chords(tonic, mode)
        .iter()
        .find(|c| c.numeral == numeral)
        .cloned()
        .with_context(|| format!("no diatonic triad '{numeral}' in {tonic} {mode}"))?;

    let mut stack = ModifierStack::new();
    for label in mods {
        if rule_for(label).is_none() {
            anyhow::bail!("unknown modifier '{label}'");
        }
        stack.toggle(label);
    }

    let intervals = resolve(&chord.intervals, &stack);
    let name = display_name(chord.root, chord.quality, &chord.intervals, &stack);
    let tones: Vec<&str> = intervals
        .iter()
        .map(|offset| spelling(chord.root.transpose(*offset).chromatic_index(), tonic, mode))
        .collect();
    let freqs: Vec<String> = chord_frequencies(chord.root, &intervals, 4)
        .iter()
        .map(|hz| format!("{hz:.2}"))
        .collect();

    println!("{name}");
    println!("  tones: {}", tones.join(" "));
    println!("  freqs: {} Hz", freqs.join(" "));
    Ok(())
}
