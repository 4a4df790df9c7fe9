//! Offline progression rendering.
//!
//! The render command reuses the real scheduler against a [`VirtualClock`]:
//! the clock is stepped at the scheduling cadence until playback finishes,
//! the collected triggers are synthesized as enveloped sine partials, and
//! the mix is written out as a 16-bit WAV file.

use crate::config::RenderSettings;
use anyhow::{bail, Context, Result};
use chordlab_playback::{
    PlaybackScheduler, PlaybackState, Tempo, Timeline, VirtualClock, SCHEDULE_INTERVAL_MS,
};
use chordlab_theory::{
    borrowed_chords, roman_numeral, scale_chords, seventh_chords, ChordDefinition, ChordQuality,
    Mode, PitchClass,
};
use std::f64::consts::TAU;
use std::path::Path;
use std::sync::{Arc, Mutex};

const ATTACK_SECONDS: f64 = 0.01;
const RELEASE_SECONDS: f64 = 0.05;

/// One scheduled tone: frequency, start and duration in seconds.
type Trigger = (f64, f64, f64);

/// Resolve progression entries against a key.
///
/// Each entry is either a roman numeral from the diatonic, seventh, or
/// borrowed chord tables ("ii", "V7", "bVI") or an absolute chord symbol
/// ("C", "Am", "G7").
pub fn resolve_progression(
    tonic: PitchClass,
    mode: Mode,
    entries: &[String],
) -> Result<Vec<ChordDefinition>> {
    let diatonic = scale_chords(tonic, mode);
    let sevenths = seventh_chords(tonic, mode);
    let borrowed = borrowed_chords(tonic, mode);

    entries
        .iter()
        .map(|entry| {
            diatonic
                .iter()
                .chain(sevenths.iter())
                .chain(borrowed.iter())
                .find(|def| def.numeral == *entry)
                .cloned()
                .or_else(|| parse_chord_symbol(entry, tonic, mode))
                .with_context(|| format!("unknown chord '{entry}' in {tonic} {mode}"))
        })
        .collect()
}

/// Parse an absolute chord symbol, e.g. "Am" or "F#maj7". The numeral is
/// derived from the chord's position in the key, "?" when it has none.
fn parse_chord_symbol(symbol: &str, tonic: PitchClass, mode: Mode) -> Option<ChordDefinition> {
    let (root, suffix) = match symbol.get(..2).and_then(|s| s.parse::<PitchClass>().ok()) {
        Some(root) => (root, &symbol[2..]),
        None => (symbol.get(..1)?.parse::<PitchClass>().ok()?, &symbol[1..]),
    };
    let quality = match suffix {
        "" => ChordQuality::Maj,
        "m" => ChordQuality::Min,
        "dim" => ChordQuality::Dim,
        "maj7" => ChordQuality::Maj7,
        "m7" => ChordQuality::Min7,
        "7" => ChordQuality::Dom7,
        "m7b5" => ChordQuality::HalfDim7,
        _ => return None,
    };
    let numeral = roman_numeral(root, quality.intervals(), tonic, mode);
    Some(ChordDefinition::new(
        numeral,
        quality,
        root,
        quality.intervals(),
    ))
}

/// Render a chord progression to a WAV file.
pub fn render_progression(
    chords: &[ChordDefinition],
    bpm: f64,
    chord_duration: f64,
    settings: &RenderSettings,
    output: &Path,
) -> Result<()> {
    if chords.is_empty() {
        bail!("nothing to render");
    }

    let tempo = Tempo::new(bpm);
    let mut timeline = Timeline::new();
    for def in chords {
        timeline.add_block(def.root, &def.intervals, def.numeral.as_str(), chord_duration)?;
    }
    let total_seconds = timeline.total_duration() * tempo.seconds_per_eighth();

    let triggers = collect_triggers(timeline, tempo)?;
    log::info!(
        "rendering {} chords, {} tones, {:.2}s at {} BPM",
        chords.len(),
        triggers.len(),
        total_seconds,
        bpm
    );

    let samples = synthesize(&triggers, total_seconds, settings);
    write_wav(&samples, settings.sample_rate, output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    Ok(())
}

/// Drive the scheduler over a virtual clock until it stops on its own.
fn collect_triggers(timeline: Timeline, tempo: Tempo) -> Result<Vec<Trigger>> {
    let clock = VirtualClock::new();
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut scheduler = PlaybackScheduler::new(clock.clone(), tempo, tx);

    let triggers: Arc<Mutex<Vec<Trigger>>> = Arc::new(Mutex::new(Vec::new()));
    let sink_triggers = triggers.clone();
    scheduler.set_sink(Box::new(move |freq: f64, start: f64, dur: f64| {
        sink_triggers.lock().unwrap().push((freq, start, dur));
    }) as Box<dyn FnMut(f64, f64, f64)>);

    scheduler.set_timeline(timeline);
    scheduler.play();
    if scheduler.state() != PlaybackState::Playing {
        bail!("scheduler declined to start");
    }

    let step = SCHEDULE_INTERVAL_MS as f64 / 1000.0;
    while scheduler.state() == PlaybackState::Playing {
        clock.advance(step);
        scheduler.scheduling_pass();
        scheduler.playhead_tick();
    }
    // Drain the final time updates and the Finished notification
    let _ = rx.try_iter().last();

    // The sink closure holds the other Arc clone
    drop(scheduler);
    let triggers = Arc::try_unwrap(triggers)
        .map_err(|_| anyhow::anyhow!("trigger buffer still shared"))?
        .into_inner()
        .map_err(|_| anyhow::anyhow!("trigger buffer poisoned"))?;
    Ok(triggers)
}

/// Additive sine synthesis with a linear attack/release envelope per tone.
fn synthesize(triggers: &[Trigger], total_seconds: f64, settings: &RenderSettings) -> Vec<f64> {
    let sample_rate = settings.sample_rate as f64;
    let len = ((total_seconds + RELEASE_SECONDS) * sample_rate).ceil() as usize;
    let mut buffer = vec![0.0f64; len];

    for &(freq, start, duration) in triggers {
        let first = (start * sample_rate).floor().max(0.0) as usize;
        let last = (((start + duration) * sample_rate).ceil() as usize).min(len);
        for i in first..last {
            let t = i as f64 / sample_rate - start;
            let attack = (t / ATTACK_SECONDS).min(1.0);
            let release = ((duration - t) / RELEASE_SECONDS).clamp(0.0, 1.0);
            buffer[i] += (TAU * freq * t).sin() * attack * release;
        }
    }

    // Normalize to the configured gain
    let peak = buffer.iter().fold(0.0f64, |acc, s| acc.max(s.abs()));
    if peak > 0.0 {
        let scale = settings.gain / peak;
        for sample in &mut buffer {
            *sample *= scale;
        }
    }
    buffer
}

fn write_wav(samples: &[f64], sample_rate: u32, output: &Path) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(output, spec)?;
    for &sample in samples {
        writer.write_sample((sample * i16::MAX as f64) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}
