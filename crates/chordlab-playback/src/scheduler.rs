//! Lookahead playback scheduler.
//!
//! The scheduler walks the chord-block timeline against an external
//! audio clock, triggering every block whose start falls inside a short
//! lookahead window. A registry of `(block id, grid position)` pairs
//! keeps each block from being scheduled twice within a window, so the
//! scheduling pass can run at any cadence smaller than the lookahead
//! without skipping or doubling block starts.

use crate::clock::{AudioClock, GridTime, Tempo};
use crate::timeline::Timeline;
use chordlab_theory::chord_frequencies;
use crossbeam_channel::Sender;
use std::collections::HashSet;

/// Lookahead window in seconds.
pub const LOOKAHEAD_SECONDS: f64 = 0.1;

/// Cadence of the scheduling pass in milliseconds.
pub const SCHEDULE_INTERVAL_MS: u64 = 25;

/// Cadence of playhead updates in milliseconds (~60 Hz).
pub const PLAYHEAD_INTERVAL_MS: u64 = 16;

/// Octave chord tones are voiced at.
const VOICING_OCTAVE: i32 = 4;

/// The externally supplied instrument capability.
///
/// `trigger` schedules one tone at an absolute clock time for a duration,
/// both in seconds of the same [`AudioClock`] the scheduler reads.
pub trait NoteSink {
    fn trigger(&mut self, freq_hz: f64, start_seconds: f64, duration_seconds: f64);
}

/// Closures can serve directly as sinks.
impl<F: FnMut(f64, f64, f64)> NoteSink for F {
    fn trigger(&mut self, freq_hz: f64, start_seconds: f64, duration_seconds: f64) {
        self(freq_hz, start_seconds, duration_seconds)
    }
}

/// Playback session state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// Notifications emitted while playing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlaybackEvent {
    /// Current playhead position in eighth-note units.
    TimeUpdate(f64),
    /// One-shot end-of-timeline notification (non-loop playback only).
    Finished,
}

/// Clock-synchronized chord-block scheduler.
///
/// The scheduler is a passive state machine: a driver (see
/// [`crate::runner::PlaybackRunner`]) calls [`scheduling_pass`] and
/// [`playhead_tick`] at their cadences while the state is Playing.
/// Control operations decline silently when their preconditions do not
/// hold; callers re-invoke once an instrument is available.
///
/// [`scheduling_pass`]: PlaybackScheduler::scheduling_pass
/// [`playhead_tick`]: PlaybackScheduler::playhead_tick
pub struct PlaybackScheduler<C: AudioClock, S: NoteSink> {
    clock: C,
    sink: Option<S>,
    timeline: Timeline,
    tempo: Tempo,
    loop_enabled: bool,
    state: PlaybackState,
    /// Clock time at which virtual time 0 began.
    reference_start: f64,
    /// Virtual time captured by `pause`, in eighths.
    paused_at: f64,
    /// Blocks already scheduled in the current session.
    scheduled: HashSet<(u64, GridTime)>,
    events: Sender<PlaybackEvent>,
}

impl<C: AudioClock, S: NoteSink> PlaybackScheduler<C, S> {
    /// Create a scheduler over a clock, reporting through `events`.
    pub fn new(clock: C, tempo: Tempo, events: Sender<PlaybackEvent>) -> Self {
        Self {
            clock,
            sink: None,
            timeline: Timeline::new(),
            tempo,
            loop_enabled: false,
            state: PlaybackState::Stopped,
            reference_start: 0.0,
            paused_at: 0.0,
            scheduled: HashSet::new(),
            events,
        }
    }

    /// Attach the instrument. Playback declines while no sink is set.
    pub fn set_sink(&mut self, sink: S) {
        self.sink = Some(sink);
    }

    /// Detach the instrument.
    pub fn clear_sink(&mut self) -> Option<S> {
        self.sink.take()
    }

    /// Replace the timeline. Takes effect on the next scheduling pass.
    pub fn set_timeline(&mut self, timeline: Timeline) {
        self.timeline = timeline;
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    /// Change tempo, preserving the current virtual position.
    pub fn set_tempo(&mut self, tempo: Tempo) {
        if self.state == PlaybackState::Playing {
            let virtual_time = self.current_virtual_time();
            self.tempo = tempo;
            self.reference_start =
                self.clock.now() - virtual_time * tempo.seconds_per_eighth();
        } else {
            self.tempo = tempo;
        }
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn set_loop(&mut self, enabled: bool) {
        self.loop_enabled = enabled;
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Current playhead position in eighth-note units.
    pub fn current_virtual_time(&self) -> f64 {
        match self.state {
            PlaybackState::Playing => {
                (self.clock.now() - self.reference_start) / self.tempo.seconds_per_eighth()
            }
            PlaybackState::Paused => self.paused_at,
            PlaybackState::Stopped => 0.0,
        }
    }

    /// Start or resume playback.
    ///
    /// A silent no-op while already Playing, with an empty timeline, or
    /// with no instrument attached. Starting from Stopped clears the
    /// registry and begins at virtual time 0; resuming from Paused keeps
    /// the registry so blocks before the pause point are not retriggered.
    pub fn play(&mut self) {
        if self.state == PlaybackState::Playing {
            return;
        }
        if self.timeline.is_empty() || self.sink.is_none() {
            log::debug!("play declined: timeline or instrument unavailable");
            return;
        }

        let resume_from = match self.state {
            PlaybackState::Paused => self.paused_at,
            _ => {
                self.scheduled.clear();
                0.0
            }
        };
        self.reference_start =
            self.clock.now() - resume_from * self.tempo.seconds_per_eighth();
        self.state = PlaybackState::Playing;
        log::debug!("playback started at {resume_from} eighths");
        self.scheduling_pass();
    }

    /// Pause playback, preserving the playhead position.
    ///
    /// No-op unless Playing. Tones already handed to the sink within the
    /// lookahead window are not retracted.
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.paused_at = self.current_virtual_time();
        self.state = PlaybackState::Paused;
        log::debug!("playback paused at {} eighths", self.paused_at);
    }

    /// Stop playback and rewind. Valid in any state; emits a final time
    /// update of 0.
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.paused_at = 0.0;
        self.scheduled.clear();
        let _ = self.events.send(PlaybackEvent::TimeUpdate(0.0));
    }

    /// One lookahead scan: trigger every block whose start lies within
    /// `[now, now + lookahead)` in virtual time and is not yet in the
    /// registry. Idempotent within a window.
    pub fn scheduling_pass(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let Some(sink) = self.sink.as_mut() else { return };

        let seconds_per_eighth = self.tempo.seconds_per_eighth();
        let now = self.clock.now();
        let virtual_now = (now - self.reference_start) / seconds_per_eighth;
        let window_end = virtual_now + LOOKAHEAD_SECONDS / seconds_per_eighth;

        for block in self.timeline.blocks() {
            let key = (block.id, GridTime::from_float(block.position));
            if self.scheduled.contains(&key) {
                continue;
            }
            if block.position < virtual_now || block.position >= window_end {
                continue;
            }

            let start = now + (block.position - virtual_now) * seconds_per_eighth;
            let duration = block.duration * seconds_per_eighth;
            for freq in chord_frequencies(block.root, &block.intervals, VOICING_OCTAVE) {
                sink.trigger(freq, start, duration);
            }
            log::trace!(
                "scheduled block {} ({}) at {:.3}s for {:.3}s",
                block.id,
                block.numeral,
                start,
                duration
            );
            self.scheduled.insert(key);
        }
    }

    /// One playhead update: report the current position and handle the
    /// end of the timeline (loop restart or stop + Finished).
    pub fn playhead_tick(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }

        let virtual_now = self.current_virtual_time();
        let _ = self.events.send(PlaybackEvent::TimeUpdate(virtual_now));

        let total = self.timeline.total_duration();
        if virtual_now < total {
            return;
        }

        if self.loop_enabled {
            // Restart immediately so the loop's first block is not missed
            self.reference_start = self.clock.now();
            self.scheduled.clear();
            self.scheduling_pass();
        } else {
            self.state = PlaybackState::Stopped;
            self.paused_at = 0.0;
            self.scheduled.clear();
            let _ = self.events.send(PlaybackEvent::TimeUpdate(0.0));
            let _ = self.events.send(PlaybackEvent::Finished);
        }
    }

    /// Number of blocks in the scheduled registry (diagnostics).
    pub fn scheduled_count(&self) -> usize {
        self.scheduled.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::VirtualClock;
    use chordlab_theory::PitchClass::*;
    use crossbeam_channel::{unbounded, Receiver};
    use std::sync::{Arc, Mutex};

    type Trigger = (f64, f64, f64);
    type SharedTriggers = Arc<Mutex<Vec<Trigger>>>;

    fn scheduler_with_sink() -> (
        PlaybackScheduler<VirtualClock, Box<dyn FnMut(f64, f64, f64)>>,
        VirtualClock,
        SharedTriggers,
        Receiver<PlaybackEvent>,
    ) {
        let clock = VirtualClock::new();
        let (tx, rx) = unbounded();
        let mut scheduler = PlaybackScheduler::new(clock.clone(), Tempo::new(120.0), tx);
        let triggers: SharedTriggers = Arc::new(Mutex::new(Vec::new()));
        let sink_triggers = triggers.clone();
        scheduler.set_sink(Box::new(move |freq, start, dur| {
            sink_triggers.lock().unwrap().push((freq, start, dur));
        }) as Box<dyn FnMut(f64, f64, f64)>);
        (scheduler, clock, triggers, rx)
    }

    #[test]
    fn test_play_declines_without_timeline() {
        let (mut scheduler, _clock, triggers, _rx) = scheduler_with_sink();
        scheduler.play();
        assert_eq!(scheduler.state(), PlaybackState::Stopped);
        assert!(triggers.lock().unwrap().is_empty());
    }

    #[test]
    fn test_play_declines_without_sink() {
        let clock = VirtualClock::new();
        let (tx, _rx) = unbounded();
        let mut scheduler: PlaybackScheduler<_, fn(f64, f64, f64)> =
            PlaybackScheduler::new(clock, Tempo::new(120.0), tx);
        scheduler
            .timeline_mut()
            .add_block(C, &[0, 4, 7], "I", 8.0)
            .unwrap();
        scheduler.play();
        assert_eq!(scheduler.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_immediate_pass_triggers_first_block() {
        let (mut scheduler, _clock, triggers, _rx) = scheduler_with_sink();
        scheduler
            .timeline_mut()
            .add_block(C, &[0, 4, 7], "I", 8.0)
            .unwrap();
        scheduler.play();

        let triggers = triggers.lock().unwrap();
        // Root, major third, fifth at octave 4, spanning 8 eighths = 2.0s
        assert_eq!(triggers.len(), 3);
        assert!((triggers[0].0 - 261.63).abs() < 0.01);
        assert!((triggers[1].0 - 329.63).abs() < 0.01);
        assert!((triggers[2].0 - 392.00).abs() < 0.01);
        for &(_, start, dur) in triggers.iter() {
            assert!((start - 0.0).abs() < 1e-9);
            assert!((dur - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_scheduling_pass_idempotent_within_window() {
        let (mut scheduler, _clock, triggers, _rx) = scheduler_with_sink();
        scheduler
            .timeline_mut()
            .add_block(C, &[0, 4, 7], "I", 8.0)
            .unwrap();
        scheduler.play();
        scheduler.scheduling_pass();
        scheduler.scheduling_pass();
        assert_eq!(triggers.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_second_block_waits_for_window() {
        let (mut scheduler, clock, triggers, _rx) = scheduler_with_sink();
        scheduler
            .timeline_mut()
            .add_block(C, &[0, 4, 7], "I", 8.0)
            .unwrap();
        scheduler
            .timeline_mut()
            .add_block(G, &[0, 4, 7], "V", 8.0)
            .unwrap();
        scheduler.play();
        assert_eq!(triggers.lock().unwrap().len(), 3);

        // Second block starts at 2.0s; the 0.1s window reaches it at 1.9s
        clock.advance(1.85);
        scheduler.scheduling_pass();
        assert_eq!(triggers.lock().unwrap().len(), 3);

        clock.advance(0.1);
        scheduler.scheduling_pass();
        let triggers = triggers.lock().unwrap();
        assert_eq!(triggers.len(), 6);
        // Scheduled at its exact grid start, 2.0s from play
        assert!((triggers[3].1 - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_stop_emits_zero_time_update() {
        let (mut scheduler, _clock, _triggers, rx) = scheduler_with_sink();
        scheduler
            .timeline_mut()
            .add_block(C, &[0, 4, 7], "I", 8.0)
            .unwrap();
        scheduler.play();
        scheduler.stop();
        assert_eq!(scheduler.state(), PlaybackState::Stopped);
        assert_eq!(scheduler.scheduled_count(), 0);
        let events: Vec<_> = rx.try_iter().collect();
        assert!(events.contains(&PlaybackEvent::TimeUpdate(0.0)));
    }

    #[test]
    fn test_pause_preserves_position_and_resume_skips_played_blocks() {
        let (mut scheduler, clock, triggers, _rx) = scheduler_with_sink();
        scheduler
            .timeline_mut()
            .add_block(C, &[0, 4, 7], "I", 8.0)
            .unwrap();
        scheduler
            .timeline_mut()
            .add_block(G, &[0, 4, 7], "V", 8.0)
            .unwrap();
        scheduler.play();

        clock.advance(1.0); // virtual time 4.0 eighths
        scheduler.pause();
        assert_eq!(scheduler.state(), PlaybackState::Paused);
        assert!((scheduler.current_virtual_time() - 4.0).abs() < 1e-9);

        // Wall time passing while paused must not advance the playhead
        clock.advance(10.0);
        assert!((scheduler.current_virtual_time() - 4.0).abs() < 1e-9);

        scheduler.play();
        assert!((scheduler.current_virtual_time() - 4.0).abs() < 1e-9);
        // First block must not retrigger
        assert_eq!(triggers.lock().unwrap().len(), 3);

        // Run to the second block's start
        clock.advance(0.95);
        scheduler.scheduling_pass();
        assert_eq!(triggers.lock().unwrap().len(), 6);
    }

    #[test]
    fn test_non_loop_end_stops_and_reports_once() {
        let (mut scheduler, clock, _triggers, rx) = scheduler_with_sink();
        scheduler
            .timeline_mut()
            .add_block(C, &[0, 4, 7], "I", 8.0)
            .unwrap();
        scheduler.play();

        clock.advance(2.1);
        scheduler.playhead_tick();
        assert_eq!(scheduler.state(), PlaybackState::Stopped);

        let events: Vec<_> = rx.try_iter().collect();
        let finished = events.iter().filter(|e| **e == PlaybackEvent::Finished).count();
        assert_eq!(finished, 1);
        assert_eq!(events.last(), Some(&PlaybackEvent::Finished));
        // The final time update before Finished rewinds to 0
        assert_eq!(events[events.len() - 2], PlaybackEvent::TimeUpdate(0.0));
    }

    #[test]
    fn test_loop_restart_clears_registry_and_reschedules() {
        let (mut scheduler, clock, triggers, rx) = scheduler_with_sink();
        scheduler
            .timeline_mut()
            .add_block(C, &[0, 4, 7], "I", 8.0)
            .unwrap();
        scheduler.set_loop(true);
        scheduler.play();
        assert_eq!(triggers.lock().unwrap().len(), 3);

        clock.advance(2.05);
        scheduler.playhead_tick();
        assert_eq!(scheduler.state(), PlaybackState::Playing);
        // The block was rescheduled for the new cycle
        assert_eq!(triggers.lock().unwrap().len(), 6);
        assert_eq!(scheduler.scheduled_count(), 1);

        // The next update reports a position back below the total duration
        scheduler.playhead_tick();
        let last_update = rx
            .try_iter()
            .filter_map(|e| match e {
                PlaybackEvent::TimeUpdate(t) => Some(t),
                _ => None,
            })
            .last()
            .unwrap();
        assert!(last_update < 8.0);
    }

    #[test]
    fn test_set_tempo_preserves_position() {
        let (mut scheduler, clock, _triggers, _rx) = scheduler_with_sink();
        scheduler
            .timeline_mut()
            .add_block(C, &[0, 4, 7], "I", 8.0)
            .unwrap();
        scheduler.play();
        clock.advance(1.0); // 4.0 eighths at 120 BPM
        scheduler.set_tempo(Tempo::new(60.0));
        assert!((scheduler.current_virtual_time() - 4.0).abs() < 1e-9);
    }
}
