//! Background driver for the playback scheduler.
//!
//! [`PlaybackRunner`] owns a [`PlaybackScheduler`] behind a mutex and
//! spawns a thread that drives the scheduling pass and playhead updates
//! at their cadences. Control operations lock the scheduler directly,
//! so `pause` and `stop` take effect before the call returns.

use crate::clock::{SystemClock, Tempo};
use crate::scheduler::{
    NoteSink, PlaybackEvent, PlaybackScheduler, PlaybackState, PLAYHEAD_INTERVAL_MS,
    SCHEDULE_INTERVAL_MS,
};
use crate::timeline::Timeline;
use crossbeam_channel::Receiver;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Scheduler running on its own thread against the system clock.
///
/// The driver thread polls at 1 ms and fires each duty when its
/// interval has elapsed. Dropping the runner signals shutdown and joins
/// the thread.
pub struct PlaybackRunner<S: NoteSink + Send + 'static> {
    scheduler: Arc<Mutex<PlaybackScheduler<SystemClock, S>>>,
    events: Receiver<PlaybackEvent>,
    shutdown: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl<S: NoteSink + Send + 'static> PlaybackRunner<S> {
    /// Spawn the driver thread around a new scheduler.
    pub fn new(tempo: Tempo) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        let scheduler = Arc::new(Mutex::new(PlaybackScheduler::new(
            SystemClock::new(),
            tempo,
            tx,
        )));
        let shutdown = Arc::new(AtomicBool::new(false));

        let thread_scheduler = scheduler.clone();
        let thread_shutdown = shutdown.clone();
        let thread_handle = thread::spawn(move || {
            drive(thread_scheduler, thread_shutdown);
        });

        Self {
            scheduler,
            events: rx,
            shutdown,
            thread_handle: Some(thread_handle),
        }
    }

    /// Attach the instrument; playback declines until one is set.
    pub fn set_sink(&self, sink: S) {
        self.lock().set_sink(sink);
    }

    pub fn play(&self) {
        self.lock().play();
    }

    pub fn pause(&self) {
        self.lock().pause();
    }

    pub fn stop(&self) {
        self.lock().stop();
    }

    pub fn set_tempo(&self, tempo: Tempo) {
        self.lock().set_tempo(tempo);
    }

    pub fn set_loop(&self, enabled: bool) {
        self.lock().set_loop(enabled);
    }

    pub fn set_timeline(&self, timeline: Timeline) {
        self.lock().set_timeline(timeline);
    }

    pub fn state(&self) -> PlaybackState {
        self.lock().state()
    }

    /// Run a closure against the scheduler, for timeline edits and
    /// inspection.
    pub fn with_scheduler<T>(
        &self,
        f: impl FnOnce(&mut PlaybackScheduler<SystemClock, S>) -> T,
    ) -> T {
        f(&mut self.lock())
    }

    /// Receiver for playhead updates and end-of-timeline notifications.
    pub fn events(&self) -> &Receiver<PlaybackEvent> {
        &self.events
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PlaybackScheduler<SystemClock, S>> {
        match self.scheduler.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<S: NoteSink + Send + 'static> Drop for PlaybackRunner<S> {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

fn drive<S: NoteSink + Send + 'static>(
    scheduler: Arc<Mutex<PlaybackScheduler<SystemClock, S>>>,
    shutdown: Arc<AtomicBool>,
) {
    let poll = Duration::from_millis(1);
    let schedule_interval = Duration::from_millis(SCHEDULE_INTERVAL_MS);
    let playhead_interval = Duration::from_millis(PLAYHEAD_INTERVAL_MS);
    let mut last_schedule = Instant::now();
    let mut last_playhead = Instant::now();

    while !shutdown.load(Ordering::Relaxed) {
        let now = Instant::now();
        if now.duration_since(last_schedule) >= schedule_interval {
            last_schedule = now;
            lock_or_recover(&scheduler).scheduling_pass();
        }
        if now.duration_since(last_playhead) >= playhead_interval {
            last_playhead = now;
            lock_or_recover(&scheduler).playhead_tick();
        }
        thread::sleep(poll);
    }
}

fn lock_or_recover<C: crate::clock::AudioClock, S: NoteSink>(
    scheduler: &Mutex<PlaybackScheduler<C, S>>,
) -> std::sync::MutexGuard<'_, PlaybackScheduler<C, S>> {
    match scheduler.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
