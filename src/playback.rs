//! Cancellable playback state machine shared by all animations.
//!
//! A `PlaybackController` walks a list of items one at a time, either on a
//! timer (auto mode) or on explicit `step()` calls (step mode). Progress is
//! reported as `PlaybackMessage`s on an mpsc channel. Every wait is a
//! condition-variable wait: pause, resume, step and reset wake the driver
//! immediately.
//!
//! ```text
//!            start            last item
//!   Idle ──────────► Running ──────────► Completed
//!    ▲                │  ▲ ▲
//!    │          pause │  │ │ step
//!    │                ▼  │ │
//!    │   reset      Paused StepWaiting
//!    └──────── (active run ends in Cancelled)
//! ```

use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default duration of a whole animation, in milliseconds.
pub const DEFAULT_SPEED_MS: u64 = 2000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Playback is already running ({0})")]
    AlreadyRunning(PlaybackState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    Idle,
    Running,
    Paused,
    StepWaiting,
    Completed,
    Cancelled,
}

impl PlaybackState {
    /// True while a run is in flight and may still emit steps.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            PlaybackState::Running | PlaybackState::Paused | PlaybackState::StepWaiting
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Running => "running",
            PlaybackState::Paused => "paused",
            PlaybackState::StepWaiting => "waiting",
            PlaybackState::Completed => "done",
            PlaybackState::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a run advances between items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    #[default]
    Auto,
    Step,
}

impl PlaybackMode {
    pub fn is_step(self) -> bool {
        self == PlaybackMode::Step
    }
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlaybackMode::Auto => "auto",
            PlaybackMode::Step => "step",
        })
    }
}

impl FromStr for PlaybackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(PlaybackMode::Auto),
            "step" => Ok(PlaybackMode::Step),
            other => Err(format!("Unknown mode '{}' (expected auto or step)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent<T> {
    Started { total: usize },
    Paused { index: usize },
    Resumed { index: usize },
    StepCompleted { index: usize, item: T },
    Completed { items: Vec<T> },
    Reset,
}

/// An event tagged with the run that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackMessage<T> {
    pub run: u64,
    pub event: PlaybackEvent<T>,
}

/// Outcome of one `advance()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The item at this index was emitted; more follow
    Advanced(usize),
    /// The last item was emitted
    Completed,
    /// The run was reset, or there is no run to advance
    Halted,
}

struct Inner<T> {
    state: PlaybackState,
    items: Vec<T>,
    cursor: usize,
    mode: PlaybackMode,
    speed_ms: u64,
    run: u64,
    step_banked: bool,
    events: Sender<PlaybackMessage<T>>,
}

impl<T: Clone> Inner<T> {
    fn emit(&self, event: PlaybackEvent<T>) {
        // A dropped receiver just means nobody is watching.
        let _ = self.events.send(PlaybackMessage {
            run: self.run,
            event,
        });
    }

    /// Wait before each item, so that a whole run lasts `speed_ms`.
    fn interval(&self) -> Duration {
        let count = self.items.len().max(1) as u64;
        Duration::from_nanos(self.speed_ms.saturating_mul(1_000_000) / count)
    }
}

struct Shared<T> {
    inner: Mutex<Inner<T>>,
    signal: Condvar,
}

/// Handle on one animation track. Clones share the same state.
pub struct PlaybackController<T> {
    name: Arc<str>,
    shared: Arc<Shared<T>>,
}

impl<T> Clone for PlaybackController<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone + Send + 'static> PlaybackController<T> {
    /// Creates an idle controller and the receiving end of its events.
    pub fn new(name: &str, speed_ms: u64) -> (Self, Receiver<PlaybackMessage<T>>) {
        let (tx, rx) = mpsc::channel();
        let inner = Inner {
            state: PlaybackState::Idle,
            items: Vec::new(),
            cursor: 0,
            mode: PlaybackMode::Auto,
            speed_ms: speed_ms.max(1),
            run: 0,
            step_banked: false,
            events: tx,
        };
        let controller = Self {
            name: Arc::from(name),
            shared: Arc::new(Shared {
                inner: Mutex::new(inner),
                signal: Condvar::new(),
            }),
        };
        (controller, rx)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> PlaybackState {
        self.shared.inner.lock().state
    }

    /// Index of the next item to emit.
    pub fn cursor(&self) -> usize {
        self.shared.inner.lock().cursor
    }

    pub fn total(&self) -> usize {
        self.shared.inner.lock().items.len()
    }

    pub fn mode(&self) -> PlaybackMode {
        self.shared.inner.lock().mode
    }

    pub fn speed_ms(&self) -> u64 {
        self.shared.inner.lock().speed_ms
    }

    /// Identifier of the current run; changes on every start and reset.
    pub fn run_id(&self) -> u64 {
        self.shared.inner.lock().run
    }

    /// Begins a new run over `items`.
    pub fn start(&self, items: Vec<T>, mode: PlaybackMode) -> Result<(), StateError> {
        let mut inner = self.shared.inner.lock();
        if inner.state.is_active() {
            return Err(StateError::AlreadyRunning(inner.state));
        }
        inner.run += 1;
        inner.items = items;
        inner.cursor = 0;
        inner.mode = mode;
        inner.step_banked = false;
        inner.state = PlaybackState::Running;
        tracing::info!(track = %self.name, total = inner.items.len(), %mode, "playback started");
        inner.emit(PlaybackEvent::Started {
            total: inner.items.len(),
        });

        if inner.items.is_empty() {
            inner.state = PlaybackState::Completed;
            inner.emit(PlaybackEvent::Completed { items: Vec::new() });
        }
        Ok(())
    }

    pub fn pause(&self) {
        let mut inner = self.shared.inner.lock();
        if matches!(inner.state, PlaybackState::Running | PlaybackState::StepWaiting) {
            inner.state = PlaybackState::Paused;
            tracing::debug!(track = %self.name, index = inner.cursor, "playback paused");
            inner.emit(PlaybackEvent::Paused {
                index: inner.cursor,
            });
            self.shared.signal.notify_all();
        }
    }

    pub fn resume(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.state == PlaybackState::Paused {
            inner.state = PlaybackState::Running;
            tracing::debug!(track = %self.name, index = inner.cursor, "playback resumed");
            inner.emit(PlaybackEvent::Resumed {
                index: inner.cursor,
            });
            self.shared.signal.notify_all();
        }
    }

    /// Releases one item in step mode. At most one step is banked when
    /// nobody is waiting yet.
    pub fn step(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.mode.is_step()
            && matches!(inner.state, PlaybackState::Running | PlaybackState::StepWaiting)
        {
            inner.step_banked = true;
            self.shared.signal.notify_all();
        }
    }

    /// Stops the current run and clears it. Once this returns, no event of
    /// the stopped run can be emitted.
    pub fn reset(&self) {
        let mut inner = self.shared.inner.lock();
        inner.run += 1;
        inner.state = if inner.state.is_active() {
            PlaybackState::Cancelled
        } else {
            PlaybackState::Idle
        };
        inner.items.clear();
        inner.cursor = 0;
        inner.step_banked = false;
        tracing::info!(track = %self.name, state = %inner.state, "playback reset");
        inner.emit(PlaybackEvent::Reset);
        self.shared.signal.notify_all();
    }

    /// Changes the duration of a whole run. Waits already under way keep
    /// their interval.
    pub fn set_speed(&self, speed_ms: u64) {
        self.shared.inner.lock().speed_ms = speed_ms.max(1);
    }

    /// Waits for the next item of the current run and emits it.
    pub fn advance(&self) -> Tick {
        let run = self.run_id();
        self.advance_run(run)
    }

    fn advance_run(&self, run: u64) -> Tick {
        let mut inner = self.shared.inner.lock();
        if inner.run != run || !inner.state.is_active() {
            return Tick::Halted;
        }

        if inner.mode.is_step() {
            loop {
                if inner.run != run {
                    return Tick::Halted;
                }
                let state = inner.state;
                match state {
                    PlaybackState::Paused => self.shared.signal.wait(&mut inner),
                    PlaybackState::Running | PlaybackState::StepWaiting => {
                        if inner.step_banked {
                            inner.step_banked = false;
                            inner.state = PlaybackState::Running;
                            break;
                        }
                        inner.state = PlaybackState::StepWaiting;
                        self.shared.signal.wait(&mut inner);
                    }
                    _ => return Tick::Halted,
                }
            }
        } else {
            let mut remaining = inner.interval();
            loop {
                if inner.run != run {
                    return Tick::Halted;
                }
                let state = inner.state;
                match state {
                    PlaybackState::Paused => self.shared.signal.wait(&mut inner),
                    PlaybackState::Running => {
                        if remaining.is_zero() {
                            break;
                        }
                        let began = Instant::now();
                        let timed_out = self
                            .shared
                            .signal
                            .wait_until(&mut inner, began + remaining)
                            .timed_out();
                        remaining = if timed_out {
                            Duration::ZERO
                        } else {
                            remaining.saturating_sub(began.elapsed())
                        };
                    }
                    _ => return Tick::Halted,
                }
            }
        }

        let index = inner.cursor;
        let Some(item) = inner.items.get(index).cloned() else {
            return Tick::Halted;
        };
        inner.cursor += 1;
        tracing::debug!(track = %self.name, index, "playback step");
        inner.emit(PlaybackEvent::StepCompleted { index, item });

        if inner.cursor >= inner.items.len() {
            inner.state = PlaybackState::Completed;
            tracing::info!(track = %self.name, total = inner.items.len(), "playback completed");
            let items = inner.items.clone();
            inner.emit(PlaybackEvent::Completed { items });
            Tick::Completed
        } else {
            Tick::Advanced(index)
        }
    }

    /// Drives the current run on a background thread until it completes or
    /// is reset.
    pub fn spawn(&self) -> io::Result<JoinHandle<()>> {
        let run = self.run_id();
        let driver = self.clone();
        thread::Builder::new()
            .name(format!("playback-{}", self.name))
            .spawn(move || while let Tick::Advanced(_) = driver.advance_run(run) {})
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::RecvTimeoutError;

    use super::*;

    const WAIT: Duration = Duration::from_secs(2);

    fn next_event<T>(rx: &Receiver<PlaybackMessage<T>>) -> PlaybackEvent<T> {
        rx.recv_timeout(WAIT).unwrap().event
    }

    #[test]
    fn test_auto_run_emits_every_item() {
        let (ctl, rx) = PlaybackController::new("test", 30);
        ctl.start(vec!['a', 'b', 'c'], PlaybackMode::Auto).unwrap();
        ctl.spawn().unwrap().join().unwrap();

        assert_eq!(next_event(&rx), PlaybackEvent::Started { total: 3 });
        for (i, c) in ['a', 'b', 'c'].into_iter().enumerate() {
            assert_eq!(next_event(&rx), PlaybackEvent::StepCompleted { index: i, item: c });
        }
        assert_eq!(
            next_event(&rx),
            PlaybackEvent::Completed {
                items: vec!['a', 'b', 'c']
            }
        );
        assert_eq!(ctl.state(), PlaybackState::Completed);
    }

    #[test]
    fn test_start_while_running_fails() {
        let (ctl, _rx) = PlaybackController::new("test", 1000);
        ctl.start(vec![1, 2], PlaybackMode::Step).unwrap();
        assert_eq!(
            ctl.start(vec![3], PlaybackMode::Auto),
            Err(StateError::AlreadyRunning(PlaybackState::Running))
        );
        ctl.reset();
        assert!(ctl.start(vec![3], PlaybackMode::Auto).is_ok());
    }

    #[test]
    fn test_empty_run_completes_immediately() {
        let (ctl, rx) = PlaybackController::<u8>::new("test", 100);
        ctl.start(Vec::new(), PlaybackMode::Auto).unwrap();
        assert_eq!(next_event(&rx), PlaybackEvent::Started { total: 0 });
        assert_eq!(next_event(&rx), PlaybackEvent::Completed { items: vec![] });
        assert_eq!(ctl.advance(), Tick::Halted);
    }

    #[test]
    fn test_step_mode_waits_for_step() {
        let (ctl, rx) = PlaybackController::new("test", 10);
        ctl.start(vec![10, 20], PlaybackMode::Step).unwrap();
        let handle = ctl.spawn().unwrap();
        assert_eq!(next_event(&rx), PlaybackEvent::Started { total: 2 });

        // Nothing happens without a step
        assert!(matches!(
            rx.recv_timeout(Duration::from_millis(100)),
            Err(RecvTimeoutError::Timeout)
        ));
        assert_eq!(ctl.state(), PlaybackState::StepWaiting);

        ctl.step();
        assert_eq!(next_event(&rx), PlaybackEvent::StepCompleted { index: 0, item: 10 });
        ctl.step();
        assert_eq!(next_event(&rx), PlaybackEvent::StepCompleted { index: 1, item: 20 });
        assert_eq!(next_event(&rx), PlaybackEvent::Completed { items: vec![10, 20] });
        handle.join().unwrap();
    }

    #[test]
    fn test_step_is_banked_once() {
        let (ctl, _rx) = PlaybackController::new("test", 10);
        ctl.start(vec![1, 2, 3], PlaybackMode::Step).unwrap();
        ctl.step();
        ctl.step();
        // Only one banked step: the first advance proceeds, the second would block
        assert_eq!(ctl.advance(), Tick::Advanced(0));
        assert_eq!(ctl.cursor(), 1);
    }

    #[test]
    fn test_step_ignored_in_auto_mode_and_idle() {
        let (ctl, rx) = PlaybackController::<u8>::new("test", 10);
        ctl.step();
        assert!(rx.try_recv().is_err());
        assert_eq!(ctl.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_reset_stops_further_steps() {
        let (ctl, rx) = PlaybackController::new("test", 10_000);
        ctl.start((0..10).collect::<Vec<u32>>(), PlaybackMode::Auto).unwrap();
        let run = ctl.run_id();
        let handle = ctl.spawn().unwrap();
        thread::sleep(Duration::from_millis(50));
        ctl.reset();
        handle.join().unwrap();

        assert_eq!(ctl.state(), PlaybackState::Cancelled);
        let events: Vec<_> = rx.try_iter().collect();
        let steps_after_reset = events
            .iter()
            .skip_while(|m| m.event != PlaybackEvent::Reset)
            .filter(|m| matches!(m.event, PlaybackEvent::StepCompleted { .. }))
            .count();
        assert_eq!(steps_after_reset, 0);
        assert!(events.iter().all(|m| m.run == run || m.event == PlaybackEvent::Reset));
    }

    #[test]
    fn test_reset_when_idle_returns_to_idle() {
        let (ctl, rx) = PlaybackController::<u8>::new("test", 10);
        ctl.reset();
        assert_eq!(ctl.state(), PlaybackState::Idle);
        assert_eq!(next_event(&rx), PlaybackEvent::Reset);
    }

    #[test]
    fn test_pause_resume_keeps_position() {
        let (ctl, rx) = PlaybackController::new("test", 300);
        ctl.start(vec!['x', 'y', 'z'], PlaybackMode::Auto).unwrap();
        let handle = ctl.spawn().unwrap();
        assert_eq!(next_event(&rx), PlaybackEvent::Started { total: 3 });
        assert_eq!(next_event(&rx), PlaybackEvent::StepCompleted { index: 0, item: 'x' });

        ctl.pause();
        assert_eq!(next_event(&rx), PlaybackEvent::Paused { index: 1 });
        assert!(matches!(
            rx.recv_timeout(Duration::from_millis(250)),
            Err(RecvTimeoutError::Timeout)
        ));
        ctl.resume();
        assert_eq!(next_event(&rx), PlaybackEvent::Resumed { index: 1 });
        assert_eq!(next_event(&rx), PlaybackEvent::StepCompleted { index: 1, item: 'y' });
        assert_eq!(next_event(&rx), PlaybackEvent::StepCompleted { index: 2, item: 'z' });
        handle.join().unwrap();
    }

    #[test]
    fn test_invalid_transitions_are_noops() {
        let (ctl, rx) = PlaybackController::<u8>::new("test", 10);
        ctl.pause();
        ctl.resume();
        assert_eq!(ctl.state(), PlaybackState::Idle);
        assert!(rx.try_recv().is_err());
        assert_eq!(ctl.advance(), Tick::Halted);
    }

    #[test]
    fn test_set_speed() {
        let (ctl, _rx) = PlaybackController::<u8>::new("test", 10);
        ctl.set_speed(500);
        assert_eq!(ctl.speed_ms(), 500);
        ctl.set_speed(0);
        assert_eq!(ctl.speed_ms(), 1);
    }

    #[test]
    fn test_run_longer_than_speed_keeps_full_duration() {
        // More items than milliseconds: each wait is below 1 ms
        let (ctl, _rx) = PlaybackController::new("test", 100);
        ctl.start((0..300).collect::<Vec<u32>>(), PlaybackMode::Auto).unwrap();
        let began = Instant::now();
        ctl.spawn().unwrap().join().unwrap();
        assert!(began.elapsed() >= Duration::from_millis(95), "took {:?}", began.elapsed());
        assert_eq!(ctl.state(), PlaybackState::Completed);
    }

    #[test]
    fn test_interval_below_one_millisecond() {
        let (ctl, _rx) = PlaybackController::new("test", 2000);
        ctl.start((0..2400).collect::<Vec<u32>>(), PlaybackMode::Auto).unwrap();
        let interval = ctl.shared.inner.lock().interval();
        assert_eq!(interval, Duration::from_nanos(833_333));
        ctl.reset();
    }

    #[test]
    fn test_set_speed_does_not_shorten_current_wait() {
        // Two items over 400 ms: 200 ms each
        let (ctl, rx) = PlaybackController::new("test", 400);
        ctl.start(vec![1u8, 2], PlaybackMode::Auto).unwrap();
        let began = Instant::now();
        let handle = ctl.spawn().unwrap();
        assert_eq!(next_event(&rx), PlaybackEvent::Started { total: 2 });

        thread::sleep(Duration::from_millis(50));
        ctl.set_speed(2);

        assert_eq!(next_event(&rx), PlaybackEvent::StepCompleted { index: 0, item: 1 });
        let first = began.elapsed();
        assert!(first >= Duration::from_millis(195), "first item after {:?}", first);

        // The next wait uses the new speed
        assert_eq!(next_event(&rx), PlaybackEvent::StepCompleted { index: 1, item: 2 });
        let second = began.elapsed() - first;
        assert!(second < Duration::from_millis(150), "second item after {:?}", second);
        handle.join().unwrap();
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("STEP".parse::<PlaybackMode>(), Ok(PlaybackMode::Step));
        assert_eq!("auto".parse::<PlaybackMode>(), Ok(PlaybackMode::Auto));
        assert!("fast".parse::<PlaybackMode>().is_err());
    }
}
