//! Session runtime
//!
//! One worker thread owns the `GameSession` and drains a single queue of
//! commands. Tilt sources, the countdown ticker and host calls all feed that
//! queue, so every mutation is serialized. After each input the worker
//! publishes an immutable `Snapshot` for renderers and forwards the
//! resulting `SessionEvent`s.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::input::TiltSource;
use super::time::Ticker;
use super::{Command, InputSink, RuntimeError};
use crate::persistence::HighscoreStore;
use crate::sim::{Ball, GameSession, MazeGrid, SessionEvent, SessionInput, SessionPhase, tick};

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub grid: Arc<MazeGrid>,
    pub tile_size: f32,
    pub ball: Ball,
    pub score: u32,
    pub highscore: u32,
    pub time_remaining: u32,
    pub phase: SessionPhase,
}

impl Snapshot {
    pub fn capture<S>(session: &GameSession<S>) -> Self {
        Self {
            grid: Arc::clone(session.grid()),
            tile_size: session.tile_size(),
            ball: session.ball(),
            score: session.score(),
            highscore: session.highscore(),
            time_remaining: session.time_remaining(),
            phase: session.phase(),
        }
    }
}

/// Latest published snapshot, readable from any thread
#[derive(Debug, Clone)]
pub struct SnapshotHandle {
    latest: Arc<RwLock<Arc<Snapshot>>>,
}

impl SnapshotHandle {
    fn new(snapshot: Snapshot) -> Self {
        Self {
            latest: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    pub fn latest(&self) -> Arc<Snapshot> {
        let guard = self.latest.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    fn publish(&self, snapshot: Snapshot) {
        let mut guard = self.latest.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(snapshot);
    }
}

pub struct Runtime<S> {
    sink: InputSink,
    snapshots: SnapshotHandle,
    events: Receiver<SessionEvent>,
    source: Box<dyn TiltSource>,
    ticker: Option<Ticker>,
    tick_period: Duration,
    paused: bool,
    worker: Option<JoinHandle<GameSession<S>>>,
}

impl<S: HighscoreStore + Send + 'static> Runtime<S> {
    /// Move `session` onto a worker thread and subscribe the input sources.
    /// A session that starts paused stays unsubscribed until resumed.
    pub fn start(session: GameSession<S>, source: Box<dyn TiltSource>, tick_period: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let (event_tx, events) = mpsc::channel();
        let snapshots = SnapshotHandle::new(Snapshot::capture(&session));
        let paused = session.is_paused();

        let worker = {
            let snapshots = snapshots.clone();
            thread::spawn(move || run_worker(session, rx, event_tx, snapshots))
        };

        let mut runtime = Self {
            sink: InputSink::new(tx),
            snapshots,
            events,
            source,
            ticker: None,
            tick_period: tick_period.max(Duration::from_millis(1)),
            paused,
            worker: Some(worker),
        };
        if !paused {
            runtime.subscribe();
        }
        log::info!("Session runtime started");
        runtime
    }

    /// Unsubscribe tilt and cancel the countdown, then pause the session
    pub fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.unsubscribe();
        self.sink.send(SessionInput::Pause);
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.sink.send(SessionInput::Resume);
        self.subscribe();
        self.paused = false;
    }

    /// Fresh game at score 0. Leaves the runtime running, and the new
    /// round waits a full period for its first tick.
    pub fn restart(&mut self) {
        self.unsubscribe();
        self.sink.send(SessionInput::Restart);
        self.subscribe();
        self.paused = false;
    }

    /// Stop every producer, drain the queue and hand back the session
    pub fn shutdown(mut self) -> Result<GameSession<S>, RuntimeError> {
        self.unsubscribe();
        self.sink.shutdown();
        let worker = self.worker.take().ok_or(RuntimeError::WorkerPanicked)?;
        let session = worker.join().map_err(|_| RuntimeError::WorkerPanicked)?;
        log::info!("Session runtime stopped");
        Ok(session)
    }
}

impl<S> Runtime<S> {
    /// Sink for hosts that deliver tilt readings themselves
    pub fn input_sink(&self) -> InputSink {
        self.sink.clone()
    }

    pub fn snapshots(&self) -> SnapshotHandle {
        self.snapshots.clone()
    }

    pub fn latest(&self) -> Arc<Snapshot> {
        self.snapshots.latest()
    }

    pub fn events(&self) -> &Receiver<SessionEvent> {
        &self.events
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    fn subscribe(&mut self) {
        self.ticker = Some(Ticker::start(self.tick_period, self.sink.clone()));
        self.source.start(self.sink.clone());
    }

    fn unsubscribe(&mut self) {
        self.source.stop();
        if let Some(mut ticker) = self.ticker.take() {
            ticker.stop();
        }
    }
}

impl<S> Drop for Runtime<S> {
    fn drop(&mut self) {
        self.unsubscribe();
        if let Some(worker) = self.worker.take() {
            self.sink.shutdown();
            if worker.join().is_err() {
                log::error!("Session worker panicked");
            }
        }
    }
}

fn run_worker<S: HighscoreStore>(
    mut session: GameSession<S>,
    commands: Receiver<Command>,
    events: Sender<SessionEvent>,
    snapshots: SnapshotHandle,
) -> GameSession<S> {
    for command in commands {
        let input = match command {
            Command::Input(input) => input,
            Command::Shutdown => break,
        };
        let happened = tick(&mut session, input);
        snapshots.publish(Snapshot::capture(&session));
        for event in happened {
            log::debug!("{:?}", event);
            // Nobody listening is fine
            let _ = events.send(event);
        }
    }
    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::Roster;
    use crate::platform::ManualTilt;
    use crate::sim::SessionConfig;

    fn runtime(round_duration: u32, tick_ms: u64) -> Runtime<Roster> {
        let config = SessionConfig {
            round_duration,
            seed: 5,
            ..Default::default()
        };
        let session = GameSession::new("Bob", Roster::new(), config).unwrap();
        Runtime::start(session, Box::new(ManualTilt), Duration::from_millis(tick_ms))
    }

    fn wait_for(runtime: &Runtime<Roster>, wanted: fn(&SessionEvent) -> bool) -> SessionEvent {
        loop {
            let event = runtime
                .events()
                .recv_timeout(Duration::from_secs(5))
                .expect("event did not arrive");
            if wanted(&event) {
                return event;
            }
        }
    }

    #[test]
    fn test_initial_snapshot_matches_session() {
        let runtime = runtime(60, 1000);
        let snapshot = runtime.latest();
        assert_eq!(snapshot.time_remaining, 60);
        assert_eq!(snapshot.phase, SessionPhase::Running);
        assert_eq!(snapshot.score, 0);
        runtime.shutdown().unwrap();
    }

    #[test]
    fn test_pause_publishes_paused_snapshot() {
        let mut runtime = runtime(60, 1000);
        runtime.pause();
        runtime.pause();
        wait_for(&runtime, |e| *e == SessionEvent::Paused);
        assert_eq!(runtime.latest().phase, SessionPhase::Paused);
        assert!(runtime.is_paused());

        runtime.resume();
        wait_for(&runtime, |e| *e == SessionEvent::Resumed);
        assert_eq!(runtime.latest().phase, SessionPhase::Running);
        runtime.shutdown().unwrap();
    }

    #[test]
    fn test_countdown_expires_round() {
        let runtime = runtime(2, 2);
        let event = wait_for(&runtime, |e| matches!(e, SessionEvent::RoundExpired { .. }));
        assert_eq!(event, SessionEvent::RoundExpired { score: 0 });
        let session = runtime.shutdown().unwrap();
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_restart_gives_full_first_tick() {
        let mut runtime = runtime(60, 150);
        thread::sleep(Duration::from_millis(100));
        runtime.restart();
        wait_for(&runtime, |e| *e == SessionEvent::Restarted);

        // The old ticker would have fired about 50ms into the new round
        thread::sleep(Duration::from_millis(90));
        assert_eq!(runtime.latest().time_remaining, 60);
        runtime.shutdown().unwrap();
    }

    #[test]
    fn test_sink_reports_shutdown() {
        let runtime = runtime(60, 1000);
        let sink = runtime.input_sink();
        assert!(sink.tilt(0.0, 0.0));
        runtime.shutdown().unwrap();
        assert!(!sink.tilt(0.0, 0.0));
    }
}
