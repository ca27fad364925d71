//! Periodic background work with prompt cancellation

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::InputSink;
use crate::sim::SessionInput;

/// Runs `step` every `period` on its own thread until stopped or until
/// `step` returns false
#[derive(Debug)]
pub struct Periodic {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Periodic {
    pub fn spawn<F>(period: Duration, mut step: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {
                        if !step() {
                            break;
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });
        Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel and wait for the thread. `step` never runs after this returns.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Periodic worker panicked");
            }
        }
    }
}

impl Drop for Periodic {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Round countdown: one `TimerTick` per period
#[derive(Debug)]
pub struct Ticker {
    worker: Periodic,
}

impl Ticker {
    pub fn start(period: Duration, sink: InputSink) -> Self {
        Self {
            worker: Periodic::spawn(period, move || sink.send(SessionInput::TimerTick)),
        }
    }

    /// Cancel the pending tick
    pub fn stop(&mut self) {
        self.worker.stop();
    }
}
