//! Platform abstraction layer
//!
//! Handles the host-facing side of the game:
//! - Input events (tilt sources, start/stop)
//! - Time (the round countdown ticker)
//! - The single-writer runtime and the render snapshot

pub mod input;
pub mod runtime;
pub mod time;

use std::sync::mpsc::Sender;

pub use input::{ManualTilt, SimulatedTilt, TiltSource};
pub use runtime::{Runtime, Snapshot, SnapshotHandle};
pub use time::{Periodic, Ticker};

use crate::sim::SessionInput;

/// Message processed by the session worker
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Command {
    Input(SessionInput),
    Shutdown,
}

/// Write end of the session queue. Cheap to clone; every producer gets one.
#[derive(Debug, Clone)]
pub struct InputSink {
    tx: Sender<Command>,
}

impl InputSink {
    pub(crate) fn new(tx: Sender<Command>) -> Self {
        Self { tx }
    }

    /// Queue a tilt event. Returns false once the session has shut down.
    pub fn tilt(&self, dx: f32, dy: f32) -> bool {
        self.send(SessionInput::Tilt { dx, dy })
    }

    pub(crate) fn send(&self, input: SessionInput) -> bool {
        self.tx.send(Command::Input(input)).is_ok()
    }

    pub(crate) fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("session worker panicked")]
    WorkerPanicked,
}
