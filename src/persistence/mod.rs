//! Highscore persistence
//!
//! Features:
//! - `HighscoreStore` contract injected into the game session
//! - In-memory store (`Roster` itself)
//! - Line-oriented file store with tmp-then-rename writes
//! - Thread-safe shared store for merges from other devices

pub mod file;
pub mod shared;

use std::io;
use std::path::PathBuf;

pub use file::FileStore;
pub use shared::SharedStore;

use crate::highscores::{RecordError, Roster};

/// Failures surfaced by a store. They never reach game state.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to encode data: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("highscore writer stopped")]
    WriterStopped,
}

/// Keyed highscore storage, player name to best score
pub trait HighscoreStore {
    /// Stored highscore, 0 for unknown players
    fn load(&self, name: &str) -> Result<u32, PersistenceError>;

    /// Record a highscore. Stores keep the best value seen per player.
    fn save(&mut self, name: &str, highscore: u32) -> Result<(), PersistenceError>;
}

impl HighscoreStore for Roster {
    fn load(&self, name: &str) -> Result<u32, PersistenceError> {
        Ok(self.highscore(name))
    }

    fn save(&mut self, name: &str, highscore: u32) -> Result<(), PersistenceError> {
        self.record(name, highscore)?;
        Ok(())
    }
}

impl<S: HighscoreStore + ?Sized> HighscoreStore for Box<S> {
    fn load(&self, name: &str) -> Result<u32, PersistenceError> {
        (**self).load(name)
    }

    fn save(&mut self, name: &str, highscore: u32) -> Result<(), PersistenceError> {
        (**self).save(name, highscore)
    }
}
