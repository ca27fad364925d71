//! Roster shared between the game thread and merge workers
//!
//! Each record update takes the lock on its own. Because merges only ever
//! raise scores, updates from different workers commute and no lock spans
//! more than one record.

use std::sync::{Arc, Mutex, MutexGuard};

use super::{HighscoreStore, PersistenceError};
use crate::highscores::{MergeReport, Player, RecordError, Roster, parse_batch};

#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<Roster>>,
}

impl SharedStore {
    pub fn new(roster: Roster) -> Self {
        Self {
            inner: Arc::new(Mutex::new(roster)),
        }
    }

    /// A poisoned lock still holds a valid roster: every update is a
    /// single map write.
    fn lock(&self) -> MutexGuard<'_, Roster> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Raise one player's score atomically
    pub fn record(&self, player: &Player) -> Result<bool, RecordError> {
        self.lock().record(&player.name, player.highscore)
    }

    /// Merge a received batch, one record at a time
    pub fn merge_batch(&self, text: &str) -> MergeReport {
        let batch = parse_batch(text);
        let mut report = MergeReport::default();
        for e in &batch.rejected {
            log::warn!("Skipping highscore record: {}", e);
        }
        report.rejected = batch.rejected;
        for player in &batch.players {
            match self.record(player) {
                Ok(true) => report.changed += 1,
                Ok(false) => report.unchanged += 1,
                Err(e) => report.rejected.push(e),
            }
        }
        report
    }

    /// Copy of the current roster
    pub fn snapshot(&self) -> Roster {
        self.lock().clone()
    }
}

impl HighscoreStore for SharedStore {
    fn load(&self, name: &str) -> Result<u32, PersistenceError> {
        Ok(self.lock().highscore(name))
    }

    fn save(&mut self, name: &str, highscore: u32) -> Result<(), PersistenceError> {
        self.lock().record(name, highscore)?;
        Ok(())
    }
}
