//! Highscores kept in a text file, one `"<name>,<highscore>"` record per line
//!
//! Disk writes run on a dedicated writer thread, so saving from the game
//! thread only queues the new file contents. Queued writes collapse into the
//! newest one and each write goes through a temp file and a rename.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use super::{HighscoreStore, PersistenceError};
use crate::highscores::{MergeReport, Roster};

enum Job {
    Write(String),
    /// Answered once every write queued before it has hit the disk
    Sync(Sender<Result<(), PersistenceError>>),
}

#[derive(Debug)]
struct Writer {
    jobs: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl Writer {
    fn spawn(path: PathBuf) -> Self {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || run_writer(&path, rx));
        Self {
            jobs: Some(tx),
            handle: Some(handle),
        }
    }

    fn submit(&self, job: Job) -> Result<(), PersistenceError> {
        self.jobs
            .as_ref()
            .and_then(|tx| tx.send(job).ok())
            .ok_or(PersistenceError::WriterStopped)
    }
}

impl Drop for Writer {
    /// Pending writes still land before the thread exits
    fn drop(&mut self) {
        self.jobs = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Highscore writer panicked");
            }
        }
    }
}

fn run_writer(path: &Path, jobs: Receiver<Job>) {
    let mut failure: Option<io::Error> = None;
    while let Ok(first) = jobs.recv() {
        let mut latest = None;
        let mut waiting = Vec::new();
        for job in std::iter::once(first).chain(jobs.try_iter()) {
            match job {
                Job::Write(text) => latest = Some(text),
                Job::Sync(reply) => waiting.push(reply),
            }
        }

        if let Some(text) = latest {
            match write_atomically(path, &text) {
                Ok(()) => log::debug!("Highscores saved to {}", path.display()),
                Err(e) => {
                    log::warn!("Could not save highscores to {}: {}", path.display(), e);
                    failure = Some(e);
                }
            }
        }

        for reply in waiting {
            let result = match failure.take() {
                Some(source) => Err(PersistenceError::Write {
                    path: path.to_path_buf(),
                    source,
                }),
                None => Ok(()),
            };
            let _ = reply.send(result);
        }
    }
}

/// Write to a sibling temp file, then rename over the real one
fn write_atomically(path: &Path, text: &str) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, text)?;
    fs::rename(&tmp, path)
}

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    roster: Roster,
    writer: Writer,
}

impl FileStore {
    /// Load the file at `path`. A missing file is an empty roster;
    /// malformed lines are logged and skipped.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let mut roster = Roster::new();
        match fs::read_to_string(&path) {
            Ok(text) => {
                let report = roster.merge_batch(&text);
                log::info!(
                    "Loaded {} players from {} ({} bad records)",
                    roster.len(),
                    path.display(),
                    report.rejected.len()
                );
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No highscores at {}, starting fresh", path.display());
            }
            Err(source) => return Err(PersistenceError::Read { path, source }),
        }
        Ok(Self {
            writer: Writer::spawn(path.clone()),
            path,
            roster,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Merge records received from another device and persist the result
    pub fn merge_batch(&mut self, text: &str) -> Result<MergeReport, PersistenceError> {
        let report = self.roster.merge_batch(text);
        if report.changed > 0 {
            self.flush()?;
        }
        Ok(report)
    }

    /// Forget every player, on disk too
    pub fn clear(&mut self) -> Result<(), PersistenceError> {
        self.roster.clear();
        self.flush()
    }

    /// Write the current roster and wait until it is on disk
    pub fn flush(&self) -> Result<(), PersistenceError> {
        self.queue()?;
        self.sync()
    }

    /// Wait for every queued write. Reports the last failed write, if any.
    pub fn sync(&self) -> Result<(), PersistenceError> {
        let (tx, rx) = mpsc::channel();
        self.writer.submit(Job::Sync(tx))?;
        rx.recv().map_err(|_| PersistenceError::WriterStopped)?
    }

    fn queue(&self) -> Result<(), PersistenceError> {
        self.writer.submit(Job::Write(self.roster.to_batch()))
    }
}

impl HighscoreStore for FileStore {
    fn load(&self, name: &str) -> Result<u32, PersistenceError> {
        Ok(self.roster.highscore(name))
    }

    /// Updates memory at once; the disk write happens on the writer thread
    fn save(&mut self, name: &str, highscore: u32) -> Result<(), PersistenceError> {
        if self.roster.record(name, highscore)? {
            self.queue()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::RecordError;
    use crate::sim::{GameSession, SessionConfig};

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tilt-maze-{}-{}", std::process::id(), name));
        let _ = fs::remove_dir_all(&dir);
        dir.join("scores.txt")
    }

    #[test]
    fn test_missing_file_is_empty() {
        let path = scratch("missing");
        let store = FileStore::open(&path).unwrap();
        assert!(store.roster().is_empty());
        assert_eq!(store.load("Alice").unwrap(), 0);
        assert_eq!(store.path(), path);
    }

    #[test]
    fn test_save_then_reopen() {
        let path = scratch("reopen");
        let mut store = FileStore::open(&path).unwrap();
        store.save("Alice", 4).unwrap();
        store.save("Bob", 2).unwrap();
        store.sync().unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.load("Alice").unwrap(), 4);
        assert_eq!(reopened.load("Bob").unwrap(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "Alice,4\nBob,2\n");
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_padded_name_survives_reopen() {
        let path = scratch("padded");
        let mut store = FileStore::open(&path).unwrap();
        store.save(" Alice ", 4).unwrap();
        assert!(matches!(
            store.save("Smith, Bob", 7),
            Err(PersistenceError::Record(RecordError::InvalidName { .. }))
        ));
        store.sync().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Alice,4\n");

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.load(" Alice ").unwrap(), 4);
        let session = GameSession::new(" Alice ", reopened, SessionConfig::default()).unwrap();
        assert_eq!(session.player(), "Alice");
        assert_eq!(session.highscore(), 4);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_queued_writes_land_on_drop() {
        let path = scratch("drop");
        let mut store = FileStore::open(&path).unwrap();
        for score in 1..=50 {
            store.save("Alice", score).unwrap();
        }
        drop(store);

        assert_eq!(fs::read_to_string(&path).unwrap(), "Alice,50\n");
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_malformed_lines_skipped_on_load() {
        let path = scratch("malformed");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "Alice,5\nCarol\nBob,oops\nDave,3\n").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.roster().len(), 2);
        assert_eq!(store.load("Alice").unwrap(), 5);
        assert_eq!(store.load("Dave").unwrap(), 3);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_merge_batch_persists() {
        let path = scratch("merge");
        let mut store = FileStore::open(&path).unwrap();
        store.save("Alice", 5).unwrap();
        let report = store.merge_batch("Alice,3\nBob,9\nCarol").unwrap();
        assert_eq!(report.changed, 1);
        assert_eq!(report.rejected.len(), 1);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.load("Alice").unwrap(), 5);
        assert_eq!(reopened.load("Bob").unwrap(), 9);
        assert!(!reopened.roster().contains("Carol"));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_clear_empties_file() {
        let path = scratch("clear");
        let mut store = FileStore::open(&path).unwrap();
        store.save("Alice", 5).unwrap();
        store.clear().unwrap();
        assert!(FileStore::open(&path).unwrap().roster().is_empty());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
