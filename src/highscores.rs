//! Player highscore records and leaderboard
//!
//! Records travel as `"<name>,<highscore>"` text, one per line, both on disk
//! and between devices. Merging keeps the larger score for each name, which
//! makes it commutative and idempotent.

use std::collections::BTreeMap;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::LEADERBOARD_SIZE;

/// Shown for empty leaderboard rows
const EMPTY_ROW: &str = "--- ; ---";

/// A single player and their best score
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub highscore: u32,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_highscore(name, 0)
    }

    pub fn with_highscore(name: impl Into<String>, highscore: u32) -> Self {
        Self {
            name: name.into(),
            highscore,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.name, self.highscore)
    }
}

/// Why a single record line was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("record {record:?} has no score field")]
    MissingScore { record: String },
    #[error("record {record:?} has an invalid score: {source}")]
    InvalidScore {
        record: String,
        source: ParseIntError,
    },
    #[error("record {record:?} has an empty name")]
    EmptyName { record: String },
    #[error("player name {name:?} contains a record separator")]
    InvalidName { name: String },
}

/// Canonical form of a player name: trimmed, non-empty, and free of the
/// characters that delimit records
pub fn normalize_name(name: &str) -> Result<&str, RecordError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RecordError::EmptyName {
            record: name.to_string(),
        });
    }
    if trimmed.contains([',', '\n', '\r']) {
        return Err(RecordError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(trimmed)
}

impl FromStr for Player {
    type Err = RecordError;

    /// Parse `"<name>,<highscore>"`. Fields after the score are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let record = s.trim();
        let mut fields = record.split(',');
        let name = fields.next().unwrap_or_default();
        let Some(score) = fields.next() else {
            return Err(RecordError::MissingScore {
                record: record.to_string(),
            });
        };
        let name = normalize_name(name).map_err(|e| match e {
            RecordError::EmptyName { .. } => RecordError::EmptyName {
                record: record.to_string(),
            },
            other => other,
        })?;
        let highscore = score
            .trim()
            .parse::<u32>()
            .map_err(|source| RecordError::InvalidScore {
                record: record.to_string(),
                source,
            })?;
        Ok(Player::with_highscore(name, highscore))
    }
}

/// Outcome of parsing a newline-delimited batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedBatch {
    pub players: Vec<Player>,
    pub rejected: Vec<RecordError>,
}

/// Parse every non-blank line independently
pub fn parse_batch(text: &str) -> ParsedBatch {
    let mut batch = ParsedBatch::default();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match line.parse::<Player>() {
            Ok(player) => batch.players.push(player),
            Err(e) => batch.rejected.push(e),
        }
    }
    batch
}

/// Result of merging a batch into a roster
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Records that inserted a player or raised a score
    pub changed: usize,
    /// Records that were already covered by local scores
    pub unchanged: usize,
    pub rejected: Vec<RecordError>,
}

/// Highscores keyed by player name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    players: BTreeMap<String, u32>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.players.contains_key(name.trim())
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.players.get(name.trim()).copied()
    }

    /// Highscore for `name`, 0 for unknown players
    pub fn highscore(&self, name: &str) -> u32 {
        self.get(name).unwrap_or(0)
    }

    /// Raise `name` to `score` if that beats the stored value.
    /// Returns true if the roster changed.
    pub fn record(&mut self, name: &str, score: u32) -> Result<bool, RecordError> {
        let name = normalize_name(name)?;
        let changed = match self.players.get_mut(name) {
            Some(best) if *best >= score => false,
            Some(best) => {
                *best = score;
                true
            }
            None => {
                self.players.insert(name.to_string(), score);
                true
            }
        };
        Ok(changed)
    }

    /// Merge incoming players, keeping the best score per name
    pub fn merge(&mut self, incoming: impl IntoIterator<Item = Player>) -> MergeReport {
        let mut report = MergeReport::default();
        for player in incoming {
            match self.record(&player.name, player.highscore) {
                Ok(true) => report.changed += 1,
                Ok(false) => report.unchanged += 1,
                Err(e) => report.rejected.push(e),
            }
        }
        report
    }

    /// Parse and merge a received batch. Bad lines are logged and skipped.
    pub fn merge_batch(&mut self, text: &str) -> MergeReport {
        let ParsedBatch { players, rejected } = parse_batch(text);
        for e in &rejected {
            log::warn!("Skipping highscore record: {}", e);
        }
        let mut report = self.merge(players);
        let mut all = rejected;
        all.append(&mut report.rejected);
        report.rejected = all;
        report
    }

    /// Existing player, or a fresh one with score 0
    pub fn find_or_create(&mut self, name: &str) -> Result<Player, RecordError> {
        let name = normalize_name(name)?;
        let highscore = *self.players.entry(name.to_string()).or_insert_with(|| {
            log::info!("New player: {}", name);
            0
        });
        Ok(Player::with_highscore(name, highscore))
    }

    /// All players in name order
    pub fn players(&self) -> impl Iterator<Item = Player> + '_ {
        self.players
            .iter()
            .map(|(name, score)| Player::with_highscore(name.as_str(), *score))
    }

    /// Best `n` players, highest score first, ties by name
    pub fn top(&self, n: usize) -> Vec<Player> {
        let mut ranked: Vec<Player> = self.players().collect();
        ranked.sort_by(|a, b| b.highscore.cmp(&a.highscore).then_with(|| a.name.cmp(&b.name)));
        ranked.truncate(n);
        ranked
    }

    /// 1-indexed leaderboard position of `name`
    pub fn rank_of(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        let score = self.get(name)?;
        let ahead = self
            .players
            .iter()
            .filter(|(other, s)| **s > score || (**s == score && other.as_str() < name))
            .count();
        Some(ahead + 1)
    }

    /// Fixed-size leaderboard rows, padded with placeholders
    pub fn leaderboard_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .top(LEADERBOARD_SIZE)
            .iter()
            .map(|p| format!("{} - {}", p.name, p.highscore))
            .collect();
        lines.resize(LEADERBOARD_SIZE, EMPTY_ROW.to_string());
        lines
    }

    /// Every record as newline-terminated text, ready to send or store
    pub fn to_batch(&self) -> String {
        self.players().map(|p| format!("{}\n", p)).collect()
    }

    pub fn clear(&mut self) {
        self.players.clear();
    }
}

impl FromIterator<Player> for Roster {
    fn from_iter<I: IntoIterator<Item = Player>>(iter: I) -> Self {
        let mut roster = Roster::new();
        roster.merge(iter);
        roster
    }
}
