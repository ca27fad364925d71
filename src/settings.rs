//! Game settings
//!
//! Persisted as JSON next to the highscores. Missing fields take their
//! default, so old files keep loading as settings grow.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::PersistenceError;
use crate::sim::{Difficulty, SessionConfig, Viewport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Difficulty ===
    /// Maze width at score 0
    pub base_width: u32,
    /// Maze height at score 0
    pub base_height: u32,
    /// Holes at score 0
    pub base_holes: u32,

    // === Timer ===
    /// Round length in ticks
    pub round_duration: u32,
    /// Wall-clock length of one tick
    pub tick_interval_ms: u64,

    // === Input ===
    /// Tilt-to-distance factor
    pub sensitivity: f32,

    // === Display ===
    pub viewport: Viewport,

    /// Fixed maze seed; random per run when unset
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_width: BASE_WIDTH,
            base_height: BASE_HEIGHT,
            base_holes: BASE_HOLES,

            round_duration: ROUND_DURATION,
            tick_interval_ms: TIMER_TICK_MS,

            sensitivity: TILT_SENSITIVITY,

            viewport: Viewport::default(),

            seed: None,
        }
    }
}

impl Settings {
    pub fn difficulty(&self) -> Difficulty {
        Difficulty {
            base_width: self.base_width,
            base_height: self.base_height,
            base_holes: self.base_holes,
        }
    }

    /// Session parameters, drawing a seed when none is configured
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            difficulty: self.difficulty(),
            round_duration: self.round_duration,
            sensitivity: self.sensitivity,
            viewport: self.viewport,
            seed: self.seed.unwrap_or_else(rand::random::<u64>),
        }
    }

    /// Timer period, never zero
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring invalid settings in {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| PersistenceError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved");
        Ok(())
    }
}
