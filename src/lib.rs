//! Tilt Maze - a tilt-controlled maze game core
//!
//! Core modules:
//! - `sim`: Maze generation, ball movement and the session state machine
//! - `highscores`: Player records, the text record codec and leaderboard merge
//! - `persistence`: Highscore stores (memory, file, shared)
//! - `platform`: Single-writer event loop, timer and tilt source plumbing
//! - `settings`: Data-driven game configuration

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use highscores::{Player, RecordError, Roster};
pub use persistence::{HighscoreStore, PersistenceError};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Maze size and hole count at difficulty tier 0
    pub const BASE_WIDTH: u32 = 20;
    pub const BASE_HEIGHT: u32 = 40;
    pub const BASE_HOLES: u32 = 7;

    /// Growth per point of score
    pub const WIDTH_PER_TIER: u32 = 2;
    pub const HEIGHT_PER_TIER: u32 = 4;
    pub const HOLES_PER_TIER: u32 = 1;

    /// Smallest maze dimension (the first 2x2 block must fit inside the border)
    pub const MIN_DIMENSION: u32 = 4;

    /// Retry budget for each hole, spawn and goal placement
    pub const PLACEMENT_ATTEMPTS: u32 = 1000;

    /// Tilt-to-distance factor
    pub const TILT_SENSITIVITY: f32 = 5.0;

    /// Round length in timer ticks (one tick per second)
    pub const ROUND_DURATION: u32 = 60;
    pub const TIMER_TICK_MS: u64 = 1000;

    /// Reference portrait viewport, in pixels
    pub const VIEWPORT_WIDTH: u32 = 1080;
    pub const VIEWPORT_HEIGHT: u32 = 2160;

    /// Entries shown on the leaderboard
    pub const LEADERBOARD_SIZE: usize = 5;
}
