//! Score, timer and difficulty state machine
//!
//! The session reacts to ball outcomes and timer ticks by regenerating the
//! maze. Difficulty tier equals the current score.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::ball::{Ball, BallController, MovementOutcome, Viewport};
use super::grid::{MazeGrid, MazeParams};
use super::maze::MazeGenerator;
use crate::consts::*;
use crate::highscores::{RecordError, normalize_name};
use crate::persistence::HighscoreStore;

/// Base maze parameters, grown by score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difficulty {
    pub base_width: u32,
    pub base_height: u32,
    pub base_holes: u32,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            base_width: BASE_WIDTH,
            base_height: BASE_HEIGHT,
            base_holes: BASE_HOLES,
        }
    }
}

impl Difficulty {
    /// Maze parameters for difficulty tier `score`
    pub fn for_score(&self, score: u32) -> MazeParams {
        MazeParams::new(
            self.base_width.saturating_add(WIDTH_PER_TIER.saturating_mul(score)),
            self.base_height.saturating_add(HEIGHT_PER_TIER.saturating_mul(score)),
            self.base_holes.saturating_add(HOLES_PER_TIER.saturating_mul(score)),
        )
    }
}

/// Everything a session needs besides its player and store
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub difficulty: Difficulty,
    /// Round length in timer ticks
    pub round_duration: u32,
    pub sensitivity: f32,
    pub viewport: Viewport,
    /// Seed for the maze generator
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            round_duration: ROUND_DURATION,
            sensitivity: TILT_SENSITIVITY,
            viewport: Viewport::default(),
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Timer counting down, tilt forwarded to the ball
    Running,
    /// Timer frozen, tilt ignored
    Paused,
}

/// Notable things that happened while applying an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    GoalReached { score: u32 },
    FellInHole,
    NewHighscore { highscore: u32 },
    /// Timer ran out; `score` is what the round ended with
    RoundExpired { score: u32 },
    Paused,
    Resumed,
    Restarted,
}

/// One player's game: score, highscore, countdown and the active maze
#[derive(Debug)]
pub struct GameSession<S> {
    player: String,
    store: S,
    config: SessionConfig,
    generator: MazeGenerator,
    controller: BallController,
    score: u32,
    highscore: u32,
    time_remaining: u32,
    phase: SessionPhase,
}

impl<S: HighscoreStore> GameSession<S> {
    /// Start a running round at base difficulty. The player name is
    /// trimmed and must be usable as a highscore record key.
    pub fn new(player: impl Into<String>, store: S, config: SessionConfig) -> Result<Self, RecordError> {
        let player: String = player.into();
        let player = normalize_name(&player)?.to_string();
        let config = SessionConfig {
            round_duration: config.round_duration.max(1),
            ..config
        };
        let highscore = store.load(&player).unwrap_or_else(|e| {
            log::warn!("Could not load highscore for {}: {}", player, e);
            0
        });

        let mut generator = MazeGenerator::new(config.seed);
        let grid = Arc::new(generator.generate(config.difficulty.for_score(0)));
        let controller =
            BallController::with_sensitivity(grid, config.viewport, config.sensitivity);

        log::info!("Session started for {} (highscore {})", player, highscore);

        Ok(Self {
            player,
            store,
            config,
            generator,
            controller,
            score: 0,
            highscore,
            time_remaining: config.round_duration,
            phase: SessionPhase::Running,
        })
    }

    /// Forward a tilt event to the ball. Ignored while paused.
    pub fn on_tilt(&mut self, dx: f32, dy: f32) -> Vec<SessionEvent> {
        if self.phase == SessionPhase::Paused {
            return Vec::new();
        }
        let outcome = self.controller.on_tilt(dx, dy);
        self.resolve(outcome)
    }

    /// Count down one unit. Ignored while paused.
    pub fn timer_tick(&mut self) -> Vec<SessionEvent> {
        if self.phase == SessionPhase::Paused {
            return Vec::new();
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.expire_round()
        } else {
            Vec::new()
        }
    }

    /// Freeze the timer and stop moving the ball
    pub fn pause(&mut self) -> Vec<SessionEvent> {
        if self.phase == SessionPhase::Paused {
            return Vec::new();
        }
        self.phase = SessionPhase::Paused;
        log::info!("Paused with {} left", self.time_remaining);
        vec![SessionEvent::Paused]
    }

    /// Continue from the time left at pause
    pub fn resume(&mut self) -> Vec<SessionEvent> {
        if self.phase == SessionPhase::Running {
            return Vec::new();
        }
        self.phase = SessionPhase::Running;
        log::info!("Resumed with {} left", self.time_remaining);
        vec![SessionEvent::Resumed]
    }

    /// Throw the round away and start over at base difficulty
    pub fn restart(&mut self) -> Vec<SessionEvent> {
        self.score = 0;
        self.time_remaining = self.config.round_duration;
        self.phase = SessionPhase::Running;
        self.regenerate();
        log::info!("Restarted session for {}", self.player);
        vec![SessionEvent::Restarted]
    }

    fn resolve(&mut self, outcome: MovementOutcome) -> Vec<SessionEvent> {
        match outcome {
            MovementOutcome::None => Vec::new(),
            MovementOutcome::EnteredGoal => {
                self.score += 1;
                let mut events = vec![SessionEvent::GoalReached { score: self.score }];
                events.extend(self.record_highscore());
                self.regenerate();
                log::info!("Goal! Score {}", self.score);
                events
            }
            MovementOutcome::EnteredHole => {
                self.regenerate();
                log::info!("Fell in a hole at score {}", self.score);
                vec![SessionEvent::FellInHole]
            }
        }
    }

    fn expire_round(&mut self) -> Vec<SessionEvent> {
        let final_score = self.score;
        let mut events = vec![SessionEvent::RoundExpired { score: final_score }];
        events.extend(self.record_highscore());

        self.score = 0;
        self.time_remaining = self.config.round_duration;
        self.regenerate();
        log::info!("Time up at score {}, new round", final_score);
        events
    }

    /// `highscore = max(highscore, score)`, always persisted
    fn record_highscore(&mut self) -> Option<SessionEvent> {
        let raised = self.score > self.highscore;
        self.highscore = self.highscore.max(self.score);
        if let Err(e) = self.store.save(&self.player, self.highscore) {
            log::warn!("Could not save highscore for {}: {}", self.player, e);
        }
        raised.then_some(SessionEvent::NewHighscore {
            highscore: self.highscore,
        })
    }

    /// Fresh maze at the current tier, ball back on spawn
    fn regenerate(&mut self) {
        let params = self.config.difficulty.for_score(self.score);
        let grid = self.generator.generate(params);
        log::debug!(
            "New maze {}x{} with {} holes for tier {}",
            grid.width(),
            grid.height(),
            grid.hole_count(),
            self.score
        );
        self.controller.load(Arc::new(grid));
    }
}

impl<S> GameSession<S> {
    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn highscore(&self) -> u32 {
        self.highscore
    }

    /// Difficulty tier, which is the score
    pub fn difficulty_tier(&self) -> u32 {
        self.score
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.phase == SessionPhase::Paused
    }

    pub fn grid(&self) -> &Arc<MazeGrid> {
        self.controller.grid()
    }

    pub fn ball(&self) -> Ball {
        self.controller.ball()
    }

    pub fn tile_size(&self) -> f32 {
        self.controller.tile_size()
    }

    pub fn controller(&self) -> &BallController {
        &self.controller
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
