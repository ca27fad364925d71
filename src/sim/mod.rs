//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Seeded RNG only
//! - One writer at a time (see `platform::runtime`)
//! - No rendering or platform dependencies

pub mod ball;
pub mod collision;
pub mod grid;
pub mod maze;
pub mod session;
pub mod tick;

pub use ball::{Ball, BallController, MovementOutcome, Viewport, tile_size_for};
pub use collision::{can_move_to, cell_at, grid_cell_for};
pub use grid::{Cell, GridError, MazeGrid, MazeParams};
pub use maze::{MazeGenerator, generate_maze};
pub use session::{Difficulty, GameSession, SessionConfig, SessionEvent, SessionPhase};
pub use tick::{SessionInput, tick};
