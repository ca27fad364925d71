//! Ball movement driven by tilt input
//!
//! There is no velocity: every tilt event is a direct displacement that is
//! either committed whole or rejected whole.

use std::sync::Arc;

use glam::{UVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::collision::{can_move_to, cell_at};
use super::grid::{Cell, MazeGrid};
use crate::consts::{TILT_SENSITIVITY, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

/// Drawable area the maze is scaled into, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: VIEWPORT_WIDTH,
            height: VIEWPORT_HEIGHT,
        }
    }
}

/// Whole-pixel tile size that fits the playable cells into `viewport`.
///
/// The far border row and column end up just off screen.
pub fn tile_size_for(grid: &MazeGrid, viewport: Viewport) -> f32 {
    let across = viewport.width / grid.width().max(1);
    let down = viewport.height / grid.height().max(1);
    across.min(down).max(1) as f32
}

/// Result of a single tilt event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementOutcome {
    None,
    EnteredGoal,
    EnteredHole,
}

/// The ball, in continuous viewport units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub radius: f32,
}

impl Ball {
    /// Centre of `cell`, sized to a third of a tile
    pub fn at_cell(cell: UVec2, tile_size: f32) -> Self {
        Self {
            pos: cell.as_vec2() * tile_size + Vec2::splat(tile_size / 2.0),
            radius: tile_size / 3.0,
        }
    }
}

/// Moves the ball through the active maze
#[derive(Debug, Clone)]
pub struct BallController {
    grid: Arc<MazeGrid>,
    ball: Ball,
    tile_size: f32,
    viewport: Viewport,
    sensitivity: f32,
}

impl BallController {
    pub fn new(grid: Arc<MazeGrid>, viewport: Viewport) -> Self {
        Self::with_sensitivity(grid, viewport, TILT_SENSITIVITY)
    }

    pub fn with_sensitivity(grid: Arc<MazeGrid>, viewport: Viewport, sensitivity: f32) -> Self {
        let tile_size = tile_size_for(&grid, viewport);
        let ball = Ball::at_cell(grid.spawn(), tile_size);
        Self {
            grid,
            ball,
            tile_size,
            viewport,
            sensitivity,
        }
    }

    /// Swap in a new maze and put the ball on its spawn
    pub fn load(&mut self, grid: Arc<MazeGrid>) {
        self.tile_size = tile_size_for(&grid, self.viewport);
        self.ball = Ball::at_cell(grid.spawn(), self.tile_size);
        self.grid = grid;
    }

    /// Apply one tilt event.
    ///
    /// The x axis is inverted relative to the y axis. Moves into a wall or
    /// the border leave the ball exactly where it was.
    pub fn on_tilt(&mut self, dx: f32, dy: f32) -> MovementOutcome {
        let candidate = Vec2::new(
            self.ball.pos.x - dx * self.sensitivity,
            self.ball.pos.y + dy * self.sensitivity,
        );
        if !can_move_to(&self.grid, candidate, self.tile_size) {
            return MovementOutcome::None;
        }
        self.ball.pos = candidate;

        match cell_at(&self.grid, self.ball.pos, self.tile_size) {
            Some(Cell::Goal) => MovementOutcome::EnteredGoal,
            Some(Cell::Hole) => MovementOutcome::EnteredHole,
            _ => MovementOutcome::None,
        }
    }

    pub fn ball(&self) -> Ball {
        self.ball
    }

    pub fn grid(&self) -> &Arc<MazeGrid> {
        &self.grid
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Cell currently under the ball centre
    pub fn current_cell(&self) -> Option<Cell> {
        cell_at(&self.grid, self.ball.pos, self.tile_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // 6x4 grid in a 60x40 viewport: 10px tiles
    const LAYOUT: &str = "
        #######
        #S.G..#
        #.###O#
        #.....#
        #######
    ";

    fn controller() -> BallController {
        let grid = Arc::new(MazeGrid::from_ascii(LAYOUT).unwrap());
        BallController::new(grid, Viewport { width: 60, height: 40 })
    }

    #[test]
    fn test_starts_centred_on_spawn() {
        let c = controller();
        assert_eq!(c.tile_size(), 10.0);
        assert_eq!(c.ball().pos, Vec2::new(15.0, 15.0));
        assert!((c.ball().radius - 10.0 / 3.0).abs() < 1e-6);
        assert_eq!(c.current_cell(), Some(Cell::Spawn));
    }

    #[test]
    fn test_tilt_axes() {
        let mut c = controller();
        // Negative dx moves right
        assert_eq!(c.on_tilt(-1.0, 0.0), MovementOutcome::None);
        assert_eq!(c.ball().pos, Vec2::new(20.0, 15.0));
        // Positive dy moves down
        let mut c = controller();
        assert_eq!(c.on_tilt(0.0, 1.0), MovementOutcome::None);
        assert_eq!(c.ball().pos, Vec2::new(15.0, 20.0));
    }

    #[test]
    fn test_border_rejects_without_moving() {
        let mut c = controller();
        // Left of spawn is column 0
        assert_eq!(c.on_tilt(1.5, 0.0), MovementOutcome::None);
        assert_eq!(c.ball().pos, Vec2::new(15.0, 15.0));
        // Above spawn is row 0
        assert_eq!(c.on_tilt(0.0, -1.5), MovementOutcome::None);
        assert_eq!(c.ball().pos, Vec2::new(15.0, 15.0));
    }

    #[test]
    fn test_wall_rejects_without_moving() {
        let mut c = controller();
        c.on_tilt(0.0, 2.0); // down to (15, 25), still in column 1
        assert_eq!(c.ball().pos, Vec2::new(15.0, 25.0));
        c.on_tilt(-2.0, 0.0); // (25, 25) is wall
        assert_eq!(c.ball().pos, Vec2::new(15.0, 25.0));
    }

    #[test]
    fn test_large_tilt_can_skip_cells() {
        let mut c = controller();
        // One 20px step lands straight on the goal
        assert_eq!(c.on_tilt(-4.0, 0.0), MovementOutcome::EnteredGoal);
        assert_eq!(c.ball().pos, Vec2::new(35.0, 15.0));
    }

    #[test]
    fn test_hole_reported() {
        let mut c = controller();
        for _ in 0..2 {
            c.on_tilt(0.0, 2.0);
        }
        assert_eq!(c.current_cell(), Some(Cell::Path)); // (15, 35)
        for _ in 0..4 {
            assert_eq!(c.on_tilt(-2.0, 0.0), MovementOutcome::None);
        }
        assert_eq!(c.ball().pos, Vec2::new(55.0, 35.0));
        assert_eq!(c.on_tilt(0.0, -2.0), MovementOutcome::EnteredHole);
    }

    #[test]
    fn test_non_finite_tilt_rejected() {
        let mut c = controller();
        assert_eq!(c.on_tilt(f32::NAN, 0.0), MovementOutcome::None);
        assert_eq!(c.ball().pos, Vec2::new(15.0, 15.0));
    }

    #[test]
    fn test_load_resets_to_new_spawn() {
        let mut c = controller();
        c.on_tilt(-1.0, 0.0);
        let next = Arc::new(
            MazeGrid::from_ascii(
                "
                #####
                #..G#
                #.S.#
                #####
                ",
            )
            .unwrap(),
        );
        c.load(next);
        // 4x3 grid in 60x40: min(15, 13) = 13px tiles
        assert_eq!(c.tile_size(), 13.0);
        assert_eq!(c.ball().pos, Vec2::new(2.0 * 13.0 + 6.5, 2.0 * 13.0 + 6.5));
        assert_eq!(c.current_cell(), Some(Cell::Spawn));
    }

    #[test]
    fn test_tile_size_never_zero() {
        let grid = MazeGrid::from_ascii(LAYOUT).unwrap();
        assert_eq!(tile_size_for(&grid, Viewport { width: 3, height: 3 }), 1.0);
    }

    proptest! {
        #[test]
        fn prop_blocked_moves_leave_ball_in_place(
            steps in proptest::collection::vec((-3.0f32..3.0, -3.0f32..3.0), 1..40),
        ) {
            let mut c = controller();
            for (dx, dy) in steps {
                let before = c.ball().pos;
                let candidate = Vec2::new(before.x - dx * TILT_SENSITIVITY, before.y + dy * TILT_SENSITIVITY);
                let allowed = can_move_to(c.grid(), candidate, c.tile_size());
                let outcome = c.on_tilt(dx, dy);
                if allowed {
                    prop_assert_eq!(c.ball().pos, candidate);
                } else {
                    prop_assert_eq!(c.ball().pos, before);
                    prop_assert_eq!(outcome, MovementOutcome::None);
                }
                prop_assert!(c.current_cell().is_some_and(Cell::is_passable));
            }
        }
    }
}
