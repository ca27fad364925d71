//! Collision detection between a continuous position and the maze grid
//!
//! Positions are mapped to cells by flooring `pos / tile_size` on each axis.
//! The ball is treated as a point: only its centre decides the cell.

use glam::{IVec2, Vec2};

use super::grid::{Cell, MazeGrid};

/// Grid cell containing `pos`, or `None` for non-finite positions
pub fn grid_cell_for(pos: Vec2, tile_size: f32) -> Option<IVec2> {
    let scaled = pos / tile_size;
    if !scaled.is_finite() {
        return None;
    }
    // `as` saturates, so huge positions land far outside any grid
    let cell = scaled.floor();
    Some(IVec2::new(cell.x as i32, cell.y as i32))
}

/// Cell under `pos`, if it lies on the grid at all
pub fn cell_at(grid: &MazeGrid, pos: Vec2, tile_size: f32) -> Option<Cell> {
    let cell = grid_cell_for(pos, tile_size)?;
    if cell.x < 0 || cell.y < 0 {
        return None;
    }
    grid.get(cell.x as u32, cell.y as u32)
}

/// Whether the ball may occupy `pos`.
///
/// The border ring is impassable even though it is padding, and walls
/// block the move outright.
pub fn can_move_to(grid: &MazeGrid, pos: Vec2, tile_size: f32) -> bool {
    let Some(cell) = grid_cell_for(pos, tile_size) else {
        return false;
    };
    if cell.x < 1 || cell.y < 1 {
        return false;
    }
    let (x, y) = (cell.x as u32, cell.y as u32);
    grid.is_interior(x, y) && grid.get(x, y).is_some_and(Cell::is_passable)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> MazeGrid {
        MazeGrid::from_ascii(
            "
            ######
            #S.#.#
            #..#G#
            ######
            ",
        )
        .unwrap()
    }

    #[test]
    fn test_grid_cell_floors() {
        assert_eq!(grid_cell_for(Vec2::new(15.0, 29.9), 10.0), Some(IVec2::new(1, 2)));
        assert_eq!(grid_cell_for(Vec2::new(-0.5, 3.0), 10.0), Some(IVec2::new(-1, 0)));
        assert_eq!(grid_cell_for(Vec2::new(f32::NAN, 3.0), 10.0), None);
        assert_eq!(grid_cell_for(Vec2::new(f32::INFINITY, 3.0), 10.0), None);
    }

    #[test]
    fn test_can_move_to_path_and_markers() {
        let grid = grid();
        assert!(can_move_to(&grid, Vec2::new(15.0, 15.0), 10.0)); // Spawn
        assert!(can_move_to(&grid, Vec2::new(25.0, 25.0), 10.0)); // Path
        assert!(can_move_to(&grid, Vec2::new(45.0, 25.0), 10.0)); // Goal
    }

    #[test]
    fn test_walls_block() {
        let grid = grid();
        assert!(!can_move_to(&grid, Vec2::new(35.0, 15.0), 10.0));
    }

    #[test]
    fn test_border_blocks() {
        let grid = grid();
        assert!(!can_move_to(&grid, Vec2::new(5.0, 15.0), 10.0)); // Column 0
        assert!(!can_move_to(&grid, Vec2::new(15.0, 5.0), 10.0)); // Row 0
        assert!(!can_move_to(&grid, Vec2::new(55.0, 15.0), 10.0)); // Last column
        assert!(!can_move_to(&grid, Vec2::new(15.0, 35.0), 10.0)); // Last row
        assert!(!can_move_to(&grid, Vec2::new(-15.0, 15.0), 10.0));
        assert!(!can_move_to(&grid, Vec2::new(500.0, 15.0), 10.0));
    }

    #[test]
    fn test_cell_at() {
        let grid = grid();
        assert_eq!(cell_at(&grid, Vec2::new(45.0, 25.0), 10.0), Some(Cell::Goal));
        assert_eq!(cell_at(&grid, Vec2::new(-1.0, 25.0), 10.0), None);
    }
}
