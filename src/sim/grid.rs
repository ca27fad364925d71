//! Maze grid and cell classification
//!
//! A grid of `width` x `height` playable units is stored as
//! `(height + 1) x (width + 1)` cells. Row 0, row `height`, column 0 and
//! column `width` are border padding and always `Wall`.

use std::fmt;

use glam::UVec2;
use serde::{Deserialize, Serialize};

/// What occupies a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Wall,
    Path,
    /// Ball falls in and the level restarts
    Hole,
    Spawn,
    Goal,
}

impl Cell {
    /// Every cell except `Wall` can hold the ball
    #[inline]
    pub fn is_passable(self) -> bool {
        self != Cell::Wall
    }

    pub fn glyph(self) -> char {
        match self {
            Cell::Wall => '#',
            Cell::Path => '.',
            Cell::Hole => 'O',
            Cell::Spawn => 'S',
            Cell::Goal => 'G',
        }
    }

    pub fn from_glyph(c: char) -> Option<Self> {
        match c {
            '#' => Some(Cell::Wall),
            '.' => Some(Cell::Path),
            'O' => Some(Cell::Hole),
            'S' => Some(Cell::Spawn),
            'G' => Some(Cell::Goal),
            _ => None,
        }
    }
}

/// Requested maze size and hole count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeParams {
    pub width: u32,
    pub height: u32,
    pub holes: u32,
}

impl MazeParams {
    pub const fn new(width: u32, height: u32, holes: u32) -> Self {
        Self {
            width,
            height,
            holes,
        }
    }
}

/// Reasons a hand-written grid layout is refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("grid layout is empty")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown cell glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },
    #[error("border cell at ({x}, {y}) is not a wall")]
    OpenBorder { x: usize, y: usize },
    #[error("expected exactly one {cell:?}, found {count}")]
    MarkerCount { cell: Cell, count: usize },
}

/// A generated maze. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeGrid {
    params: MazeParams,
    width: u32,
    height: u32,
    /// Row-major, `(height + 1) * (width + 1)` cells
    cells: Vec<Cell>,
    spawn: UVec2,
    goal: UVec2,
}

impl MazeGrid {
    /// Assemble a grid from generator output
    pub(crate) fn from_parts(
        params: MazeParams,
        width: u32,
        height: u32,
        cells: Vec<Cell>,
        spawn: UVec2,
        goal: UVec2,
    ) -> Self {
        debug_assert_eq!(cells.len(), ((width + 1) * (height + 1)) as usize);
        Self {
            params,
            width,
            height,
            cells,
            spawn,
            goal,
        }
    }

    /// Parse a layout drawn with `Cell::glyph` characters, one row per line.
    ///
    /// The outermost ring must be walls and exactly one spawn and one goal
    /// must be present. Used for fixed levels and tests.
    pub fn from_ascii(layout: &str) -> Result<Self, GridError> {
        let rows: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let cols = rows.first().map(|r| r.chars().count()).ok_or(GridError::Empty)?;
        if rows.len() < 2 || cols < 2 {
            return Err(GridError::Empty);
        }

        let mut cells = Vec::with_capacity(rows.len() * cols);
        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != cols {
                return Err(GridError::Ragged {
                    row: y,
                    expected: cols,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let cell = Cell::from_glyph(glyph).ok_or(GridError::UnknownGlyph { glyph, x, y })?;
                let border = x == 0 || y == 0 || x == cols - 1 || y == rows.len() - 1;
                if border && cell != Cell::Wall {
                    return Err(GridError::OpenBorder { x, y });
                }
                cells.push(cell);
            }
        }

        let width = (cols - 1) as u32;
        let height = (rows.len() - 1) as u32;
        let locate = |marker: Cell| -> Result<UVec2, GridError> {
            let found: Vec<usize> = cells
                .iter()
                .enumerate()
                .filter(|(_, c)| **c == marker)
                .map(|(i, _)| i)
                .collect();
            match found.as_slice() {
                [i] => Ok(UVec2::new((*i % cols) as u32, (*i / cols) as u32)),
                _ => Err(GridError::MarkerCount {
                    cell: marker,
                    count: found.len(),
                }),
            }
        };
        let spawn = locate(Cell::Spawn)?;
        let goal = locate(Cell::Goal)?;
        let holes = cells.iter().filter(|c| **c == Cell::Hole).count() as u32;

        Ok(Self {
            params: MazeParams::new(width, height, holes),
            width,
            height,
            cells,
            spawn,
            goal,
        })
    }

    /// The parameters this grid was requested with (before normalization)
    pub fn params(&self) -> MazeParams {
        self.params
    }

    /// Playable width (even), excluding the far border column
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Playable height (even), excluding the far border row
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of cell columns, border included
    pub fn columns(&self) -> u32 {
        self.width + 1
    }

    /// Number of cell rows, border included
    pub fn rows(&self) -> u32 {
        self.height + 1
    }

    pub fn spawn(&self) -> UVec2 {
        self.spawn
    }

    pub fn goal(&self) -> UVec2 {
        self.goal
    }

    /// Cell at `(x, y)`, or `None` outside the grid
    pub fn get(&self, x: u32, y: u32) -> Option<Cell> {
        if x > self.width || y > self.height {
            return None;
        }
        self.cells.get(self.index(x, y)).copied()
    }

    /// True for row/column 0 and the last row/column
    pub fn is_border(&self, x: u32, y: u32) -> bool {
        x == 0 || y == 0 || x == self.width || y == self.height
    }

    /// True for cells strictly inside the border
    pub fn is_interior(&self, x: u32, y: u32) -> bool {
        x >= 1 && y >= 1 && x < self.width && y < self.height
    }

    /// Holes actually placed (may be fewer than requested)
    pub fn hole_count(&self) -> usize {
        self.count(Cell::Hole)
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|c| **c == cell).count()
    }

    /// Rows of cells, top to bottom, border included
    pub fn row_slices(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.columns() as usize)
    }

    /// All `(position, cell)` pairs in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (UVec2, Cell)> + '_ {
        let cols = self.columns();
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, c)| (UVec2::new(i as u32 % cols, i as u32 / cols), *c))
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y * self.columns() + x) as usize
    }
}

impl fmt::Display for MazeGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.row_slices().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for cell in row {
                write!(f, "{}", cell.glyph())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "
        #######
        #S..O.#
        #.##..#
        #...G.#
        #######
    ";

    #[test]
    fn test_from_ascii_dimensions() {
        let grid = MazeGrid::from_ascii(SMALL).unwrap();
        assert_eq!(grid.width(), 6);
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.spawn(), UVec2::new(1, 1));
        assert_eq!(grid.goal(), UVec2::new(4, 3));
        assert_eq!(grid.hole_count(), 1);
        assert_eq!(grid.get(4, 1), Some(Cell::Hole));
        assert_eq!(grid.get(7, 0), None);
    }

    #[test]
    fn test_display_round_trips_layout() {
        let grid = MazeGrid::from_ascii(SMALL).unwrap();
        let again = MazeGrid::from_ascii(&grid.to_string()).unwrap();
        assert_eq!(grid, again);
    }

    #[test]
    fn test_border_and_interior() {
        let grid = MazeGrid::from_ascii(SMALL).unwrap();
        assert!(grid.is_border(0, 2));
        assert!(grid.is_border(6, 2));
        assert!(grid.is_border(3, 4));
        assert!(!grid.is_border(3, 2));
        assert!(grid.is_interior(5, 3));
        assert!(!grid.is_interior(6, 3));
    }

    #[test]
    fn test_from_ascii_rejects_open_border() {
        let err = MazeGrid::from_ascii("####\n.SG#\n####").unwrap_err();
        assert_eq!(err, GridError::OpenBorder { x: 0, y: 1 });
    }

    #[test]
    fn test_from_ascii_requires_single_goal() {
        let err = MazeGrid::from_ascii("#####\n#S..#\n#####").unwrap_err();
        assert_eq!(
            err,
            GridError::MarkerCount {
                cell: Cell::Goal,
                count: 0
            }
        );
    }

    #[test]
    fn test_from_ascii_rejects_ragged_rows() {
        let err = MazeGrid::from_ascii("#####\n#SG#\n#####").unwrap_err();
        assert!(matches!(err, GridError::Ragged { row: 1, .. }));
    }
}
