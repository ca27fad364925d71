//! Procedural maze generation
//!
//! Randomized depth-first backtracking over a lattice of step 4, carving
//! 2x2 blocks so corridors and the walls between them are both two cells
//! wide. The carved cells form a spanning tree, so every passable cell is
//! reachable from every other one. Holes, the spawn and the goal are then
//! dropped onto corridor cells with bounded retries.

use glam::UVec2;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::grid::{Cell, MazeGrid, MazeParams};
use crate::consts::{MIN_DIMENSION, PLACEMENT_ATTEMPTS};

/// Distance between lattice points
const LATTICE_STEP: i64 = 4;

/// First lattice point, just inside the border
const LATTICE_ORIGIN: (i64, i64) = (1, 1);

const DIRECTIONS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Owns the random source used for every maze of a session
#[derive(Debug, Clone)]
pub struct MazeGenerator {
    rng: Pcg32,
}

impl MazeGenerator {
    pub fn new(seed: u64) -> Self {
        Self::from_rng(Pcg32::seed_from_u64(seed))
    }

    pub fn from_rng(rng: Pcg32) -> Self {
        Self { rng }
    }

    /// Build a brand-new maze. Nothing is reused from earlier grids.
    pub fn generate(&mut self, params: MazeParams) -> MazeGrid {
        generate_maze(&mut self.rng, params)
    }
}

/// Generate a maze from any random source.
///
/// Hole placement is best-effort: the result may hold fewer holes than
/// `params.holes` on small or crowded grids.
pub fn generate_maze<R: Rng + ?Sized>(rng: &mut R, params: MazeParams) -> MazeGrid {
    let width = normalize_dimension(params.width);
    let height = normalize_dimension(params.height);
    if params.width < MIN_DIMENSION || params.height < MIN_DIMENSION {
        log::warn!(
            "Maze {}x{} below minimum, using {}x{}",
            params.width,
            params.height,
            width,
            height
        );
    }

    let mut canvas = Canvas::new(width, height);
    carve_paths(&mut canvas, rng);

    let placed = place_holes(&mut canvas, rng, params.holes);
    if placed < params.holes {
        log::debug!("Placed {} of {} holes", placed, params.holes);
    }

    let spawn = place_marker(&mut canvas, rng, Cell::Spawn);
    let goal = place_marker(&mut canvas, rng, Cell::Goal);

    log::debug!(
        "Generated {}x{} maze, {} holes, spawn {:?}, goal {:?}",
        width,
        height,
        placed,
        spawn,
        goal
    );

    MazeGrid::from_parts(params, width, height, canvas.cells, spawn, goal)
}

/// Raise to the minimum, then round odd values up to even
fn normalize_dimension(d: u32) -> u32 {
    let d = d.max(MIN_DIMENSION);
    if d % 2 == 1 { d + 1 } else { d }
}

/// Mutable grid used while a maze is being built
struct Canvas {
    width: i64,
    height: i64,
    cells: Vec<Cell>,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        let len = (width as usize + 1) * (height as usize + 1);
        Self {
            width: width as i64,
            height: height as i64,
            cells: vec![Cell::Wall; len],
        }
    }

    fn is_interior(&self, x: i64, y: i64) -> bool {
        x >= 1 && y >= 1 && x < self.width && y < self.height
    }

    /// A 2x2 block anchored at `(x, y)` lies fully inside the border
    fn block_fits(&self, x: i64, y: i64) -> bool {
        self.is_interior(x, y) && self.is_interior(x + 1, y + 1)
    }

    fn get(&self, x: i64, y: i64) -> Option<Cell> {
        if x < 0 || y < 0 || x > self.width || y > self.height {
            return None;
        }
        self.cells.get((y * (self.width + 1) + x) as usize).copied()
    }

    fn set(&mut self, x: i64, y: i64, cell: Cell) {
        if self.is_interior(x, y) {
            let i = (y * (self.width + 1) + x) as usize;
            self.cells[i] = cell;
        }
    }

    fn carve_block(&mut self, x: i64, y: i64) {
        for dy in 0..2 {
            for dx in 0..2 {
                self.set(x + dx, y + dy, Cell::Path);
            }
        }
    }

    /// Any hole in the 8-neighbourhood (or on the cell itself)
    fn hole_nearby(&self, x: i64, y: i64) -> bool {
        (-1..=1).any(|dy| (-1..=1).any(|dx| self.get(x + dx, y + dy) == Some(Cell::Hole)))
    }

    /// Uniform interior coordinate
    fn random_interior<R: Rng + ?Sized>(&self, rng: &mut R) -> (i64, i64) {
        (
            rng.random_range(1..self.width),
            rng.random_range(1..self.height),
        )
    }

    fn positions_of(&self, cell: Cell) -> Vec<(i64, i64)> {
        let cols = self.width + 1;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == cell)
            .map(|(i, _)| (i as i64 % cols, i as i64 / cols))
            .collect()
    }
}

/// One level of the backtracking walk: a lattice point and the directions
/// still to try from it
struct Frame {
    x: i64,
    y: i64,
    directions: [(i64, i64); 4],
    next: usize,
}

impl Frame {
    /// Carve the block at `(x, y)` and pick a random visiting order
    fn enter<R: Rng + ?Sized>(canvas: &mut Canvas, rng: &mut R, x: i64, y: i64) -> Self {
        canvas.carve_block(x, y);
        let mut directions = DIRECTIONS;
        directions.shuffle(rng);
        Self {
            x,
            y,
            directions,
            next: 0,
        }
    }

    fn next_direction(&mut self) -> Option<(i64, i64)> {
        let dir = self.directions.get(self.next).copied();
        self.next += 1;
        dir
    }
}

/// Depth-first carve from the lattice origin. An explicit stack visits
/// points in the same order a recursive walk would.
fn carve_paths<R: Rng + ?Sized>(canvas: &mut Canvas, rng: &mut R) {
    let (ox, oy) = LATTICE_ORIGIN;
    if !canvas.block_fits(ox, oy) {
        return;
    }

    let mut stack = vec![Frame::enter(canvas, rng, ox, oy)];
    while let Some(frame) = stack.last_mut() {
        let Some((dx, dy)) = frame.next_direction() else {
            stack.pop();
            continue;
        };
        let (x, y) = (frame.x, frame.y);
        let (nx, ny) = (x + dx * LATTICE_STEP, y + dy * LATTICE_STEP);

        if canvas.block_fits(nx, ny) && canvas.get(nx, ny) == Some(Cell::Wall) {
            // Quarter and half points close the 4-cell gap with 2-wide path
            canvas.carve_block(x + dx * LATTICE_STEP / 4, y + dy * LATTICE_STEP / 4);
            canvas.carve_block(x + dx * LATTICE_STEP / 2, y + dy * LATTICE_STEP / 2);
            let child = Frame::enter(canvas, rng, nx, ny);
            stack.push(child);
        }
    }
}

/// Returns how many holes were actually placed
fn place_holes<R: Rng + ?Sized>(canvas: &mut Canvas, rng: &mut R, count: u32) -> u32 {
    let mut placed = 0;
    for _ in 0..count {
        let spot = (0..PLACEMENT_ATTEMPTS).find_map(|_| {
            let (x, y) = canvas.random_interior(rng);
            (canvas.get(x, y) == Some(Cell::Path) && !canvas.hole_nearby(x, y)).then_some((x, y))
        });
        if let Some((x, y)) = spot {
            canvas.set(x, y, Cell::Hole);
            placed += 1;
        }
    }
    placed
}

/// Turn one corridor cell into `marker`.
///
/// Sampling is bounded; once the budget runs out a cell is drawn from the
/// remaining corridor cells directly.
fn place_marker<R: Rng + ?Sized>(canvas: &mut Canvas, rng: &mut R, marker: Cell) -> UVec2 {
    let sampled = (0..PLACEMENT_ATTEMPTS).find_map(|_| {
        let (x, y) = canvas.random_interior(rng);
        (canvas.get(x, y) == Some(Cell::Path)).then_some((x, y))
    });
    // The origin block keeps at least three corridor cells after hole
    // placement (holes are never adjacent), so the fallback always finds one.
    let (x, y) = sampled
        .or_else(|| canvas.positions_of(Cell::Path).choose(rng).copied())
        .unwrap_or(LATTICE_ORIGIN);
    canvas.set(x, y, marker);
    UVec2::new(x as u32, y as u32)
}
