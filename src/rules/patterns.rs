//! Seed patterns and the initial grid builder.

use crate::config::SeedMode;
use crate::error::{LifeError, Result};
use crate::grid::{Cell, Grid};
use rand::Rng;

/// Fixed world used by glider-gun runs: 120 columns by 90 rows.
pub const GLIDER_WORLD_WIDTH: usize = 120;
pub const GLIDER_WORLD_HEIGHT: usize = 90;

/// Top-left corner `(row, col)` at which glider-gun templates are placed.
pub const GLIDER_GUN_OFFSET: (usize, usize) = (3, 3);

/// An immutable rectangular pattern. Rows use `O` for live and `.` for dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternTemplate {
    pub name: &'static str,
    rows: &'static [&'static [u8]],
}

impl PatternTemplate {
    pub const fn new(name: &'static str, rows: &'static [&'static [u8]]) -> Self {
        Self { name, rows }
    }

    /// `(rows, cols)` of the bounding box. `cols` is the longest row.
    pub fn dimensions(&self) -> (usize, usize) {
        let cols = self.rows.iter().map(|row| row.len()).max().unwrap_or(0);
        (self.rows.len(), cols)
    }

    /// Every cell of the template as `(row, col, value)`, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, line)| {
            line.iter()
                .enumerate()
                .map(move |(col, &byte)| (row, col, Cell::from(byte == b'O')))
        })
    }

    pub fn live_count(&self) -> usize {
        self.cells().filter(|(_, _, cell)| cell.is_alive()).count()
    }
}

/// Gosper's glider gun, 9x39.
pub const SINGLE_GLIDER_GUN: PatternTemplate = PatternTemplate::new(
    "Gosper glider gun",
    &[
        b"........................O..............",
        b"......................O.O..............",
        b"............OO......OO............OO...",
        b"...........O...O....OO............OO...",
        b"OO........O.....O...OO.................",
        b"OO........O...O.OO....O.O..............",
        b"..........O.....O.......O..............",
        b"...........O...O.......................",
        b"............OO.........................",
    ],
);

/// Two Gosper guns facing each other, 9x80.
pub const DOUBLE_GLIDER_GUN: PatternTemplate = PatternTemplate::new(
    "Double Gosper glider gun",
    &[
        b"........................O..............................O........................",
        b"......................O.O..............................O.O......................",
        b"............OO......OO............OO........OO............OO......OO............",
        b"...........O...O....OO............OO........OO............OO....O...O...........",
        b"OO........O.....O...OO....................................OO...O.....O........OO",
        b"OO........O...O.OO....O.O..............................O.O....OO.O...O........OO",
        b"..........O.....O.......O..............................O.......O.....O..........",
        b"...........O...O................................................O...O...........",
        b"............OO....................................................OO............",
    ],
);

/// Template for a glider-gun run with `count` guns.
pub fn glider_gun(count: u8) -> Result<&'static PatternTemplate> {
    match count {
        1 => Ok(&SINGLE_GLIDER_GUN),
        2 => Ok(&DOUBLE_GLIDER_GUN),
        other => Err(LifeError::InvalidGliderCount(other)),
    }
}

/// Build the initial grid for `mode` using the thread-local RNG.
pub fn seed(mode: &SeedMode) -> Result<Grid> {
    seed_with(mode, &mut rand::rng())
}

/// Build the initial grid for `mode`, drawing randomness from `rng`.
///
/// Random seeding makes one independent Bernoulli draw per cell, row-major.
pub fn seed_with<R: Rng + ?Sized>(mode: &SeedMode, rng: &mut R) -> Result<Grid> {
    let grid = match *mode {
        SeedMode::Random {
            width,
            height,
            probability,
        } => {
            if !(0.0..=1.0).contains(&probability) {
                return Err(LifeError::InvalidProbability(probability));
            }
            let mut grid = Grid::new(width, height)?;
            for row in 0..height {
                for col in 0..width {
                    grid.set(row, col, Cell::from(rng.random_bool(probability)))?;
                }
            }
            grid
        }
        SeedMode::GliderGun { count } => {
            let template = glider_gun(count)?;
            let mut grid = Grid::new(GLIDER_WORLD_WIDTH, GLIDER_WORLD_HEIGHT)?;
            let (row, col) = GLIDER_GUN_OFFSET;
            grid.set_block(row, col, template)?;
            grid
        }
    };

    log::info!(
        "Seeded {}x{} grid ({}) with {} live cells",
        grid.width(),
        grid.height(),
        mode,
        grid.live_count()
    );
    Ok(grid)
}
