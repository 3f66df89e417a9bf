//! Update engine for Conway's Game of Life.
//!
//! `advance` turns one generation into the next and reports exactly which
//! cells changed, so a renderer only has to redraw the deltas.

pub mod patterns;

use crate::grid::{Cell, Grid};
use rayon::prelude::*;

/// Game of Life standard rules (B3/S23):
/// 1. Any live cell with fewer than two live neighbors dies (underpopulation)
/// 2. Any live cell with two or three live neighbors lives (survival)
/// 3. Any live cell with more than three live neighbors dies (overpopulation)
/// 4. Any dead cell with exactly three live neighbors becomes alive (reproduction)
pub fn next_cell_state(cell: Cell, neighbors: u8) -> Cell {
    match (cell, neighbors) {
        (Cell::Alive, n) if !(2..=3).contains(&n) => Cell::Dead,
        (Cell::Alive, _) => Cell::Alive,
        (Cell::Dead, 3) => Cell::Alive,
        _ => Cell::Dead,
    }
}

/// Count the live neighbors of `(row, col)`.
///
/// With `wrap` the grid is a torus and offsets are taken modulo the
/// dimensions. Without it the grid behaves as if surrounded by a one-cell
/// border of dead cells.
pub fn count_neighbors(grid: &Grid, row: usize, col: usize, wrap: bool) -> u8 {
    let width = grid.width();
    let height = grid.height();
    let cells = grid.cells();
    let mut count = 0;

    for dy in 0..3 {
        for dx in 0..3 {
            // Skip the cell itself
            if dx == 1 && dy == 1 {
                continue;
            }

            let (ny, nx) = if wrap {
                ((row + height + dy - 1) % height, (col + width + dx - 1) % width)
            } else {
                // Offsets that leave the grid land on the dead border.
                match ((row + dy).checked_sub(1), (col + dx).checked_sub(1)) {
                    (Some(ny), Some(nx)) if ny < height && nx < width => (ny, nx),
                    _ => continue,
                }
            };

            count += cells[ny * width + nx].value();
        }
    }

    count
}

/// One cell whose value differs between two consecutive generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub row: usize,
    pub col: usize,
    pub value: Cell,
}

/// Every cell that changed in one step, in row-major order. Cells not listed
/// are guaranteed unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    /// Diff two grids of identical dimensions.
    pub(crate) fn between(before: &Grid, after: &Grid) -> Self {
        debug_assert_eq!(
            (before.width(), before.height()),
            (after.width(), after.height())
        );
        let width = after.width();
        let changes = before
            .cells()
            .iter()
            .zip(after.cells())
            .enumerate()
            .filter(|(_, (old, new))| old != new)
            .map(|(idx, (_, &value))| Change {
                row: idx / width,
                col: idx % width,
                value,
            })
            .collect();
        Self { changes }
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    /// Pixel origins of the changed cells for a renderer drawing square
    /// cells of `cell_size` pixels: `(x, y, value)` with `x` from the column.
    ///
    /// Coordinates past `u32::MAX` saturate.
    pub fn scaled(&self, cell_size: u32) -> impl Iterator<Item = (u32, u32, Cell)> + '_ {
        let to_pixels =
            move |index: usize| u32::try_from(index).unwrap_or(u32::MAX).saturating_mul(cell_size);
        self.changes
            .iter()
            .map(move |change| (to_pixels(change.col), to_pixels(change.row), change.value))
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

/// Compute the next generation of `grid` and the cells that changed.
///
/// All neighbor counts read the current generation only; the next one is
/// written into a separate buffer, row by row in parallel.
pub fn advance(grid: &Grid, wrap: bool) -> (Grid, ChangeSet) {
    let width = grid.width();
    let height = grid.height();
    let current = grid.cells();
    let mut next = vec![Cell::Dead; width * height];

    next.par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, out_row)| {
            for (col, out) in out_row.iter_mut().enumerate() {
                let neighbors = count_neighbors(grid, row, col, wrap);
                *out = next_cell_state(current[row * width + col], neighbors);
            }
        });

    let next = Grid::from_cells(width, height, next);
    let changes = ChangeSet::between(grid, &next);
    (next, changes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with(width: usize, height: usize, alive: &[(usize, usize)]) -> Grid {
        let mut grid = Grid::new(width, height).unwrap();
        for &(row, col) in alive {
            grid.set(row, col, Cell::Alive).unwrap();
        }
        grid
    }

    fn alive_cells(grid: &Grid) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for row in 0..grid.height() {
            for col in 0..grid.width() {
                if grid.get(row, col).unwrap().is_alive() {
                    out.push((row, col));
                }
            }
        }
        out
    }

    #[test]
    fn every_neighborhood_matches_conway_truth_table() {
        for wrap in [false, true] {
            for bits in 0u16..512 {
                let mut grid = Grid::new(3, 3).unwrap();
                for i in 0..9 {
                    if bits & (1 << i) != 0 {
                        grid.set(i / 3, i % 3, Cell::Alive).unwrap();
                    }
                }
                let center_alive = bits & (1 << 4) != 0;
                let neighbors = (bits & !(1 << 4)).count_ones();
                let expected = if center_alive {
                    neighbors == 2 || neighbors == 3
                } else {
                    neighbors == 3
                };

                let (next, _) = advance(&grid, wrap);
                assert_eq!(
                    next.get(1, 1).unwrap().is_alive(),
                    expected,
                    "pattern {bits:#011b}, wrap {wrap}"
                );
            }
        }
    }

    #[test]
    fn rule_precedence() {
        for n in 0..=8u8 {
            let survives = next_cell_state(Cell::Alive, n);
            let born = next_cell_state(Cell::Dead, n);
            assert_eq!(survives.is_alive(), n == 2 || n == 3, "alive with {n}");
            assert_eq!(born.is_alive(), n == 3, "dead with {n}");
        }
    }

    #[test]
    fn wrap_reaches_opposite_corners() {
        let grid = grid_with(6, 5, &[(0, 0)]);
        let (h, w) = (grid.height(), grid.width());
        for (row, col) in [(h - 1, w - 1), (h - 1, 0), (0, w - 1)] {
            assert_eq!(count_neighbors(&grid, row, col, true), 1, "({row}, {col}) wrapped");
            assert_eq!(count_neighbors(&grid, row, col, false), 0, "({row}, {col}) padded");
        }
        assert_eq!(count_neighbors(&grid, 1, 1, false), 1);
    }

    #[test]
    fn empty_grid_stays_empty() {
        let mut grid = Grid::new(3, 3).unwrap();
        for wrap in [false, true] {
            for _ in 0..5 {
                let (next, changes) = advance(&grid, wrap);
                assert!(changes.is_empty());
                assert_eq!(next.live_count(), 0);
                grid = next;
            }
        }
    }

    #[test]
    fn block_is_a_still_life() {
        let grid = grid_with(4, 4, &[(1, 1), (1, 2), (2, 1), (2, 2)]);
        for wrap in [false, true] {
            let (next, changes) = advance(&grid, wrap);
            assert!(changes.is_empty(), "wrap {wrap}");
            assert_eq!(next, grid);
        }
    }

    #[test]
    fn blinker_oscillates_with_period_two() {
        let horizontal = grid_with(5, 5, &[(2, 1), (2, 2), (2, 3)]);

        let (vertical, changes) = advance(&horizontal, false);
        assert_eq!(alive_cells(&vertical), vec![(1, 2), (2, 2), (3, 2)]);
        let changed: Vec<(usize, usize, Cell)> =
            changes.iter().map(|c| (c.row, c.col, c.value)).collect();
        assert_eq!(
            changed,
            vec![
                (1, 2, Cell::Alive),
                (2, 1, Cell::Dead),
                (2, 3, Cell::Dead),
                (3, 2, Cell::Alive),
            ]
        );

        let (back, _) = advance(&vertical, false);
        assert_eq!(back, horizontal);
    }

    #[test]
    fn edges_do_not_wrap_without_wrap_mode() {
        // A vertical blinker on the left edge: with wrap, the far column
        // gains a cell; padded, it does not.
        let grid = grid_with(5, 5, &[(1, 0), (2, 0), (3, 0)]);

        let (padded, _) = advance(&grid, false);
        assert_eq!(alive_cells(&padded), vec![(2, 0), (2, 1)]);

        let (wrapped, _) = advance(&grid, true);
        assert_eq!(alive_cells(&wrapped), vec![(2, 0), (2, 1), (2, 4)]);
    }

    #[test]
    fn scaled_changes_use_column_for_x() {
        let grid = grid_with(5, 5, &[(2, 1), (2, 2), (2, 3)]);
        let (_, changes) = advance(&grid, false);
        let scaled: Vec<(u32, u32, Cell)> = changes.scaled(8).collect();
        assert_eq!(scaled[0], (16, 8, Cell::Alive));
        assert_eq!(scaled.len(), changes.len());
    }

    #[test]
    fn scaled_changes_saturate_instead_of_wrapping() {
        let grid = grid_with(5, 5, &[(2, 1), (2, 2), (2, 3)]);
        let (_, changes) = advance(&grid, false);
        let half = u32::MAX / 2;
        let scaled: Vec<(u32, u32, Cell)> = changes.scaled(half).collect();
        // (1, 2) fits, (3, 2) overflows on the row.
        assert_eq!(scaled[0], (2 * half, half, Cell::Alive));
        assert_eq!(scaled[3], (2 * half, u32::MAX, Cell::Alive));
    }
}
