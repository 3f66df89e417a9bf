//! Grid state for the simulation.
//!
//! A rectangular matrix of cells stored row-major in a flat buffer. The
//! dimensions are fixed when the grid is created.

use crate::error::{LifeError, Result};
use crate::rules::patterns::PatternTemplate;

/// A single cell. The discriminants are the values summed when counting
/// neighbors, so they must stay `0` and `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Cell {
    #[default]
    Dead = 0,
    Alive = 1,
}

impl Cell {
    pub fn is_alive(self) -> bool {
        self == Cell::Alive
    }

    /// Numeric value used in neighbor sums and GPU uploads.
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl From<bool> for Cell {
    fn from(alive: bool) -> Self {
        if alive {
            Cell::Alive
        } else {
            Cell::Dead
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an all-dead grid of `width` columns by `height` rows.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let len = match width.checked_mul(height) {
            Some(len) if len > 0 => len,
            _ => return Err(LifeError::InvalidDimension { width, height }),
        };
        Ok(Self {
            width,
            height,
            cells: vec![Cell::Dead; len],
        })
    }

    /// Build a grid from an already computed cell buffer.
    ///
    /// The buffer length is trusted to equal `width * height`; only the
    /// update engine uses this.
    pub(crate) fn from_cells(width: usize, height: usize, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major view of every cell.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate over rows as slices, top to bottom.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, Cell> {
        self.cells.chunks_exact(self.width)
    }

    pub fn get(&self, row: usize, col: usize) -> Result<Cell> {
        let idx = self.index(row, col)?;
        Ok(self.cells[idx])
    }

    pub fn set(&mut self, row: usize, col: usize, value: Cell) -> Result<()> {
        let idx = self.index(row, col)?;
        self.cells[idx] = value;
        Ok(())
    }

    /// Copy `template` into the grid with its top-left corner at
    /// `(origin_row, origin_col)`. Cells the template marks dead are written
    /// dead as well. A short row leaves the grid cells past its end alone.
    ///
    /// Nothing is written unless the whole template fits.
    pub fn set_block(
        &mut self,
        origin_row: usize,
        origin_col: usize,
        template: &PatternTemplate,
    ) -> Result<()> {
        let (rows, cols) = template.dimensions();
        let end_row = origin_row.checked_add(rows).filter(|&end| end <= self.height);
        let end_col = origin_col.checked_add(cols).filter(|&end| end <= self.width);
        if end_row.is_none() || end_col.is_none() {
            return Err(LifeError::OutOfBounds {
                row: origin_row.saturating_add(rows.saturating_sub(1)),
                col: origin_col.saturating_add(cols.saturating_sub(1)),
                width: self.width,
                height: self.height,
            });
        }

        for (row, col, value) in template.cells() {
            let idx = (origin_row + row) * self.width + origin_col + col;
            self.cells[idx] = value;
        }
        Ok(())
    }

    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }

    fn index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.height || col >= self.width {
            return Err(LifeError::OutOfBounds {
                row,
                col,
                width: self.width,
                height: self.height,
            });
        }
        Ok(row * self.width + col)
    }
}
