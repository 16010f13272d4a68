//! Grid representation and utilities for Game of Life

use crate::error::{LifeError, Result};
use itertools::iproduct;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    #[default]
    Dead,
    Alive,
}

impl Cell {
    pub fn is_alive(self) -> bool {
        self == Cell::Alive
    }

    /// The opposite state
    pub fn toggled(self) -> Self {
        match self {
            Cell::Dead => Cell::Alive,
            Cell::Alive => Cell::Dead,
        }
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

/// A finite Game of Life grid with hard (dead) edges.
///
/// Dimensions are fixed at construction. Cells are stored densely in
/// row-major order, so every in-range coordinate has exactly one state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid with every cell dead
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        // Cell storage is one byte per cell and a Vec holds at most isize::MAX bytes
        let len = rows
            .checked_mul(cols)
            .filter(|&len| len > 0 && len <= isize::MAX as usize)
            .ok_or(LifeError::InvalidDimensions { rows, cols })?;

        Ok(Self {
            rows,
            cols,
            cells: vec![Cell::Dead; len],
        })
    }

    /// Create a grid where each cell is independently alive with probability `density`.
    ///
    /// A cell is alive when a uniform draw from `[0, 1)` falls below `density`,
    /// so `0.0` always yields an empty grid and `1.0` a full one.
    pub fn random<R: Rng>(rows: usize, cols: usize, density: f64, rng: &mut R) -> Result<Self> {
        if !(0.0..=1.0).contains(&density) {
            return Err(LifeError::InvalidDensity(density));
        }

        let mut grid = Self::new(rows, cols)?;
        for cell in grid.cells.iter_mut() {
            *cell = Cell::from(rng.random::<f64>() < density);
        }
        Ok(grid)
    }

    /// Create a grid from rows of booleans (`true` is alive)
    pub fn from_cells(cells: Vec<Vec<bool>>) -> Result<Self> {
        let rows = cells.len();
        let cols = cells.first().map_or(0, Vec::len);

        if rows == 0 || cols == 0 {
            return Err(LifeError::InvalidDimensions { rows, cols });
        }

        // Ragged input has no single column count
        if let Some(bad) = cells.iter().find(|row| row.len() != cols) {
            return Err(LifeError::InvalidDimensions { rows, cols: bad.len() });
        }

        Ok(Self {
            rows,
            cols,
            cells: cells.into_iter().flatten().map(Cell::from).collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Get the cell at the given coordinates, or `None` outside the grid
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.contains(row, col).then(|| self.cells[self.index(row, col)])
    }

    /// Out-of-bounds cells read as dead
    pub fn is_alive(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_some_and(Cell::is_alive)
    }

    /// Return a copy of this grid with the cell at `(row, col)` flipped.
    ///
    /// `self` is never modified; on error no grid is produced.
    pub fn toggle(&self, row: usize, col: usize) -> Result<Self> {
        if !self.contains(row, col) {
            return Err(LifeError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }

        let mut next = self.clone();
        let idx = self.index(row, col);
        next.cells[idx] = next.cells[idx].toggled();
        Ok(next)
    }

    /// Count living cells among the 8 surrounding positions.
    ///
    /// Offsets falling outside the grid are skipped, so corner cells have at
    /// most 3 neighbours and edge cells at most 5.
    pub fn count_neighbors(&self, row: usize, col: usize) -> u8 {
        let mut count = 0;

        for (dr, dc) in iproduct!(-1isize..=1, -1isize..=1) {
            if dr == 0 && dc == 0 {
                continue;
            }

            let neighbor = row
                .checked_add_signed(dr)
                .zip(col.checked_add_signed(dc));

            if let Some((r, c)) = neighbor {
                if self.is_alive(r, c) {
                    count += 1;
                }
            }
        }

        count
    }

    /// Coordinates of every living cell in row-major order
    pub fn living_cells(&self) -> Vec<(usize, usize)> {
        iproduct!(0..self.rows, 0..self.cols)
            .filter(|&(row, col)| self.is_alive(row, col))
            .collect()
    }

    pub fn living_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }

    /// Check if the grid has no living cells
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_alive())
    }

    /// Iterate over rows of cells
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.cols)
    }

    /// A grid of the same shape with every cell dead
    pub fn cleared(&self) -> Self {
        self.with_cells(vec![Cell::Dead; self.cells.len()])
    }

    /// Build a grid of the same shape from row-major cells.
    ///
    /// Only used by the rules engine, which always produces `rows * cols` cells.
    pub(crate) fn with_cells(&self, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), self.cells.len());
        Self {
            rows: self.rows,
            cols: self.cols,
            cells,
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.iter_rows() {
            for cell in row {
                let symbol = if cell.is_alive() { "⬛" } else { "⬜" };
                write!(f, "{}", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
