//! Owned engine state: the current grid and its generation counter

use super::{Cell, GameOfLifeRules, Grid};
use crate::error::Result;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

/// Owns one grid and applies mutations to it.
///
/// Every operation computes the replacement grid first and only then swaps
/// it in, so a failed call leaves the current generation untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifeEngine {
    grid: Grid,
    generation: u64,
}

/// Read-only view of the engine handed to renderers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub rows: usize,
    pub cols: usize,
    pub generation: u64,
    pub population: usize,
    pub cells: Vec<Vec<Cell>>,
}

impl Snapshot {
    /// State at `(row, col)`, or `None` outside the grid
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }
}

impl LifeEngine {
    /// Create an engine over an empty `rows x cols` grid
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        Ok(Self::from_grid(Grid::new(rows, cols)?))
    }

    /// Create an engine over an existing grid, starting at generation 0
    pub fn from_grid(grid: Grid) -> Self {
        Self { grid, generation: 0 }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn population(&self) -> usize {
        self.grid.living_count()
    }

    /// Flip one cell
    pub fn toggle(&mut self, row: usize, col: usize) -> Result<()> {
        self.grid = self.grid.toggle(row, col)?;
        debug!(row, col, "toggled cell");
        Ok(())
    }

    /// Kill every cell and reset the generation counter
    pub fn clear(&mut self) {
        self.grid = self.grid.cleared();
        self.generation = 0;
        debug!(rows = self.grid.rows(), cols = self.grid.cols(), "cleared grid");
    }

    /// Reseed every cell with probability `density` and reset the generation counter
    pub fn randomize<R: Rng>(&mut self, density: f64, rng: &mut R) -> Result<()> {
        let (rows, cols) = self.grid.dimensions();
        self.grid = Grid::random(rows, cols, density, rng)?;
        self.generation = 0;
        debug!(density, population = self.population(), "randomized grid");
        Ok(())
    }

    /// Advance one generation
    pub fn step(&mut self) {
        self.grid = GameOfLifeRules::evolve(&self.grid);
        self.generation += 1;
        debug!(generation = self.generation, population = self.population(), "stepped");
    }

    /// Copy out the current state for rendering
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            rows: self.grid.rows(),
            cols: self.grid.cols(),
            generation: self.generation,
            population: self.population(),
            cells: self.grid.iter_rows().map(<[Cell]>::to_vec).collect(),
        }
    }
}
