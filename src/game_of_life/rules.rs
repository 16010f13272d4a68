//! Game of Life rules implementation

use super::{Cell, Grid};
use rayon::prelude::*;

/// Neighbour count that brings a dead cell to life
pub const BIRTH_COUNT: u8 = 3;

/// Neighbour counts that keep a living cell alive
pub const SURVIVAL_COUNTS: [u8; 2] = [2, 3];

/// Game of Life rules engine (B3/S23)
pub struct GameOfLifeRules;

impl GameOfLifeRules {
    /// Compute the next generation.
    ///
    /// Neighbour counts are read from `current` only; the result is built as
    /// a separate grid, so no cell ever sees a partially updated generation.
    pub fn evolve(current: &Grid) -> Grid {
        let cols = current.cols();

        let next_cells: Vec<Cell> = (0..current.rows())
            .into_par_iter()
            .flat_map_iter(|row| {
                (0..cols).map(move |col| {
                    let state = current.get(row, col).unwrap_or_default();
                    Self::next_state(state, current.count_neighbors(row, col))
                })
            })
            .collect();

        current.with_cells(next_cells)
    }

    /// Evolve the grid for multiple generations
    pub fn evolve_generations(mut grid: Grid, generations: usize) -> Grid {
        for _ in 0..generations {
            grid = Self::evolve(&grid);
        }
        grid
    }

    /// State of a cell in the next generation given its current state and neighbour count
    pub fn next_state(current: Cell, neighbor_count: u8) -> Cell {
        match (current, neighbor_count) {
            (Cell::Alive, n) if SURVIVAL_COUNTS.contains(&n) => Cell::Alive,
            (Cell::Dead, BIRTH_COUNT) => Cell::Alive,
            _ => Cell::Dead,
        }
    }
}
