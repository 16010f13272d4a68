//! Game of Life core functionality

pub mod engine;
pub mod grid;
pub mod rules;

pub use engine::{LifeEngine, Snapshot};
pub use grid::{Cell, Grid};
pub use rules::GameOfLifeRules;
