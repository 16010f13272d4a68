//! Conway's Game of Life engine
//!
//! A finite grid with hard edges, advanced one generation at a time either
//! manually or by a [`Stepper`] timer, with cell toggling, clearing and
//! seeded randomization.

pub mod config;
pub mod console;
pub mod error;
pub mod game_of_life;
pub mod stepper;
pub mod utils;

pub use config::Settings;
pub use error::{LifeError, Result};
pub use game_of_life::{Cell, GameOfLifeRules, Grid, LifeEngine, Snapshot};
pub use stepper::{SharedEngine, Stepper, StepperState};
