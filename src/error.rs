//! Error types for the Life engine

use thiserror::Error;

/// Errors reported by grid construction and mutation.
///
/// Every failing operation leaves the grid it was called on untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifeError {
    #[error("invalid grid dimensions {rows}x{cols}: rows and columns must be positive")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("coordinates ({row}, {col}) out of bounds for {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("invalid density {0}: must be within [0, 1]")]
    InvalidDensity(f64),
}

pub type Result<T> = std::result::Result<T, LifeError>;
