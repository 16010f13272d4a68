//! Configuration management for the Life engine runner

pub mod settings;

pub use settings::{
    CliOverrides, GridConfig, OutputConfig, OutputFormat, SeedingConfig, Settings, StepperConfig,
    MAX_GRID_CELLS,
};
