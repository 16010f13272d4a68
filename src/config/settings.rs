//! Configuration settings for the Life engine runner

use crate::stepper::DEFAULT_TICK_INTERVAL;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Largest grid the runner will allocate
pub const MAX_GRID_CELLS: usize = 1 << 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub grid: GridConfig,
    pub stepper: StepperConfig,
    pub seeding: SeedingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepperConfig {
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedingConfig {
    /// Probability that a randomized cell starts alive
    pub density: f64,
    /// Fixed RNG seed; entropy is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
    Visual,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid: GridConfig { rows: 50, cols: 50 },
            stepper: StepperConfig {
                tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            },
            seeding: SeedingConfig {
                density: 0.25,
                seed: None,
            },
            output: OutputConfig {
                format: OutputFormat::Text,
            },
        }
    }
}

impl StepperConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.grid.rows == 0 || self.grid.cols == 0 {
            anyhow::bail!(
                "Grid dimensions must be positive, got {}x{}",
                self.grid.rows,
                self.grid.cols
            );
        }

        let cells = self.grid.rows.checked_mul(self.grid.cols).unwrap_or(usize::MAX);
        if cells > MAX_GRID_CELLS {
            anyhow::bail!(
                "Grid of {}x{} exceeds the limit of {} cells",
                self.grid.rows,
                self.grid.cols,
                MAX_GRID_CELLS
            );
        }

        if self.stepper.tick_interval_ms == 0 {
            anyhow::bail!("Tick interval must be positive");
        }

        if !(0.0..=1.0).contains(&self.seeding.density) {
            anyhow::bail!("Density must be within [0, 1], got {}", self.seeding.density);
        }

        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(rows) = cli_overrides.rows {
            self.grid.rows = rows;
        }
        if let Some(cols) = cli_overrides.cols {
            self.grid.cols = cols;
        }
        if let Some(interval) = cli_overrides.tick_interval_ms {
            self.stepper.tick_interval_ms = interval;
        }
        if let Some(density) = cli_overrides.density {
            self.seeding.density = density;
        }
        if let Some(seed) = cli_overrides.seed {
            self.seeding.seed = Some(seed);
        }
        if let Some(format) = cli_overrides.format {
            self.output.format = format;
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub rows: Option<usize>,
    pub cols: Option<usize>,
    pub tick_interval_ms: Option<u64>,
    pub density: Option<f64>,
    pub seed: Option<u64>,
    pub format: Option<OutputFormat>,
}
