//! Display and output formatting utilities

use crate::config::OutputFormat;
use crate::game_of_life::{Cell, Snapshot};
use anyhow::{Context, Result};
use std::io::IsTerminal;

/// Renders engine snapshots for the terminal
pub struct GridFormatter;

impl GridFormatter {
    /// Render a snapshot in the given output format
    pub fn render(snapshot: &Snapshot, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => {
                let mut output = Self::format_header(snapshot);
                output.push('\n');
                output.push_str(&Self::format_grid_compact(snapshot));
                Ok(output)
            }
            OutputFormat::Json => Self::format_json(snapshot),
            OutputFormat::Visual => {
                let mut output = Self::format_header(snapshot);
                output.push('\n');
                output.push_str(&Self::format_grid_with_coords(snapshot));
                Ok(output)
            }
        }
    }

    /// One-line summary: generation, population and dimensions
    pub fn format_header(snapshot: &Snapshot) -> String {
        format!(
            "Generation {} | Living: {} | {}x{}",
            snapshot.generation, snapshot.population, snapshot.rows, snapshot.cols
        )
    }

    /// Format a grid in compact form
    pub fn format_grid_compact(snapshot: &Snapshot) -> String {
        let mut output = String::with_capacity(snapshot.rows * (snapshot.cols + 1));
        for row in &snapshot.cells {
            for cell in row {
                output.push(Self::symbol(*cell));
            }
            output.push('\n');
        }
        output
    }

    /// Format a grid with coordinates
    pub fn format_grid_with_coords(snapshot: &Snapshot) -> String {
        let mut output = String::new();

        // Header with column numbers
        output.push_str("   ");
        for x in 0..snapshot.cols {
            output.push_str(&format!("{:2}", x % 10));
        }
        output.push('\n');

        // Rows with row numbers
        for (y, row) in snapshot.cells.iter().enumerate() {
            output.push_str(&format!("{:2} ", y));
            for cell in row {
                output.push_str(if cell.is_alive() { "██" } else { "··" });
            }
            output.push('\n');
        }

        output
    }

    /// Serialize a snapshot as a single JSON line
    pub fn format_json(snapshot: &Snapshot) -> Result<String> {
        serde_json::to_string(snapshot).context("Failed to serialize snapshot")
    }

    fn symbol(cell: Cell) -> char {
        match cell {
            Cell::Alive => '█',
            Cell::Dead => '·',
        }
    }
}

/// Kind of status line printed by the front ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
    Warning,
    Info,
}

impl Tone {
    fn ansi_code(self) -> u8 {
        match self {
            Tone::Error => 31,
            Tone::Success => 32,
            Tone::Warning => 33,
            Tone::Info => 34,
        }
    }
}

/// Colored status lines on stdout.
///
/// Grid frames are never colored, only the messages around them.
pub struct ColorOutput;

impl ColorOutput {
    /// Wrap `text` in the escape code for `tone` when stdout takes color
    pub fn paint(text: &str, tone: Tone) -> String {
        let no_color = std::env::var_os("NO_COLOR").is_some();
        let term = std::env::var("TERM").unwrap_or_default();
        let enabled = Self::color_enabled(no_color, &term, std::io::stdout().is_terminal());
        Self::paint_if(enabled, text, tone)
    }

    /// Color only when stdout is a terminal, `NO_COLOR` is unset and `TERM` is not `dumb`
    fn color_enabled(no_color: bool, term: &str, is_terminal: bool) -> bool {
        is_terminal && !no_color && term != "dumb"
    }

    fn paint_if(enabled: bool, text: &str, tone: Tone) -> String {
        if enabled {
            format!("\x1b[{}m{}\x1b[0m", tone.ansi_code(), text)
        } else {
            text.to_string()
        }
    }

    pub fn success(text: &str) -> String {
        Self::paint(text, Tone::Success)
    }

    pub fn error(text: &str) -> String {
        Self::paint(text, Tone::Error)
    }

    pub fn warning(text: &str) -> String {
        Self::paint(text, Tone::Warning)
    }

    pub fn info(text: &str) -> String {
        Self::paint(text, Tone::Info)
    }
}
