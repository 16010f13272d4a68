//! Command line front end for the Game of Life engine

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use life_engine::{
    config::{CliOverrides, OutputFormat, Settings},
    console::{Command, Reply, Session, HELP},
    stepper::{self, Stepper},
    utils::{ColorOutput, GridFormatter},
    LifeEngine,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::BufRead;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "life")]
#[command(about = "Conway's Game of Life engine")]
#[command(version = "0.1.0")]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides shared by the commands that build an engine
#[derive(clap::Args)]
struct EngineArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "config/life.yaml")]
    config: PathBuf,

    /// Grid rows (overrides config)
    #[arg(long)]
    rows: Option<usize>,

    /// Grid columns (overrides config)
    #[arg(long)]
    cols: Option<usize>,

    /// Milliseconds between generations (overrides config)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Probability a randomized cell starts alive (overrides config)
    #[arg(short, long)]
    density: Option<f64>,

    /// RNG seed for reproducible runs (overrides config)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output format (overrides config)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed a grid and let the timer evolve it
    Run {
        #[command(flatten)]
        engine: EngineArgs,

        /// Stop after this many generations (runs until interrupted otherwise)
        #[arg(short, long)]
        generations: Option<u64>,

        /// Start from an empty grid instead of a random one
        #[arg(long)]
        empty: bool,
    },

    /// Drive the engine interactively from standard input
    Play {
        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Create a default configuration file
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run { engine, generations, empty } => run_command(engine, generations, empty),
        Commands::Play { engine } => play_command(engine),
        Commands::Setup { directory, force } => setup_command(directory, force),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the config file (or defaults) and apply command line overrides
fn load_settings(args: &EngineArgs) -> Result<Settings> {
    if !args.config.exists() {
        println!("{}", ColorOutput::warning(&format!(
            "Config file {} not found, using defaults", args.config.display()
        )));
    }

    let mut settings = Settings::load_or_default(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    settings.merge_with_cli(&CliOverrides {
        rows: args.rows,
        cols: args.cols,
        tick_interval_ms: args.interval,
        density: args.density,
        seed: args.seed,
        format: args.format,
    });

    settings.validate()
        .context("Configuration validation failed")?;

    info!(
        rows = settings.grid.rows,
        cols = settings.grid.cols,
        interval_ms = settings.stepper.tick_interval_ms,
        density = settings.seeding.density,
        "loaded settings"
    );
    Ok(settings)
}

fn run_command(args: EngineArgs, generations: Option<u64>, empty: bool) -> Result<()> {
    let settings = load_settings(&args)?;
    let format = settings.output.format;

    let mut engine = LifeEngine::new(settings.grid.rows, settings.grid.cols)?;
    if !empty {
        let mut rng = match settings.seeding.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        engine.randomize(settings.seeding.density, &mut rng)?;
    }

    println!("{}", GridFormatter::render(&engine.snapshot(), format)?);
    if generations == Some(0) {
        return Ok(());
    }

    let mut stepper = Stepper::new(stepper::shared(engine), settings.stepper.tick_interval())
        .with_observer(move |engine| {
            match GridFormatter::render(&engine.snapshot(), format) {
                Ok(frame) => println!("{}", frame),
                Err(e) => {
                    error!("Failed to render generation {}: {:#}", engine.generation(), e);
                    return ControlFlow::Break(());
                }
            }

            match generations {
                Some(limit) if engine.generation() >= limit => ControlFlow::Break(()),
                _ => ControlFlow::Continue(()),
            }
        });

    stepper.start();
    // Without a generation limit the observer never breaks and this runs until interrupted
    stepper.wait();

    let engine = stepper::lock(stepper.engine());
    println!("{}", ColorOutput::success(&format!(
        "Finished after {} generation(s), {} living cell(s)",
        engine.generation(),
        engine.population()
    )));

    Ok(())
}

fn play_command(args: EngineArgs) -> Result<()> {
    let settings = load_settings(&args)?;
    let mut session = Session::new(&settings)?;

    println!("{}", ColorOutput::info(HELP));
    println!("{}", session.render()?);

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let reply = line
            .parse::<Command>()
            .and_then(|command| session.execute(command));

        match reply {
            Ok(Reply::Render(frame)) => println!("{}", frame),
            Ok(Reply::Message(message)) => println!("{}", ColorOutput::info(&message)),
            Ok(Reply::Quit) => break,
            Err(e) => println!("{}", ColorOutput::error(&format!("{:#}", e))),
        }
    }

    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    let config_path = directory.join("config").join("life.yaml");
    write_default_config(&config_path, force)?;

    println!("\nNext steps:");
    println!("1. Edit {}", config_path.display());
    println!("2. Run: cargo run -- run --config {}", config_path.display());

    Ok(())
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        println!("Skipped: {} (already exists)", path.display());
        return Ok(());
    }

    Settings::default().to_file(path)
        .context("Failed to create default configuration")?;
    println!("{}", ColorOutput::success(&format!("Created: {}", path.display())));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "life",
            "run",
            "--config", "test.yaml",
            "--rows", "20",
            "--format", "json",
            "--generations", "5",
        ]);
        assert!(cli.is_ok());

        let cli = Cli::try_parse_from(["life", "-v", "play", "--seed", "42"]);
        assert!(cli.is_ok());

        let cli = Cli::try_parse_from(["life", "run", "--format", "sixel"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_overrides_reach_settings() {
        let temp_dir = tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "life",
            "run",
            "--config", temp_dir.path().join("missing.yaml").to_str().unwrap(),
            "--rows", "7",
            "--density", "0.5",
        ])
        .unwrap();

        let Commands::Run { engine, .. } = cli.command else {
            panic!("expected run command");
        };
        let settings = load_settings(&engine).unwrap();
        assert_eq!(settings.grid.rows, 7);
        assert_eq!(settings.seeding.density, 0.5);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let temp_dir = tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "life",
            "play",
            "--config", temp_dir.path().join("missing.yaml").to_str().unwrap(),
            "--cols", "0",
        ])
        .unwrap();

        let Commands::Play { engine } = cli.command else {
            panic!("expected play command");
        };
        assert!(load_settings(&engine).is_err());
    }

    #[test]
    fn test_setup_command() {
        let temp_dir = tempdir().unwrap();
        let result = setup_command(temp_dir.path().to_path_buf(), false);

        assert!(result.is_ok());
        let config_path = temp_dir.path().join("config/life.yaml");
        assert_eq!(Settings::from_file(&config_path).unwrap(), Settings::default());

        // Second run leaves the edited file alone
        std::fs::write(&config_path, "edited").unwrap();
        setup_command(temp_dir.path().to_path_buf(), false).unwrap();
        assert_eq!(std::fs::read_to_string(&config_path).unwrap(), "edited");
    }
}
