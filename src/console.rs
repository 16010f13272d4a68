//! Line-oriented console front end.
//!
//! Maps text commands onto engine operations the way a graphical front end
//! maps clicks and buttons: `toggle` for a cell click, `clear`, `randomize`,
//! and `start`/`stop` for the timer.

use crate::config::{OutputFormat, Settings};
use crate::game_of_life::LifeEngine;
use crate::stepper::{self, Stepper};
use crate::utils::GridFormatter;
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::str::FromStr;

/// Most generations a single `step` command may request
pub const MAX_STEP_BATCH: usize = 10_000;

pub const HELP: &str = "\
Commands:
  toggle <row> <col>   flip a cell (alias: t)
  clear                kill every cell (alias: c)
  randomize [density]  reseed the grid (alias: r)
  step [n]             advance n generations, default 1, max 10000 (alias: s)
  start | stop         run or pause the timer
  show                 print the grid
  help                 show this message
  quit                 exit (alias: q)";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Toggle { row: usize, col: usize },
    Clear,
    Randomize { density: Option<f64> },
    Step { generations: usize },
    Start,
    Stop,
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let name = words.next().context("Empty command")?;
        let args: Vec<&str> = words.collect();

        let command = match (name.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("toggle" | "t", [row, col]) => Command::Toggle {
                row: row.parse().with_context(|| format!("Invalid row: {}", row))?,
                col: col.parse().with_context(|| format!("Invalid column: {}", col))?,
            },
            ("toggle" | "t", _) => anyhow::bail!("Usage: toggle <row> <col>"),
            ("clear" | "c", []) => Command::Clear,
            ("randomize" | "r", []) => Command::Randomize { density: None },
            ("randomize" | "r", [density]) => Command::Randomize {
                density: Some(
                    density
                        .parse()
                        .with_context(|| format!("Invalid density: {}", density))?,
                ),
            },
            ("step" | "s", []) => Command::Step { generations: 1 },
            ("step" | "s", [n]) => {
                let generations: usize = n
                    .parse()
                    .with_context(|| format!("Invalid generation count: {}", n))?;
                if generations > MAX_STEP_BATCH {
                    anyhow::bail!("At most {} generations per step", MAX_STEP_BATCH);
                }
                Command::Step { generations }
            }
            ("start", []) => Command::Start,
            ("stop", []) => Command::Stop,
            ("show", []) => Command::Show,
            ("help" | "?", []) => Command::Help,
            ("quit" | "q" | "exit", []) => Command::Quit,
            (other, _) => anyhow::bail!("Unknown command or arguments: {}", other),
        };

        Ok(command)
    }
}

/// What the front end should do after a command
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Render(String),
    Message(String),
    Quit,
}

/// One interactive session: an engine, its stepper and a seeded RNG
pub struct Session {
    stepper: Stepper,
    density: f64,
    format: OutputFormat,
    rng: StdRng,
}

impl Session {
    pub fn new(settings: &Settings) -> Result<Self> {
        let engine = LifeEngine::new(settings.grid.rows, settings.grid.cols)?;
        let rng = match settings.seeding.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            stepper: Stepper::new(stepper::shared(engine), settings.stepper.tick_interval()),
            density: settings.seeding.density,
            format: settings.output.format,
            rng,
        })
    }

    pub fn stepper(&self) -> &Stepper {
        &self.stepper
    }

    /// Render the current grid
    pub fn render(&self) -> Result<String> {
        let snapshot = stepper::lock(self.stepper.engine()).snapshot();
        GridFormatter::render(&snapshot, self.format)
    }

    /// Apply one command. Engine errors are returned and leave the grid unchanged.
    pub fn execute(&mut self, command: Command) -> Result<Reply> {
        match command {
            Command::Toggle { row, col } => {
                stepper::lock(self.stepper.engine()).toggle(row, col)?;
            }
            Command::Clear => stepper::lock(self.stepper.engine()).clear(),
            Command::Randomize { density } => {
                let density = density.unwrap_or(self.density);
                stepper::lock(self.stepper.engine()).randomize(density, &mut self.rng)?;
            }
            Command::Step { generations } => {
                // Relock per generation so a running timer can interleave
                for _ in 0..generations.min(MAX_STEP_BATCH) {
                    stepper::lock(self.stepper.engine()).step();
                }
            }
            Command::Start => {
                let message = if self.stepper.start() {
                    format!("Running every {} ms", self.stepper.interval().as_millis())
                } else {
                    "Already running".to_string()
                };
                return Ok(Reply::Message(message));
            }
            Command::Stop => {
                let message = if self.stepper.stop() {
                    "Stopped"
                } else {
                    "Not running"
                };
                return Ok(Reply::Message(message.to_string()));
            }
            Command::Show => {}
            Command::Help => return Ok(Reply::Message(HELP.to_string())),
            Command::Quit => {
                self.stepper.stop();
                return Ok(Reply::Quit);
            }
        }

        Ok(Reply::Render(self.render()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LifeError;
    use crate::stepper::StepperState;

    fn session(rows: usize, cols: usize) -> Session {
        let mut settings = Settings::default();
        settings.grid.rows = rows;
        settings.grid.cols = cols;
        settings.stepper.tick_interval_ms = 3_600_000;
        settings.seeding.seed = Some(11);
        Session::new(&settings).unwrap()
    }

    fn population(session: &Session) -> usize {
        stepper::lock(session.stepper().engine()).population()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("toggle 2 3".parse::<Command>().unwrap(), Command::Toggle { row: 2, col: 3 });
        assert_eq!("T 0 1".parse::<Command>().unwrap(), Command::Toggle { row: 0, col: 1 });
        assert_eq!("clear".parse::<Command>().unwrap(), Command::Clear);
        assert_eq!("r".parse::<Command>().unwrap(), Command::Randomize { density: None });
        assert_eq!(
            "randomize 0.5".parse::<Command>().unwrap(),
            Command::Randomize { density: Some(0.5) }
        );
        assert_eq!("step".parse::<Command>().unwrap(), Command::Step { generations: 1 });
        assert_eq!("s 10".parse::<Command>().unwrap(), Command::Step { generations: 10 });
        assert_eq!("  start ".parse::<Command>().unwrap(), Command::Start);
        assert_eq!("q".parse::<Command>().unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("".parse::<Command>().is_err());
        assert!("toggle 1".parse::<Command>().is_err());
        assert!("toggle -1 2".parse::<Command>().is_err());
        assert!("randomize lots".parse::<Command>().is_err());
        assert!("jump".parse::<Command>().is_err());
        assert!("clear now".parse::<Command>().is_err());
        assert!("step 999999999".parse::<Command>().is_err());
        assert_eq!(
            format!("step {}", MAX_STEP_BATCH).parse::<Command>().unwrap(),
            Command::Step { generations: MAX_STEP_BATCH }
        );
    }

    #[test]
    fn test_session_blinker() {
        let mut session = session(5, 5);
        for col in 1..=3 {
            session.execute(Command::Toggle { row: 2, col }).unwrap();
        }

        let reply = session.execute(Command::Step { generations: 1 }).unwrap();
        let Reply::Render(frame) = reply else {
            panic!("expected a rendered frame");
        };
        assert!(frame.contains("Generation 1"));
        assert!(frame.ends_with("·····\n··█··\n··█··\n··█··\n·····\n"));
    }

    #[test]
    fn test_session_step_batch_is_capped() {
        let mut session = session(3, 3);
        session.execute(Command::Step { generations: MAX_STEP_BATCH + 5 }).unwrap();
        let generation = stepper::lock(session.stepper().engine()).generation();
        assert_eq!(generation, MAX_STEP_BATCH as u64);
    }

    #[test]
    fn test_session_errors_leave_grid() {
        let mut session = session(3, 3);
        session.execute(Command::Toggle { row: 1, col: 1 }).unwrap();

        let err = session.execute(Command::Toggle { row: 3, col: 0 }).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LifeError>(),
            Some(LifeError::OutOfBounds { .. })
        ));

        let err = session.execute(Command::Randomize { density: Some(2.0) }).unwrap_err();
        assert_eq!(err.downcast_ref::<LifeError>(), Some(&LifeError::InvalidDensity(2.0)));
        assert_eq!(population(&session), 1);
    }

    #[test]
    fn test_session_randomize_and_clear() {
        let mut session = session(4, 4);
        session.execute(Command::Randomize { density: Some(1.0) }).unwrap();
        assert_eq!(population(&session), 16);

        session.execute(Command::Clear).unwrap();
        assert_eq!(population(&session), 0);
    }

    #[test]
    fn test_session_start_stop() {
        let mut session = session(4, 4);

        assert_eq!(
            session.execute(Command::Start).unwrap(),
            Reply::Message("Running every 3600000 ms".to_string())
        );
        assert_eq!(
            session.execute(Command::Start).unwrap(),
            Reply::Message("Already running".to_string())
        );
        assert_eq!(session.stepper().state(), StepperState::Running);

        assert_eq!(session.execute(Command::Quit).unwrap(), Reply::Quit);
        assert_eq!(session.stepper().state(), StepperState::Idle);
    }
}
