//! Timer-driven stepping of a shared [`LifeEngine`].
//!
//! The stepper owns a background worker that waits one interval between
//! generations. Every tick locks the engine, re-reads the live running flag
//! and only then steps, so a tick racing with [`Stepper::stop`] never mutates
//! the grid. `stop` also wakes and joins the worker: once it returns, no
//! further generation is computed.

use crate::game_of_life::LifeEngine;
use std::ops::ControlFlow;
use crossbeam_channel::{RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// Default delay between generations
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Engine handle shared between the stepper and the presentation layer.
///
/// The mutex is the single mutual-exclusion point for grid mutations.
pub type SharedEngine = Arc<Mutex<LifeEngine>>;

/// Callback run after every timed generation, while the engine lock is held.
/// Returning `Break` stops the stepper.
pub type TickObserver = Arc<dyn Fn(&LifeEngine) -> ControlFlow<()> + Send + Sync>;

/// Wrap an engine for sharing with a [`Stepper`]
pub fn shared(engine: LifeEngine) -> SharedEngine {
    Arc::new(Mutex::new(engine))
}

/// Lock the engine, recovering from poisoning.
///
/// Mutations replace the grid wholesale, so a panic while the lock was held
/// cannot leave a half-updated generation behind.
pub fn lock(engine: &SharedEngine) -> MutexGuard<'_, LifeEngine> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepperState {
    Idle,
    Running,
}

/// State shared by the stepper and its worker thread
#[derive(Clone)]
struct TickContext {
    engine: SharedEngine,
    running: Arc<AtomicBool>,
    observer: Option<TickObserver>,
}

impl TickContext {
    /// Step once if still running. Returns whether the stepper should keep going.
    fn tick(&self) -> bool {
        let mut engine = lock(&self.engine);

        // Checked under the lock so a concurrent stop is always observed
        if !self.running.load(Ordering::Acquire) {
            return false;
        }

        engine.step();

        if let Some(observer) = &self.observer {
            if observer(&*engine).is_break() {
                self.running.store(false, Ordering::Release);
                debug!(generation = engine.generation(), "observer stopped stepper");
                return false;
            }
        }

        true
    }
}

struct Worker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl Worker {
    fn shutdown(self) {
        // The worker may already have exited and dropped its receiver
        let _ = self.stop_tx.send(());
        if self.handle.join().is_err() {
            warn!("stepper worker panicked");
        }
    }
}

/// Repeating timer that advances a [`SharedEngine`] while running.
pub struct Stepper {
    context: TickContext,
    interval: Duration,
    worker: Option<Worker>,
}

impl Stepper {
    pub fn new(engine: SharedEngine, interval: Duration) -> Self {
        Self {
            context: TickContext {
                engine,
                running: Arc::new(AtomicBool::new(false)),
                observer: None,
            },
            interval,
            worker: None,
        }
    }

    /// Run `observer` after every generation the stepper computes
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&LifeEngine) -> ControlFlow<()> + Send + Sync + 'static,
    {
        self.context.observer = Some(Arc::new(observer));
        self
    }

    pub fn engine(&self) -> &SharedEngine {
        &self.context.engine
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> StepperState {
        if self.is_running() {
            StepperState::Running
        } else {
            StepperState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.context.running.load(Ordering::Acquire)
    }

    /// Transition `Idle -> Running` and start the timer.
    ///
    /// Returns `false` without side effects if already running.
    pub fn start(&mut self) -> bool {
        if self.context.running.swap(true, Ordering::AcqRel) {
            return false;
        }

        // A worker that stopped itself through the observer is reaped here
        if let Some(old) = self.worker.take() {
            old.shutdown();
        }

        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        let context = self.context.clone();
        let interval = self.interval;

        let handle = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    if !context.tick() {
                        break;
                    }
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        self.worker = Some(Worker { stop_tx, handle });
        debug!(interval_ms = self.interval.as_millis() as u64, "stepper started");
        true
    }

    /// Transition `Running -> Idle`.
    ///
    /// Blocks until the worker has exited. Returns `false` if already idle.
    pub fn stop(&mut self) -> bool {
        let was_running = self.context.running.swap(false, Ordering::AcqRel);

        if let Some(worker) = self.worker.take() {
            worker.shutdown();
        }

        if was_running {
            debug!("stepper stopped");
        }
        was_running
    }

    /// Advance one generation now if running, without waiting for the timer.
    ///
    /// Lets single-threaded drivers pump the engine cooperatively.
    pub fn tick(&self) -> bool {
        self.context.tick()
    }

    /// Block until the observer stops the run by returning `Break`.
    ///
    /// The observer is the only stop condition `wait` can honour, so without
    /// one this returns `false` at once and leaves the stepper running. It
    /// also returns `false` when idle. An observer that never breaks keeps
    /// this blocked for as long as the timer runs.
    pub fn wait(&mut self) -> bool {
        if self.context.observer.is_none() || (!self.is_running() && self.worker.is_none()) {
            return false;
        }

        if let Some(worker) = self.worker.take() {
            if worker.handle.join().is_err() {
                warn!("stepper worker panicked");
            }
        }
        self.context.running.store(false, Ordering::Release);
        true
    }
}

impl Drop for Stepper {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    const FAST: Duration = Duration::from_millis(5);
    const NEVER: Duration = Duration::from_secs(3600);

    fn blinker() -> SharedEngine {
        let mut engine = LifeEngine::new(5, 5).unwrap();
        for col in 1..=3 {
            engine.toggle(2, col).unwrap();
        }
        shared(engine)
    }

    #[test]
    fn test_start_stop_transitions() {
        let mut stepper = Stepper::new(blinker(), NEVER);
        assert_eq!(stepper.state(), StepperState::Idle);

        assert!(stepper.start());
        assert_eq!(stepper.state(), StepperState::Running);
        assert!(!stepper.start());

        assert!(stepper.stop());
        assert_eq!(stepper.state(), StepperState::Idle);
        assert!(!stepper.stop());
    }

    #[test]
    fn test_manual_tick_requires_running() {
        let engine = blinker();
        let mut stepper = Stepper::new(engine.clone(), NEVER);

        assert!(!stepper.tick());
        assert_eq!(lock(&engine).generation(), 0);

        stepper.start();
        assert!(stepper.tick());
        assert_eq!(lock(&engine).grid().living_cells(), vec![(1, 2), (2, 2), (3, 2)]);

        stepper.stop();
        assert!(!stepper.tick());
        assert_eq!(lock(&engine).generation(), 1);
    }

    #[test]
    fn test_timer_advances_and_stop_is_final() {
        let engine = blinker();
        let mut stepper = Stepper::new(engine.clone(), FAST);

        stepper.start();
        thread::sleep(Duration::from_millis(100));
        stepper.stop();

        let stopped_at = lock(&engine).generation();
        assert!(stopped_at > 0);

        thread::sleep(Duration::from_millis(50));
        assert_eq!(lock(&engine).generation(), stopped_at);
    }

    #[test]
    fn test_observer_break_stops_after_exact_generations() {
        let engine = blinker();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();

        let mut stepper = Stepper::new(engine.clone(), FAST).with_observer(move |engine| {
            counter.fetch_add(1, Ordering::SeqCst);
            if engine.generation() >= 4 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        stepper.start();
        assert!(stepper.wait());

        assert_eq!(stepper.state(), StepperState::Idle);
        assert_eq!(lock(&engine).generation(), 4);
        assert_eq!(seen.load(Ordering::SeqCst), 4);

        // Restartable after stopping itself
        assert!(stepper.start());
        stepper.stop();
    }

    #[test]
    fn test_wait_without_observer_returns_at_once() {
        let engine = blinker();
        let mut stepper = Stepper::new(engine.clone(), FAST);
        assert!(!stepper.wait());

        stepper.start();
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        let waiter = thread::spawn(move || {
            let waited = stepper.wait();
            let _ = done_tx.send(());
            (stepper, waited)
        });

        assert!(done_rx.recv_timeout(Duration::from_secs(2)).is_ok());
        let (mut stepper, waited) = waiter.join().unwrap();
        assert!(!waited);
        assert_eq!(stepper.state(), StepperState::Running);
        assert!(stepper.stop());
    }

    #[test]
    fn test_mutations_allowed_while_running() {
        let engine = blinker();
        let mut stepper = Stepper::new(engine.clone(), NEVER);
        stepper.start();

        lock(&engine).clear();
        lock(&engine).toggle(0, 0).unwrap();
        assert!(stepper.tick());

        assert!(lock(&engine).grid().is_empty());
        stepper.stop();
    }

    #[test]
    fn test_drop_stops_worker() {
        let engine = blinker();
        {
            let mut stepper = Stepper::new(engine.clone(), FAST);
            stepper.start();
        }
        let generation = lock(&engine).generation();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(lock(&engine).generation(), generation);
    }
}
