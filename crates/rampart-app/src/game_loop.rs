//! Game loop thread: runs the simulation engine at a fixed tick rate and
//! hands every snapshot to a listener.
//!
//! The engine is built on the caller's thread so configuration errors
//! surface from `spawn`, then moved into the loop thread. Commands arrive
//! via an `mpsc` channel and are applied between frames. Each tick's snapshot
//! goes to the [`TickListener`] and into shared state for synchronous polling.

use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use rampart_core::config::GameConfig;
use rampart_core::constants::{DT, MAX_STEPS_PER_FRAME, PAUSE_POLL, TICK_RATE};
use rampart_core::enums::GamePhase;
use rampart_core::state::GameStateSnapshot;
use rampart_sim::SimulationEngine;

use crate::error::AppError;
use crate::handle::GameHandle;
use crate::state::{GameLoopCommand, SharedState};

/// Nominal duration of one tick at 1x speed.
pub const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Receives every snapshot the loop publishes: one per simulation tick, plus
/// one after commands applied while no tick ran. Called on the loop thread.
pub trait TickListener: Send + 'static {
    fn on_tick(&mut self, snapshot: &GameStateSnapshot);
}

impl<F> TickListener for F
where
    F: FnMut(&GameStateSnapshot) + Send + 'static,
{
    fn on_tick(&mut self, snapshot: &GameStateSnapshot) {
        self(snapshot)
    }
}

/// Converts scaled wall-clock time into a whole number of fixed steps.
///
/// Time that does not fill a step carries over to the next frame. When a
/// frame owes more than `max_steps`, the surplus is dropped so a stalled
/// thread never tries to catch up in one burst.
#[derive(Debug, Clone)]
pub struct FrameClock {
    step: f64,
    accumulator: f64,
    max_steps: u32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DT, MAX_STEPS_PER_FRAME)
    }
}

impl FrameClock {
    pub fn new(step: f64, max_steps: u32) -> Self {
        Self {
            step,
            accumulator: 0.0,
            max_steps,
        }
    }

    /// Add `elapsed` seconds of simulated time and return how many steps to run.
    pub fn advance(&mut self, elapsed: f64) -> u32 {
        if elapsed.is_finite() && elapsed > 0.0 {
            self.accumulator += elapsed;
        }
        let owed = (self.accumulator / self.step).floor();
        if owed >= self.max_steps as f64 {
            self.accumulator = 0.0;
            return self.max_steps;
        }
        let steps = owed as u32;
        self.accumulator -= steps as f64 * self.step;
        steps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    pub fn pending(&self) -> f64 {
        self.accumulator
    }
}

/// Entry point for starting a game on its own thread.
pub struct GameLoop;

impl GameLoop {
    /// Build an engine from `config` and run it on a new thread.
    pub fn spawn(config: GameConfig, listener: impl TickListener) -> Result<GameHandle, AppError> {
        let engine = SimulationEngine::new(config)?;
        let economy = engine.economy();
        let shared = SharedState::new();
        let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();
        let (done_tx, done_rx) = mpsc::channel::<()>();

        let loop_shared = shared.clone();
        let thread = std::thread::Builder::new()
            .name("rampart-game-loop".into())
            .spawn(move || {
                run_game_loop(engine, cmd_rx, listener, &loop_shared);
                let _ = done_tx.send(());
            })
            .map_err(AppError::Spawn)?;

        info!("game loop started");
        Ok(GameHandle::new(cmd_tx, shared, economy, done_rx, thread))
    }
}

/// The game loop. Runs until Shutdown, channel disconnect, or cancellation.
fn run_game_loop(
    mut engine: SimulationEngine,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    mut listener: impl TickListener,
    shared: &SharedState,
) {
    let mut clock = FrameClock::default();
    let mut last_frame = Instant::now();
    publish(&mut engine, &mut listener, shared);

    while !shared.cancel.load(Ordering::Acquire) {
        // 1. Drain all pending commands
        let mut dirty = false;
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::PlayerCommand { command, reply }) => {
                    let outcome = engine.apply_command(command);
                    dirty = true;
                    if let Some(reply) = reply {
                        let _ = reply.send(outcome);
                    }
                }
                Ok(GameLoopCommand::Shutdown) | Err(mpsc::TryRecvError::Disconnected) => {
                    debug!("game loop shutting down");
                    return;
                }
                Err(mpsc::TryRecvError::Empty) => break,
            }
        }

        let frame_start = Instant::now();
        let elapsed = frame_start - last_frame;
        last_frame = frame_start;

        // 2. Idle while not running
        if engine.phase() != GamePhase::Running {
            clock.reset();
            if dirty {
                publish(&mut engine, &mut listener, shared);
            }
            std::thread::sleep(PAUSE_POLL);
            continue;
        }

        // 3. Run the fixed steps this frame owes, scaled by game speed.
        // Every step is published so the listener sees each tick.
        let steps = clock.advance(elapsed.as_secs_f64() * engine.game_speed());
        for _ in 0..steps {
            if shared.cancel.load(Ordering::Acquire) {
                return;
            }
            engine.step(DT);
            publish(&mut engine, &mut listener, shared);
            if engine.phase() != GamePhase::Running {
                break;
            }
        }

        // 4. Publish command effects on frames that did not step
        if steps == 0 && dirty {
            publish(&mut engine, &mut listener, shared);
        }

        // 5. Sleep out the rest of the frame
        if let Some(rest) = TICK_DURATION.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }
}

fn publish(engine: &mut SimulationEngine, listener: &mut impl TickListener, shared: &SharedState) {
    let snapshot = engine.snapshot();
    listener.on_tick(&snapshot);
    shared.store_snapshot(snapshot);
}
