//! Thread-safe command surface for a running game.
//!
//! Every command is forwarded to the loop thread and answered with the
//! outcome the engine produced. The handle owns the thread: dropping it ends
//! the game.

use std::sync::atomic::Ordering;
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use tracing::{debug, info, warn};

use rampart_core::commands::{CommandOutcome, PlayerCommand};
use rampart_core::constants::{COMMAND_REPLY_TIMEOUT, SHUTDOWN_TIMEOUT};
use rampart_core::enums::TowerKind;
use rampart_core::error::SimError;
use rampart_core::state::GameStateSnapshot;
use rampart_core::types::Point;
use rampart_sim::Economy;

use crate::state::{GameLoopCommand, SharedState, StopToken};

pub struct GameHandle {
    command_tx: mpsc::Sender<GameLoopCommand>,
    shared: SharedState,
    economy: Arc<Economy>,
    done_rx: mpsc::Receiver<()>,
    thread: Option<JoinHandle<()>>,
}

impl GameHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<GameLoopCommand>,
        shared: SharedState,
        economy: Arc<Economy>,
        done_rx: mpsc::Receiver<()>,
        thread: JoinHandle<()>,
    ) -> Self {
        Self {
            command_tx,
            shared,
            economy,
            done_rx,
            thread: Some(thread),
        }
    }

    /// Send a command and wait for the loop to apply it.
    pub fn send(&self, command: PlayerCommand) -> Result<CommandOutcome, SimError> {
        if !self.is_running() {
            return Err(SimError::LoopUnavailable);
        }
        let (reply_tx, reply_rx) = mpsc::channel();
        self.command_tx
            .send(GameLoopCommand::PlayerCommand {
                command,
                reply: Some(reply_tx),
            })
            .map_err(|_| SimError::LoopUnavailable)?;
        reply_rx
            .recv_timeout(COMMAND_REPLY_TIMEOUT)
            .map_err(|_| SimError::LoopUnavailable)
    }

    /// Send a command without waiting for its outcome.
    pub fn queue(&self, command: PlayerCommand) -> Result<(), SimError> {
        if !self.is_running() {
            return Err(SimError::LoopUnavailable);
        }
        self.command_tx
            .send(GameLoopCommand::PlayerCommand {
                command,
                reply: None,
            })
            .map_err(|_| SimError::LoopUnavailable)
    }

    // --- Towers ---

    pub fn build_tower(&self, x: i32, y: i32, kind: TowerKind) -> Result<bool, SimError> {
        self.send(PlayerCommand::BuildTower { x, y, kind })
            .and_then(outcome_to_result)
    }

    pub fn sell_tower(&self, x: i32, y: i32) -> Result<bool, SimError> {
        self.send(PlayerCommand::SellTower { x, y })
            .and_then(outcome_to_result)
    }

    pub fn upgrade_tower(&self, x: i32, y: i32) -> Result<bool, SimError> {
        self.send(PlayerCommand::UpgradeTower { x, y })
            .and_then(outcome_to_result)
    }

    // --- Pickups ---

    pub fn handle_collectable_click(&self, point: Point) -> Result<bool, SimError> {
        self.send(PlayerCommand::CollectAt { point })
            .and_then(outcome_to_result)
    }

    // --- Simulation control ---

    pub fn start_game(&self) -> Result<bool, SimError> {
        self.send(PlayerCommand::StartGame).and_then(outcome_to_result)
    }

    pub fn pause_game(&self) -> Result<bool, SimError> {
        self.send(PlayerCommand::Pause).and_then(outcome_to_result)
    }

    pub fn resume_game(&self) -> Result<bool, SimError> {
        self.send(PlayerCommand::Resume).and_then(outcome_to_result)
    }

    pub fn set_game_speed(&self, multiplier: f64) -> Result<bool, SimError> {
        self.send(PlayerCommand::SetGameSpeed { multiplier })
            .and_then(outcome_to_result)
    }

    // --- Queries ---

    pub fn latest_snapshot(&self) -> Option<GameStateSnapshot> {
        self.shared.latest_snapshot()
    }

    /// Live gold and health counters, readable without a round trip.
    pub fn economy(&self) -> Arc<Economy> {
        Arc::clone(&self.economy)
    }

    /// A token that stops the loop from any thread without owning the handle.
    pub fn stop_token(&self) -> StopToken {
        self.shared.stop_token()
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some() && !self.shared.cancel.load(Ordering::Acquire)
    }

    /// Stop the loop thread and wait for it to exit.
    ///
    /// Returns `true` when the thread was joined. A thread that does not
    /// finish within the shutdown timeout is detached. Calling this again
    /// after the first time does nothing and returns `true`.
    pub fn end_game(&mut self) -> bool {
        let Some(thread) = self.thread.take() else {
            return true;
        };
        self.shared.cancel.store(true, Ordering::Release);
        let _ = self.command_tx.send(GameLoopCommand::Shutdown);

        match self.done_rx.recv_timeout(SHUTDOWN_TIMEOUT) {
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                if thread.join().is_err() {
                    warn!("game loop thread panicked");
                }
                info!("game loop stopped");
                true
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                warn!(
                    timeout_ms = SHUTDOWN_TIMEOUT.as_millis() as u64,
                    "game loop did not stop in time, detaching"
                );
                false
            }
        }
    }
}

impl Drop for GameHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            debug!("game handle dropped, stopping loop");
            self.end_game();
        }
    }
}

fn outcome_to_result(outcome: CommandOutcome) -> Result<bool, SimError> {
    match outcome {
        CommandOutcome::Accepted => Ok(true),
        CommandOutcome::Rejected => Ok(false),
        CommandOutcome::OutOfBounds { x, y } => Err(SimError::TileOutOfBounds { x, y }),
    }
}
