//! State shared between command callers and the game loop thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use rampart_core::commands::{CommandOutcome, PlayerCommand};
use rampart_core::state::GameStateSnapshot;

/// Commands sent to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A player command to apply between ticks. The outcome is sent back on
    /// `reply` when one is given.
    PlayerCommand {
        command: PlayerCommand,
        reply: Option<mpsc::Sender<CommandOutcome>>,
    },
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// Handles both sides of the loop hold on to.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    /// Latest snapshot for polling. Updated by the loop after every tick and
    /// after commands applied while paused.
    pub latest_snapshot: Arc<Mutex<Option<GameStateSnapshot>>>,
    /// Set to ask the loop to stop. Checked between ticks only.
    pub cancel: Arc<AtomicBool>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest_snapshot(&self) -> Option<GameStateSnapshot> {
        self.latest_snapshot
            .lock()
            .ok()
            .and_then(|lock| lock.clone())
    }

    pub fn store_snapshot(&self, snapshot: GameStateSnapshot) {
        if let Ok(mut lock) = self.latest_snapshot.lock() {
            *lock = Some(snapshot);
        }
    }

    pub fn stop_token(&self) -> StopToken {
        StopToken {
            cancel: Arc::clone(&self.cancel),
        }
    }
}

/// Cloneable request to stop the game loop, usable from any thread.
///
/// The loop notices the request before its next tick and exits on its own.
/// Joining the thread is still up to the [`crate::GameHandle`] owner.
#[derive(Debug, Clone)]
pub struct StopToken {
    cancel: Arc<AtomicBool>,
}

impl StopToken {
    pub fn stop(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_state_creation() {
        let state = SharedState::new();
        assert!(state.latest_snapshot().is_none());
        assert!(!state.cancel.load(Ordering::Acquire));
    }

    #[test]
    fn test_clones_share_the_snapshot() {
        let state = SharedState::new();
        let other = state.clone();
        other.store_snapshot(GameStateSnapshot {
            gold: 42,
            ..Default::default()
        });
        assert_eq!(state.latest_snapshot().map(|s| s.gold), Some(42));
    }

    #[test]
    fn test_stop_token_sets_the_shared_flag() {
        let state = SharedState::new();
        let token = state.stop_token();
        let other = token.clone();
        assert!(!token.is_stopped());
        std::thread::spawn(move || other.stop()).join().unwrap();
        assert!(token.is_stopped());
        assert!(state.cancel.load(Ordering::Acquire));
    }
}
