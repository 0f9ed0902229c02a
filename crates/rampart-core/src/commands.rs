//! Player commands sent from the outside world to the simulation.
//!
//! Commands are applied on the loop thread, either immediately with a reply
//! or queued for the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::enums::TowerKind;
use crate::types::Point;

/// All possible player actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Towers ---
    /// Build a tower of `kind` on tile (x, y).
    BuildTower { x: i32, y: i32, kind: TowerKind },
    /// Sell the tower on tile (x, y).
    SellTower { x: i32, y: i32 },
    /// Upgrade the tower on tile (x, y) by one level.
    UpgradeTower { x: i32, y: i32 },

    // --- Pickups ---
    /// Click at a world position to pick up a collectable.
    CollectAt { point: Point },

    // --- Simulation control ---
    /// Leave setup and start the waves.
    StartGame,
    /// Pause the simulation.
    Pause,
    /// Resume the simulation.
    Resume,
    /// Set the game speed multiplier (1.0 = normal, 2.0 = double).
    SetGameSpeed { multiplier: f64 },
}

/// Result of applying a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandOutcome {
    /// The command took effect.
    Accepted,
    /// The command was refused for a gameplay reason (funds, occupancy, phase).
    Rejected,
    /// The command carried invalid coordinates.
    OutOfBounds { x: i32, y: i32 },
}

impl CommandOutcome {
    pub fn from_bool(accepted: bool) -> Self {
        if accepted {
            CommandOutcome::Accepted
        } else {
            CommandOutcome::Rejected
        }
    }

    pub fn is_accepted(&self) -> bool {
        *self == CommandOutcome::Accepted
    }
}
