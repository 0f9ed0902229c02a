//! Error types shared across the workspace.

use thiserror::Error;

use crate::enums::{EnemyKind, TowerKind};

/// Fatal simulation errors. Recoverable gameplay refusals are reported as
/// `Ok(false)` by the command methods instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("tile ({x}, {y}) is outside the map")]
    TileOutOfBounds { x: i32, y: i32 },
    #[error("game loop is not running")]
    LoopUnavailable,
}

/// Configuration loading and validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no waves configured")]
    NoWaves,
    #[error("wave {wave} has no groups")]
    EmptyWave { wave: usize },
    #[error("wave {wave} group {group} spawns no enemies")]
    EmptyGroup { wave: usize, group: usize },
    #[error("{what} for enemy {kind:?} must be positive")]
    NonPositiveEnemyStat { kind: EnemyKind, what: &'static str },
    #[error("{what} for tower {kind:?} level {level} must be positive")]
    NonPositiveTowerStat {
        kind: TowerKind,
        level: usize,
        what: &'static str,
    },
    #[error("tower {0:?} has no levels")]
    NoTowerLevels(TowerKind),
    #[error("damage table for {tower:?} vs {enemy:?} has {found} levels, expected {expected}")]
    DamageTableShape {
        tower: TowerKind,
        enemy: EnemyKind,
        expected: usize,
        found: usize,
    },
    #[error("timing value `{0}` must be positive")]
    NonPositiveTiming(&'static str),
    #[error("map row {row} has width {found}, expected {expected}")]
    RaggedMap {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown map tile {0:?}")]
    UnknownTile(char),
    #[error("map has no path")]
    EmptyPath,
    #[error("path waypoint ({x}, {y}) is not on a path tile")]
    WaypointOffPath { x: i32, y: i32 },
}

/// Broken bookkeeping in a [`crate::deferred::DeferredList`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("staged removal {0} is not in the list")]
    RemovalMissing(String),
    #[error("staged addition {0} is already in the list")]
    AdditionPresent(String),
    #[error("addition {0} is staged more than once")]
    DuplicateAddition(String),
}
