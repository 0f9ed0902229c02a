//! Events emitted by the simulation for the renderer and audio layers.

use serde::{Deserialize, Serialize};

use crate::enums::{EnemyKind, GamePhase, ProjectileKind, TowerKind};
use crate::types::{EnemyId, Point, TileCoord};

/// Something noteworthy that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    EnemySpawned { enemy: EnemyId, kind: EnemyKind },
    EnemyKilled { enemy: EnemyId, reward: u32 },
    EnemyArrived { enemy: EnemyId },
    ProjectileFired { kind: ProjectileKind, from: Point, to: Point },
    Explosion { at: Point, radius: f64 },
    TowerBuilt { tile: TileCoord, kind: TowerKind },
    TowerSold { tile: TileCoord, refund: u32 },
    TowerUpgraded { tile: TileCoord, level: u8 },
    CollectableDropped { at: Point, value: u32 },
    CollectablePicked { value: u32 },
    PhaseChanged { phase: GamePhase },
}
