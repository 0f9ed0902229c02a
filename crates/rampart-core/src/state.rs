//! Game state snapshot: the read-only view handed to the renderer each tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::SimEvent;
use crate::types::{CollectableId, EnemyId, Point, ProjectileId, SimTime, TileCoord, TowerId};

/// Complete visible state after a tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub game_speed: f64,
    pub gold: u32,
    pub health: u32,
    pub wave: WaveView,
    pub enemies: Vec<EnemyView>,
    pub towers: Vec<TowerView>,
    pub projectiles: Vec<ProjectileView>,
    pub collectables: Vec<CollectableView>,
    pub events: Vec<SimEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub position: Point,
    pub health: f64,
    pub max_health: f64,
    pub alive: bool,
    /// Speed after effects (world units per second).
    pub effective_speed: f64,
    pub effects: Vec<EffectKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowerView {
    pub id: TowerId,
    pub kind: TowerKind,
    pub tile: TileCoord,
    pub level: u8,
    pub range: f64,
    /// Seconds until the tower can fire again.
    pub cooldown: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: ProjectileId,
    pub kind: ProjectileKind,
    pub state: ProjectileState,
    pub position: Point,
    pub target: Point,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectableView {
    pub id: CollectableId,
    pub position: Point,
    pub value: u32,
    pub remaining_secs: f64,
}

/// Wave progress for the HUD.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveView {
    /// Zero-based index of the wave being spawned.
    pub wave_index: usize,
    pub wave_count: usize,
    pub enemies_emitted: u32,
    pub enemies_total: u32,
    pub finished_spawning: bool,
}
