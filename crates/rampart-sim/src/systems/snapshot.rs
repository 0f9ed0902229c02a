//! Snapshot system: builds a complete GameStateSnapshot from the managers.
//!
//! Read-only apart from the drained event buffer.

use rampart_core::enums::GamePhase;
use rampart_core::events::SimEvent;
use rampart_core::state::*;
use rampart_core::types::SimTime;

use crate::economy::Economy;
use crate::systems::collectables::CollectableManager;
use crate::systems::enemies::EnemyManager;
use crate::systems::projectiles::ProjectileManager;
use crate::systems::towers::TowerManager;

#[allow(clippy::too_many_arguments)]
pub fn build_snapshot(
    time: &SimTime,
    phase: GamePhase,
    game_speed: f64,
    economy: &Economy,
    enemies: &EnemyManager,
    towers: &TowerManager,
    projectiles: &ProjectileManager,
    collectables: &CollectableManager,
    events: Vec<SimEvent>,
) -> GameStateSnapshot {
    GameStateSnapshot {
        time: *time,
        phase,
        game_speed,
        gold: economy.gold(),
        health: economy.health(),
        wave: build_wave(enemies),
        enemies: build_enemies(enemies),
        towers: build_towers(towers),
        projectiles: build_projectiles(projectiles),
        collectables: build_collectables(collectables),
        events,
    }
}

fn build_wave(enemies: &EnemyManager) -> WaveView {
    let scheduler = enemies.scheduler();
    WaveView {
        wave_index: scheduler.wave_index(),
        wave_count: scheduler.wave_count(),
        enemies_emitted: scheduler.emitted(),
        enemies_total: scheduler.total(),
        finished_spawning: scheduler.is_finished(),
    }
}

fn build_enemies(enemies: &EnemyManager) -> Vec<EnemyView> {
    enemies
        .enemies()
        .iter()
        .map(|node| {
            let enemy = node.enemy();
            EnemyView {
                id: enemy.id(),
                kind: enemy.kind(),
                position: enemy.position(),
                health: enemy.health(),
                max_health: enemy.max_health(),
                alive: enemy.is_alive(),
                effective_speed: node.effective_speed(),
                effects: node.effects(),
            }
        })
        .collect()
}

fn build_towers(towers: &TowerManager) -> Vec<TowerView> {
    towers
        .towers()
        .iter()
        .map(|tower| TowerView {
            id: tower.id(),
            kind: tower.kind(),
            tile: tower.tile(),
            level: tower.level(),
            range: towers.level_stats(tower).map_or(0.0, |stats| stats.range),
            cooldown: tower.cooldown(),
        })
        .collect()
}

fn build_projectiles(projectiles: &ProjectileManager) -> Vec<ProjectileView> {
    projectiles
        .projectiles()
        .iter()
        .map(|projectile| ProjectileView {
            id: projectile.id(),
            kind: projectile.kind(),
            state: projectile.state(),
            position: projectile.position(),
            target: projectile.target(),
        })
        .collect()
}

fn build_collectables(collectables: &CollectableManager) -> Vec<CollectableView> {
    collectables
        .collectables()
        .iter()
        .map(|item| CollectableView {
            id: item.id(),
            position: item.position(),
            value: item.value(),
            remaining_secs: item.remaining(),
        })
        .collect()
}
