//! Tower manager: build, sell and upgrade commands, and firing.

use rand_chacha::ChaCha8Rng;

use rampart_core::config::{PerTower, TowerLevelStats, TowerStats};
use rampart_core::constants::GRAVITY;
use rampart_core::deferred::DeferredList;
use rampart_core::enums::{DamageShape, TileKind, TowerKind};
use rampart_core::error::SimError;
use rampart_core::events::SimEvent;
use rampart_core::types::{IdAllocator, TileCoord, TowerId};

use crate::ballistics;
use crate::economy::Economy;
use crate::map::GameMap;
use crate::projectile::launch_speed;
use crate::systems::enemies::EnemyManager;
use crate::systems::projectiles::ProjectileManager;
use crate::targeting::{self, Candidate};
use crate::tower::Tower;

#[derive(Debug)]
pub struct TowerManager {
    towers: DeferredList<Tower>,
    stats: PerTower<TowerStats>,
    ids: IdAllocator,
}

impl TowerManager {
    pub fn new(stats: PerTower<TowerStats>) -> Self {
        Self {
            towers: DeferredList::new(),
            stats,
            ids: IdAllocator::default(),
        }
    }

    /// Build a level 1 tower on a buildable tile.
    ///
    /// `Err` only for coordinates outside the map; a taken tile or missing
    /// funds give `Ok(false)`.
    pub fn build_tower(
        &mut self,
        map: &mut GameMap,
        economy: &Economy,
        x: i32,
        y: i32,
        kind: TowerKind,
        events: &mut Vec<SimEvent>,
    ) -> Result<bool, SimError> {
        if map.tile(x, y)? != TileKind::Buildable {
            return Ok(false);
        }
        let stats = &self.stats[kind];
        let Some(first) = stats.level(1) else {
            return Ok(false);
        };
        if !economy.try_spend(first.cost) {
            tracing::debug!(x, y, ?kind, cost = first.cost, "not enough gold to build");
            return Ok(false);
        }

        let tile = TileCoord::new(x, y);
        let tower = Tower::new(
            TowerId(self.ids.next()),
            kind,
            tile,
            targeting::strategy_for(stats.targeting),
        );
        map.set_tile(x, y, TileKind::Tower { kind, level: 1 })?;
        self.towers.add(tower);
        events.push(SimEvent::TowerBuilt { tile, kind });
        tracing::info!(x, y, ?kind, "tower built");
        Ok(true)
    }

    /// Sell the tower on a tile for its current level's sell return.
    pub fn sell_tower(
        &mut self,
        map: &mut GameMap,
        economy: &Economy,
        x: i32,
        y: i32,
        events: &mut Vec<SimEvent>,
    ) -> Result<bool, SimError> {
        map.tile(x, y)?;
        let tile = TileCoord::new(x, y);
        let Some(id) = self.tower_at(tile).map(Tower::id) else {
            return Ok(false);
        };
        let Some(tower) = self.towers.remove(id) else {
            return Ok(false);
        };
        let refund = self
            .level_stats(&tower)
            .map_or(0, |stats| stats.sell_return);
        economy.credit(refund);
        map.set_tile(x, y, TileKind::Buildable)?;
        events.push(SimEvent::TowerSold { tile, refund });
        tracing::info!(x, y, refund, "tower sold");
        Ok(true)
    }

    /// Raise the tower on a tile by one level, paying the next level's cost.
    pub fn upgrade_tower(
        &mut self,
        map: &mut GameMap,
        economy: &Economy,
        x: i32,
        y: i32,
        events: &mut Vec<SimEvent>,
    ) -> Result<bool, SimError> {
        map.tile(x, y)?;
        let tile = TileCoord::new(x, y);
        let Some(id) = self.tower_at(tile).map(Tower::id) else {
            return Ok(false);
        };
        let stats = &self.stats;
        let Some(tower) = self.towers.get_mut(id) else {
            return Ok(false);
        };
        let kind = tower.kind();
        if tower.level() >= stats[kind].max_level() {
            return Ok(false);
        }
        let Some(next) = stats[kind].level(tower.level() + 1) else {
            return Ok(false);
        };
        if !economy.try_spend(next.cost) {
            return Ok(false);
        }
        tower.level_up();
        let level = tower.level();
        map.set_tile(x, y, TileKind::Tower { kind, level })?;
        events.push(SimEvent::TowerUpgraded { tile, level });
        tracing::info!(x, y, level, "tower upgraded");
        Ok(true)
    }

    /// Let every ready tower pick a target in range and fire at it.
    pub fn create_projectiles(
        &mut self,
        dt: f64,
        enemies: &EnemyManager,
        projectiles: &mut ProjectileManager,
        rng: &mut ChaCha8Rng,
        events: &mut Vec<SimEvent>,
    ) {
        let alive = enemies.live_candidates();
        let stats = &self.stats;
        for tower in self.towers.iter_mut() {
            if !tower.tick_cooldown(dt) {
                continue;
            }
            let Some(level) = stats[tower.kind()].level(tower.level()) else {
                continue;
            };
            let origin = tower.position();
            let range_sq = level.range * level.range;
            let in_range: Vec<Candidate> = alive
                .iter()
                .filter(|candidate| candidate.position.distance_squared(origin) <= range_sq)
                .copied()
                .collect();
            let Some(target) = tower.targeting().select(&in_range, &alive, rng) else {
                continue;
            };

            let projectile = tower.kind().projectile();
            let aim = match projectile.shape() {
                DamageShape::Point => target.position,
                DamageShape::Area => {
                    let flight =
                        ballistics::solve(origin, target.position, launch_speed(projectile), GRAVITY)
                            .flight_time;
                    enemies
                        .predict_position(target.id, flight)
                        .unwrap_or(target.position)
                }
            };
            projectiles.launch(tower.kind(), tower.level(), origin, aim, target.id, events);
            tower.reset_cooldown(level.attack_interval);
        }
    }

    pub fn towers(&self) -> &DeferredList<Tower> {
        &self.towers
    }

    pub fn tower_at(&self, tile: TileCoord) -> Option<&Tower> {
        self.towers.iter().find(|tower| tower.tile() == tile)
    }

    pub fn level_stats(&self, tower: &Tower) -> Option<&TowerLevelStats> {
        self.stats[tower.kind()].level(tower.level())
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;
    use rand::SeedableRng;

    use rampart_core::config::GameConfig;

    use super::*;

    struct Fixture {
        map: GameMap,
        economy: Economy,
        towers: TowerManager,
        events: Vec<SimEvent>,
    }

    fn fixture(gold: u32) -> Fixture {
        let config = GameConfig::default();
        Fixture {
            map: GameMap::from_layout(&config.map).unwrap(),
            economy: Economy::new(gold, 10),
            towers: TowerManager::new(config.towers),
            events: Vec::new(),
        }
    }

    #[test]
    fn build_needs_buildable_tile_and_funds() {
        let mut f = fixture(1_000);
        // Path tile.
        assert_eq!(
            f.towers
                .build_tower(&mut f.map, &f.economy, 0, 1, TowerKind::Archer, &mut f.events),
            Ok(false)
        );
        assert_eq!(
            f.towers
                .build_tower(&mut f.map, &f.economy, 99, 1, TowerKind::Archer, &mut f.events),
            Err(SimError::TileOutOfBounds { x: 99, y: 1 })
        );
        assert_eq!(
            f.towers
                .build_tower(&mut f.map, &f.economy, 4, 3, TowerKind::Archer, &mut f.events),
            Ok(true)
        );
        assert_eq!(f.economy.gold(), 950);
        // Occupied now.
        assert_eq!(
            f.towers
                .build_tower(&mut f.map, &f.economy, 4, 3, TowerKind::Mage, &mut f.events),
            Ok(false)
        );
        assert_eq!(
            f.map.tile(4, 3),
            Ok(TileKind::Tower {
                kind: TowerKind::Archer,
                level: 1
            })
        );
    }

    #[test]
    fn sell_refunds_current_level() {
        let mut f = fixture(1_000);
        f.towers
            .build_tower(&mut f.map, &f.economy, 4, 3, TowerKind::Archer, &mut f.events)
            .unwrap();
        assert_eq!(
            f.towers.upgrade_tower(&mut f.map, &f.economy, 4, 3, &mut f.events),
            Ok(true)
        );
        assert_eq!(f.economy.gold(), 1_000 - 50 - 40);
        assert_eq!(
            f.towers.sell_tower(&mut f.map, &f.economy, 4, 3, &mut f.events),
            Ok(true)
        );
        assert_eq!(f.economy.gold(), 1_000 - 50 - 40 + 60);
        assert_eq!(f.map.tile(4, 3), Ok(TileKind::Buildable));
        assert!(f.towers.towers().is_empty());
        assert_eq!(
            f.towers.sell_tower(&mut f.map, &f.economy, 4, 3, &mut f.events),
            Ok(false)
        );
    }

    #[test]
    fn upgrade_stops_at_max_level() {
        let mut f = fixture(1_000);
        f.towers
            .build_tower(&mut f.map, &f.economy, 4, 3, TowerKind::Mage, &mut f.events)
            .unwrap();
        assert_eq!(
            f.towers.upgrade_tower(&mut f.map, &f.economy, 4, 3, &mut f.events),
            Ok(true)
        );
        assert_eq!(
            f.towers.upgrade_tower(&mut f.map, &f.economy, 4, 3, &mut f.events),
            Ok(true)
        );
        let gold = f.economy.gold();
        assert_eq!(
            f.towers.upgrade_tower(&mut f.map, &f.economy, 4, 3, &mut f.events),
            Ok(false)
        );
        assert_eq!(f.economy.gold(), gold);
        assert_eq!(
            f.map.tile(4, 3),
            Ok(TileKind::Tower {
                kind: TowerKind::Mage,
                level: 3
            })
        );
    }

    #[test]
    fn upgrade_without_funds_is_refused() {
        let mut f = fixture(50);
        f.towers
            .build_tower(&mut f.map, &f.economy, 4, 3, TowerKind::Archer, &mut f.events)
            .unwrap();
        assert_eq!(
            f.towers.upgrade_tower(&mut f.map, &f.economy, 4, 3, &mut f.events),
            Ok(false)
        );
        assert_eq!(f.towers.tower_at(TileCoord::new(4, 3)).unwrap().level(), 1);
    }

    #[test]
    fn ready_tower_fires_at_enemy_in_range() {
        let config = GameConfig::default();
        let mut f = fixture(1_000);
        let mut enemies = EnemyManager::new(&config, f.map.path().to_vec());
        let mut projectiles = ProjectileManager::default();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        f.towers
            .build_tower(&mut f.map, &f.economy, 4, 3, TowerKind::Archer, &mut f.events)
            .unwrap();

        // Nobody in range yet.
        f.towers
            .create_projectiles(0.1, &enemies, &mut projectiles, &mut rng, &mut f.events);
        assert!(projectiles.projectiles().is_empty());

        let near = TileCoord::new(4, 3).center() + DVec2::new(0.0, -64.0);
        enemies.spawn_at(rampart_core::enums::EnemyKind::Goblin, near);
        f.towers
            .create_projectiles(0.1, &enemies, &mut projectiles, &mut rng, &mut f.events);
        assert_eq!(projectiles.projectiles().len(), 1);

        // Cooling down.
        f.towers
            .create_projectiles(0.1, &enemies, &mut projectiles, &mut rng, &mut f.events);
        assert_eq!(projectiles.projectiles().len(), 1);
        let tower = f.towers.tower_at(TileCoord::new(4, 3)).unwrap();
        assert!((tower.cooldown() - 0.7).abs() < 1e-9);
    }
}
