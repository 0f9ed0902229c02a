//! Enemy manager: spawning, movement, arrival and death bookkeeping, effects.

use rand_chacha::ChaCha8Rng;

use rampart_core::config::GameConfig;
use rampart_core::constants::SYNERGY_RADIUS;
use rampart_core::deferred::DeferredList;
use rampart_core::enums::{EffectKind, EnemyKind};
use rampart_core::events::SimEvent;
use rampart_core::types::{EnemyId, Point};

use crate::effects::{Effect, EnemyNode};
use crate::enemy::EnemyFactory;
use crate::systems::wave_scheduler::{SpawnSignal, WaveScheduler};
use crate::targeting::Candidate;

#[derive(Debug)]
pub struct EnemyManager {
    enemies: DeferredList<EnemyNode>,
    scheduler: WaveScheduler,
    factory: EnemyFactory,
    path: Vec<Point>,
}

impl EnemyManager {
    pub fn new(config: &GameConfig, path: Vec<Point>) -> Self {
        let spawn_point = path.first().copied().unwrap_or_default();
        Self {
            enemies: DeferredList::new(),
            scheduler: WaveScheduler::new(config.waves.clone(), config.timing),
            factory: EnemyFactory::new(config.enemies, spawn_point),
            path,
        }
    }

    /// Ask the scheduler for the next enemy and add it straight away.
    /// Returns false once no enemies are left to spawn.
    pub fn spawn_enemies(
        &mut self,
        dt: f64,
        rng: &mut ChaCha8Rng,
        events: &mut Vec<SimEvent>,
    ) -> bool {
        match self.scheduler.tick(dt, rng) {
            SpawnSignal::NoneYet => true,
            SpawnSignal::Enemy(kind) => {
                let enemy = self.factory.create(kind);
                let id = enemy.id();
                self.enemies.add(enemy.into());
                events.push(SimEvent::EnemySpawned { enemy: id, kind });
                tracing::debug!(enemy = id.0, ?kind, "enemy spawned");
                true
            }
            SpawnSignal::NoEnemyLeft => false,
        }
    }

    /// Place an enemy at an arbitrary position, bypassing the scheduler.
    /// It still walks the path from its first waypoint onwards.
    pub fn spawn_at(&mut self, kind: EnemyKind, position: Point) -> EnemyId {
        let enemy = self.factory.create_at(kind, position);
        let id = enemy.id();
        self.enemies.add(enemy.into());
        id
    }

    /// Walk every live enemy along the path. Enemies reaching the end and
    /// dead enemies whose death animation finished are removed. Returns the
    /// number of arrivals.
    pub fn move_enemies(&mut self, dt: f64, events: &mut Vec<SimEvent>) -> u32 {
        let path = &self.path;
        let (nodes, stage) = self.enemies.split_mut();
        let mut arrived = 0;
        for node in nodes {
            let id = node.enemy().id();
            if node.enemy().is_alive() {
                node.advance(dt, path);
                if node.enemy().has_arrived() {
                    stage.remove_later(id);
                    events.push(SimEvent::EnemyArrived { enemy: id });
                    arrived += 1;
                }
            } else if node.enemy_mut().tick_death(dt) {
                stage.remove_later(id);
            }
        }
        self.enemies.commit_all();
        arrived
    }

    /// Tick effect timers, apply slowdowns requested by this tick's hits and
    /// re-evaluate leader/escort synergy. Changed nodes are swapped in one
    /// commit so no enemy is ever missing or duplicated.
    pub fn apply_effects(&mut self, dt: f64, slowed: &[EnemyId]) {
        let escorts: Vec<(Point, f64)> = self
            .enemies
            .iter()
            .map(EnemyNode::enemy)
            .filter(|enemy| enemy.is_alive() && enemy.kind().is_escort())
            .map(|enemy| (enemy.position(), f64::from(enemy.base_speed())))
            .collect();
        let radius_sq = SYNERGY_RADIUS * SYNERGY_RADIUS;

        let (nodes, stage) = self.enemies.split_mut();
        for node in nodes {
            let expired = node.tick_effects(dt);
            let enemy = node.enemy();
            let alive = enemy.is_alive();
            let slow = alive && slowed.contains(&enemy.id());
            let position = enemy.position();
            let partner = if alive && enemy.kind().is_leader() {
                escorts
                    .iter()
                    .filter(|(at, _)| at.distance_squared(position) <= radius_sq)
                    .min_by(|a, b| {
                        a.0.distance_squared(position)
                            .total_cmp(&b.0.distance_squared(position))
                    })
                    .map(|&(_, speed)| speed)
            } else {
                None
            };
            let has_synergy = node.has_effect(EffectKind::SynergeticMovement);
            if !expired && !slow && partner.is_some() == has_synergy {
                continue;
            }

            let mut next = node.clone();
            if expired {
                next = next.strip_expired();
            }
            if slow {
                let effect = Effect::slow_down();
                next = next.decorate(effect, effect.default_duration());
            }
            next = match partner {
                Some(partner_speed) if !has_synergy => {
                    next.decorate(Effect::SynergeticMovement { partner_speed }, None)
                }
                None if has_synergy => next.strip(EffectKind::SynergeticMovement),
                _ => next,
            };
            stage.replace_later(next);
        }
        self.enemies.commit_all();
    }

    pub fn enemies(&self) -> &DeferredList<EnemyNode> {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut DeferredList<EnemyNode> {
        &mut self.enemies
    }

    pub fn get(&self, id: EnemyId) -> Option<&EnemyNode> {
        self.enemies.get(id)
    }

    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut EnemyNode> {
        self.enemies.get_mut(id)
    }

    pub fn alive_count(&self) -> usize {
        self.enemies
            .iter()
            .filter(|node| node.enemy().is_alive())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn scheduler(&self) -> &WaveScheduler {
        &self.scheduler
    }

    pub fn path(&self) -> &[Point] {
        &self.path
    }

    /// Live enemies as targeting candidates, ordered by id.
    pub fn live_candidates(&self) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = self
            .enemies
            .iter()
            .map(EnemyNode::enemy)
            .filter(|enemy| enemy.is_alive())
            .map(|enemy| Candidate {
                id: enemy.id(),
                position: enemy.position(),
            })
            .collect();
        candidates.sort_by_key(|candidate| candidate.id);
        candidates
    }

    /// Where a live enemy will be after `secs` more seconds at its current
    /// effective speed.
    pub fn predict_position(&self, id: EnemyId, secs: f64) -> Option<Point> {
        self.enemies
            .get(id)
            .map(|node| node.predict_position(secs, &self.path))
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;
    use rand::SeedableRng;

    use rampart_core::constants::{DT, SLOWDOWN_DURATION, SLOWDOWN_FACTOR, TILE_SIZE};

    use super::*;

    fn manager() -> EnemyManager {
        let config = GameConfig::default();
        let path = vec![DVec2::new(0.0, 32.0), DVec2::new(2_000.0, 32.0)];
        EnemyManager::new(&config, path)
    }

    #[test]
    fn leader_with_escort_gets_synergy_and_loses_it() {
        let mut enemies = manager();
        let knight = enemies.spawn_at(EnemyKind::Knight, DVec2::new(100.0, 32.0));
        let goblin = enemies.spawn_at(EnemyKind::Goblin, DVec2::new(140.0, 32.0));
        let base = enemies.get(knight).unwrap().effective_speed();

        enemies.apply_effects(DT, &[]);
        let node = enemies.get(knight).unwrap();
        assert_eq!(node.effects(), vec![EffectKind::SynergeticMovement]);
        // (40 + 80) / 2
        assert_eq!(node.effective_speed(), 60.0);
        assert!(!enemies.get(goblin).unwrap().is_decorated());
        assert_eq!(enemies.enemies().len(), 2);

        // Still together: still exactly one layer.
        enemies.apply_effects(DT, &[]);
        assert_eq!(enemies.get(knight).unwrap().layers().len(), 1);

        enemies
            .get_mut(goblin)
            .unwrap()
            .enemy_mut()
            .set_position(DVec2::new(100.0 + 2.0 * TILE_SIZE, 32.0));
        enemies.apply_effects(DT, &[]);
        let node = enemies.get(knight).unwrap();
        assert!(!node.is_decorated());
        assert_eq!(node.effective_speed(), base);
        assert_eq!(enemies.enemies().len(), 2);
    }

    #[test]
    fn slowdown_expires_through_the_manager() {
        let mut enemies = manager();
        let goblin = enemies.spawn_at(EnemyKind::Goblin, DVec2::new(0.0, 32.0));
        enemies.apply_effects(DT, &[goblin]);
        assert_eq!(
            enemies.get(goblin).unwrap().effective_speed(),
            80.0 * SLOWDOWN_FACTOR
        );

        let ticks = (SLOWDOWN_DURATION / 0.1) as usize + 2;
        for _ in 0..ticks {
            enemies.apply_effects(0.1, &[]);
        }
        let node = enemies.get(goblin).unwrap();
        assert!(!node.is_decorated());
        assert_eq!(node.effective_speed(), 80.0);
    }

    #[test]
    fn arrivals_are_counted_and_removed() {
        let mut enemies = manager();
        let mut events = Vec::new();
        enemies.spawn_at(EnemyKind::Goblin, DVec2::new(1_990.0, 32.0));
        enemies.spawn_at(EnemyKind::Knight, DVec2::new(0.0, 32.0));
        let arrived = enemies.move_enemies(1.0, &mut events);
        assert_eq!(arrived, 1);
        assert_eq!(enemies.enemies().len(), 1);
        assert!(matches!(events[0], SimEvent::EnemyArrived { .. }));
    }

    #[test]
    fn dead_enemies_linger_then_leave() {
        let mut enemies = manager();
        let mut events = Vec::new();
        let id = enemies.spawn_at(EnemyKind::Goblin, DVec2::new(0.0, 32.0));
        enemies.get_mut(id).unwrap().enemy_mut().apply_damage(1_000.0);
        enemies.move_enemies(0.25, &mut events);
        assert!(enemies.get(id).is_some());
        assert_eq!(enemies.alive_count(), 0);
        enemies.move_enemies(0.25, &mut events);
        assert!(enemies.get(id).is_none());
    }

    #[test]
    fn scheduler_feeds_spawns() {
        let mut enemies = manager();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut events = Vec::new();
        let mut spawned = 0;
        while enemies.spawn_enemies(0.5, &mut rng, &mut events) {
            spawned = enemies.enemies().len();
            assert!(spawned <= 35);
        }
        assert_eq!(spawned as u32, GameConfig::default().total_enemies());
        assert_eq!(enemies.scheduler().emitted(), 35);
    }
}
