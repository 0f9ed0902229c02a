//! Enemies: one entity type parameterised by [`EnemyKind`] and its stat row.

use rampart_core::config::{EnemyStats, PerEnemy};
use rampart_core::constants::{DEATH_LINGER_SECS, WAYPOINT_EPSILON};
use rampart_core::enums::EnemyKind;
use rampart_core::types::{EnemyId, IdAllocator, Point};

/// Result of applying damage to an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// The enemy was already dead; nothing changed.
    Ignored,
    Hit,
    /// This hit was the killing blow.
    Killed { reward: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    health: f64,
    max_health: f64,
    position: Point,
    base_speed: u32,
    reward: u32,
    alive: bool,
    arrived: bool,
    /// Index of the waypoint the enemy is walking towards.
    next_waypoint: usize,
    /// Seconds of death animation left once dead.
    death_linger: f64,
}

impl Enemy {
    pub fn new(id: EnemyId, kind: EnemyKind, stats: &EnemyStats, position: Point) -> Self {
        Self {
            id,
            kind,
            health: stats.health,
            max_health: stats.health,
            position,
            base_speed: stats.speed,
            reward: stats.reward,
            alive: true,
            arrived: false,
            next_waypoint: 1,
            death_linger: DEATH_LINGER_SECS,
        }
    }

    pub fn id(&self) -> EnemyId {
        self.id
    }

    pub fn kind(&self) -> EnemyKind {
        self.kind
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn max_health(&self) -> f64 {
        self.max_health
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn base_speed(&self) -> u32 {
        self.base_speed
    }

    pub fn reward(&self) -> u32 {
        self.reward
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn has_arrived(&self) -> bool {
        self.arrived
    }

    /// Subtract `amount` from health, clamped at zero. The transition to dead
    /// happens at most once.
    pub fn apply_damage(&mut self, amount: f64) -> DamageOutcome {
        if !self.alive {
            return DamageOutcome::Ignored;
        }
        self.health = (self.health - amount.max(0.0)).max(0.0);
        if self.health > 0.0 {
            return DamageOutcome::Hit;
        }
        self.alive = false;
        self.death_linger = DEATH_LINGER_SECS;
        DamageOutcome::Killed {
            reward: self.reward,
        }
    }

    /// Walk along `path` at `speed` world units per second. `speed` comes from
    /// the effect chain, so the base speed is never touched.
    pub fn advance(&mut self, speed: f64, dt: f64, path: &[Point]) {
        if !self.alive || self.arrived {
            return;
        }
        let mut budget = speed.max(0.0) * dt;
        while let Some(&waypoint) = path.get(self.next_waypoint) {
            let to = waypoint - self.position;
            let dist = to.length();
            if dist <= budget + WAYPOINT_EPSILON {
                self.position = waypoint;
                budget = (budget - dist).max(0.0);
                self.next_waypoint += 1;
            } else {
                self.position += to / dist * budget;
                return;
            }
        }
        self.arrived = true;
    }

    /// Position after walking `secs` more seconds at `speed`, without moving.
    pub fn predict_position(&self, speed: f64, secs: f64, path: &[Point]) -> Point {
        let mut ghost = self.clone();
        ghost.advance(speed, secs, path);
        ghost.position
    }

    /// Count down the death animation. Returns true once it has finished.
    pub fn tick_death(&mut self, dt: f64) -> bool {
        if self.alive {
            return false;
        }
        self.death_linger -= dt;
        self.death_linger <= 0.0
    }
}

/// Builds enemies from the per-kind stat table, placed at the path start.
#[derive(Debug, Clone)]
pub struct EnemyFactory {
    stats: PerEnemy<EnemyStats>,
    spawn_point: Point,
    ids: IdAllocator,
}

impl EnemyFactory {
    pub fn new(stats: PerEnemy<EnemyStats>, spawn_point: Point) -> Self {
        Self {
            stats,
            spawn_point,
            ids: IdAllocator::default(),
        }
    }

    pub fn create(&mut self, kind: EnemyKind) -> Enemy {
        self.create_at(kind, self.spawn_point)
    }

    pub fn create_at(&mut self, kind: EnemyKind, position: Point) -> Enemy {
        let id = EnemyId(self.ids.next());
        Enemy::new(id, kind, &self.stats[kind], position)
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn goblin() -> Enemy {
        let stats = EnemyStats {
            health: 60.0,
            speed: 80,
            reward: 8,
        };
        Enemy::new(EnemyId(0), EnemyKind::Goblin, &stats, DVec2::ZERO)
    }

    #[test]
    fn health_never_negative_and_dies_once() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..50 {
            let mut enemy = goblin();
            let mut kills = 0;
            for _ in 0..20 {
                let outcome = enemy.apply_damage(rng.gen_range(0.0..40.0));
                assert!(enemy.health() >= 0.0);
                if matches!(outcome, DamageOutcome::Killed { .. }) {
                    kills += 1;
                }
            }
            assert_eq!(kills, 1);
            assert!(!enemy.is_alive());
            assert_eq!(enemy.health(), 0.0);
        }
    }

    #[test]
    fn overkill_reports_reward_once() {
        let mut enemy = goblin();
        assert_eq!(
            enemy.apply_damage(1_000.0),
            DamageOutcome::Killed { reward: 8 }
        );
        assert_eq!(enemy.apply_damage(1.0), DamageOutcome::Ignored);
    }

    #[test]
    fn walks_waypoints_and_arrives() {
        let path = [
            DVec2::ZERO,
            DVec2::new(100.0, 0.0),
            DVec2::new(100.0, 100.0),
        ];
        let mut enemy = goblin();
        enemy.advance(80.0, 1.0, &path);
        assert_eq!(enemy.position(), DVec2::new(80.0, 0.0));
        // Corner is turned within one step.
        enemy.advance(80.0, 0.5, &path);
        assert!(enemy.position().distance(DVec2::new(100.0, 20.0)) < 1e-9);
        assert!(!enemy.has_arrived());
        enemy.advance(80.0, 2.0, &path);
        assert_eq!(enemy.position(), DVec2::new(100.0, 100.0));
        assert!(enemy.has_arrived());
        assert_eq!(enemy.base_speed(), 80);
    }

    #[test]
    fn dead_enemies_do_not_move_and_linger() {
        let path = [DVec2::ZERO, DVec2::new(100.0, 0.0)];
        let mut enemy = goblin();
        enemy.apply_damage(60.0);
        enemy.advance(80.0, 1.0, &path);
        assert_eq!(enemy.position(), DVec2::ZERO);
        assert!(!enemy.tick_death(DEATH_LINGER_SECS / 2.0));
        assert!(enemy.tick_death(DEATH_LINGER_SECS / 2.0));
    }

    #[test]
    fn prediction_does_not_move() {
        let path = [DVec2::ZERO, DVec2::new(100.0, 0.0)];
        let enemy = goblin();
        assert_eq!(
            enemy.predict_position(80.0, 0.5, &path),
            DVec2::new(40.0, 0.0)
        );
        assert_eq!(enemy.position(), DVec2::ZERO);
    }

    #[test]
    fn factory_assigns_fresh_ids() {
        let mut factory = EnemyFactory::new(
            PerEnemy {
                goblin: EnemyStats {
                    health: 1.0,
                    speed: 1,
                    reward: 1,
                },
                knight: EnemyStats {
                    health: 2.0,
                    speed: 2,
                    reward: 2,
                },
            },
            DVec2::new(5.0, 5.0),
        );
        let a = factory.create(EnemyKind::Goblin);
        let b = factory.create(EnemyKind::Knight);
        assert_ne!(a.id(), b.id());
        assert_eq!(b.max_health(), 2.0);
        assert_eq!(a.position(), DVec2::new(5.0, 5.0));
    }
}
