//! Collision engine: projectile hits, explosions and reward accounting.

use std::sync::Arc;

use rampart_core::config::GameConfig;
use rampart_core::deferred::DeferredList;
use rampart_core::enums::{DamageShape, ProjectileState};
use rampart_core::events::SimEvent;
use rampart_core::types::{EnemyId, Point};

use crate::effects::EnemyNode;
use crate::enemy::DamageOutcome;
use crate::projectile::Projectile;

/// What one resolution pass produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Kill rewards earned.
    pub gold: u32,
    /// Enemies killed, with where they died.
    pub kills: Vec<(EnemyId, Point)>,
    /// Enemies hit by a slowing projectile that survived.
    pub slowed: Vec<EnemyId>,
}

impl CollisionReport {
    pub fn merge(&mut self, other: CollisionReport) {
        self.gold = self.gold.saturating_add(other.gold);
        self.kills.extend(other.kills);
        self.slowed.extend(other.slowed);
    }
}

#[derive(Debug, Clone)]
pub struct CollisionEngine {
    config: Arc<GameConfig>,
}

impl CollisionEngine {
    pub fn new(config: Arc<GameConfig>) -> Self {
        Self { config }
    }

    /// Resolve point projectiles.
    ///
    /// A projectile about to reach its target point this tick
    /// (`distance_to_target < dt * speed`) hits its target enemy if that
    /// enemy is still alive. Otherwise it hits the nearest live enemy within
    /// its hit radius, lower id first on ties. One enemy per projectile.
    pub fn resolve_collisions(
        &self,
        dt: f64,
        projectiles: &mut DeferredList<Projectile>,
        enemies: &mut DeferredList<EnemyNode>,
        events: &mut Vec<SimEvent>,
    ) -> CollisionReport {
        let mut report = CollisionReport::default();
        let (shots, stage) = projectiles.split_mut();
        for shot in shots {
            if shot.shape() != DamageShape::Point {
                continue;
            }
            match shot.state() {
                ProjectileState::Active => {}
                ProjectileState::Stopped | ProjectileState::Dead => {
                    stage.remove_later(shot.id());
                    continue;
                }
                ProjectileState::Moving => continue,
            }

            let forced = shot.distance_to_target() < dt * shot.speed();
            let victim = shot
                .target_enemy()
                .filter(|&id| forced && is_alive(enemies, id))
                .or_else(|| nearest_alive(enemies, shot.position(), shot.hit_radius()));

            match victim {
                Some(id) => {
                    if let Some(node) = enemies.get_mut(id) {
                        self.hit(shot, node, &mut report, events);
                    }
                    shot.mark_dead();
                    stage.remove_later(shot.id());
                }
                None if shot.reached_target() => {
                    shot.mark_stopped();
                    stage.remove_later(shot.id());
                }
                None => {}
            }
        }
        projectiles.commit_all();
        report
    }

    /// Detonate landed shells: every live enemy within the blast radius
    /// takes damage.
    pub fn resolve_explosions(
        &self,
        projectiles: &mut DeferredList<Projectile>,
        enemies: &mut DeferredList<EnemyNode>,
        events: &mut Vec<SimEvent>,
    ) -> CollisionReport {
        let mut report = CollisionReport::default();
        let (shells, stage) = projectiles.split_mut();
        for shell in shells {
            if shell.shape() != DamageShape::Area {
                continue;
            }
            match shell.state() {
                ProjectileState::Active => {}
                ProjectileState::Stopped | ProjectileState::Dead => {
                    stage.remove_later(shell.id());
                    continue;
                }
                ProjectileState::Moving => continue,
            }

            let center = shell.position();
            let radius_sq = shell.area_radius() * shell.area_radius();
            for node in enemies.iter_mut() {
                let enemy = node.enemy();
                if enemy.is_alive() && enemy.position().distance_squared(center) <= radius_sq {
                    self.hit(shell, node, &mut report, events);
                }
            }
            events.push(SimEvent::Explosion {
                at: center,
                radius: shell.area_radius(),
            });
            shell.mark_dead();
            stage.remove_later(shell.id());
        }
        projectiles.commit_all();
        report
    }

    fn hit(
        &self,
        shot: &Projectile,
        node: &mut EnemyNode,
        report: &mut CollisionReport,
        events: &mut Vec<SimEvent>,
    ) {
        let enemy = node.enemy_mut();
        let damage = self
            .config
            .damage(shot.tower_kind(), enemy.kind(), shot.tower_level());
        match enemy.apply_damage(damage) {
            DamageOutcome::Killed { reward } => {
                report.gold = report.gold.saturating_add(reward);
                report.kills.push((enemy.id(), enemy.position()));
                events.push(SimEvent::EnemyKilled {
                    enemy: enemy.id(),
                    reward,
                });
                tracing::debug!(enemy = enemy.id().0, reward, "enemy killed");
            }
            DamageOutcome::Hit if shot.kind().slows() => report.slowed.push(enemy.id()),
            DamageOutcome::Hit | DamageOutcome::Ignored => {}
        }
    }
}

fn is_alive(enemies: &DeferredList<EnemyNode>, id: EnemyId) -> bool {
    enemies.get(id).is_some_and(|node| node.enemy().is_alive())
}

fn nearest_alive(enemies: &DeferredList<EnemyNode>, at: Point, radius: f64) -> Option<EnemyId> {
    let radius_sq = radius * radius;
    enemies
        .iter()
        .map(EnemyNode::enemy)
        .filter(|enemy| enemy.is_alive())
        .map(|enemy| (enemy.id(), enemy.position().distance_squared(at)))
        .filter(|&(_, dist_sq)| dist_sq <= radius_sq)
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use rampart_core::config::EnemyStats;
    use rampart_core::constants::DT;
    use rampart_core::enums::{EnemyKind, TowerKind};
    use rampart_core::types::ProjectileId;

    use super::*;
    use crate::enemy::Enemy;

    fn engine() -> CollisionEngine {
        CollisionEngine::new(Arc::new(GameConfig::default()))
    }

    fn enemy(id: u32, kind: EnemyKind, health: f64, at: Point) -> EnemyNode {
        let stats = EnemyStats {
            health,
            speed: 40,
            reward: 20,
        };
        Enemy::new(EnemyId(id), kind, &stats, at).into()
    }

    fn arrow(origin: Point, target: Point, enemy: Option<EnemyId>) -> Projectile {
        Projectile::aimed(ProjectileId(0), TowerKind::Archer, 1, origin, target, enemy)
    }

    #[test]
    fn point_hit_kills_and_pays() {
        let mut enemies: DeferredList<EnemyNode> =
            [enemy(1, EnemyKind::Goblin, 5.0, DVec2::new(0.5, 0.0))].into_iter().collect();
        // Aimed away from the enemy so only the radius check can hit.
        let shot = arrow(DVec2::ZERO, DVec2::new(0.0, 500.0), None).with_hit_radius(1.0);
        let mut projectiles: DeferredList<Projectile> = [shot].into_iter().collect();
        let mut events = Vec::new();

        let report = engine().resolve_collisions(DT, &mut projectiles, &mut enemies, &mut events);
        assert!(projectiles.is_empty());
        let target = enemies.get(EnemyId(1)).unwrap().enemy();
        assert_eq!(target.health(), 0.0);
        assert!(!target.is_alive());
        assert_eq!(report.gold, 20);
        assert_eq!(report.kills, vec![(EnemyId(1), DVec2::new(0.5, 0.0))]);
    }

    #[test]
    fn surviving_magic_hit_requests_slowdown() {
        let mut enemies: DeferredList<EnemyNode> =
            [enemy(1, EnemyKind::Knight, 500.0, DVec2::ZERO)].into_iter().collect();
        let bolt = Projectile::aimed(
            ProjectileId(0),
            TowerKind::Mage,
            1,
            DVec2::ZERO,
            DVec2::new(100.0, 0.0),
            None,
        );
        let mut projectiles: DeferredList<Projectile> = [bolt].into_iter().collect();
        let report =
            engine().resolve_collisions(DT, &mut projectiles, &mut enemies, &mut Vec::new());
        assert_eq!(report.slowed, vec![EnemyId(1)]);
        assert_eq!(report.gold, 0);
        assert_eq!(enemies.get(EnemyId(1)).unwrap().enemy().health(), 500.0 - 24.0);
    }

    #[test]
    fn forced_hit_on_target_about_to_be_reached() {
        let target_at = DVec2::new(300.0, 0.0);
        let mut enemies: DeferredList<EnemyNode> = [
            enemy(1, EnemyKind::Goblin, 100.0, target_at),
            enemy(2, EnemyKind::Goblin, 100.0, DVec2::new(3.0, 0.0)),
        ]
        .into_iter()
        .collect();
        // Two pixels short of the target point, with enemy 2 inside the hit radius.
        let mut shot = arrow(DVec2::new(2.0, 0.0), DVec2::new(4.0, 0.0), Some(EnemyId(1)));
        shot = shot.with_hit_radius(16.0);
        let mut projectiles: DeferredList<Projectile> = [shot].into_iter().collect();
        engine().resolve_collisions(DT, &mut projectiles, &mut enemies, &mut Vec::new());
        assert_eq!(enemies.get(EnemyId(1)).unwrap().enemy().health(), 80.0);
        assert_eq!(enemies.get(EnemyId(2)).unwrap().enemy().health(), 100.0);
    }

    #[test]
    fn nearest_enemy_wins_then_lower_id() {
        let mut enemies: DeferredList<EnemyNode> = [
            enemy(5, EnemyKind::Goblin, 100.0, DVec2::new(8.0, 0.0)),
            enemy(3, EnemyKind::Goblin, 100.0, DVec2::new(-8.0, 0.0)),
            enemy(4, EnemyKind::Goblin, 100.0, DVec2::new(12.0, 0.0)),
        ]
        .into_iter()
        .collect();
        let shot = arrow(DVec2::ZERO, DVec2::new(0.0, 500.0), None);
        let mut projectiles: DeferredList<Projectile> = [shot].into_iter().collect();
        engine().resolve_collisions(DT, &mut projectiles, &mut enemies, &mut Vec::new());
        assert_eq!(enemies.get(EnemyId(3)).unwrap().enemy().health(), 80.0);
        assert_eq!(enemies.get(EnemyId(5)).unwrap().enemy().health(), 100.0);
        assert_eq!(enemies.get(EnemyId(4)).unwrap().enemy().health(), 100.0);
    }

    #[test]
    fn miss_at_target_point_stops_projectile() {
        let mut enemies: DeferredList<EnemyNode> =
            [enemy(1, EnemyKind::Goblin, 100.0, DVec2::new(500.0, 500.0))].into_iter().collect();
        let target = DVec2::new(10.0, 0.0);
        let mut shot = arrow(DVec2::ZERO, target, None);
        shot.advance(1.0);
        assert_eq!(shot.position(), target);
        let mut projectiles: DeferredList<Projectile> = [shot].into_iter().collect();
        let report =
            engine().resolve_collisions(DT, &mut projectiles, &mut enemies, &mut Vec::new());
        assert!(projectiles.is_empty());
        assert_eq!(report, CollisionReport::default());
    }

    #[test]
    fn explosion_damages_everything_in_radius() {
        let mut enemies: DeferredList<EnemyNode> = [
            enemy(1, EnemyKind::Goblin, 30.0, DVec2::new(210.0, 200.0)),
            enemy(2, EnemyKind::Knight, 100.0, DVec2::new(200.0, 250.0)),
            enemy(3, EnemyKind::Goblin, 100.0, DVec2::new(400.0, 200.0)),
        ]
        .into_iter()
        .collect();
        let mut shell = Projectile::aimed(
            ProjectileId(0),
            TowerKind::Artillery,
            1,
            DVec2::new(0.0, 200.0),
            DVec2::new(200.0, 200.0),
            None,
        );
        let mut projectiles: DeferredList<Projectile> = DeferredList::new();
        let mut events = Vec::new();

        // In flight: nothing happens.
        shell.advance(shell.flight_time() / 2.0);
        projectiles.add(shell);
        let report = engine().resolve_explosions(&mut projectiles, &mut enemies, &mut events);
        assert_eq!(report, CollisionReport::default());
        assert_eq!(projectiles.len(), 1);

        for shell in projectiles.iter_mut() {
            shell.advance(10.0);
        }
        let report = engine().resolve_explosions(&mut projectiles, &mut enemies, &mut events);
        assert!(projectiles.is_empty());
        assert_eq!(report.kills.len(), 1);
        assert_eq!(report.gold, 20);
        assert_eq!(enemies.get(EnemyId(2)).unwrap().enemy().health(), 60.0);
        assert_eq!(enemies.get(EnemyId(3)).unwrap().enemy().health(), 100.0);
        assert!(events
            .iter()
            .any(|e| matches!(e, SimEvent::Explosion { .. })));
    }
}
