//! Projectiles fired by towers.
//!
//! Point projectiles (arrows, magic bolts) fly straight at a fixed speed and
//! hit the first enemy they touch. Area projectiles (artillery shells) follow
//! a ballistic arc, are harmless in flight and explode on landing.

use glam::DVec2;

use rampart_core::constants::{
    ARROW_SPEED, ARTILLERY_AREA_RADIUS, ARTILLERY_SPEED, GRAVITY, MAGIC_SPEED, POINT_HIT_RADIUS,
    PROJECTILE_LIFETIME, WAYPOINT_EPSILON,
};
use rampart_core::deferred::Keyed;
use rampart_core::enums::{DamageShape, ProjectileKind, ProjectileState, TowerKind};
use rampart_core::types::{EnemyId, Point, ProjectileId};

use crate::ballistics;

/// Launch speed in world units per second.
pub fn launch_speed(kind: ProjectileKind) -> f64 {
    match kind {
        ProjectileKind::Arrow => ARROW_SPEED,
        ProjectileKind::Magic => MAGIC_SPEED,
        ProjectileKind::Artillery => ARTILLERY_SPEED,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    id: ProjectileId,
    kind: ProjectileKind,
    tower_kind: TowerKind,
    tower_level: u8,
    state: ProjectileState,
    origin: Point,
    position: Point,
    velocity: DVec2,
    target: Point,
    target_enemy: Option<EnemyId>,
    speed: f64,
    hit_radius: f64,
    area_radius: f64,
    elapsed: f64,
    /// Time of flight for ballistic shells.
    flight_time: f64,
}

impl Projectile {
    /// Aim a projectile from `origin` at `target`.
    pub fn aimed(
        id: ProjectileId,
        tower_kind: TowerKind,
        tower_level: u8,
        origin: Point,
        target: Point,
        target_enemy: Option<EnemyId>,
    ) -> Self {
        let kind = tower_kind.projectile();
        let speed = launch_speed(kind);
        let (state, velocity, flight_time) = match kind.shape() {
            DamageShape::Point => {
                let dir = (target - origin).normalize_or_zero();
                (ProjectileState::Active, dir * speed, origin.distance(target) / speed)
            }
            DamageShape::Area => {
                let solution = ballistics::solve(origin, target, speed, GRAVITY);
                (ProjectileState::Moving, solution.velocity, solution.flight_time)
            }
        };
        Self {
            id,
            kind,
            tower_kind,
            tower_level,
            state,
            origin,
            position: origin,
            velocity,
            target,
            target_enemy,
            speed,
            hit_radius: POINT_HIT_RADIUS,
            area_radius: ARTILLERY_AREA_RADIUS,
            elapsed: 0.0,
            flight_time,
        }
    }

    pub fn with_hit_radius(mut self, radius: f64) -> Self {
        self.hit_radius = radius;
        self
    }

    pub fn id(&self) -> ProjectileId {
        self.id
    }

    pub fn kind(&self) -> ProjectileKind {
        self.kind
    }

    pub fn shape(&self) -> DamageShape {
        self.kind.shape()
    }

    pub fn tower_kind(&self) -> TowerKind {
        self.tower_kind
    }

    pub fn tower_level(&self) -> u8 {
        self.tower_level
    }

    pub fn state(&self) -> ProjectileState {
        self.state
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    pub fn target(&self) -> Point {
        self.target
    }

    pub fn target_enemy(&self) -> Option<EnemyId> {
        self.target_enemy
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn hit_radius(&self) -> f64 {
        self.hit_radius
    }

    pub fn area_radius(&self) -> f64 {
        self.area_radius
    }

    pub fn flight_time(&self) -> f64 {
        self.flight_time
    }

    pub fn distance_to_target(&self) -> f64 {
        self.position.distance(self.target)
    }

    pub fn reached_target(&self) -> bool {
        self.distance_to_target() <= WAYPOINT_EPSILON
    }

    pub fn mark_stopped(&mut self) {
        self.state = ProjectileState::Stopped;
    }

    pub fn mark_dead(&mut self) {
        self.state = ProjectileState::Dead;
    }

    /// Advance by `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        if matches!(self.state, ProjectileState::Stopped | ProjectileState::Dead) {
            return;
        }
        self.elapsed += dt;
        match self.shape() {
            DamageShape::Point => {
                if self.distance_to_target() <= self.speed * dt {
                    self.position = self.target;
                } else {
                    self.position += self.velocity * dt;
                }
                if self.elapsed >= PROJECTILE_LIFETIME {
                    self.state = ProjectileState::Dead;
                }
            }
            DamageShape::Area => {
                if self.elapsed >= self.flight_time {
                    self.position = self.target;
                    self.state = ProjectileState::Active;
                } else {
                    self.position =
                        ballistics::position_at(self.origin, self.velocity, GRAVITY, self.elapsed);
                }
            }
        }
    }
}

impl Keyed for Projectile {
    type Key = ProjectileId;

    fn key(&self) -> ProjectileId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_flies_straight_and_snaps_to_target() {
        let target = DVec2::new(100.0, 0.0);
        let mut arrow = Projectile::aimed(
            ProjectileId(0),
            TowerKind::Archer,
            1,
            DVec2::ZERO,
            target,
            Some(EnemyId(1)),
        );
        assert_eq!(arrow.state(), ProjectileState::Active);
        arrow.advance(0.1);
        assert!((arrow.position().x - ARROW_SPEED * 0.1).abs() < 1e-9);
        assert_eq!(arrow.position().y, 0.0);
        arrow.advance(0.2);
        assert_eq!(arrow.position(), target);
        assert!(arrow.reached_target());
    }

    #[test]
    fn point_projectile_expires() {
        let mut bolt = Projectile::aimed(
            ProjectileId(0),
            TowerKind::Mage,
            1,
            DVec2::ZERO,
            DVec2::ZERO,
            None,
        );
        bolt.advance(PROJECTILE_LIFETIME);
        assert_eq!(bolt.state(), ProjectileState::Dead);
    }

    #[test]
    fn shell_is_harmless_until_it_lands() {
        let origin = DVec2::new(0.0, 200.0);
        let target = DVec2::new(200.0, 200.0);
        let mut shell =
            Projectile::aimed(ProjectileId(0), TowerKind::Artillery, 2, origin, target, None);
        assert_eq!(shell.state(), ProjectileState::Moving);
        let mut apex: f64 = origin.y;
        let mut ticks = 0;
        while shell.state() == ProjectileState::Moving {
            shell.advance(0.01);
            apex = apex.min(shell.position().y);
            ticks += 1;
            assert!(ticks < 10_000, "shell never landed");
        }
        assert!(apex < origin.y);
        assert!((ticks as f64 * 0.01 - shell.flight_time()).abs() <= 0.011);
        assert_eq!(shell.state(), ProjectileState::Active);
        assert_eq!(shell.position(), target);
    }
}
