//! Projectile manager: launching and per-tick movement.

use rampart_core::deferred::DeferredList;
use rampart_core::enums::TowerKind;
use rampart_core::events::SimEvent;
use rampart_core::types::{EnemyId, IdAllocator, Point, ProjectileId};

use crate::projectile::Projectile;

#[derive(Debug, Default)]
pub struct ProjectileManager {
    projectiles: DeferredList<Projectile>,
    ids: IdAllocator,
}

impl ProjectileManager {
    /// Fire a projectile of the tower's kind from `origin` at `target`.
    pub fn launch(
        &mut self,
        tower_kind: TowerKind,
        tower_level: u8,
        origin: Point,
        target: Point,
        enemy: EnemyId,
        events: &mut Vec<SimEvent>,
    ) -> ProjectileId {
        let id = self.next_id();
        let projectile =
            Projectile::aimed(id, tower_kind, tower_level, origin, target, Some(enemy));
        events.push(SimEvent::ProjectileFired {
            kind: projectile.kind(),
            from: origin,
            to: target,
        });
        self.projectiles.add(projectile);
        id
    }

    /// Add a projectile built elsewhere. Returns false if its id is taken.
    pub fn insert(&mut self, projectile: Projectile) -> bool {
        self.projectiles.add(projectile)
    }

    pub fn next_id(&mut self) -> ProjectileId {
        ProjectileId(self.ids.next())
    }

    pub fn move_projectiles(&mut self, dt: f64) {
        for projectile in self.projectiles.iter_mut() {
            projectile.advance(dt);
        }
    }

    pub fn projectiles(&self) -> &DeferredList<Projectile> {
        &self.projectiles
    }

    pub fn projectiles_mut(&mut self) -> &mut DeferredList<Projectile> {
        &mut self.projectiles
    }
}
