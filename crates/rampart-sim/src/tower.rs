//! Towers: one entity type parameterised by [`TowerKind`], a level and a
//! boxed targeting strategy.

use rampart_core::deferred::Keyed;
use rampart_core::enums::TowerKind;
use rampart_core::types::{Point, TileCoord, TowerId};

use crate::targeting::TargetingStrategy;

#[derive(Debug)]
pub struct Tower {
    id: TowerId,
    kind: TowerKind,
    tile: TileCoord,
    /// 1-based.
    level: u8,
    /// Seconds until the next shot is allowed.
    cooldown: f64,
    targeting: Box<dyn TargetingStrategy>,
}

impl Tower {
    pub fn new(
        id: TowerId,
        kind: TowerKind,
        tile: TileCoord,
        targeting: Box<dyn TargetingStrategy>,
    ) -> Self {
        Self {
            id,
            kind,
            tile,
            level: 1,
            cooldown: 0.0,
            targeting,
        }
    }

    pub fn id(&self) -> TowerId {
        self.id
    }

    pub fn kind(&self) -> TowerKind {
        self.kind
    }

    pub fn tile(&self) -> TileCoord {
        self.tile
    }

    pub fn position(&self) -> Point {
        self.tile.center()
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn cooldown(&self) -> f64 {
        self.cooldown
    }

    pub fn targeting(&self) -> &dyn TargetingStrategy {
        self.targeting.as_ref()
    }

    pub fn level_up(&mut self) {
        self.level = self.level.saturating_add(1);
    }

    /// Count the cooldown down. Returns true when the tower may fire.
    pub fn tick_cooldown(&mut self, dt: f64) -> bool {
        self.cooldown = (self.cooldown - dt).max(0.0);
        self.cooldown <= 0.0
    }

    pub fn reset_cooldown(&mut self, attack_interval: f64) {
        self.cooldown = attack_interval;
    }
}

impl Keyed for Tower {
    type Key = TowerId;

    fn key(&self) -> TowerId {
        self.id
    }
}
