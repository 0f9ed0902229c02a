//! Gold pickups dropped by killed enemies.

use rampart_core::deferred::Keyed;
use rampart_core::types::{CollectableId, Point};

#[derive(Debug, Clone, PartialEq)]
pub struct Collectable {
    id: CollectableId,
    position: Point,
    value: u32,
    remaining: f64,
}

impl Collectable {
    pub fn new(id: CollectableId, position: Point, value: u32, lifetime: f64) -> Self {
        Self {
            id,
            position,
            value,
            remaining: lifetime,
        }
    }

    pub fn id(&self) -> CollectableId {
        self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    /// Count down the lifetime. Returns true once expired.
    pub fn tick(&mut self, dt: f64) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}

impl Keyed for Collectable {
    type Key = CollectableId;

    fn key(&self) -> CollectableId {
        self.id
    }
}
