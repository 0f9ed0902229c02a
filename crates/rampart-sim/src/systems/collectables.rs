//! Collectable manager: loot drops, expiry and pickup.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use rampart_core::config::CollectableConfig;
use rampart_core::deferred::DeferredList;
use rampart_core::events::SimEvent;
use rampart_core::types::{CollectableId, EnemyId, IdAllocator, Point};

use crate::collectable::Collectable;

#[derive(Debug)]
pub struct CollectableManager {
    items: DeferredList<Collectable>,
    ids: IdAllocator,
    config: CollectableConfig,
}

impl CollectableManager {
    pub fn new(config: CollectableConfig) -> Self {
        Self {
            items: DeferredList::new(),
            ids: IdAllocator::default(),
            config,
        }
    }

    /// Roll a drop for each kill.
    pub fn drop_loot(
        &mut self,
        kills: &[(EnemyId, Point)],
        rng: &mut ChaCha8Rng,
        events: &mut Vec<SimEvent>,
    ) {
        for &(_, at) in kills {
            if rng.gen::<f64>() >= self.config.drop_chance {
                continue;
            }
            self.spawn(at);
            events.push(SimEvent::CollectableDropped {
                at,
                value: self.config.value,
            });
        }
    }

    /// Place a collectable worth the configured value.
    pub fn spawn(&mut self, at: Point) -> CollectableId {
        let id = CollectableId(self.ids.next());
        self.items.add(Collectable::new(
            id,
            at,
            self.config.value,
            self.config.lifetime,
        ));
        id
    }

    /// Age every collectable and drop the expired ones.
    pub fn update(&mut self, dt: f64) {
        let (items, stage) = self.items.split_mut();
        for item in items {
            if item.tick(dt) {
                stage.remove_later(item.id());
            }
        }
        self.items.commit_all();
    }

    /// Pick up the collectable nearest to `point` within the pickup radius.
    /// Returns its value.
    pub fn collect_at(&mut self, point: Point) -> Option<u32> {
        let radius_sq = self.config.pickup_radius * self.config.pickup_radius;
        let id = self
            .items
            .iter()
            .map(|item| (item.id(), item.position().distance_squared(point)))
            .filter(|&(_, dist_sq)| dist_sq <= radius_sq)
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(id, _)| id)?;
        self.items.remove(id).map(|item| item.value())
    }

    pub fn collectables(&self) -> &DeferredList<Collectable> {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;
    use rand::SeedableRng;

    use super::*;

    fn config(drop_chance: f64) -> CollectableConfig {
        CollectableConfig {
            drop_chance,
            value: 10,
            lifetime: 1.0,
            pickup_radius: 20.0,
        }
    }

    #[test]
    fn pickup_within_radius_only() {
        let mut manager = CollectableManager::new(config(1.0));
        manager.spawn(DVec2::new(100.0, 100.0));
        assert_eq!(manager.collect_at(DVec2::new(150.0, 100.0)), None);
        assert_eq!(manager.collect_at(DVec2::new(110.0, 100.0)), Some(10));
        assert!(manager.collectables().is_empty());
        assert_eq!(manager.collect_at(DVec2::new(100.0, 100.0)), None);
    }

    #[test]
    fn collectables_expire() {
        let mut manager = CollectableManager::new(config(1.0));
        manager.spawn(DVec2::ZERO);
        manager.update(0.6);
        assert_eq!(manager.collectables().len(), 1);
        manager.update(0.6);
        assert!(manager.collectables().is_empty());
    }

    #[test]
    fn drop_chance_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut events = Vec::new();
        let kills: Vec<_> = (0..20).map(|i| (EnemyId(i), DVec2::ZERO)).collect();

        let mut never = CollectableManager::new(config(0.0));
        never.drop_loot(&kills, &mut rng, &mut events);
        assert!(never.collectables().is_empty());

        let mut always = CollectableManager::new(config(1.0));
        always.drop_loot(&kills, &mut rng, &mut events);
        assert_eq!(always.collectables().len(), 20);
        assert_eq!(events.len(), 20);
    }
}
