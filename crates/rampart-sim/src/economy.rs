//! Player economy: gold and health.
//!
//! Both counters are atomics behind an `Arc` so the HUD and command callers
//! can read them from any thread while the loop thread mutates them.

use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug)]
pub struct Economy {
    gold: AtomicU32,
    health: AtomicU32,
}

impl Economy {
    pub fn new(gold: u32, health: u32) -> Self {
        Self {
            gold: AtomicU32::new(gold),
            health: AtomicU32::new(health),
        }
    }

    pub fn gold(&self) -> u32 {
        self.gold.load(Ordering::Acquire)
    }

    pub fn health(&self) -> u32 {
        self.health.load(Ordering::Acquire)
    }

    /// Add gold, saturating at `u32::MAX`.
    pub fn credit(&self, amount: u32) {
        let _ = self
            .gold
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |gold| {
                Some(gold.saturating_add(amount))
            });
    }

    /// Deduct `amount` if the balance covers it. Returns whether it did.
    pub fn try_spend(&self, amount: u32) -> bool {
        self.gold
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |gold| {
                gold.checked_sub(amount)
            })
            .is_ok()
    }

    /// Remove health, clamped at zero. Returns the remaining health.
    pub fn lose_health(&self, amount: u32) -> u32 {
        let previous = self
            .health
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |health| {
                Some(health.saturating_sub(amount))
            })
            .unwrap_or_default();
        previous.saturating_sub(amount)
    }

    pub fn is_defeated(&self) -> bool {
        self.health() == 0
    }
}
