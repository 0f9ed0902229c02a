//! Per-tick systems. Each manager owns one entity collection; the engine
//! calls them in a fixed order.

pub mod collectables;
pub mod collision;
pub mod enemies;
pub mod projectiles;
pub mod snapshot;
pub mod towers;
pub mod wave_scheduler;
