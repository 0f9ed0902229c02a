//! Simulation crate for RAMPART.
//!
//! Owns the enemy, tower, projectile and collectable managers, runs them at
//! a fixed tick and produces GameStateSnapshots for the frontend.

pub mod ballistics;
pub mod collectable;
pub mod economy;
pub mod effects;
pub mod enemy;
pub mod engine;
pub mod map;
pub mod projectile;
pub mod systems;
pub mod targeting;
pub mod tower;

pub use economy::Economy;
pub use engine::SimulationEngine;
