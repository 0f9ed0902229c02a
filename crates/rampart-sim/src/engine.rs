//! Simulation engine: the core of the game.
//!
//! `SimulationEngine` owns every manager, processes player commands, runs the
//! per-tick systems in a fixed order and produces `GameStateSnapshot`s.
//! Completely headless and single-threaded, so runs are deterministic for a
//! given seed and command sequence.

use std::collections::VecDeque;
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rampart_core::commands::{CommandOutcome, PlayerCommand};
use rampart_core::config::GameConfig;
use rampart_core::constants::{MAX_GAME_SPEED, MIN_GAME_SPEED};
use rampart_core::enums::{EnemyKind, GamePhase, TowerKind};
use rampart_core::error::{ConfigError, SimError};
use rampart_core::events::SimEvent;
use rampart_core::state::GameStateSnapshot;
use rampart_core::types::{EnemyId, Point, SimTime};

use crate::economy::Economy;
use crate::map::GameMap;
use crate::systems;
use crate::systems::collectables::CollectableManager;
use crate::systems::collision::CollisionEngine;
use crate::systems::enemies::EnemyManager;
use crate::systems::projectiles::ProjectileManager;
use crate::systems::towers::TowerManager;

/// The simulation engine. Owns the map, the managers and all sim state.
pub struct SimulationEngine {
    config: Arc<GameConfig>,
    map: GameMap,
    time: SimTime,
    phase: GamePhase,
    game_speed: f64,
    rng: ChaCha8Rng,
    economy: Arc<Economy>,
    command_queue: VecDeque<PlayerCommand>,
    events: Vec<SimEvent>,

    enemies: EnemyManager,
    towers: TowerManager,
    projectiles: ProjectileManager,
    collision: CollisionEngine,
    collectables: CollectableManager,
}

impl SimulationEngine {
    /// Validate `config` and build an engine in the `Setup` phase.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let map = GameMap::from_layout(&config.map)?;
        let config = Arc::new(config);
        tracing::info!(
            seed = config.seed,
            waves = config.waves.len(),
            enemies = config.total_enemies(),
            "simulation created"
        );
        Ok(Self {
            time: SimTime::default(),
            phase: GamePhase::default(),
            game_speed: 1.0,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            economy: Arc::new(Economy::new(
                config.economy.starting_gold,
                config.economy.starting_health,
            )),
            command_queue: VecDeque::new(),
            events: Vec::new(),
            enemies: EnemyManager::new(&config, map.path().to_vec()),
            towers: TowerManager::new(config.towers.clone()),
            projectiles: ProjectileManager::default(),
            collision: CollisionEngine::new(Arc::clone(&config)),
            collectables: CollectableManager::new(config.collectables),
            map,
            config,
        })
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Apply queued commands, advance one tick of `dt` seconds if running,
    /// and return the resulting snapshot.
    pub fn tick(&mut self, dt: f64) -> GameStateSnapshot {
        self.process_commands();
        self.step(dt);
        self.snapshot()
    }

    /// Advance one tick without touching the command queue or building a
    /// snapshot. Does nothing unless the game is running.
    pub fn step(&mut self, dt: f64) {
        if self.phase != GamePhase::Running {
            return;
        }
        self.run_systems(dt);
        self.time.advance(dt);
    }

    /// Build a snapshot, draining the events gathered since the last one.
    pub fn snapshot(&mut self) -> GameStateSnapshot {
        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(
            &self.time,
            self.phase,
            self.game_speed,
            &self.economy,
            &self.enemies,
            &self.towers,
            &self.projectiles,
            &self.collectables,
            events,
        )
    }

    /// Apply one command right away.
    pub fn apply_command(&mut self, command: PlayerCommand) -> CommandOutcome {
        let result = match command {
            PlayerCommand::BuildTower { x, y, kind } => self.build_tower(x, y, kind),
            PlayerCommand::SellTower { x, y } => self.sell_tower(x, y),
            PlayerCommand::UpgradeTower { x, y } => self.upgrade_tower(x, y),
            PlayerCommand::CollectAt { point } => Ok(self.handle_collectable_click(point)),
            PlayerCommand::StartGame => Ok(self.start_game()),
            PlayerCommand::Pause => Ok(self.pause()),
            PlayerCommand::Resume => Ok(self.resume()),
            PlayerCommand::SetGameSpeed { multiplier } => Ok(self.set_game_speed(multiplier)),
        };
        match result {
            Ok(accepted) => CommandOutcome::from_bool(accepted),
            Err(SimError::TileOutOfBounds { x, y }) => CommandOutcome::OutOfBounds { x, y },
            Err(SimError::LoopUnavailable) => CommandOutcome::Rejected,
        }
    }

    pub fn build_tower(&mut self, x: i32, y: i32, kind: TowerKind) -> Result<bool, SimError> {
        if self.phase.is_over() {
            return Ok(false);
        }
        self.towers
            .build_tower(&mut self.map, &self.economy, x, y, kind, &mut self.events)
    }

    pub fn sell_tower(&mut self, x: i32, y: i32) -> Result<bool, SimError> {
        if self.phase.is_over() {
            return Ok(false);
        }
        self.towers
            .sell_tower(&mut self.map, &self.economy, x, y, &mut self.events)
    }

    pub fn upgrade_tower(&mut self, x: i32, y: i32) -> Result<bool, SimError> {
        if self.phase.is_over() {
            return Ok(false);
        }
        self.towers
            .upgrade_tower(&mut self.map, &self.economy, x, y, &mut self.events)
    }

    /// Collect the pickup under a click, crediting its value.
    pub fn handle_collectable_click(&mut self, point: Point) -> bool {
        if self.phase.is_over() {
            return false;
        }
        let Some(value) = self.collectables.collect_at(point) else {
            return false;
        };
        self.economy.credit(value);
        self.events.push(SimEvent::CollectablePicked { value });
        true
    }

    pub fn start_game(&mut self) -> bool {
        if self.phase != GamePhase::Setup {
            return false;
        }
        self.set_phase(GamePhase::Running);
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }
        self.set_phase(GamePhase::Paused);
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != GamePhase::Paused {
            return false;
        }
        self.set_phase(GamePhase::Running);
        true
    }

    /// Set the speed multiplier, clamped to the supported range. Non-finite
    /// values are refused, as is any change after the game has ended.
    pub fn set_game_speed(&mut self, multiplier: f64) -> bool {
        if self.phase.is_over() || !multiplier.is_finite() {
            return false;
        }
        self.game_speed = multiplier.clamp(MIN_GAME_SPEED, MAX_GAME_SPEED);
        tracing::debug!(speed = self.game_speed, "game speed changed");
        true
    }

    /// Place an enemy directly, bypassing the wave scheduler.
    pub fn spawn_enemy_at(&mut self, kind: EnemyKind, position: Point) -> EnemyId {
        self.enemies.spawn_at(kind, position)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn game_speed(&self) -> f64 {
        self.game_speed
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn map(&self) -> &GameMap {
        &self.map
    }

    /// Shared handle on gold and health, readable from any thread.
    pub fn economy(&self) -> Arc<Economy> {
        Arc::clone(&self.economy)
    }

    pub fn enemies(&self) -> &EnemyManager {
        &self.enemies
    }

    pub fn towers(&self) -> &TowerManager {
        &self.towers
    }

    pub fn projectiles(&self) -> &ProjectileManager {
        &self.projectiles
    }

    pub fn collectables(&self) -> &CollectableManager {
        &self.collectables
    }

    #[cfg(test)]
    pub(crate) fn enemies_mut(&mut self) -> &mut EnemyManager {
        &mut self.enemies
    }

    #[cfg(test)]
    pub(crate) fn projectiles_mut(&mut self) -> &mut ProjectileManager {
        &mut self.projectiles
    }

    #[cfg(test)]
    pub(crate) fn collectables_mut(&mut self) -> &mut CollectableManager {
        &mut self.collectables
    }

    fn set_phase(&mut self, phase: GamePhase) {
        if self.phase == phase {
            return;
        }
        tracing::info!(from = ?self.phase, to = ?phase, tick = self.time.tick, "phase changed");
        self.phase = phase;
        self.events.push(SimEvent::PhaseChanged { phase });
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            let outcome = self.apply_command(command);
            if !outcome.is_accepted() {
                tracing::debug!(?outcome, "queued command refused");
            }
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f64) {
        // 1. Spawning
        let more_coming = self
            .enemies
            .spawn_enemies(dt, &mut self.rng, &mut self.events);
        // 2. Movement and arrivals
        let arrived = self.enemies.move_enemies(dt, &mut self.events);
        if arrived > 0 {
            let damage = arrived.saturating_mul(self.config.economy.arrival_damage);
            let health = self.economy.lose_health(damage);
            tracing::debug!(arrived, health, "enemies reached the end of the path");
        }
        // 3. Towers fire
        self.towers.create_projectiles(
            dt,
            &self.enemies,
            &mut self.projectiles,
            &mut self.rng,
            &mut self.events,
        );
        // 4. Projectile flight
        self.projectiles.move_projectiles(dt);
        // 5. Hits and explosions
        let mut report = self.collision.resolve_collisions(
            dt,
            self.projectiles.projectiles_mut(),
            self.enemies.enemies_mut(),
            &mut self.events,
        );
        report.merge(self.collision.resolve_explosions(
            self.projectiles.projectiles_mut(),
            self.enemies.enemies_mut(),
            &mut self.events,
        ));
        // 6. Rewards
        if report.gold > 0 {
            self.economy.credit(report.gold);
        }
        // 7. Effects
        self.enemies.apply_effects(dt, &report.slowed);
        // 8. Collectables
        self.collectables.update(dt);
        self.collectables
            .drop_loot(&report.kills, &mut self.rng, &mut self.events);
        // 9. Loss and win
        if self.economy.is_defeated() {
            self.set_phase(GamePhase::Lost);
        } else if !more_coming && self.enemies.alive_count() == 0 {
            self.set_phase(GamePhase::Won);
        }
    }
}
