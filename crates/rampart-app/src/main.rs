//! Headless RAMPART runner.
//!
//! Loads a config (first argument, or the built-in default), places a few
//! towers, and plays the game out at full speed while logging progress.
//! Set `RUST_LOG` to control verbosity.

use std::process::ExitCode;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use rampart_app::{AppError, GameLoop};
use rampart_core::config::GameConfig;
use rampart_core::constants::MAX_GAME_SPEED;
use rampart_core::enums::{GamePhase, TowerKind};
use rampart_core::events::SimEvent;
use rampart_core::state::GameStateSnapshot;

/// Towers placed before the first wave.
const OPENING: [(i32, i32, TowerKind); 2] = [(7, 2, TowerKind::Archer), (9, 3, TowerKind::Mage)];

/// Built once enough gold has come in.
const REINFORCEMENT: (i32, i32, TowerKind) = (7, 4, TowerKind::Artillery);

const POLL: Duration = Duration::from_millis(100);
const WALL_CLOCK_LIMIT: Duration = Duration::from_secs(120);

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "rampart failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    let config = match std::env::args_os().nth(1) {
        Some(path) => {
            info!(path = %path.to_string_lossy(), "loading config");
            GameConfig::load(path)?
        }
        None => GameConfig::default(),
    };
    let artillery_cost = config.towers[REINFORCEMENT.2]
        .level(1)
        .map_or(u32::MAX, |stats| stats.cost);

    let mut handle = GameLoop::spawn(config, log_events())?;
    handle.set_game_speed(MAX_GAME_SPEED)?;
    for (x, y, kind) in OPENING {
        if !handle.build_tower(x, y, kind)? {
            warn!(x, y, ?kind, "could not place opening tower");
        }
    }
    handle.start_game()?;

    let economy = handle.economy();
    let started = Instant::now();
    let mut reinforced = false;
    let last = loop {
        std::thread::sleep(POLL);
        let snapshot = handle.latest_snapshot();
        if snapshot.as_ref().is_some_and(|s| s.phase.is_over()) {
            break snapshot;
        }
        if started.elapsed() >= WALL_CLOCK_LIMIT {
            warn!("wall clock limit reached, stopping");
            break snapshot;
        }
        if !reinforced && economy.gold() >= artillery_cost {
            let (x, y, kind) = REINFORCEMENT;
            reinforced = handle.build_tower(x, y, kind)?;
        }
    };
    handle.end_game();

    match last {
        Some(snapshot) => info!(
            phase = ?snapshot.phase,
            gold = snapshot.gold,
            health = snapshot.health,
            emitted = snapshot.wave.enemies_emitted,
            total = snapshot.wave.enemies_total,
            sim_secs = snapshot.time.elapsed_secs,
            "game finished"
        ),
        None => warn!("no snapshot was published"),
    }
    Ok(())
}

/// Listener that logs wave progress and notable events.
fn log_events() -> impl FnMut(&GameStateSnapshot) + Send + 'static {
    let mut wave = None;
    move |snapshot: &GameStateSnapshot| {
        if snapshot.phase == GamePhase::Running && wave != Some(snapshot.wave.wave_index) {
            wave = Some(snapshot.wave.wave_index);
            info!(
                wave = snapshot.wave.wave_index + 1,
                of = snapshot.wave.wave_count,
                "wave"
            );
        }
        for event in &snapshot.events {
            match event {
                SimEvent::EnemyArrived { enemy } => {
                    warn!(enemy = enemy.0, health = snapshot.health, "enemy reached the end")
                }
                SimEvent::EnemyKilled { enemy, reward } => {
                    info!(enemy = enemy.0, reward, "enemy killed")
                }
                SimEvent::PhaseChanged { phase } => info!(?phase, "phase"),
                _ => {}
            }
        }
    }
}
