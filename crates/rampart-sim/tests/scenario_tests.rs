use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use rampart_core::commands::PlayerCommand;
use rampart_core::config::{GameConfig, PerEnemy, Timing, WaveSpec};
use rampart_core::constants::DT;
use rampart_core::enums::{EnemyKind, GamePhase, ProjectileState, TowerKind};
use rampart_core::types::ProjectileId;
use rampart_sim::projectile::Projectile;
use rampart_sim::systems::wave_scheduler::{SchedulerState, SpawnSignal, WaveScheduler};
use rampart_sim::SimulationEngine;

fn random_waves(rng: &mut ChaCha8Rng) -> Vec<WaveSpec> {
    (0..rng.gen_range(1..4))
        .map(|_| WaveSpec {
            groups: (0..rng.gen_range(1..4))
                .map(|_| {
                    let goblin = rng.gen_range(0..6);
                    let knight = if goblin == 0 {
                        rng.gen_range(1..6)
                    } else {
                        rng.gen_range(0..6)
                    };
                    PerEnemy { goblin, knight }
                })
                .collect(),
        })
        .collect()
}

#[test]
fn scheduler_emits_every_configured_enemy_then_stops() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let timing = Timing {
        grace_period: 1.0,
        spawn_interval: 0.5,
        group_delay: 2.0,
        wave_delay: 3.0,
    };
    for _ in 0..50 {
        let waves = random_waves(&mut rng);
        let expected: [u32; EnemyKind::COUNT] = waves
            .iter()
            .flat_map(|w| w.groups.iter())
            .fold([0, 0], |acc, g| [acc[0] + g.goblin, acc[1] + g.knight]);

        let mut scheduler = WaveScheduler::new(waves, timing);
        let mut spawned = [0u32; EnemyKind::COUNT];
        let mut ticks = 0;
        loop {
            match scheduler.tick(0.25, &mut rng) {
                SpawnSignal::Enemy(kind) => spawned[kind.index()] += 1,
                SpawnSignal::NoneYet => {}
                SpawnSignal::NoEnemyLeft => break,
            }
            ticks += 1;
            assert!(ticks < 100_000, "scheduler never finished");
        }
        assert_eq!(spawned, expected);
        assert_eq!(scheduler.emitted(), expected.iter().sum::<u32>());
        assert_eq!(scheduler.state(), SchedulerState::NoEnemyLeft);
        assert_eq!(scheduler.tick(10.0, &mut rng), SpawnSignal::NoEnemyLeft);
    }
}

#[test]
fn artillery_shell_lands_on_aim_point() {
    let origin = DVec2::new(96.0, 224.0);
    let target = DVec2::new(288.0, 96.0);
    let mut shell = Projectile::aimed(
        ProjectileId(1),
        TowerKind::Artillery,
        1,
        origin,
        target,
        None,
    );
    while shell.state() == ProjectileState::Moving {
        shell.advance(DT);
    }
    assert_eq!(shell.state(), ProjectileState::Active);
    assert_eq!(shell.position(), target);
}

#[test]
fn default_game_runs_to_an_end() {
    let mut engine = SimulationEngine::new(GameConfig::default()).unwrap();
    engine.queue_commands([
        PlayerCommand::BuildTower {
            x: 3,
            y: 2,
            kind: TowerKind::Archer,
        },
        PlayerCommand::BuildTower {
            x: 7,
            y: 3,
            kind: TowerKind::Mage,
        },
        PlayerCommand::StartGame,
    ]);

    let mut last_health = engine.economy().health();
    let mut finished = None;
    for _ in 0..(240.0 / DT) as usize {
        let snapshot = engine.tick(DT);
        assert!(snapshot.health <= last_health);
        last_health = snapshot.health;
        for enemy in &snapshot.enemies {
            assert!(enemy.health >= 0.0);
            assert!(enemy.health <= enemy.max_health);
        }
        if snapshot.phase.is_over() {
            finished = Some(snapshot);
            break;
        }
    }

    let snapshot = finished.expect("game should end within four minutes");
    assert!(matches!(snapshot.phase, GamePhase::Won | GamePhase::Lost));
    if snapshot.phase == GamePhase::Won {
        assert!(snapshot.wave.finished_spawning);
        assert_eq!(snapshot.wave.enemies_emitted, snapshot.wave.enemies_total);
        assert!(snapshot.enemies.iter().all(|e| !e.alive));
    } else {
        assert_eq!(snapshot.health, 0);
    }
}

#[test]
fn config_round_trips_through_json() {
    let config = GameConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    let engine = SimulationEngine::new(GameConfig::from_json_str(&json).unwrap()).unwrap();
    assert_eq!(engine.config(), &config);
    assert_eq!(engine.map().width(), 12);
}
