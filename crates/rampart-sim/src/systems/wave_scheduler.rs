//! Wave scheduler: decides, tick by tick, which enemy kind to spawn next.
//!
//! Waves are ordered lists of groups; each group is a count per enemy kind.
//! A group is copied out of the configuration when it becomes current and
//! the copy is decremented as enemies are drawn.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use rampart_core::config::{Timing, WaveSpec};
use rampart_core::constants::MAX_SPAWN_ATTEMPTS;
use rampart_core::enums::EnemyKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    GracePeriod,
    Spawning,
    GroupWaiting,
    WaveWaiting,
    NoEnemyLeft,
}

/// Outcome of one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnSignal {
    NoneYet,
    Enemy(EnemyKind),
    NoEnemyLeft,
}

#[derive(Debug, Clone)]
pub struct WaveScheduler {
    waves: Vec<WaveSpec>,
    timing: Timing,
    state: SchedulerState,
    /// Seconds accumulated towards the current threshold.
    timer: f64,
    wave: usize,
    group: usize,
    counts: [u32; EnemyKind::COUNT],
    emitted: u32,
    total: u32,
}

impl WaveScheduler {
    pub fn new(waves: Vec<WaveSpec>, timing: Timing) -> Self {
        let total = waves
            .iter()
            .flat_map(|wave| wave.groups.iter())
            .flat_map(|group| group.to_array())
            .sum();
        Self {
            waves,
            timing,
            state: SchedulerState::GracePeriod,
            timer: 0.0,
            wave: 0,
            group: 0,
            counts: [0; EnemyKind::COUNT],
            emitted: 0,
            total,
        }
    }

    /// Advance by `dt` seconds. Emits at most one enemy per call.
    pub fn tick(&mut self, dt: f64, rng: &mut ChaCha8Rng) -> SpawnSignal {
        self.timer += dt;
        loop {
            match self.state {
                SchedulerState::GracePeriod => {
                    if self.timer < self.timing.grace_period {
                        return SpawnSignal::NoneYet;
                    }
                    self.timer -= self.timing.grace_period;
                    self.load_group(0, 0);
                }
                SchedulerState::Spawning => {
                    if self.remaining_in_group() == 0 {
                        self.state = self.next_wait_state();
                        continue;
                    }
                    if self.timer < self.timing.spawn_interval {
                        return SpawnSignal::NoneYet;
                    }
                    self.timer -= self.timing.spawn_interval;
                    let kind = self.draw_kind(rng);
                    self.counts[kind.index()] -= 1;
                    self.emitted += 1;
                    return SpawnSignal::Enemy(kind);
                }
                SchedulerState::GroupWaiting => {
                    if self.timer < self.timing.group_delay {
                        return SpawnSignal::NoneYet;
                    }
                    self.timer -= self.timing.group_delay;
                    self.load_group(self.wave, self.group + 1);
                }
                SchedulerState::WaveWaiting => {
                    if self.timer < self.timing.wave_delay {
                        return SpawnSignal::NoneYet;
                    }
                    self.timer -= self.timing.wave_delay;
                    tracing::info!(wave = self.wave + 1, "wave starting");
                    self.load_group(self.wave + 1, 0);
                }
                SchedulerState::NoEnemyLeft => return SpawnSignal::NoEnemyLeft,
            }
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == SchedulerState::NoEnemyLeft
    }

    pub fn emitted(&self) -> u32 {
        self.emitted
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn wave_index(&self) -> usize {
        self.wave
    }

    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    pub fn group_index(&self) -> usize {
        self.group
    }

    pub fn remaining_in_group(&self) -> u32 {
        self.counts.iter().sum()
    }

    fn next_wait_state(&self) -> SchedulerState {
        let groups = self.waves.get(self.wave).map_or(0, |w| w.groups.len());
        if self.group + 1 < groups {
            SchedulerState::GroupWaiting
        } else if self.wave + 1 < self.waves.len() {
            SchedulerState::WaveWaiting
        } else {
            tracing::debug!(emitted = self.emitted, "all waves spawned");
            SchedulerState::NoEnemyLeft
        }
    }

    fn load_group(&mut self, wave: usize, group: usize) {
        self.wave = wave;
        self.group = group;
        self.counts = self
            .waves
            .get(wave)
            .and_then(|w| w.groups.get(group))
            .map(|counts| counts.to_array())
            .unwrap_or([0; EnemyKind::COUNT]);
        self.state = SchedulerState::Spawning;
    }

    /// Uniform pick among kinds with a non-zero count. Only called when the
    /// group has enemies left.
    fn draw_kind(&self, rng: &mut ChaCha8Rng) -> EnemyKind {
        for _ in 0..MAX_SPAWN_ATTEMPTS {
            let index = rng.gen_range(0..EnemyKind::COUNT);
            if self.counts[index] > 0 {
                return EnemyKind::ALL[index];
            }
        }
        let index = self
            .counts
            .iter()
            .position(|&count| count > 0)
            .unwrap_or_default();
        EnemyKind::ALL[index]
    }
}

#[cfg(test)]
mod tests {
    use rampart_core::config::PerEnemy;
    use rand::SeedableRng;

    use super::*;

    fn timing(grace: f64, interval: f64) -> Timing {
        Timing {
            grace_period: grace,
            spawn_interval: interval,
            group_delay: 3.0,
            wave_delay: 5.0,
        }
    }

    fn group(goblin: u32, knight: u32) -> PerEnemy<u32> {
        PerEnemy { goblin, knight }
    }

    #[test]
    fn grace_period_holds_spawns() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let waves = vec![WaveSpec {
            groups: vec![group(1, 0)],
        }];
        let mut scheduler = WaveScheduler::new(waves, timing(2.0, 1.0));
        assert_eq!(scheduler.tick(1.0, &mut rng), SpawnSignal::NoneYet);
        assert_eq!(scheduler.state(), SchedulerState::GracePeriod);
        assert_eq!(scheduler.tick(1.0, &mut rng), SpawnSignal::NoneYet);
        assert_eq!(scheduler.state(), SchedulerState::Spawning);
        assert_eq!(
            scheduler.tick(1.0, &mut rng),
            SpawnSignal::Enemy(EnemyKind::Goblin)
        );
    }

    #[test]
    fn mixed_group_emits_exact_counts_by_eleven_seconds() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let waves = vec![WaveSpec {
            groups: vec![group(3, 2)],
        }];
        let mut scheduler = WaveScheduler::new(waves, timing(1.0, 2.0));
        let mut spawned = [0u32; EnemyKind::COUNT];
        let mut spawn_times = Vec::new();
        for step in 1..=22 {
            if let SpawnSignal::Enemy(kind) = scheduler.tick(0.5, &mut rng) {
                spawned[kind.index()] += 1;
                spawn_times.push(step as f64 * 0.5);
            }
        }
        assert_eq!(spawned, [3, 2]);
        assert_eq!(spawn_times, vec![3.0, 5.0, 7.0, 9.0, 11.0]);
        assert_eq!(scheduler.emitted(), 5);
        assert_eq!(scheduler.tick(0.5, &mut rng), SpawnSignal::NoEnemyLeft);
    }

    #[test]
    fn groups_and_waves_wait_their_delays() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let waves = vec![
            WaveSpec {
                groups: vec![group(1, 0), group(0, 1)],
            },
            WaveSpec {
                groups: vec![group(1, 0)],
            },
        ];
        let mut scheduler = WaveScheduler::new(waves, timing(0.0, 1.0));
        let mut emissions = Vec::new();
        for step in 1..=40 {
            if let SpawnSignal::Enemy(kind) = scheduler.tick(0.5, &mut rng) {
                emissions.push((step as f64 * 0.5, kind));
            }
        }
        // First enemy at 1s, group delay 3s + interval 1s, wave delay 5s + interval 1s.
        assert_eq!(
            emissions,
            vec![
                (1.0, EnemyKind::Goblin),
                (5.0, EnemyKind::Knight),
                (11.0, EnemyKind::Goblin),
            ]
        );
        assert!(scheduler.is_finished());
    }

    #[test]
    fn large_step_emits_one_enemy_per_tick() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let waves = vec![WaveSpec {
            groups: vec![group(4, 0)],
        }];
        let mut scheduler = WaveScheduler::new(waves, timing(0.0, 1.0));
        assert!(matches!(scheduler.tick(10.0, &mut rng), SpawnSignal::Enemy(_)));
        assert!(matches!(scheduler.tick(0.0, &mut rng), SpawnSignal::Enemy(_)));
        assert_eq!(scheduler.emitted(), 2);
    }

    #[test]
    fn all_zero_group_is_skipped() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let waves = vec![WaveSpec {
            groups: vec![group(0, 0), group(0, 1)],
        }];
        let mut scheduler = WaveScheduler::new(waves, timing(0.0, 1.0));
        let mut kinds = Vec::new();
        for _ in 0..20 {
            if let SpawnSignal::Enemy(kind) = scheduler.tick(0.5, &mut rng) {
                kinds.push(kind);
            }
        }
        assert_eq!(kinds, vec![EnemyKind::Knight]);
        assert!(scheduler.is_finished());
    }

    #[test]
    fn group_is_copied_not_aliased() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let waves = vec![WaveSpec {
            groups: vec![group(2, 0)],
        }];
        let mut scheduler = WaveScheduler::new(waves.clone(), timing(0.0, 1.0));
        while !scheduler.is_finished() {
            scheduler.tick(1.0, &mut rng);
        }
        assert_eq!(scheduler.waves, waves);
        assert_eq!(scheduler.total(), 2);
    }
}
