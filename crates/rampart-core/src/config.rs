//! Game configuration: the immutable snapshot a simulation run is built from.
//!
//! Loaded once (JSON or `GameConfig::default()`), validated, then handed to
//! the engine by value. Nothing in the simulation mutates it.

use std::ops::{Index, IndexMut};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::enums::{EnemyKind, TargetingKind, TileKind, TowerKind};
use crate::error::ConfigError;
use crate::types::TileCoord;

/// One value per enemy kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerEnemy<T> {
    #[serde(default)]
    pub goblin: T,
    #[serde(default)]
    pub knight: T,
}

impl<T: Copy> PerEnemy<T> {
    pub fn to_array(&self) -> [T; EnemyKind::COUNT] {
        [self.goblin, self.knight]
    }
}

impl<T> Index<EnemyKind> for PerEnemy<T> {
    type Output = T;

    fn index(&self, kind: EnemyKind) -> &T {
        match kind {
            EnemyKind::Goblin => &self.goblin,
            EnemyKind::Knight => &self.knight,
        }
    }
}

impl<T> IndexMut<EnemyKind> for PerEnemy<T> {
    fn index_mut(&mut self, kind: EnemyKind) -> &mut T {
        match kind {
            EnemyKind::Goblin => &mut self.goblin,
            EnemyKind::Knight => &mut self.knight,
        }
    }
}

/// One value per tower kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerTower<T> {
    pub artillery: T,
    pub mage: T,
    pub archer: T,
}

impl<T> Index<TowerKind> for PerTower<T> {
    type Output = T;

    fn index(&self, kind: TowerKind) -> &T {
        match kind {
            TowerKind::Artillery => &self.artillery,
            TowerKind::Mage => &self.mage,
            TowerKind::Archer => &self.archer,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub health: f64,
    /// World units per second.
    pub speed: u32,
    /// Gold awarded on kill.
    pub reward: u32,
}

/// Stats for one tower level. `cost` is the build price for level 1 and the
/// upgrade price for later levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TowerLevelStats {
    pub cost: u32,
    pub sell_return: u32,
    pub range: f64,
    /// Seconds between shots.
    pub attack_interval: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    #[serde(default)]
    pub targeting: TargetingKind,
    pub levels: Vec<TowerLevelStats>,
}

impl TowerStats {
    pub fn max_level(&self) -> u8 {
        self.levels.len().min(u8::MAX as usize) as u8
    }

    /// Stats for a 1-based level.
    pub fn level(&self, level: u8) -> Option<&TowerLevelStats> {
        self.levels.get(usize::from(level).checked_sub(1)?)
    }
}

/// A wave is an ordered list of groups; a group is a count per enemy kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveSpec {
    pub groups: Vec<PerEnemy<u32>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    /// Seconds before the first wave.
    pub grace_period: f64,
    /// Seconds between two enemies of a group.
    pub spawn_interval: f64,
    /// Seconds between two groups of a wave.
    pub group_delay: f64,
    /// Seconds between two waves.
    pub wave_delay: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomyConfig {
    pub starting_gold: u32,
    pub starting_health: u32,
    /// Player health lost per enemy reaching the path end.
    pub arrival_damage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollectableConfig {
    /// Probability that a killed enemy drops a collectable.
    pub drop_chance: f64,
    pub value: u32,
    /// Seconds before an uncollected drop disappears.
    pub lifetime: f64,
    /// Click distance within which a drop is collected.
    pub pickup_radius: f64,
}

/// Map layout: one string per row. `.` buildable, `#` path, `x` blocked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapLayout {
    pub tiles: Vec<String>,
    /// Waypoints enemies walk through, in tile coordinates.
    pub path: Vec<TileCoord>,
}

/// Parsed map tiles, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTiles {
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<TileKind>,
}

impl MapLayout {
    pub fn parse_tiles(&self) -> Result<ParsedTiles, ConfigError> {
        let width = self.tiles.first().map_or(0, |row| row.chars().count());
        let mut tiles = Vec::with_capacity(width * self.tiles.len());
        for (row, line) in self.tiles.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(ConfigError::RaggedMap {
                    row,
                    expected: width,
                    found,
                });
            }
            for c in line.chars() {
                tiles.push(match c {
                    '.' => TileKind::Buildable,
                    '#' => TileKind::Path,
                    'x' => TileKind::Blocked,
                    other => return Err(ConfigError::UnknownTile(other)),
                });
            }
        }
        Ok(ParsedTiles {
            width,
            height: self.tiles.len(),
            tiles,
        })
    }
}

/// Complete configuration for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// RNG seed. Same seed and same commands give the same run.
    pub seed: u64,
    pub enemies: PerEnemy<EnemyStats>,
    pub towers: PerTower<TowerStats>,
    /// Damage per hit, indexed `[tower][enemy][level - 1]`.
    pub damage: PerTower<PerEnemy<Vec<f64>>>,
    pub waves: Vec<WaveSpec>,
    pub timing: Timing,
    pub economy: EconomyConfig,
    pub collectables: CollectableConfig,
    pub map: MapLayout,
}

impl GameConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Damage dealt by a tower of `tower` kind at `level` to an enemy of `enemy` kind.
    pub fn damage(&self, tower: TowerKind, enemy: EnemyKind, level: u8) -> f64 {
        let table = &self.damage[tower][enemy];
        usize::from(level)
            .checked_sub(1)
            .and_then(|i| table.get(i))
            .copied()
            .unwrap_or_default()
    }

    /// Total number of enemies across every wave.
    pub fn total_enemies(&self) -> u32 {
        self.waves
            .iter()
            .flat_map(|wave| wave.groups.iter())
            .flat_map(|group| group.to_array())
            .sum()
    }

    /// Reject configurations the simulation cannot run sensibly.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.waves.is_empty() {
            return Err(ConfigError::NoWaves);
        }
        for (wave, spec) in self.waves.iter().enumerate() {
            if spec.groups.is_empty() {
                return Err(ConfigError::EmptyWave { wave });
            }
            for (group, counts) in spec.groups.iter().enumerate() {
                if counts.to_array().iter().all(|&count| count == 0) {
                    return Err(ConfigError::EmptyGroup { wave, group });
                }
            }
        }

        for kind in EnemyKind::ALL {
            let stats = &self.enemies[kind];
            if stats.health <= 0.0 {
                return Err(ConfigError::NonPositiveEnemyStat {
                    kind,
                    what: "health",
                });
            }
            if stats.speed == 0 {
                return Err(ConfigError::NonPositiveEnemyStat {
                    kind,
                    what: "speed",
                });
            }
        }

        for tower in TowerKind::ALL {
            let stats = &self.towers[tower];
            if stats.levels.is_empty() {
                return Err(ConfigError::NoTowerLevels(tower));
            }
            for (i, level) in stats.levels.iter().enumerate() {
                if level.range <= 0.0 {
                    return Err(ConfigError::NonPositiveTowerStat {
                        kind: tower,
                        level: i + 1,
                        what: "range",
                    });
                }
                if level.attack_interval <= 0.0 {
                    return Err(ConfigError::NonPositiveTowerStat {
                        kind: tower,
                        level: i + 1,
                        what: "attack_interval",
                    });
                }
            }
            for enemy in EnemyKind::ALL {
                let found = self.damage[tower][enemy].len();
                if found != stats.levels.len() {
                    return Err(ConfigError::DamageTableShape {
                        tower,
                        enemy,
                        expected: stats.levels.len(),
                        found,
                    });
                }
            }
        }

        let timing = [
            ("spawn_interval", self.timing.spawn_interval),
            ("grace_period", self.timing.grace_period),
            ("group_delay", self.timing.group_delay),
            ("wave_delay", self.timing.wave_delay),
        ];
        for (name, value) in timing {
            if value <= 0.0 {
                return Err(ConfigError::NonPositiveTiming(name));
            }
        }

        let parsed = self.map.parse_tiles()?;
        if self.map.path.is_empty() {
            return Err(ConfigError::EmptyPath);
        }
        for waypoint in &self.map.path {
            let on_path = usize::try_from(waypoint.x)
                .ok()
                .zip(usize::try_from(waypoint.y).ok())
                .filter(|&(x, y)| x < parsed.width && y < parsed.height)
                .map(|(x, y)| parsed.tiles[y * parsed.width + x] == TileKind::Path)
                .unwrap_or(false);
            if !on_path {
                return Err(ConfigError::WaypointOffPath {
                    x: waypoint.x,
                    y: waypoint.y,
                });
            }
        }

        Ok(())
    }
}

impl Default for GameConfig {
    /// Three waves on a 12x8 map with a single winding path.
    fn default() -> Self {
        let level = |cost, sell_return, range, attack_interval| TowerLevelStats {
            cost,
            sell_return,
            range,
            attack_interval,
        };
        let group = |goblin, knight| PerEnemy { goblin, knight };

        Self {
            seed: 42,
            enemies: PerEnemy {
                goblin: EnemyStats {
                    health: 60.0,
                    speed: 80,
                    reward: 8,
                },
                knight: EnemyStats {
                    health: 180.0,
                    speed: 40,
                    reward: 20,
                },
            },
            towers: PerTower {
                artillery: TowerStats {
                    targeting: TargetingKind::Cluster,
                    levels: vec![
                        level(100, 70, 224.0, 2.5),
                        level(80, 120, 240.0, 2.3),
                        level(100, 190, 256.0, 2.1),
                    ],
                },
                mage: TowerStats {
                    targeting: TargetingKind::Random,
                    levels: vec![
                        level(70, 50, 144.0, 1.2),
                        level(60, 90, 160.0, 1.1),
                        level(80, 140, 176.0, 1.0),
                    ],
                },
                archer: TowerStats {
                    targeting: TargetingKind::Random,
                    levels: vec![
                        level(50, 35, 160.0, 0.8),
                        level(40, 60, 176.0, 0.7),
                        level(60, 100, 192.0, 0.6),
                    ],
                },
            },
            damage: PerTower {
                artillery: PerEnemy {
                    goblin: vec![30.0, 45.0, 60.0],
                    knight: vec![40.0, 60.0, 80.0],
                },
                mage: PerEnemy {
                    goblin: vec![18.0, 26.0, 36.0],
                    knight: vec![24.0, 34.0, 46.0],
                },
                archer: PerEnemy {
                    goblin: vec![20.0, 28.0, 38.0],
                    knight: vec![12.0, 18.0, 26.0],
                },
            },
            waves: vec![
                WaveSpec {
                    groups: vec![group(6, 0)],
                },
                WaveSpec {
                    groups: vec![group(4, 2), group(6, 0)],
                },
                WaveSpec {
                    groups: vec![group(4, 4), group(6, 3)],
                },
            ],
            timing: Timing {
                grace_period: 5.0,
                spawn_interval: 1.0,
                group_delay: 4.0,
                wave_delay: 10.0,
            },
            economy: EconomyConfig {
                starting_gold: 150,
                starting_health: 20,
                arrival_damage: 1,
            },
            collectables: CollectableConfig {
                drop_chance: 0.15,
                value: 10,
                lifetime: 6.0,
                pickup_radius: 24.0,
            },
            map: MapLayout {
                tiles: [
                    "x...........",
                    "#########...",
                    "........#...",
                    "........#...",
                    "........#...",
                    "..#######...",
                    "..#.........",
                    "..#.........",
                ]
                .iter()
                .map(|row| row.to_string())
                .collect(),
                path: vec![
                    TileCoord::new(0, 1),
                    TileCoord::new(8, 1),
                    TileCoord::new(8, 5),
                    TileCoord::new(2, 5),
                    TileCoord::new(2, 7),
                ],
            },
        }
    }
}
