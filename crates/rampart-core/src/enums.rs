//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Enemy archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Fast and fragile. Acts as the escort for synergetic movement.
    Goblin,
    /// Slow and armoured. Acts as the leader for synergetic movement.
    Knight,
}

impl EnemyKind {
    pub const COUNT: usize = 2;
    pub const ALL: [EnemyKind; Self::COUNT] = [EnemyKind::Goblin, EnemyKind::Knight];

    /// Position of this kind in per-kind arrays.
    pub fn index(self) -> usize {
        match self {
            EnemyKind::Goblin => 0,
            EnemyKind::Knight => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Whether this kind gets sped up when escorted.
    pub fn is_leader(self) -> bool {
        self == EnemyKind::Knight
    }

    /// Whether this kind escorts leaders.
    pub fn is_escort(self) -> bool {
        self == EnemyKind::Goblin
    }
}

/// Tower archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    Artillery,
    Mage,
    Archer,
}

impl TowerKind {
    pub const COUNT: usize = 3;
    pub const ALL: [TowerKind; Self::COUNT] =
        [TowerKind::Artillery, TowerKind::Mage, TowerKind::Archer];

    pub fn index(self) -> usize {
        match self {
            TowerKind::Artillery => 0,
            TowerKind::Mage => 1,
            TowerKind::Archer => 2,
        }
    }

    /// The projectile this tower fires.
    pub fn projectile(self) -> ProjectileKind {
        match self {
            TowerKind::Artillery => ProjectileKind::Artillery,
            TowerKind::Mage => ProjectileKind::Magic,
            TowerKind::Archer => ProjectileKind::Arrow,
        }
    }
}

/// Projectile type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    Arrow,
    Magic,
    Artillery,
}

impl ProjectileKind {
    pub fn shape(self) -> DamageShape {
        match self {
            ProjectileKind::Arrow | ProjectileKind::Magic => DamageShape::Point,
            ProjectileKind::Artillery => DamageShape::Area,
        }
    }

    /// Whether a hit from this projectile slows the target.
    pub fn slows(self) -> bool {
        self == ProjectileKind::Magic
    }
}

/// How a projectile applies damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageShape {
    /// Single target.
    Point,
    /// Every enemy within the blast radius.
    Area,
}

/// Projectile lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileState {
    /// In flight, cannot hit anything yet (area shells).
    #[default]
    Moving,
    /// Able to hit (point projectiles in flight, area shells on impact).
    Active,
    /// Reached its target point without hitting.
    Stopped,
    /// Resolved; waiting for removal.
    Dead,
}

/// Effect discriminator for enemy decorations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    SlowDown,
    SynergeticMovement,
}

/// Tower target selection strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetingKind {
    /// Uniformly random enemy in range.
    #[default]
    Random,
    /// Enemy with the most neighbours.
    Cluster,
}

/// Game phase (top-level state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Setup,
    Running,
    Paused,
    Lost,
    Won,
}

impl GamePhase {
    pub fn is_over(self) -> bool {
        matches!(self, GamePhase::Lost | GamePhase::Won)
    }
}

/// Content of one map tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Buildable,
    Path,
    Blocked,
    Tower { kind: TowerKind, level: u8 },
}
