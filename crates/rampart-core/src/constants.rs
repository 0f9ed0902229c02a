//! Simulation constants and tuning parameters.

use std::time::Duration;

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- World ---

/// Width and height of one map tile in world units.
pub const TILE_SIZE: f64 = 64.0;

// --- Wave scheduling ---

/// Upper bound on random draws before the scheduler falls back to the
/// first kind with a non-zero count.
pub const MAX_SPAWN_ATTEMPTS: u32 = 32;

// --- Enemies ---

/// Seconds a dead enemy lingers (death animation) before removal.
pub const DEATH_LINGER_SECS: f64 = 0.5;

/// Distance at which an enemy counts as having reached a waypoint.
pub const WAYPOINT_EPSILON: f64 = 1e-6;

// --- Effects ---

/// Speed multiplier applied by a slowdown.
pub const SLOWDOWN_FACTOR: f64 = 0.8;

/// Slowdown duration in seconds.
pub const SLOWDOWN_DURATION: f64 = 2.0;

/// Priority of the slowdown layer when folding effective speed.
pub const SLOWDOWN_PRIORITY: u8 = 1;

/// Leader/escort proximity that activates synergetic movement.
pub const SYNERGY_RADIUS: f64 = TILE_SIZE;

/// Priority of the synergy layer when folding effective speed.
pub const SYNERGY_PRIORITY: u8 = 2;

// --- Towers ---

/// Neighbourhood radius used by the cluster targeting strategy.
pub const CLUSTER_RADIUS: f64 = TILE_SIZE * 1.5;

// --- Projectiles ---

/// Arrow flight speed (world units per second).
pub const ARROW_SPEED: f64 = 480.0;

/// Magic bolt flight speed (world units per second).
pub const MAGIC_SPEED: f64 = 360.0;

/// Artillery shell launch speed (world units per second).
pub const ARTILLERY_SPEED: f64 = 420.0;

/// Hit radius for point projectiles.
pub const POINT_HIT_RADIUS: f64 = 16.0;

/// Blast radius of an artillery shell.
pub const ARTILLERY_AREA_RADIUS: f64 = TILE_SIZE;

/// Screen-space gravity for ballistic projectiles (+y is down).
pub const GRAVITY: f64 = 600.0;

/// Seconds before an unresolved projectile is discarded.
pub const PROJECTILE_LIFETIME: f64 = 5.0;

// --- Game speed ---

/// Lowest accepted game speed multiplier.
pub const MIN_GAME_SPEED: f64 = 0.25;

/// Highest accepted game speed multiplier.
pub const MAX_GAME_SPEED: f64 = 4.0;

// --- Loop ---

/// Maximum simulation steps run for a single wall-clock frame.
pub const MAX_STEPS_PER_FRAME: u32 = 8;

/// Polling interval while the game is paused.
pub const PAUSE_POLL: Duration = Duration::from_millis(50);

/// How long a command waits for the loop thread to reply.
pub const COMMAND_REPLY_TIMEOUT: Duration = Duration::from_millis(500);

/// How long `end_game` waits for the loop thread to exit.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);
