//! Ballistic arcs for artillery shells.
//!
//! Gravity pulls along +y (screen down). A shell launched from `origin` with
//! velocity `v` is at `origin + v·t + ½·g·t²·ŷ` after `t` seconds.

use glam::DVec2;

use rampart_core::types::Point;

/// Launch parameters for a shell, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallisticSolution {
    pub velocity: DVec2,
    pub flight_time: f64,
}

/// Solve the launch velocity that lands on `target` with launch speed `speed`.
///
/// With `u = t²`, requiring `|v| = speed` gives
/// `¼g²u² − (speed² + g·dy)u + (dx² + dy²) = 0`. The larger root is the high
/// lob. When the target is out of reach the flight time falls back to
/// `|d| / speed`, which still lands on the target at a higher launch speed.
pub fn solve(origin: Point, target: Point, speed: f64, gravity: f64) -> BallisticSolution {
    let d = target - origin;
    let dist_sq = d.length_squared();
    if dist_sq <= f64::EPSILON {
        return BallisticSolution {
            velocity: DVec2::ZERO,
            flight_time: 0.0,
        };
    }

    let fallback = d.length() / speed;
    let flight_time = if gravity.abs() <= f64::EPSILON {
        fallback
    } else {
        let a = 0.25 * gravity * gravity;
        let b = -(speed * speed + gravity * d.y);
        let discriminant = b * b - 4.0 * a * dist_sq;
        if discriminant < 0.0 {
            fallback
        } else {
            let u = (-b + discriminant.sqrt()) / (2.0 * a);
            if u > 0.0 {
                u.sqrt()
            } else {
                fallback
            }
        }
    };

    BallisticSolution {
        velocity: DVec2::new(
            d.x / flight_time,
            d.y / flight_time - 0.5 * gravity * flight_time,
        ),
        flight_time,
    }
}

/// Closed-form position `t` seconds after launch.
pub fn position_at(origin: Point, velocity: DVec2, gravity: f64, t: f64) -> Point {
    origin + velocity * t + DVec2::new(0.0, 0.5 * gravity * t * t)
}
