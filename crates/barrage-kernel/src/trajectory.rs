//! Ballistic trajectory solver.
//!
//! Solves launch velocities for indirect (arcing) fire entirely in integer
//! arithmetic:
//!
//! ```text
//! dx = vx * t
//! dz = vz * t - g * t^2 / 2
//! v^2 = vx^2 + vz^2
//! ```
//!
//! Velocities are world units per second, time is game-time milliseconds.
//!
//! # Example
//!
//! ```
//! use barrage_kernel::trajectory::{solve_indirect, ACC_GRAVITY};
//!
//! let shot = solve_indirect(1000, 0, 1000, 0, ACC_GRAVITY);
//! assert_eq!(shot.vx, shot.vz); // 45 degrees is the only solution
//! assert!((shot.apex_time() * 2).abs_diff(shot.flight_time) <= 2);
//! ```

use barrage_common::{atan2, deg, hypot2, isqrt, isqrt_i64, sin_cos, SyncedRng, GAME_TICKS_PER_SEC};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Default gravitational acceleration in world units per second squared.
pub const ACC_GRAVITY: i32 = 1000;

/// Steepest minimum elevation the solver will honour.
pub const MAX_MIN_ANGLE: u16 = deg(85);

const MS: i64 = GAME_TICKS_PER_SEC as i64;

/// Launch parameters of an arcing shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallisticSolution {
    /// Horizontal speed along the firing direction.
    pub vx: i32,
    /// Initial vertical speed; never negative.
    pub vz: i32,
    /// Milliseconds until the shell reaches the aim point.
    pub flight_time: u32,
    /// Launch speed actually used, after any increase.
    pub speed: i32,
    /// Gravity the solution was computed for.
    pub gravity: i32,
}

impl BallisticSolution {
    /// Horizontal distance and height gained after `elapsed` milliseconds.
    #[must_use]
    pub fn position_at(&self, elapsed: u32) -> (i32, i32) {
        let t = i64::from(elapsed);
        let horizontal = i64::from(self.vx) * t / MS;
        let vertical =
            i64::from(self.vz) * t / MS - i64::from(self.gravity) * t * t / (2 * MS * MS);
        (horizontal as i32, vertical as i32)
    }

    /// Milliseconds until the top of the arc.
    #[must_use]
    pub fn apex_time(&self) -> u32 {
        if self.gravity <= 0 {
            return self.flight_time;
        }
        (i64::from(self.vz) * MS / i64::from(self.gravity)) as u32
    }

    /// Elevation of the launch velocity.
    #[must_use]
    pub fn launch_angle(&self) -> u16 {
        atan2(self.vz, self.vx)
    }
}

/// Applies the shared speed jitter so repeated shots do not follow one arc.
pub fn jittered_speed(speed: i32, rng: &mut SyncedRng, percent: u32) -> i32 {
    rng.jitter_percent(speed, percent).max(1)
}

/// Solves the low arc from the muzzle to a point `dx` away horizontally and
/// `dz` above.
///
/// The speed is raised to the smallest value that reaches the target if
/// `speed` cannot. A solution that would leave the muzzle pointing down is
/// replaced by a level launch that falls onto the target. An elevation below
/// `min_angle` is replaced by the arc through the target at exactly
/// `min_angle`.
#[must_use]
pub fn solve_indirect(dx: i32, dz: i32, speed: i32, min_angle: u16, gravity: i32) -> BallisticSolution {
    let g = i64::from(gravity.max(1));
    let dx = i64::from(dx.max(0));
    let dz = i64::from(dz);
    let v = i64::from(speed.max(1));

    if dx == 0 {
        return solve_vertical(dz, v, g);
    }

    let mut v2 = v * v;
    let mut disc = discriminant(v2, dx, dz, g);
    if disc < 0 {
        // Cheapest speed that still reaches: v^2 = g * (dz + |(dx, dz)|)
        let reach = i64::from(hypot2(dx as i32, dz as i32));
        v2 = g * (dz + reach) + g;
        disc = discriminant(v2, dx, dz, g).max(0);
        trace!(dx, dz, speed, raised = isqrt_i64(v2), "raised launch speed to reach target");
    }
    let launch_speed = isqrt_i64(v2);

    let root = isqrt(disc.min(i128::from(u64::MAX)) as u64) as i64;
    let rise = v2 - root;
    let run = g * dx;

    let (mut vx, mut vz) = if rise < 0 {
        // Level launch, then fall the whole height difference.
        let t = isqrt_i64(-2 * dz * MS * MS / g).max(1);
        (dx * MS / t, 0)
    } else {
        let len = isqrt_i64(rise * rise + run * run).max(1);
        (launch_speed * run / len, launch_speed * rise / len)
    };

    let floor = min_angle.min(MAX_MIN_ANGLE);
    if atan2(vz as i32, vx as i32) < floor {
        let (s, c) = sin_cos(floor);
        let (s, c) = (i64::from(s), i64::from(c));
        let lift = (dx * s / c - dz).max(1);
        vx = isqrt_i64(g * dx * dx / (2 * lift));
        vz = vx * s / c;
    }

    let vx = vx.max(1);
    let flight_time = (dx * MS / vx).max(1);
    BallisticSolution {
        vx: vx as i32,
        vz: vz as i32,
        flight_time: flight_time as u32,
        speed: isqrt_i64(vx * vx + vz * vz) as i32,
        gravity: g as i32,
    }
}

/// `v^4 - g * (g * dx^2 + 2 * dz * v^2)`; negative means out of reach.
fn discriminant(v2: i64, dx: i64, dz: i64, g: i64) -> i128 {
    let v2 = i128::from(v2);
    let (dx, dz, g) = (i128::from(dx), i128::from(dz), i128::from(g));
    v2 * v2 - g * (g * dx * dx + 2 * dz * v2)
}

/// Straight up and back down onto a point directly above or below.
fn solve_vertical(dz: i64, v: i64, g: i64) -> BallisticSolution {
    let need = 2 * g * dz.max(0);
    let mut vz = isqrt_i64((v * v).max(need));
    if vz * vz < need {
        vz += 1;
    }
    let fall = isqrt_i64(vz * vz - 2 * g * dz);
    let flight_time = ((vz + fall) * MS / g).max(1);
    BallisticSolution {
        vx: 0,
        vz: vz as i32,
        flight_time: flight_time as u32,
        speed: vz as i32,
        gravity: g as i32,
    }
}
