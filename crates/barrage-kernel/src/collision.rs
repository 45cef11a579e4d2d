//! Swept collision intervals.
//!
//! A projectile moves along a straight segment during one tick. Every test in
//! this module takes the segment relative to the target (so the target sits
//! at the origin) and returns the window of the tick, as a fraction of
//! [`FRACTION_ONE`], during which the moving point overlaps the shape.
//!
//! Interval bounds round inward: `begin` up, `end` down. A segment that never
//! enters the shape therefore always yields an empty interval.
//!
//! # Example
//!
//! ```
//! use barrage_common::Vec3i;
//! use barrage_kernel::collision::{sweep_shape, CollisionShape, FRACTION_ONE};
//!
//! // Crossing a 64-unit circle head on, from x = -256 to x = 256.
//! let hit = sweep_shape(
//!     CollisionShape::circle(64),
//!     Vec3i::new(-256, 0, 0),
//!     Vec3i::new(256, 0, 0),
//!     32,
//! );
//! assert_eq!(hit.begin, 384);
//! assert_eq!(hit.end, 640);
//! assert!(hit.end <= FRACTION_ONE);
//! ```

use barrage_common::{isqrt, Vec2i, Vec3i};
use serde::{Deserialize, Serialize};

/// The whole tick, as an interval fraction.
pub const FRACTION_ONE: i32 = 1024;

// ============================================================================
// Interval
// ============================================================================

/// Fraction-of-tick window, inclusive at both ends. Empty when `begin > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    /// First overlapping fraction.
    pub begin: i32,
    /// Last overlapping fraction.
    pub end: i32,
}

impl Interval {
    /// The whole tick.
    pub const FULL: Self = Self {
        begin: 0,
        end: FRACTION_ONE,
    };

    /// No overlap.
    pub const EMPTY: Self = Self {
        begin: FRACTION_ONE,
        end: 0,
    };

    /// Creates an interval clamped to the tick.
    #[must_use]
    pub fn new(begin: i64, end: i64) -> Self {
        if begin > i64::from(FRACTION_ONE) || end < 0 || begin > end {
            return Self::EMPTY;
        }
        Self {
            begin: begin.max(0) as i32,
            end: end.min(i64::from(FRACTION_ONE)) as i32,
        }
    }

    /// True when there is no overlap.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.begin > self.end
    }

    /// Overlap of both windows.
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        if self.is_empty() || other.is_empty() {
            return Self::EMPTY;
        }
        let begin = self.begin.max(other.begin);
        let end = self.end.min(other.end);
        if begin > end {
            Self::EMPTY
        } else {
            Self { begin, end }
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::EMPTY
    }
}

fn floor_div(num: i128, den: i128) -> i128 {
    num.div_euclid(den)
}

fn ceil_div(num: i128, den: i128) -> i128 {
    -(-num).div_euclid(den)
}

// ============================================================================
// Interval tests
// ============================================================================

/// Window during which `z` moving from `z1` to `z2` satisfies `|z| <= height`.
#[must_use]
pub fn collision_z(z1: i32, z2: i32, height: i32) -> Interval {
    let height = i128::from(height.max(0));
    let (z1, z2) = (i128::from(z1), i128::from(z2));
    let mut dz = z2 - z1;
    if dz == 0 {
        return if z1.abs() <= height {
            Interval::FULL
        } else {
            Interval::EMPTY
        };
    }

    let one = i128::from(FRACTION_ONE);
    let mut low = (-height - z1) * one;
    let mut high = (height - z1) * one;
    if dz < 0 {
        dz = -dz;
        low = -low;
        high = -high;
        std::mem::swap(&mut low, &mut high);
    }
    Interval::new(
        clamp_i64(ceil_div(low, dz)),
        clamp_i64(floor_div(high, dz)),
    )
}

/// Window during which a point moving from `p1` to `p2` is within `radius`
/// of the origin.
#[must_use]
pub fn collision_xy(p1: Vec2i, p2: Vec2i, radius: i32) -> Interval {
    let (x1, y1) = (i128::from(p1.x), i128::from(p1.y));
    let dx = i128::from(p2.x) - x1;
    let dy = i128::from(p2.y) - y1;
    let r = i128::from(radius.max(0));

    let a = dx * dx + dy * dy;
    let c = x1 * x1 + y1 * y1 - r * r;
    if a == 0 {
        return if c <= 0 {
            Interval::FULL
        } else {
            Interval::EMPTY
        };
    }

    // |p1 + d t|^2 = r^2 with the linear term halved.
    let half_b = x1 * dx + y1 * dy;
    let disc = half_b * half_b - a * c;
    if disc < 0 {
        return Interval::EMPTY;
    }
    let root = i128::from(isqrt(disc.min(i128::from(u64::MAX)) as u64));
    let one = i128::from(FRACTION_ONE);
    Interval::new(
        clamp_i64(ceil_div((-half_b - root) * one, a)),
        clamp_i64(floor_div((-half_b + root) * one, a)),
    )
}

/// Window during which a point moving from `p1` to `p2` is inside the
/// axis-aligned rectangle `[-half_w, half_w] x [-half_h, half_h]`.
#[must_use]
pub fn collision_xy_rect(p1: Vec2i, p2: Vec2i, half_w: i32, half_h: i32) -> Interval {
    collision_z(p1.x, p2.x, half_w).intersect(collision_z(p1.y, p2.y, half_h))
}

fn clamp_i64(v: i128) -> i64 {
    v.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

// ============================================================================
// Shapes
// ============================================================================

/// Horizontal footprint of a collision candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionShape {
    /// Round footprint, used for units and projectiles.
    Circle {
        /// Radius in world units.
        radius: i32,
    },
    /// Axis-aligned footprint, used for structures and features.
    Rect {
        /// Half the extent along x.
        half_w: i32,
        /// Half the extent along y.
        half_h: i32,
    },
}

impl CollisionShape {
    /// Circular footprint.
    #[must_use]
    pub const fn circle(radius: i32) -> Self {
        Self::Circle { radius }
    }

    /// Rectangular footprint from a tile-aligned width and breadth.
    #[must_use]
    pub const fn rect(width: i32, breadth: i32) -> Self {
        Self::Rect {
            half_w: width / 2,
            half_h: breadth / 2,
        }
    }

    /// Radius of a circle containing the whole footprint.
    #[must_use]
    pub fn bounding_radius(&self) -> i32 {
        match *self {
            Self::Circle { radius } => radius,
            Self::Rect { half_w, half_h } => barrage_common::hypot2(half_w, half_h) + 1,
        }
    }

    /// The same footprint grown by `margin` on every side.
    #[must_use]
    pub fn inflated(self, margin: i32) -> Self {
        match self {
            Self::Circle { radius } => Self::Circle {
                radius: radius + margin,
            },
            Self::Rect { half_w, half_h } => Self::Rect {
                half_w: half_w + margin,
                half_h: half_h + margin,
            },
        }
    }
}

impl Default for CollisionShape {
    fn default() -> Self {
        Self::Circle { radius: 32 }
    }
}

/// Sweeps a segment against a shape extruded `half_height` above and below
/// the origin. `start` and `end` are relative to the shape's centre.
#[must_use]
pub fn sweep_shape(shape: CollisionShape, start: Vec3i, end: Vec3i, half_height: i32) -> Interval {
    let vertical = collision_z(start.z, end.z, half_height);
    if vertical.is_empty() {
        return Interval::EMPTY;
    }
    let horizontal = match shape {
        CollisionShape::Circle { radius } => collision_xy(start.xy(), end.xy(), radius),
        CollisionShape::Rect { half_w, half_h } => {
            collision_xy_rect(start.xy(), end.xy(), half_w, half_h)
        },
    };
    vertical.intersect(horizontal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_interval_intersect() {
        let a = Interval::new(100, 600);
        let b = Interval::new(400, 900);
        assert_eq!(a.intersect(b), Interval { begin: 400, end: 600 });
        assert!(a.intersect(Interval::new(700, 800)).is_empty());
        assert!(Interval::EMPTY.intersect(Interval::FULL).is_empty());
        assert!(Interval::new(-50, -1).is_empty());
        assert_eq!(Interval::new(-50, 2000), Interval::FULL);
    }

    #[test]
    fn test_collision_z_crossing() {
        // Falling from 100 to -100 through a band of half-height 50.
        let hit = collision_z(100, -100, 50);
        assert_eq!(hit, Interval { begin: 256, end: 768 });
        // Rising gives the mirrored window.
        assert_eq!(collision_z(-100, 100, 50), hit);
    }

    #[test]
    fn test_collision_z_level() {
        assert_eq!(collision_z(20, 20, 50), Interval::FULL);
        assert!(collision_z(80, 80, 50).is_empty());
    }

    #[test]
    fn test_collision_xy_miss_and_graze() {
        // Passes 100 units to the side of a 64-unit circle.
        let miss = collision_xy(Vec2i::new(-300, 100), Vec2i::new(300, 100), 64);
        assert!(miss.is_empty());

        let hit = collision_xy(Vec2i::new(-300, 30), Vec2i::new(300, 30), 64);
        assert!(!hit.is_empty());
        assert!(hit.begin < FRACTION_ONE / 2 && hit.end > FRACTION_ONE / 2);
    }

    #[test]
    fn test_collision_xy_starts_inside() {
        let hit = collision_xy(Vec2i::new(0, 0), Vec2i::new(500, 0), 100);
        assert_eq!(hit.begin, 0);
        assert_eq!(hit.end, 204);
    }

    #[test]
    fn test_rect_sweep() {
        let hit = collision_xy_rect(Vec2i::new(-200, 10), Vec2i::new(200, 10), 64, 64);
        assert_eq!(hit, Interval { begin: 349, end: 675 });
        assert!(collision_xy_rect(Vec2i::new(-200, 90), Vec2i::new(200, 90), 64, 64).is_empty());
    }

    #[test]
    fn test_sweep_shape_rejects_on_height() {
        let shape = CollisionShape::circle(64);
        let over = sweep_shape(shape, Vec3i::new(-256, 0, 200), Vec3i::new(256, 0, 200), 32);
        assert!(over.is_empty());
    }

    #[test]
    fn test_shape_helpers() {
        assert_eq!(CollisionShape::rect(256, 128), CollisionShape::Rect { half_w: 128, half_h: 64 });
        assert_eq!(CollisionShape::circle(10).inflated(6), CollisionShape::circle(16));
        assert!(CollisionShape::rect(256, 256).bounding_radius() > 128);
    }

    proptest! {
        #[test]
        fn prop_collision_z_empty_when_segment_stays_out(
            z1 in -100_000i32..100_000,
            z2 in -100_000i32..100_000,
            height in 0i32..5_000,
        ) {
            let above = z1 > height && z2 > height;
            let below = z1 < -height && z2 < -height;
            prop_assume!(above || below);
            prop_assert!(collision_z(z1, z2, height).is_empty());
        }

        #[test]
        fn prop_collision_z_endpoints_inside(
            z1 in -5_000i32..5_000,
            z2 in -5_000i32..5_000,
            height in 0i32..5_000,
        ) {
            let hit = collision_z(z1, z2, height);
            if z1.abs() <= height {
                prop_assert_eq!(hit.begin, 0);
            }
            if z2.abs() <= height {
                prop_assert_eq!(hit.end, FRACTION_ONE);
            }
        }

        #[test]
        fn prop_collision_xy_empty_when_far(
            x1 in -10_000i32..10_000,
            x2 in -10_000i32..10_000,
            offset in 65i32..10_000,
        ) {
            // A horizontal path `offset` away from the centre never touches a 64 circle.
            let hit = collision_xy(Vec2i::new(x1, offset), Vec2i::new(x2, offset), 64);
            prop_assert!(hit.is_empty());
        }
    }
}
