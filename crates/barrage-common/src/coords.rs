//! Integer world coordinates.
//!
//! The map is measured in world units; one tile is [`TILE_UNITS`] wide.
//! Heights use the same unit, with `z` pointing up.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::math::{hypot2, hypot3};

/// World units per map tile.
pub const TILE_UNITS: i32 = 128;

/// Shift equivalent of [`TILE_UNITS`].
pub const TILE_SHIFT: u32 = 7;

/// Horizontal world position or offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2i {
    /// X coordinate in world units
    pub x: i32,
    /// Y coordinate in world units
    pub y: i32,
}

impl Vec2i {
    /// Creates a new horizontal vector.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Length of the vector, rounded down.
    #[must_use]
    pub fn length(self) -> i32 {
        hypot2(self.x, self.y)
    }

    /// Squared length as `i64` (cannot overflow for world coordinates).
    #[must_use]
    pub const fn length_sq(self) -> i64 {
        (self.x as i64) * (self.x as i64) + (self.y as i64) * (self.y as i64)
    }
}

impl Add for Vec2i {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2i {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// World position or offset in three dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec3i {
    /// X coordinate in world units
    pub x: i32,
    /// Y coordinate in world units
    pub y: i32,
    /// Height in world units
    pub z: i32,
}

impl Vec3i {
    /// The origin.
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// Creates a new vector.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Horizontal part of the vector.
    #[must_use]
    pub const fn xy(self) -> Vec2i {
        Vec2i::new(self.x, self.y)
    }

    /// Same horizontal position with a different height.
    #[must_use]
    pub const fn with_z(self, z: i32) -> Self {
        Self::new(self.x, self.y, z)
    }

    /// Full 3D length, rounded down.
    #[must_use]
    pub fn length(self) -> i32 {
        hypot3(self.x, self.y, self.z)
    }

    /// Horizontal length, rounded down.
    #[must_use]
    pub fn horizontal_length(self) -> i32 {
        hypot2(self.x, self.y)
    }

    /// Tile containing this position.
    #[must_use]
    pub const fn to_tile(self) -> (i32, i32) {
        (self.x >> TILE_SHIFT, self.y >> TILE_SHIFT)
    }

    /// Scales by `num / den` in 64-bit space, truncating toward zero.
    ///
    /// Returns the vector unchanged when `den` is zero.
    #[must_use]
    pub fn scale(self, num: i64, den: i64) -> Self {
        if den == 0 {
            return self;
        }
        Self::new(
            (self.x as i64 * num / den) as i32,
            (self.y as i64 * num / den) as i32,
            (self.z as i64 * num / den) as i32,
        )
    }

    /// Linear interpolation from `self` to `other` by `num / den`.
    #[must_use]
    pub fn lerp(self, other: Self, num: i64, den: i64) -> Self {
        self + (other - self).scale(num, den)
    }
}

impl Add for Vec3i {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3i {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3i {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vec3i {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Vec3i {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<i32> for Vec3i {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Orientation of an object as 16-bit circular angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rotation {
    /// Heading in the horizontal plane (0 = +x, counter-clockwise)
    pub direction: u16,
    /// Elevation above the horizontal plane
    pub pitch: u16,
}

impl Rotation {
    /// Creates a rotation.
    #[must_use]
    pub const fn new(direction: u16, pitch: u16) -> Self {
        Self { direction, pitch }
    }

    /// Rotation that looks along `delta`.
    #[must_use]
    pub fn facing(delta: Vec3i) -> Self {
        let horizontal = delta.horizontal_length();
        Self {
            direction: crate::math::atan2(delta.y, delta.x),
            pitch: crate::math::atan2(delta.z, horizontal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_arithmetic() {
        let a = Vec3i::new(1, 2, 3);
        let b = Vec3i::new(10, 20, 30);
        assert_eq!(a + b, Vec3i::new(11, 22, 33));
        assert_eq!(b - a, Vec3i::new(9, 18, 27));
        assert_eq!(-a, Vec3i::new(-1, -2, -3));
        assert_eq!(a * 2, Vec3i::new(2, 4, 6));
    }

    #[test]
    fn test_lerp_midpoint() {
        let a = Vec3i::new(0, 0, 0);
        let b = Vec3i::new(900, -300, 60);
        assert_eq!(a.lerp(b, 1, 2), Vec3i::new(450, -150, 30));
    }

    #[test]
    fn test_scale_zero_denominator() {
        let a = Vec3i::new(5, 6, 7);
        assert_eq!(a.scale(3, 0), a);
    }

    #[test]
    fn test_lengths() {
        assert_eq!(Vec3i::new(3, 4, 0).length(), 5);
        assert_eq!(Vec3i::new(3, 4, 12).length(), 13);
        assert_eq!(Vec3i::new(3, 4, 12).horizontal_length(), 5);
        assert_eq!(Vec2i::new(-6, 8).length(), 10);
        assert_eq!(Vec2i::new(-6, 8).length_sq(), 100);
    }

    #[test]
    fn test_negative_tile() {
        assert_eq!(Vec3i::new(-1, 127, 0).to_tile(), (-1, 0));
    }

    #[test]
    fn test_facing_straight_up_pitch() {
        let rot = Rotation::facing(Vec3i::new(0, 0, 100));
        assert!((i32::from(rot.pitch) - 16384).abs() <= 2);
    }
}
