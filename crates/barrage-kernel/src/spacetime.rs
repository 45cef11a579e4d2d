//! Position, orientation and time of a moving object at one instant.

use barrage_common::{GameTime, Rotation, Vec3i};
use serde::{Deserialize, Serialize};

use crate::collision::FRACTION_ONE;

/// A pose stamped with the game time it was valid at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Spacetime {
    /// World position
    pub pos: Vec3i,
    /// Orientation
    pub rot: Rotation,
    /// Game time of this sample
    pub time: GameTime,
}

impl Spacetime {
    /// Creates a spacetime sample.
    #[must_use]
    pub const fn new(pos: Vec3i, rot: Rotation, time: GameTime) -> Self {
        Self { pos, rot, time }
    }

    /// Pose at `time`, interpolated between `self` and `later`.
    ///
    /// Times outside the pair are clamped. Angles take the short way round.
    #[must_use]
    pub fn interpolate(&self, later: &Self, time: GameTime) -> Self {
        let span = later.time.since(self.time);
        if span == 0 {
            return *later;
        }
        let elapsed = time.since(self.time).min(span);
        self.blend(later, i64::from(elapsed), i64::from(span))
    }

    /// Pose a fraction of [`FRACTION_ONE`] of the way to `later`.
    #[must_use]
    pub fn at_fraction(&self, later: &Self, fraction: i32) -> Self {
        let fraction = fraction.clamp(0, FRACTION_ONE);
        self.blend(later, i64::from(fraction), i64::from(FRACTION_ONE))
    }

    fn blend(&self, later: &Self, num: i64, den: i64) -> Self {
        let span = i64::from(later.time.since(self.time));
        Self {
            pos: self.pos.lerp(later.pos, num, den),
            rot: Rotation::new(
                lerp_angle(self.rot.direction, later.rot.direction, num, den),
                lerp_angle(self.rot.pitch, later.rot.pitch, num, den),
            ),
            time: self.time.plus((span * num / den) as u32),
        }
    }
}

fn lerp_angle(from: u16, to: u16, num: i64, den: i64) -> u16 {
    let delta = i64::from(to.wrapping_sub(from) as i16);
    from.wrapping_add((delta * num / den) as i16 as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use barrage_common::deg;

    fn sample(x: i32, dir: u16, ms: u32) -> Spacetime {
        Spacetime::new(Vec3i::new(x, 0, 0), Rotation::new(dir, 0), GameTime::from_millis(ms))
    }

    #[test]
    fn test_interpolate_midpoint() {
        let a = sample(0, 0, 1000);
        let b = sample(300, 0, 1100);
        let mid = a.interpolate(&b, GameTime::from_millis(1050));
        assert_eq!(mid.pos.x, 150);
        assert_eq!(mid.time.millis(), 1050);
    }

    #[test]
    fn test_interpolate_clamps() {
        let a = sample(0, 0, 1000);
        let b = sample(300, 0, 1100);
        assert_eq!(a.interpolate(&b, GameTime::from_millis(5000)).pos.x, 300);
        assert_eq!(a.interpolate(&b, GameTime::ZERO).pos.x, 0);
    }

    #[test]
    fn test_angle_takes_short_way() {
        let a = sample(0, deg(350), 0);
        let b = sample(0, deg(10), 100);
        let mid = a.at_fraction(&b, FRACTION_ONE / 2);
        // midpoint is 0 degrees, not 180
        assert!(i32::from(mid.rot.direction as i16).abs() <= 2);
    }

    #[test]
    fn test_at_fraction_time() {
        let a = sample(0, 0, 2000);
        let b = sample(1024, 0, 2100);
        let quarter = a.at_fraction(&b, 256);
        assert_eq!(quarter.pos.x, 256);
        assert_eq!(quarter.time.millis(), 2025);
    }
}
