//! # Barrage Kernel
//!
//! Deterministic ballistics kernel.
//!
//! This crate holds the pure numeric pieces of projectile simulation:
//! - Ballistic trajectory solving for indirect fire
//! - Swept collision intervals against circles, rectangles and height bands
//! - Spacetime samples and sub-tick interpolation
//! - Terrain height fields and line-versus-terrain intersection
//!
//! ## Determinism
//!
//! Every function here is integer-only and depends on nothing but its
//! arguments. Peers of a lockstep match call these with identical inputs
//! and must get identical outputs, so no floating point and no hidden state
//! is allowed anywhere in the crate.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod collision;
pub mod spacetime;
pub mod terrain;
pub mod trajectory;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::collision::*;
    pub use crate::spacetime::*;
    pub use crate::terrain::*;
    pub use crate::trajectory::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use barrage_common::{GameTime, Rotation, Vec3i};

    #[test]
    fn test_arc_samples_stay_above_flat_ground() {
        let ground = FlatTerrain::new(0);
        let shot = solve_indirect(2000, 0, 1500, 0, ACC_GRAVITY);
        let mut prev = Spacetime::new(Vec3i::new(0, 0, 1), Rotation::default(), GameTime::ZERO);
        let mut t = 100;
        while t < shot.flight_time.saturating_sub(100) {
            let (x, z) = shot.position_at(t);
            let next = Spacetime::new(Vec3i::new(x, 0, z + 1), Rotation::default(), GameTime::from_millis(t));
            assert_eq!(terrain_intersection(&ground, prev.pos, next.pos, 32), None);
            prev = next;
            t += 100;
        }
    }
}
