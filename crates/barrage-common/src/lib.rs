//! # Barrage Common
//!
//! Common types, utilities, and shared abstractions for Project Barrage.
//!
//! This crate provides foundational types used across all Barrage subsystems:
//! - Integer world coordinates and vectors
//! - ID and generation-checked handle types
//! - Fixed-point math (integer square root, 16-bit circular angles)
//! - Game time and tick constants
//! - The network-synchronized random source
//! - Common error types
//! - Prelude for convenient imports
//!
//! Nothing in here uses floating point. Every value that feeds the
//! simulation must be bit-identical on every peer of a lockstep game.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;
pub mod math;
pub mod rng;
pub mod time;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::math::*;
    pub use crate::rng::*;
    pub use crate::time::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_conversion() {
        let pos = Vec3i::new(300, 130, 0);
        assert_eq!(pos.to_tile(), (2, 1));
    }

    #[test]
    fn test_handle_generation_mismatch() {
        let a = ObjectHandle::new(4, 1);
        let b = ObjectHandle::new(4, 2);
        assert_ne!(a, b);
        assert_eq!(a.index(), b.index());
    }

    #[test]
    fn test_angle_roundtrip() {
        let angle = atan2(100, 100);
        assert!((i32::from(angle) - i32::from(DEG_45)).abs() <= 2);
    }
}
