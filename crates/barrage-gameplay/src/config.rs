//! Tunables of the projectile simulation.

use barrage_kernel::ACC_GRAVITY;
use serde::{Deserialize, Serialize};

/// Projectile simulation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Gravity for indirect fire, units per second squared
    pub gravity: i32,
    /// How far past its long range a projectile may travel, in percent
    pub range_extension_percent: u32,
    /// Radius of the candidate query around a projectile
    pub neighbour_radius: i32,
    /// Homing missiles cruise at remaining distance divided by this above ground
    pub homing_clearance_divisor: i32,
    /// Highest cruise altitude above ground for homing missiles
    pub homing_max_clearance: i32,
    /// Attempts to lift a homing path clear of terrain
    pub homing_terrain_retries: u32,
    /// Height added per attempt
    pub homing_terrain_bias: i32,
    /// Random spread of indirect muzzle speed, in percent
    pub speed_jitter_percent: u32,
    /// Spacing of terrain samples along a path
    pub terrain_sample_step: i32,
    /// Collision radius of interceptable projectiles
    pub projectile_radius: i32,
    /// Capacity of the combat event bus
    pub event_capacity: usize,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            gravity: ACC_GRAVITY,
            range_extension_percent: 150,
            neighbour_radius: 512,
            homing_clearance_divisor: 4,
            homing_max_clearance: 256,
            homing_terrain_retries: 3,
            homing_terrain_bias: 64,
            speed_jitter_percent: 5,
            terrain_sample_step: 32,
            projectile_radius: 16,
            event_capacity: 4096,
        }
    }
}
