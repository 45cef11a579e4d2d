//! # Barrage Engine
//!
//! Headless host for Project Barrage.
//!
//! This crate ties the simulation to the outside world:
//! - Configuration: TOML engine settings with defaults for every key
//! - Weapon data: TOML weapon files, validation and the shared registry
//! - Skirmish: a scripted battle that drives the fixed-rate outer loop

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod skirmish;
pub mod weapon_loader;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::skirmish::*;
    pub use crate::weapon_loader::*;
}

pub use prelude::*;
