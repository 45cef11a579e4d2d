//! # Barrage Gameplay
//!
//! Projectile simulation for Project Barrage.
//!
//! This crate provides everything between "a weapon fired" and "something
//! took damage":
//! - Weapon statistics and movement models
//! - World objects (droids, structures, features) in a handle arena
//! - Projectile launch, flight, collision and impact
//! - Splash, burn and EMP damage with armour and modifier tables
//! - Experience attribution and match statistics
//! - Combat event bus for listeners outside the simulation
//!
//! All arithmetic is integer and all randomness comes from the battlefield's
//! synchronized generator, so two peers fed the same orders stay in lockstep.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod battlefield;
pub mod collision_detector;
pub mod config;
pub mod damage_calc;
pub mod entity;
pub mod events;
pub mod experience;
pub mod faction;
pub mod impact;
pub mod match_stats;
pub mod projectile;
pub mod weapon;
pub mod world;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::battlefield::*;
    pub use crate::collision_detector::*;
    pub use crate::config::*;
    pub use crate::damage_calc::*;
    pub use crate::entity::*;
    pub use crate::events::*;
    pub use crate::experience::*;
    pub use crate::faction::*;
    pub use crate::impact::*;
    pub use crate::match_stats::*;
    pub use crate::projectile::*;
    pub use crate::weapon::*;
    pub use crate::world::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use barrage_common::{PlayerId, Vec3i};
    use barrage_kernel::FlatTerrain;
    use std::sync::Arc;

    #[test]
    fn test_cannon_duel() {
        let attacker = PlayerId::from_raw(0);
        let mut bf = Battlefield::new(FlatTerrain::new(-100), 7);
        let mut world = ProjectileWorld::new(ProjectileConfig::default());
        world.init();

        let gunner = bf.objects.insert(Droid::new(attacker, Vec3i::ZERO, 500));
        let victim = bf
            .objects
            .insert(Droid::new(PlayerId::from_raw(1), Vec3i::new(600, 0, 0), 40));
        let cannon = Arc::new(WeaponStats::new("cannon", "Light Cannon").with_damage(100, 0));

        let order = LaunchOrder::new(cannon, attacker, Vec3i::new(0, 0, 10), AimPoint::Object(victim))
            .with_attacker(gunner);
        assert!(world.launch(&mut bf, order));

        for _ in 0..20 {
            world.advance_all(&mut bf);
        }

        assert!(bf.objects.get(victim).is_some_and(Combatant::is_dead));
        let stats = bf.stats.player(attacker).expect("attacker stats");
        assert_eq!((stats.shots_fired, stats.hits, stats.kills), (1, 1, 1));
        assert!(world.iter().all(Projectile::is_inactive) || world.is_empty());
    }
}
