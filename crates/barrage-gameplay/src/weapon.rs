//! Weapon statistics.
//!
//! Weapon data is loaded once, validated, and shared read-only between every
//! projectile that weapon fires.

use serde::{Deserialize, Serialize};

/// How a projectile travels from muzzle to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementModel {
    /// Straight line to the aim point.
    #[default]
    Direct,
    /// Ballistic arc.
    Indirect,
    /// Straight line that follows a live target.
    HomingDirect,
    /// Arc that follows a live target while hugging the terrain.
    HomingIndirect,
}

impl MovementModel {
    /// Arcing movement.
    #[must_use]
    pub const fn is_indirect(self) -> bool {
        matches!(self, Self::Indirect | Self::HomingIndirect)
    }

    /// Re-aims at a live target every tick.
    #[must_use]
    pub const fn is_homing(self) -> bool {
        matches!(self, Self::HomingDirect | Self::HomingIndirect)
    }
}

/// Damage profile used against the modifier tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponEffect {
    /// Machine guns and the like.
    #[default]
    AntiPersonnel,
    /// Armour-piercing.
    AntiTank,
    /// Anti-structure.
    BunkerBuster,
    /// Area artillery.
    ArtilleryRound,
    /// Incendiary.
    Flamer,
    /// Anti-air.
    AntiAircraft,
}

impl WeaponEffect {
    /// Every effect, in table order.
    pub const ALL: [Self; 6] = [
        Self::AntiPersonnel,
        Self::AntiTank,
        Self::BunkerBuster,
        Self::ArtilleryRound,
        Self::Flamer,
        Self::AntiAircraft,
    ];

    /// Row index into the modifier tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Which armour value protects against the weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponClass {
    /// Stopped by kinetic armour.
    #[default]
    Kinetic,
    /// Stopped by thermal armour.
    Heat,
}

/// Weapon family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponSubClass {
    /// Automatic small arms.
    #[default]
    MachineGun,
    /// Tank and bunker guns.
    Cannon,
    /// Light artillery.
    Mortar,
    /// Heavy artillery.
    Howitzer,
    /// Guided missiles.
    Missile,
    /// Unguided rockets.
    Rocket,
    /// Flamethrowers and incendiaries.
    Flame,
    /// Beam weapons.
    Energy,
    /// Electromagnetic pulse.
    Emp,
}

impl WeaponSubClass {
    /// Projectiles of this family can be shot down.
    #[must_use]
    pub const fn is_interceptable(self) -> bool {
        matches!(self, Self::Missile | Self::Rocket)
    }

    /// Only disables, never damages.
    #[must_use]
    pub const fn is_emp(self) -> bool {
        matches!(self, Self::Emp)
    }
}

/// Which altitude bands a weapon can engage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceToAir(u8);

impl SurfaceToAir {
    /// Ground targets only.
    pub const GROUND: Self = Self(1);
    /// Air targets only.
    pub const AIR: Self = Self(2);
    /// Both.
    pub const ALL: Self = Self(3);

    /// Can engage things on the ground.
    #[must_use]
    pub const fn hits_ground(self) -> bool {
        self.0 & Self::GROUND.0 != 0
    }

    /// Can engage flying things.
    #[must_use]
    pub const fn hits_air(self) -> bool {
        self.0 & Self::AIR.0 != 0
    }

    /// One of the three defined combinations.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 >= Self::GROUND.0 && self.0 <= Self::ALL.0
    }

    /// Whether a target at that altitude band is eligible.
    #[must_use]
    pub const fn can_hit(self, airborne: bool) -> bool {
        if airborne {
            self.hits_air()
        } else {
            self.hits_ground()
        }
    }
}

impl Default for SurfaceToAir {
    fn default() -> Self {
        Self::GROUND
    }
}

/// Read-only statistics of a weapon.
///
/// Distances are world units, times are game-time milliseconds and periodic
/// damage is per second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponStats {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Flight behaviour
    pub movement: MovementModel,
    /// Modifier table row
    pub effect: WeaponEffect,
    /// Armour class
    pub class: WeaponClass,
    /// Weapon family
    pub sub_class: WeaponSubClass,
    /// Altitude bands it can engage
    pub surface_to_air: SurfaceToAir,
    /// Damage to the struck object
    pub damage: u32,
    /// Minimum share of post-modifier damage that armour cannot stop
    pub min_damage_percent: u32,
    /// Splash radius
    pub radius: i32,
    /// Damage to everything else in the splash radius
    pub radius_damage: u32,
    /// How long the blast lingers after impact
    pub radius_life: u32,
    /// Damage per second inside the burning area
    pub periodic_damage: u32,
    /// Radius of the burning area
    pub periodic_damage_radius: i32,
    /// How long the area burns
    pub periodic_damage_time: u32,
    /// Armour class of the burn damage
    pub periodic_damage_class: WeaponClass,
    /// Maximum range
    pub long_range: i32,
    /// Muzzle speed, units per second
    pub flight_speed: i32,
    /// Continues past droids it hits
    pub penetrate: bool,
    /// How long a struck droid is disabled
    pub emp_disable_time: u32,
}

impl Default for WeaponStats {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            movement: MovementModel::Direct,
            effect: WeaponEffect::AntiPersonnel,
            class: WeaponClass::Kinetic,
            sub_class: WeaponSubClass::MachineGun,
            surface_to_air: SurfaceToAir::GROUND,
            damage: 10,
            min_damage_percent: 33,
            radius: 0,
            radius_damage: 0,
            radius_life: 0,
            periodic_damage: 0,
            periodic_damage_radius: 0,
            periodic_damage_time: 0,
            periodic_damage_class: WeaponClass::Heat,
            long_range: 1024,
            flight_speed: 1000,
            penetrate: false,
            emp_disable_time: 0,
        }
    }
}

impl WeaponStats {
    /// Creates a weapon with default statistics.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the movement model.
    #[must_use]
    pub fn with_movement(mut self, movement: MovementModel) -> Self {
        self.movement = movement;
        self
    }

    /// Sets the damage profile.
    #[must_use]
    pub fn with_effect(mut self, effect: WeaponEffect) -> Self {
        self.effect = effect;
        self
    }

    /// Sets the family and armour class.
    #[must_use]
    pub fn with_sub_class(mut self, sub_class: WeaponSubClass, class: WeaponClass) -> Self {
        self.sub_class = sub_class;
        self.class = class;
        self
    }

    /// Sets the engageable altitude bands.
    #[must_use]
    pub fn with_surface_to_air(mut self, surface_to_air: SurfaceToAir) -> Self {
        self.surface_to_air = surface_to_air;
        self
    }

    /// Sets direct damage and the armour-proof share.
    #[must_use]
    pub fn with_damage(mut self, damage: u32, min_damage_percent: u32) -> Self {
        self.damage = damage;
        self.min_damage_percent = min_damage_percent;
        self
    }

    /// Sets splash radius, damage and lingering time.
    #[must_use]
    pub fn with_splash(mut self, radius: i32, radius_damage: u32, radius_life: u32) -> Self {
        self.radius = radius;
        self.radius_damage = radius_damage;
        self.radius_life = radius_life;
        self
    }

    /// Sets burn rate, radius and duration.
    #[must_use]
    pub fn with_periodic(mut self, damage_per_sec: u32, radius: i32, time: u32) -> Self {
        self.periodic_damage = damage_per_sec;
        self.periodic_damage_radius = radius;
        self.periodic_damage_time = time;
        self
    }

    /// Sets range and muzzle speed.
    #[must_use]
    pub fn with_ballistics(mut self, long_range: i32, flight_speed: i32) -> Self {
        self.long_range = long_range;
        self.flight_speed = flight_speed;
        self
    }

    /// Makes the weapon continue past droids it hits.
    #[must_use]
    pub fn with_penetrate(mut self, penetrate: bool) -> Self {
        self.penetrate = penetrate;
        self
    }

    /// Sets the EMP disable duration.
    #[must_use]
    pub fn with_emp(mut self, disable_time: u32) -> Self {
        self.emp_disable_time = disable_time;
        self
    }

    /// Whether an impact leaves something behind that needs ticking.
    #[must_use]
    pub const fn has_aftermath(&self) -> bool {
        self.radius > 0 || self.periodic_damage_time > 0
    }

    /// Milliseconds the aftermath lasts.
    #[must_use]
    pub fn aftermath_time(&self) -> u32 {
        self.radius_life.max(self.periodic_damage_time)
    }

    /// Distance past which a projectile counts as a miss.
    #[must_use]
    pub fn max_travel(&self, extension_percent: u32) -> i64 {
        i64::from(self.long_range.max(0)) * i64::from(extension_percent) / 100
    }
}
