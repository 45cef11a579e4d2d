//! World objects that projectiles can hit, and their arena storage.
//!
//! The projectile code only sees objects through the [`Combatant`]
//! capability trait. Concrete droids, structures and features live in an
//! [`ObjectArena`] and are referred to by generation-checked
//! [`ObjectHandle`]s, so a reference that outlives its object resolves to
//! nothing instead of to whatever reused the slot.

use barrage_common::{GameTime, ObjectHandle, PlayerId, Vec2i, Vec3i, GAME_TICKS_PER_UPDATE};
use barrage_kernel::CollisionShape;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::weapon::WeaponClass;

/// Error types for object lookups.
#[derive(Debug, Error)]
pub enum ObjectError {
    /// No object was ever stored at the handle's slot
    #[error("Object not found: {0:?}")]
    NotFound(ObjectHandle),
    /// The slot has been reused since the handle was issued
    #[error("Stale object handle: {0:?}")]
    Stale(ObjectHandle),
}

/// Result type for object lookups.
pub type ObjectResult<T> = Result<T, ObjectError>;

// ============================================================================
// Classification
// ============================================================================

/// Concrete kind of a world object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Mobile unit
    Droid,
    /// Player-built building
    Structure,
    /// Map decoration: trees, wrecks, oil drums
    Feature,
}

/// Droid locomotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Propulsion {
    /// Wheels
    #[default]
    Wheeled,
    /// Half-tracks
    HalfTracked,
    /// Full tracks
    Tracked,
    /// Hovercraft
    Hover,
    /// Cyborg legs
    Legged,
    /// VTOL
    Lift,
}

impl Propulsion {
    /// Column index into the modifier tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Flies instead of driving.
    #[must_use]
    pub const fn is_airborne(self) -> bool {
        matches!(self, Self::Lift)
    }
}

/// Droid body weight class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodySize {
    /// Light body
    #[default]
    Light,
    /// Medium body
    Medium,
    /// Heavy body
    Heavy,
    /// Super-heavy body
    SuperHeavy,
}

impl BodySize {
    /// Column index into the modifier tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Structure material class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureStrength {
    /// Walls of sticks
    Soft,
    /// Ordinary buildings
    #[default]
    Medium,
    /// Fortified buildings
    Hard,
    /// Bunkers
    Bunker,
}

impl StructureStrength {
    /// Column index into the modifier tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// What the damage tables need to know about a victim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageTarget {
    /// A droid
    Unit {
        /// Locomotion
        propulsion: Propulsion,
        /// Weight class
        body: BodySize,
    },
    /// A structure
    Structure {
        /// Material class
        strength: StructureStrength,
    },
    /// A feature; takes unmodified damage
    Feature,
}

// ============================================================================
// Shared state
// ============================================================================

/// Armour values per weapon class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Armour {
    /// Protection against kinetic weapons
    pub kinetic: u32,
    /// Protection against heat weapons
    pub thermal: u32,
}

impl Armour {
    /// Creates armour values.
    #[must_use]
    pub const fn new(kinetic: u32, thermal: u32) -> Self {
        Self { kinetic, thermal }
    }

    /// Armour that applies to `class`.
    #[must_use]
    pub const fn against(&self, class: WeaponClass) -> u32 {
        match class {
            WeaponClass::Kinetic => self.kinetic,
            WeaponClass::Heat => self.thermal,
        }
    }
}

/// Burn damage already taken during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeriodicWindow {
    /// Tick the window belongs to
    pub tick: GameTime,
    /// Highest damage rate already applied in that tick
    pub rate_applied: u32,
}

/// State every damageable object carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectCore {
    /// Owning player
    pub player: PlayerId,
    /// Position of the object's base
    pub pos: Vec3i,
    /// Remaining body points
    pub body: u32,
    /// Body points when undamaged
    pub original_body: u32,
    /// Armour per weapon class
    pub armour: Armour,
    /// Damage that direct-fire projectiles in flight expect to deal
    pub expected_damage_direct: u32,
    /// Damage that indirect projectiles in flight expect to deal
    pub expected_damage_indirect: u32,
    /// Burn damage bookkeeping for the current tick
    pub periodic: PeriodicWindow,
    /// When the object was destroyed
    pub died: Option<GameTime>,
}

impl ObjectCore {
    /// Creates an undamaged core.
    #[must_use]
    pub fn new(player: PlayerId, pos: Vec3i, body: u32) -> Self {
        let body = body.max(1);
        Self {
            player,
            pos,
            body,
            original_body: body,
            armour: Armour::default(),
            expected_damage_direct: 0,
            expected_damage_indirect: 0,
            periodic: PeriodicWindow::default(),
            died: None,
        }
    }

    /// Sets armour values.
    #[must_use]
    pub fn with_armour(mut self, armour: Armour) -> Self {
        self.armour = armour;
        self
    }

    /// Whether the object has been destroyed.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.died.is_some()
    }

    /// Registers or withdraws an expected-damage estimate.
    pub fn adjust_expected_damage(&mut self, amount: u32, indirect: bool, add: bool) {
        let slot = if indirect {
            &mut self.expected_damage_indirect
        } else {
            &mut self.expected_damage_direct
        };
        *slot = if add {
            slot.saturating_add(amount)
        } else {
            slot.saturating_sub(amount)
        };
    }
}

// ============================================================================
// Capability interface
// ============================================================================

/// What the projectile code may ask of anything it can hit.
pub trait Combatant {
    /// Concrete kind.
    fn kind(&self) -> ObjectKind;

    /// Shared state.
    fn core(&self) -> &ObjectCore;

    /// Shared state, mutably.
    fn core_mut(&mut self) -> &mut ObjectCore;

    /// Horizontal footprint used for hit tests.
    fn collision_shape(&self) -> CollisionShape;

    /// Height of the hittable volume above the base.
    fn target_height(&self) -> i32;

    /// Row and columns of the damage tables that apply.
    fn damage_target(&self) -> DamageTarget;

    /// Whether projectiles interact with this object at all.
    fn is_damageable(&self) -> bool {
        true
    }

    /// Whether only anti-air weapons can reach it.
    fn is_airborne(&self) -> bool {
        false
    }

    /// Owning player.
    fn player(&self) -> PlayerId {
        self.core().player
    }

    /// Base position.
    fn position(&self) -> Vec3i {
        self.core().pos
    }

    /// Centre of the hittable volume.
    fn aim_point(&self) -> Vec3i {
        let pos = self.core().pos;
        pos.with_z(pos.z + self.target_height() / 2)
    }

    /// Whether the object has been destroyed.
    fn is_dead(&self) -> bool {
        self.core().is_dead()
    }
}

// ============================================================================
// Concrete objects
// ============================================================================

/// A mobile unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Droid {
    /// Shared state
    pub core: ObjectCore,
    /// Locomotion
    pub propulsion: Propulsion,
    /// Weight class
    pub body_size: BodySize,
    /// Radius of the visual model
    pub radius: i32,
    /// Height of the visual model
    pub height: i32,
    /// Production cost
    pub power_cost: u32,
    /// Build effort
    pub build_points: u32,
    /// Commander this droid is attached to
    pub commander: Option<ObjectHandle>,
    /// Sensor droid directing this droid's fire
    pub sensor_link: Option<ObjectHandle>,
    /// Confirmed kills
    pub kills: u32,
    /// Experience in Q16 body-points dealt
    pub experience: u32,
    /// When the droid caught fire
    pub burn_start: Option<GameTime>,
    /// Last tick burn damage landed
    pub last_burn: GameTime,
    /// Disabled by EMP until this time
    pub disabled_until: Option<GameTime>,
}

impl Droid {
    /// Creates a droid with default stats.
    #[must_use]
    pub fn new(player: PlayerId, pos: Vec3i, body: u32) -> Self {
        Self {
            core: ObjectCore::new(player, pos, body),
            propulsion: Propulsion::Wheeled,
            body_size: BodySize::Light,
            radius: 48,
            height: 64,
            power_cost: 100,
            build_points: 100,
            commander: None,
            sensor_link: None,
            kills: 0,
            experience: 0,
            burn_start: None,
            last_burn: GameTime::ZERO,
            disabled_until: None,
        }
    }

    /// Sets propulsion and body size.
    #[must_use]
    pub fn with_chassis(mut self, propulsion: Propulsion, body_size: BodySize) -> Self {
        self.propulsion = propulsion;
        self.body_size = body_size;
        self
    }

    /// Sets cost figures used by the quality factor.
    #[must_use]
    pub fn with_cost(mut self, power_cost: u32, build_points: u32) -> Self {
        self.power_cost = power_cost;
        self.build_points = build_points;
        self
    }

    /// Sets the model dimensions.
    #[must_use]
    pub fn with_size(mut self, radius: i32, height: i32) -> Self {
        self.radius = radius;
        self.height = height;
        self
    }

    /// Sets armour.
    #[must_use]
    pub fn with_armour(mut self, armour: Armour) -> Self {
        self.core.armour = armour;
        self
    }

    /// Attaches to a commander.
    #[must_use]
    pub fn with_commander(mut self, commander: ObjectHandle) -> Self {
        self.commander = Some(commander);
        self
    }

    /// Links to a sensor droid.
    #[must_use]
    pub fn with_sensor_link(mut self, sensor: ObjectHandle) -> Self {
        self.sensor_link = Some(sensor);
        self
    }

    /// Whether the droid is on fire.
    #[must_use]
    pub const fn is_burning(&self) -> bool {
        self.burn_start.is_some()
    }

    /// Records burn damage landing this tick.
    pub fn mark_burning(&mut self, now: GameTime) {
        if self.burn_start.is_none() {
            self.burn_start = Some(now);
        }
        self.last_burn = now;
    }

    /// Whether an EMP hit still disables the droid.
    #[must_use]
    pub fn is_disabled(&self, now: GameTime) -> bool {
        self.disabled_until.is_some_and(|until| now < until)
    }

    /// Disables the droid until `until`, keeping any longer disable.
    pub fn disable_until(&mut self, until: GameTime) {
        self.disabled_until = Some(self.disabled_until.map_or(until, |t| t.max(until)));
    }
}

impl Combatant for Droid {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Droid
    }

    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn collision_shape(&self) -> CollisionShape {
        CollisionShape::circle(self.radius)
    }

    fn target_height(&self) -> i32 {
        self.height
    }

    fn damage_target(&self) -> DamageTarget {
        DamageTarget::Unit {
            propulsion: self.propulsion,
            body: self.body_size,
        }
    }

    fn is_airborne(&self) -> bool {
        self.propulsion.is_airborne()
    }
}

/// A player-built building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    /// Shared state
    pub core: ObjectCore,
    /// Material class
    pub strength: StructureStrength,
    /// Footprint along x
    pub width: i32,
    /// Footprint along y
    pub breadth: i32,
    /// Height
    pub height: i32,
    /// Commander responsible for this structure's fire orders
    pub designator: Option<ObjectHandle>,
}

impl Structure {
    /// Creates a one-tile structure.
    #[must_use]
    pub fn new(player: PlayerId, pos: Vec3i, body: u32) -> Self {
        Self {
            core: ObjectCore::new(player, pos, body),
            strength: StructureStrength::Medium,
            width: 128,
            breadth: 128,
            height: 128,
            designator: None,
        }
    }

    /// Sets the material class.
    #[must_use]
    pub fn with_strength(mut self, strength: StructureStrength) -> Self {
        self.strength = strength;
        self
    }

    /// Sets the footprint and height.
    #[must_use]
    pub fn with_footprint(mut self, width: i32, breadth: i32, height: i32) -> Self {
        self.width = width;
        self.breadth = breadth;
        self.height = height;
        self
    }

    /// Sets the responsible commander.
    #[must_use]
    pub fn with_designator(mut self, commander: ObjectHandle) -> Self {
        self.designator = Some(commander);
        self
    }
}

impl Combatant for Structure {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Structure
    }

    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn collision_shape(&self) -> CollisionShape {
        CollisionShape::rect(self.width, self.breadth)
    }

    fn target_height(&self) -> i32 {
        self.height
    }

    fn damage_target(&self) -> DamageTarget {
        DamageTarget::Structure {
            strength: self.strength,
        }
    }
}

/// A map feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    /// Shared state
    pub core: ObjectCore,
    /// Footprint along x
    pub width: i32,
    /// Footprint along y
    pub breadth: i32,
    /// Height
    pub height: i32,
    /// Whether weapons can destroy it
    pub damageable: bool,
}

impl Feature {
    /// Creates a damageable one-tile feature.
    #[must_use]
    pub fn new(player: PlayerId, pos: Vec3i, body: u32) -> Self {
        Self {
            core: ObjectCore::new(player, pos, body),
            width: 128,
            breadth: 128,
            height: 64,
            damageable: true,
        }
    }

    /// Sets whether weapons can destroy it.
    #[must_use]
    pub fn with_damageable(mut self, damageable: bool) -> Self {
        self.damageable = damageable;
        self
    }
}

impl Combatant for Feature {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Feature
    }

    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn collision_shape(&self) -> CollisionShape {
        CollisionShape::rect(self.width, self.breadth)
    }

    fn target_height(&self) -> i32 {
        self.height
    }

    fn damage_target(&self) -> DamageTarget {
        DamageTarget::Feature
    }

    fn is_damageable(&self) -> bool {
        self.damageable
    }
}

/// Any object stored in the arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldObject {
    /// A droid
    Droid(Droid),
    /// A structure
    Structure(Structure),
    /// A feature
    Feature(Feature),
}

impl WorldObject {
    fn inner(&self) -> &dyn Combatant {
        match self {
            Self::Droid(d) => d as &dyn Combatant,
            Self::Structure(s) => s as &dyn Combatant,
            Self::Feature(f) => f as &dyn Combatant,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Combatant {
        match self {
            Self::Droid(d) => d as &mut dyn Combatant,
            Self::Structure(s) => s as &mut dyn Combatant,
            Self::Feature(f) => f as &mut dyn Combatant,
        }
    }

    /// The droid, if this is one.
    #[must_use]
    pub fn as_droid(&self) -> Option<&Droid> {
        match self {
            Self::Droid(d) => Some(d),
            _ => None,
        }
    }

    /// The droid, mutably, if this is one.
    pub fn as_droid_mut(&mut self) -> Option<&mut Droid> {
        match self {
            Self::Droid(d) => Some(d),
            _ => None,
        }
    }

    /// The structure, if this is one.
    #[must_use]
    pub fn as_structure(&self) -> Option<&Structure> {
        match self {
            Self::Structure(s) => Some(s),
            _ => None,
        }
    }
}

impl Combatant for WorldObject {
    fn kind(&self) -> ObjectKind {
        self.inner().kind()
    }

    fn core(&self) -> &ObjectCore {
        self.inner().core()
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        self.inner_mut().core_mut()
    }

    fn collision_shape(&self) -> CollisionShape {
        self.inner().collision_shape()
    }

    fn target_height(&self) -> i32 {
        self.inner().target_height()
    }

    fn damage_target(&self) -> DamageTarget {
        self.inner().damage_target()
    }

    fn is_damageable(&self) -> bool {
        self.inner().is_damageable()
    }

    fn is_airborne(&self) -> bool {
        self.inner().is_airborne()
    }
}

impl From<Droid> for WorldObject {
    fn from(droid: Droid) -> Self {
        Self::Droid(droid)
    }
}

impl From<Structure> for WorldObject {
    fn from(structure: Structure) -> Self {
        Self::Structure(structure)
    }
}

impl From<Feature> for WorldObject {
    fn from(feature: Feature) -> Self {
        Self::Feature(feature)
    }
}

// ============================================================================
// Arena
// ============================================================================

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    object: Option<WorldObject>,
}

/// Generation-checked storage for world objects.
///
/// Slots are reused through a free list; every removal bumps the slot's
/// generation so older handles stop resolving. Iteration is always in slot
/// order, which is identical on every peer.
#[derive(Debug, Default)]
pub struct ObjectArena {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    len: usize,
}

impl ObjectArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects, dead or alive.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True if nothing is stored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores an object and returns its handle.
    pub fn insert(&mut self, object: impl Into<WorldObject>) -> ObjectHandle {
        let object = object.into();
        self.len += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.object = Some(object);
            return ObjectHandle::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            object: Some(object),
        });
        ObjectHandle::new(index, 0)
    }

    /// Removes an object, invalidating every handle to it.
    pub fn remove(&mut self, handle: ObjectHandle) -> ObjectResult<WorldObject> {
        let slot = self
            .slots
            .get_mut(handle.index())
            .ok_or(ObjectError::NotFound(handle))?;
        if slot.generation != handle.generation() {
            return Err(ObjectError::Stale(handle));
        }
        let object = slot.object.take().ok_or(ObjectError::NotFound(handle))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(handle.index() as u32);
        self.len -= 1;
        Ok(object)
    }

    /// Resolves a handle, reporting why it failed.
    pub fn try_get(&self, handle: ObjectHandle) -> ObjectResult<&WorldObject> {
        let slot = self
            .slots
            .get(handle.index())
            .ok_or(ObjectError::NotFound(handle))?;
        if slot.generation != handle.generation() {
            return Err(ObjectError::Stale(handle));
        }
        slot.object.as_ref().ok_or(ObjectError::NotFound(handle))
    }

    /// Resolves a handle to a stored object, dead or alive.
    #[must_use]
    pub fn get(&self, handle: ObjectHandle) -> Option<&WorldObject> {
        self.try_get(handle).ok()
    }

    /// Resolves a handle mutably.
    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut WorldObject> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.object.as_mut()
    }

    /// Resolves a handle to an object that has not been destroyed.
    #[must_use]
    pub fn get_alive(&self, handle: ObjectHandle) -> Option<&WorldObject> {
        self.get(handle).filter(|o| !o.is_dead())
    }

    /// Whether the handle resolves to a living object.
    #[must_use]
    pub fn is_alive(&self, handle: ObjectHandle) -> bool {
        self.get_alive(handle).is_some()
    }

    /// Iterates stored objects in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectHandle, &WorldObject)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.object
                .as_ref()
                .map(|o| (ObjectHandle::new(i as u32, slot.generation), o))
        })
    }

    /// Objects whose footprint reaches within `radius` of `center`, in slot
    /// order.
    #[must_use]
    pub fn query_radius(&self, center: Vec2i, radius: i32) -> Vec<ObjectHandle> {
        self.iter()
            .filter(|(_, o)| {
                let pos = o.position();
                let reach = i64::from(radius.max(0) + o.collision_shape().bounding_radius());
                let d = Vec2i::new(pos.x - center.x, pos.y - center.y);
                d.length_sq() <= reach * reach
            })
            .map(|(h, _)| h)
            .collect()
    }

    /// Objects whose base lies within `radius` of `center`, in slot order.
    #[must_use]
    pub fn query_centres(&self, center: Vec2i, radius: i32) -> Vec<ObjectHandle> {
        let reach = i64::from(radius.max(0));
        self.iter()
            .filter(|(_, o)| {
                let pos = o.position();
                Vec2i::new(pos.x - center.x, pos.y - center.y).length_sq() <= reach * reach
            })
            .map(|(h, _)| h)
            .collect()
    }

    /// Clears the burning mark on droids that took no burn damage last tick.
    pub fn expire_burning(&mut self, now: GameTime) {
        let cutoff = now.minus(GAME_TICKS_PER_UPDATE);
        for slot in &mut self.slots {
            if let Some(WorldObject::Droid(droid)) = slot.object.as_mut() {
                if droid.burn_start.is_some() && droid.last_burn < cutoff {
                    droid.burn_start = None;
                }
            }
        }
    }

    /// Removes every destroyed object and returns their handles.
    pub fn reap_dead(&mut self) -> Vec<ObjectHandle> {
        let dead: Vec<_> = self
            .iter()
            .filter(|(_, o)| o.is_dead())
            .map(|(h, _)| h)
            .collect();
        for &handle in &dead {
            let _ = self.remove(handle);
        }
        dead
    }

    /// Removes everything.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.len = 0;
    }
}
