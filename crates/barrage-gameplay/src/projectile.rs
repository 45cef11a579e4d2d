//! A single munition and how it moves.
//!
//! This module provides:
//! - The projectile lifecycle states
//! - Launch orders, as issued by the combat-decision layer
//! - Per-model motion: straight, ballistic and homing flight
//! - Expected-damage registration on the intended victim
//! - GPU-ready render instances

use std::sync::Arc;

use barrage_common::{GameTime, ObjectHandle, PlayerId, ProjectileId, Rotation, Vec3i, GAME_TICKS_PER_SEC};
use barrage_kernel::{jittered_speed, solve_indirect, terrain_intersection, BallisticSolution, Spacetime, Terrain};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::battlefield::Battlefield;
use crate::config::ProjectileConfig;
use crate::damage_calc::{calc_damage, DamageTables};
use crate::entity::{Combatant, ObjectArena};
use crate::weapon::{MovementModel, WeaponStats};

// ============================================================================
// State and orders
// ============================================================================

/// Lifecycle stage of a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProjectileState {
    /// Moving toward its destination
    #[default]
    InFlight,
    /// Struck something this tick; damage not yet resolved
    Impact,
    /// Burning or smoking at the impact point
    PostImpact,
    /// Finished; removed at the start of the next update
    Inactive,
}

impl ProjectileState {
    /// Numeric code used by render instances.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        match self {
            Self::InFlight => 0,
            Self::Impact => 1,
            Self::PostImpact => 2,
            Self::Inactive => 3,
        }
    }
}

/// Where a shot is aimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AimPoint {
    /// A fixed map position
    Point(Vec3i),
    /// A live object; the shot aims at the centre of its hittable volume
    Object(ObjectHandle),
}

/// Request to fire one projectile.
#[derive(Debug, Clone)]
pub struct LaunchOrder {
    /// Weapon being fired
    pub weapon: Arc<WeaponStats>,
    /// Object firing, if any
    pub attacker: Option<ObjectHandle>,
    /// Firing player
    pub player: PlayerId,
    /// Muzzle position
    pub origin: Vec3i,
    /// Aim point or victim
    pub aim: AimPoint,
    /// Whether the local player can see the shot
    pub visible: bool,
    /// Lowest elevation an arcing shot may use
    pub min_angle: u16,
    /// When the weapon fired
    pub fire_time: GameTime,
}

impl LaunchOrder {
    /// Creates an order fired at match start with no attacker.
    #[must_use]
    pub fn new(weapon: Arc<WeaponStats>, player: PlayerId, origin: Vec3i, aim: AimPoint) -> Self {
        Self {
            weapon,
            attacker: None,
            player,
            origin,
            aim,
            visible: true,
            min_angle: 0,
            fire_time: GameTime::ZERO,
        }
    }

    /// Sets the firing object.
    #[must_use]
    pub fn with_attacker(mut self, attacker: ObjectHandle) -> Self {
        self.attacker = Some(attacker);
        self
    }

    /// Sets visibility.
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets the minimum elevation.
    #[must_use]
    pub fn with_min_angle(mut self, min_angle: u16) -> Self {
        self.min_angle = min_angle;
        self
    }

    /// Sets the fire time.
    #[must_use]
    pub fn with_fire_time(mut self, fire_time: GameTime) -> Self {
        self.fire_time = fire_time;
        self
    }
}

/// Where a projectile wants to be at the end of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Motion {
    /// Position at the end of the step
    pub next: Vec3i,
    /// Whether that position is the destination
    pub arrived: bool,
}

// ============================================================================
// Projectile
// ============================================================================

/// One munition in flight or in its aftermath.
#[derive(Debug, Clone)]
pub struct Projectile {
    id: ProjectileId,
    player: PlayerId,
    weapon: Arc<WeaponStats>,
    origin: Vec3i,
    destination: Vec3i,
    speed: i32,
    solution: Option<BallisticSolution>,
    spacetime: Spacetime,
    prev: Spacetime,
    state: ProjectileState,
    born: GameTime,
    died: Option<GameTime>,
    impact_tick: Option<GameTime>,
    source: Option<ObjectHandle>,
    target: Option<ObjectHandle>,
    damaged: Vec<ObjectHandle>,
    expected_damage: u32,
    visible: bool,
    travelled: i32,
    last_target_pos: Option<Vec3i>,
}

impl Projectile {
    /// Builds a projectile from a validated order.
    ///
    /// Arcing weapons consume one draw from the shared random source for
    /// their speed spread.
    pub(crate) fn launch(
        id: ProjectileId,
        order: &LaunchOrder,
        destination: Vec3i,
        config: &ProjectileConfig,
        bf: &mut Battlefield,
    ) -> Self {
        let weapon = Arc::clone(&order.weapon);
        let mut speed = weapon.flight_speed;
        let solution = weapon.movement.is_indirect().then(|| {
            let delta = destination - order.origin;
            let jittered = jittered_speed(speed, &mut bf.rng, config.speed_jitter_percent);
            let solution = solve_indirect(
                delta.horizontal_length(),
                delta.z,
                jittered,
                order.min_angle,
                config.gravity,
            );
            speed = solution.speed;
            solution
        });

        let start = Spacetime::new(order.origin, Rotation::facing(destination - order.origin), order.fire_time);
        let mut projectile = Self {
            id,
            player: order.player,
            weapon,
            origin: order.origin,
            destination,
            speed,
            solution,
            spacetime: start,
            prev: start,
            state: ProjectileState::InFlight,
            born: order.fire_time,
            died: None,
            impact_tick: None,
            source: order.attacker,
            target: None,
            damaged: Vec::new(),
            expected_damage: 0,
            visible: order.visible,
            travelled: 0,
            last_target_pos: None,
        };
        projectile.separate_samples();
        projectile
    }

    /// Unique ID.
    #[must_use]
    pub const fn id(&self) -> ProjectileId {
        self.id
    }

    /// Firing player.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Weapon statistics.
    #[must_use]
    pub fn weapon(&self) -> &WeaponStats {
        &self.weapon
    }

    /// Shared handle to the weapon statistics.
    #[must_use]
    pub fn weapon_arc(&self) -> &Arc<WeaponStats> {
        &self.weapon
    }

    /// Muzzle position.
    #[must_use]
    pub const fn origin(&self) -> Vec3i {
        self.origin
    }

    /// Current aim point.
    #[must_use]
    pub const fn destination(&self) -> Vec3i {
        self.destination
    }

    /// Speed in units per second, after spread and any increase.
    #[must_use]
    pub const fn speed(&self) -> i32 {
        self.speed
    }

    /// Arc parameters for ballistic weapons.
    #[must_use]
    pub const fn solution(&self) -> Option<&BallisticSolution> {
        self.solution.as_ref()
    }

    /// Current pose.
    #[must_use]
    pub const fn spacetime(&self) -> &Spacetime {
        &self.spacetime
    }

    /// Pose at the previous update.
    #[must_use]
    pub const fn previous(&self) -> &Spacetime {
        &self.prev
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec3i {
        self.spacetime.pos
    }

    /// Lifecycle stage.
    #[must_use]
    pub const fn state(&self) -> ProjectileState {
        self.state
    }

    /// Fire time.
    #[must_use]
    pub const fn born(&self) -> GameTime {
        self.born
    }

    /// When the projectile became inactive.
    #[must_use]
    pub const fn died(&self) -> Option<GameTime> {
        self.died
    }

    /// Object the shot came from.
    #[must_use]
    pub const fn source(&self) -> Option<ObjectHandle> {
        self.source
    }

    /// Intended or struck victim.
    #[must_use]
    pub const fn target(&self) -> Option<ObjectHandle> {
        self.target
    }

    /// Objects already hit during this flight, in hit order.
    #[must_use]
    pub fn damaged(&self) -> &[ObjectHandle] {
        &self.damaged
    }

    /// Damage registered on the target as expected.
    #[must_use]
    pub const fn expected_damage(&self) -> u32 {
        self.expected_damage
    }

    /// Whether the local player can see the shot.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Horizontal distance covered from the muzzle.
    #[must_use]
    pub const fn travelled(&self) -> i32 {
        self.travelled
    }

    /// Whether the projectile is done.
    #[must_use]
    pub fn is_inactive(&self) -> bool {
        self.state == ProjectileState::Inactive
    }

    /// Changes the intended victim.
    ///
    /// The expected-damage estimate is withdrawn from the old target and
    /// registered on the new one, split by direct and indirect fire. A dead
    /// or unresolvable new target is stored without an estimate.
    pub fn set_target(&mut self, target: Option<ObjectHandle>, objects: &mut ObjectArena, tables: &DamageTables) {
        if self.target == target {
            return;
        }
        let indirect = self.weapon.movement.is_indirect();
        if let Some(old) = self.target {
            if let Some(object) = objects.get_mut(old) {
                object
                    .core_mut()
                    .adjust_expected_damage(self.expected_damage, indirect, false);
            }
        }
        self.expected_damage = 0;
        self.target = target;

        let Some(object) = target.and_then(|t| objects.get_mut(t)) else {
            return;
        };
        if object.is_dead() {
            return;
        }
        let expected = calc_damage(self.weapon.damage, self.weapon.effect, object.damage_target(), tables);
        object.core_mut().adjust_expected_damage(expected, indirect, true);
        self.expected_damage = expected;
        self.last_target_pos = Some(object.aim_point());
    }

    // ========================================================================
    // Motion
    // ========================================================================

    /// Position this projectile should reach by `now`.
    pub fn plan_motion(&mut self, bf: &Battlefield, config: &ProjectileConfig, now: GameTime) -> Motion {
        match self.weapon.movement {
            MovementModel::Direct => self.direct_motion(now),
            MovementModel::Indirect => self.ballistic_motion(now),
            MovementModel::HomingDirect | MovementModel::HomingIndirect => {
                self.retarget_homing(bf);
                self.homing_motion(bf.terrain.as_ref(), config, now)
            },
        }
    }

    /// Straight line from the muzzle, `elapsed * speed` along the way.
    fn direct_motion(&self, now: GameTime) -> Motion {
        let distance = (self.destination - self.origin).length();
        let covered = i64::from(self.speed) * i64::from(now.since(self.born)) / i64::from(GAME_TICKS_PER_SEC);
        if distance == 0 || covered >= i64::from(distance) {
            return Motion {
                next: self.destination,
                arrived: true,
            };
        }
        Motion {
            next: self.origin.lerp(self.destination, covered, i64::from(distance)),
            arrived: false,
        }
    }

    /// Point on the solved arc; snaps to the destination once the flight
    /// time is up.
    fn ballistic_motion(&self, now: GameTime) -> Motion {
        let Some(solution) = self.solution else {
            return self.direct_motion(now);
        };
        let elapsed = now.since(self.born);
        if elapsed >= solution.flight_time {
            return Motion {
                next: self.destination,
                arrived: true,
            };
        }
        let (along, rise) = solution.position_at(elapsed);
        let delta = self.destination - self.origin;
        let run = delta.horizontal_length();
        let ground = if run == 0 {
            self.origin
        } else {
            self.origin + Vec3i::new(delta.x, delta.y, 0).scale(i64::from(along), i64::from(run))
        };
        Motion {
            next: ground.with_z(self.origin.z + rise),
            arrived: false,
        }
    }

    /// Points the destination at the live target, one update ahead.
    fn retarget_homing(&mut self, bf: &Battlefield) {
        let Some(target) = self.target.and_then(|t| bf.objects.get_alive(t)) else {
            return;
        };
        let current = target.aim_point();
        let lead = self.last_target_pos.map_or(Vec3i::ZERO, |last| current - last);
        self.destination = current + lead;
        self.last_target_pos = Some(current);
    }

    /// One update's worth of travel toward the destination.
    ///
    /// Arcing homing weapons cruise at a height above ground proportional
    /// to the remaining distance and are lifted clear of terrain that would
    /// block the step.
    fn homing_motion(&self, terrain: &dyn Terrain, config: &ProjectileConfig, now: GameTime) -> Motion {
        let from = self.spacetime.pos;
        let dt = now.since(self.spacetime.time);
        let step = (i64::from(self.speed) * i64::from(dt) / i64::from(GAME_TICKS_PER_SEC)).max(1) as i32;
        let to_go = self.destination - from;
        let distance = to_go.length();
        if distance <= step {
            return Motion {
                next: self.destination,
                arrived: true,
            };
        }

        let mut next = from + to_go.scale(i64::from(step), i64::from(distance));
        if self.weapon.movement.is_indirect() {
            let remaining = (self.destination - next).horizontal_length();
            let clearance =
                (remaining / config.homing_clearance_divisor.max(1)).min(config.homing_max_clearance);
            let cruise = (terrain.height_at(next.x, next.y) + clearance).max(self.destination.z);
            next.z += (cruise - next.z).clamp(-step, step);

            for _ in 0..config.homing_terrain_retries {
                if terrain_intersection(terrain, from, next, config.terrain_sample_step).is_none() {
                    break;
                }
                next.z += config.homing_terrain_bias;
            }
        }
        Motion { next, arrived: false }
    }

    // ========================================================================
    // State changes driven by the world
    // ========================================================================

    /// Moves to `pos` at `now`, keeping the previous sample strictly older.
    pub(crate) fn move_to(&mut self, pos: Vec3i, now: GameTime) {
        self.prev = self.spacetime;
        let delta = pos - self.prev.pos;
        let rot = if delta == Vec3i::ZERO {
            self.prev.rot
        } else {
            Rotation::facing(delta)
        };
        self.spacetime = Spacetime::new(pos, rot, now);
        self.separate_samples();
        self.travelled = (pos - self.origin).horizontal_length();
    }

    /// Pulls the current sample back to a fraction of the last step.
    pub(crate) fn snap_to_fraction(&mut self, fraction: i32) {
        self.spacetime = self.prev.at_fraction(&self.spacetime, fraction);
        self.separate_samples();
        self.travelled = (self.spacetime.pos - self.origin).horizontal_length();
    }

    fn separate_samples(&mut self) {
        if self.prev.time < self.spacetime.time {
            return;
        }
        if self.spacetime.time > GameTime::ZERO {
            self.prev.time = self.spacetime.time.minus(1);
        } else {
            self.spacetime.time = self.prev.time.plus(1);
        }
    }

    pub(crate) fn set_state(&mut self, state: ProjectileState) {
        self.state = state;
    }

    pub(crate) fn mark_impact(&mut self, now: GameTime) {
        self.state = ProjectileState::Impact;
        self.impact_tick = Some(now);
    }

    /// Milliseconds since the update that resolved the impact.
    pub(crate) fn aftermath_age(&self, now: GameTime) -> u32 {
        self.impact_tick.map_or(0, |t| now.since(t))
    }

    /// Becomes inactive, stamping the death time only once.
    pub(crate) fn deactivate(&mut self, now: GameTime) {
        self.state = ProjectileState::Inactive;
        if self.died.is_none() {
            self.died = Some(now);
        }
    }

    pub(crate) fn damaged_mut(&mut self) -> &mut Vec<ObjectHandle> {
        &mut self.damaged
    }

    pub(crate) fn inherit_damaged(&mut self, damaged: Vec<ObjectHandle>) {
        self.damaged = damaged;
    }

    /// Renderer view of this projectile.
    #[must_use]
    pub fn instance(&self) -> ProjectileInstance {
        let pos = self.spacetime.pos;
        ProjectileInstance {
            position: [pos.x, pos.y, pos.z],
            direction: self.spacetime.rot.direction,
            pitch: self.spacetime.rot.pitch,
            state: self.state.as_raw(),
            visible: u32::from(self.visible),
        }
    }
}

/// Per-projectile data handed to the renderer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct ProjectileInstance {
    /// World position
    pub position: [i32; 3],
    /// Heading
    pub direction: u16,
    /// Elevation
    pub pitch: u16,
    /// [`ProjectileState::as_raw`]
    pub state: u32,
    /// 1 if visible to the local player
    pub visible: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Droid;
    use barrage_kernel::FlatTerrain;
    use proptest::prelude::*;

    fn p(i: u8) -> PlayerId {
        PlayerId::from_raw(i)
    }

    fn fire(bf: &mut Battlefield, weapon: WeaponStats, origin: Vec3i, destination: Vec3i) -> Projectile {
        let order = LaunchOrder::new(Arc::new(weapon), p(0), origin, AimPoint::Point(destination));
        Projectile::launch(ProjectileId::from_raw(1), &order, destination, &ProjectileConfig::default(), bf)
    }

    #[test]
    fn test_direct_motion_is_linear() {
        let mut bf = Battlefield::flat(1);
        let weapon = WeaponStats::new("c", "Cannon").with_ballistics(2000, 300);
        let mut shot = fire(&mut bf, weapon, Vec3i::ZERO, Vec3i::new(900, 0, 0));
        let config = ProjectileConfig::default();

        let half = shot.plan_motion(&bf, &config, GameTime::from_millis(1500));
        assert_eq!(half, Motion { next: Vec3i::new(450, 0, 0), arrived: false });
        let end = shot.plan_motion(&bf, &config, GameTime::from_millis(3500));
        assert_eq!(end, Motion { next: Vec3i::new(900, 0, 0), arrived: true });
    }

    #[test]
    fn test_samples_forced_apart() {
        let mut bf = Battlefield::flat(1);
        let mut shot = fire(&mut bf, WeaponStats::new("c", "Cannon"), Vec3i::new(0, 0, 50), Vec3i::new(500, 0, 50));
        let t = GameTime::from_millis(200);
        assert!(shot.previous().time < shot.spacetime().time);
        shot.move_to(Vec3i::new(100, 0, 50), t);
        shot.move_to(Vec3i::new(100, 0, 50), t);
        assert_eq!(shot.spacetime().time, t);
        assert_eq!(shot.previous().time.millis(), 199);
        shot.snap_to_fraction(0);
        assert!(shot.previous().time < shot.spacetime().time);
    }

    #[test]
    fn test_ballistic_motion_follows_arc() {
        let mut bf = Battlefield::flat(7);
        let weapon = WeaponStats::new("m", "Mortar").with_movement(MovementModel::Indirect);
        let mut shot = fire(&mut bf, weapon, Vec3i::new(0, 0, 10), Vec3i::new(0, 1000, 10));
        let config = ProjectileConfig::default();
        let solution = *shot.solution().expect("arcing weapons are solved at launch");

        let apex = shot.plan_motion(&bf, &config, GameTime::from_millis(solution.apex_time()));
        assert!(apex.next.z > 10);
        assert_eq!(apex.next.x, 0);
        assert!((apex.next.y - 500).abs() <= 10);

        let end = shot.plan_motion(&bf, &config, GameTime::from_millis(solution.flight_time));
        assert_eq!(end, Motion { next: Vec3i::new(0, 1000, 10), arrived: true });
        assert_eq!(bf.rng.checksum().draws, 1);
    }

    #[test]
    fn test_homing_leads_moving_target() {
        let mut bf = Battlefield::flat(1);
        let victim = bf.objects.insert(Droid::new(p(1), Vec3i::new(1000, 0, 0), 100));
        let weapon = WeaponStats::new("h", "Homing").with_movement(MovementModel::HomingDirect);
        let mut shot = fire(&mut bf, weapon, Vec3i::new(0, 0, 32), Vec3i::new(1000, 0, 32));
        shot.set_target(Some(victim), &mut bf.objects, &DamageTables::default());

        if let Some(object) = bf.objects.get_mut(victim) {
            object.core_mut().pos = Vec3i::new(1000, 50, 0);
        }
        let config = ProjectileConfig::default();
        let motion = shot.plan_motion(&bf, &config, GameTime::from_millis(100));
        assert_eq!(shot.destination(), Vec3i::new(1000, 100, 32));
        assert!(!motion.arrived);
        assert!(motion.next.y > 0);
        let moved = (motion.next - Vec3i::new(0, 0, 32)).length();
        assert!((95..=100).contains(&moved));
    }

    #[test]
    fn test_homing_indirect_climbs_over_terrain() {
        let mut bf = Battlefield::new(FlatTerrain::new(200), 1);
        let weapon = WeaponStats::new("h", "Seeker").with_movement(MovementModel::HomingIndirect);
        let shot = fire(&mut bf, weapon, Vec3i::new(0, 0, 210), Vec3i::new(2000, 0, 232));
        let config = ProjectileConfig::default();
        let motion = shot.homing_motion(bf.terrain.as_ref(), &config, GameTime::from_millis(100));
        assert!(motion.next.z > 210);
        assert!(!bf.terrain.is_underground(motion.next));
    }

    #[test]
    fn test_set_target_moves_expected_damage() {
        let mut bf = Battlefield::flat(1);
        let tables = DamageTables::default();
        let a = bf.objects.insert(Droid::new(p(1), Vec3i::new(500, 0, 0), 100));
        let b = bf.objects.insert(Droid::new(p(1), Vec3i::new(600, 0, 0), 100));
        let mut shot = fire(&mut bf, WeaponStats::new("c", "Cannon").with_damage(50, 0), Vec3i::ZERO, Vec3i::ZERO);

        shot.set_target(Some(a), &mut bf.objects, &tables);
        let expected = shot.expected_damage();
        assert!(expected > 0);
        assert_eq!(bf.objects.get(a).map(|o| o.core().expected_damage_direct), Some(expected));

        shot.set_target(Some(b), &mut bf.objects, &tables);
        assert_eq!(bf.objects.get(a).map(|o| o.core().expected_damage_direct), Some(0));
        assert_eq!(bf.objects.get(b).map(|o| o.core().expected_damage_direct), Some(expected));

        shot.set_target(None, &mut bf.objects, &tables);
        assert_eq!(bf.objects.get(b).map(|o| o.core().expected_damage_direct), Some(0));
        assert_eq!(shot.expected_damage(), 0);
    }

    #[test]
    fn test_deactivate_stamps_once() {
        let mut bf = Battlefield::flat(1);
        let mut shot = fire(&mut bf, WeaponStats::new("c", "Cannon"), Vec3i::ZERO, Vec3i::ZERO);
        shot.deactivate(GameTime::from_millis(300));
        shot.deactivate(GameTime::from_millis(400));
        assert_eq!(shot.died(), Some(GameTime::from_millis(300)));
        assert!(shot.is_inactive());
        assert_eq!(shot.instance().state, 3);
        assert_eq!(std::mem::size_of::<ProjectileInstance>(), 24);
    }

    proptest! {
        #[test]
        fn prop_direct_motion_covers_speed_times_elapsed(
            ox in -2000i32..2000, oy in -2000i32..2000, oz in 0i32..300,
            dx in -2000i32..2000, dy in -2000i32..2000, dz in 0i32..300,
            speed in 1i32..5000,
            elapsed in 0u32..20_000,
        ) {
            let mut bf = Battlefield::flat(1);
            let origin = Vec3i::new(ox, oy, oz);
            let destination = Vec3i::new(dx, dy, dz);
            let weapon = WeaponStats::new("c", "Cannon").with_ballistics(8000, speed);
            let mut shot = fire(&mut bf, weapon, origin, destination);

            let distance = i64::from((destination - origin).length());
            let covered = (i64::from(speed) * i64::from(elapsed) / 1000).min(distance);
            let motion = shot.plan_motion(&bf, &ProjectileConfig::default(), GameTime::from_millis(elapsed));

            prop_assert_eq!(motion.arrived, covered == distance);
            let expected = if motion.arrived { destination } else { origin.lerp(destination, covered, distance) };
            prop_assert_eq!(motion.next, expected);
            prop_assert!(i64::from((motion.next - origin).length()) <= covered + 2);
        }
    }
}
