//! The live projectile set and its per-tick update.
//!
//! Projectiles are kept in creation order and updated once per tick in that
//! order. The set itself is only changed at fixed points of a pass:
//! inactive projectiles are pruned before it starts, and interceptions and
//! penetration children are applied after every projectile has moved.

use std::sync::Arc;

use barrage_common::{GameTime, ObjectHandle, ProjectileId, Vec3i};
use tracing::{debug, error, info};

use crate::battlefield::Battlefield;
use crate::collision_detector::{CollisionDetector, CollisionProbe, CollisionTarget, ProjectileSnapshot};
use crate::config::ProjectileConfig;
use crate::entity::Combatant;
use crate::events::CombatEvent;
use crate::impact::{ImpactContext, ImpactResolver};
use crate::match_stats::StatsSink;
use crate::projectile::{AimPoint, LaunchOrder, Projectile, ProjectileInstance, ProjectileState};
use crate::weapon::WeaponStats;

/// A penetration child waiting for the end of the pass.
#[derive(Debug)]
struct Spawn {
    order: LaunchOrder,
    destination: Vec3i,
    damaged: Vec<ObjectHandle>,
}

/// Changes to the live set deferred until the pass is over.
#[derive(Debug, Default)]
struct PassQueue {
    spawned: Vec<Spawn>,
    /// (victim, interceptor)
    intercepted: Vec<(ProjectileId, ProjectileId)>,
}

impl PassQueue {
    fn is_intercepted(&self, id: ProjectileId) -> bool {
        self.intercepted.iter().any(|&(victim, _)| victim == id)
    }
}

/// Owner of every live projectile.
#[derive(Debug)]
pub struct ProjectileWorld {
    config: ProjectileConfig,
    projectiles: Vec<Projectile>,
    next_id: ProjectileId,
}

impl Default for ProjectileWorld {
    fn default() -> Self {
        Self::new(ProjectileConfig::default())
    }
}

impl ProjectileWorld {
    /// Creates an empty world.
    #[must_use]
    pub fn new(config: ProjectileConfig) -> Self {
        Self {
            config,
            projectiles: Vec::new(),
            next_id: ProjectileId::from_raw(1),
        }
    }

    /// Settings in use.
    #[must_use]
    pub const fn config(&self) -> &ProjectileConfig {
        &self.config
    }

    /// Resets the world for a new match.
    pub fn init(&mut self) {
        self.projectiles.clear();
        self.next_id = ProjectileId::from_raw(1);
        info!(
            neighbour_radius = self.config.neighbour_radius,
            gravity = self.config.gravity,
            "projectile world initialised"
        );
    }

    /// Drops every projectile, withdrawing their expected damage.
    pub fn shutdown(&mut self, bf: &mut Battlefield) {
        let count = self.projectiles.len();
        for projectile in &mut self.projectiles {
            projectile.set_target(None, &mut bf.objects, &bf.tables);
        }
        self.projectiles.clear();
        info!(dropped = count, "projectile world shut down");
    }

    /// Number of projectiles, including inactive ones not yet pruned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    /// True if there are no projectiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    /// Projectiles in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter()
    }

    /// Looks up a projectile by ID.
    #[must_use]
    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.id() == id)
    }

    /// Render data for every projectile still in play.
    #[must_use]
    pub fn render_instances(&self) -> Vec<ProjectileInstance> {
        self.projectiles
            .iter()
            .filter(|p| !p.is_inactive())
            .map(Projectile::instance)
            .collect()
    }

    fn allocate_id(&mut self) -> ProjectileId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    // ========================================================================
    // Launch
    // ========================================================================

    /// Fires one projectile.
    ///
    /// Returns `false`, after logging why, when the order is malformed: an
    /// out-of-range player, a weapon that cannot fly, or a victim that is
    /// already dead. Nothing else in the world is affected in that case.
    pub fn launch(&mut self, bf: &mut Battlefield, order: LaunchOrder) -> bool {
        if !order.player.is_valid() {
            error!(player = order.player.index(), weapon = %order.weapon.id, "launch rejected: invalid player");
            return false;
        }
        if order.weapon.flight_speed <= 0 {
            error!(weapon = %order.weapon.id, speed = order.weapon.flight_speed, "launch rejected: weapon cannot fly");
            return false;
        }
        let (destination, target) = match order.aim {
            AimPoint::Point(point) => (point, None),
            AimPoint::Object(handle) => match bf.objects.get_alive(handle) {
                Some(object) => (object.aim_point(), Some(handle)),
                None => {
                    error!(victim = ?handle, weapon = %order.weapon.id, "launch rejected: target is gone");
                    return false;
                },
            },
        };

        let id = self.allocate_id();
        let mut projectile = Projectile::launch(id, &order, destination, &self.config, bf);
        projectile.set_target(target, &mut bf.objects, &bf.tables);
        bf.stats.record_shot(order.player);
        bf.events.publish(CombatEvent::ProjectileLaunched {
            id,
            player: order.player,
            weapon: order.weapon.id.clone(),
        });
        debug!(
            projectile = id.raw(),
            weapon = %order.weapon.id,
            ?destination,
            speed = projectile.speed(),
            "projectile launched"
        );
        self.projectiles.push(projectile);
        true
    }

    // ========================================================================
    // Update
    // ========================================================================

    /// Advances the clock one tick and updates every projectile.
    pub fn advance_all(&mut self, bf: &mut Battlefield) -> GameTime {
        let now = bf.advance_clock();
        self.update(bf);
        now
    }

    /// Runs one update pass at the battlefield's current time.
    pub fn update(&mut self, bf: &mut Battlefield) {
        let now = bf.now();
        self.projectiles.retain(|p| !p.is_inactive());
        bf.objects.expire_burning(now);

        let mut snapshot: Vec<ProjectileSnapshot> = self
            .projectiles
            .iter()
            .filter(|p| p.state() == ProjectileState::InFlight && p.weapon().sub_class.is_interceptable())
            .map(|p| ProjectileSnapshot::at_rest(p.id(), p.player(), p.position()))
            .collect();

        let mut queue = PassQueue::default();
        for projectile in &mut self.projectiles {
            if queue.is_intercepted(projectile.id()) {
                continue;
            }
            let from = projectile.position();
            step(projectile, bf, &self.config, &snapshot, now, &mut queue);
            if let Some(entry) = snapshot.iter_mut().find(|s| s.id == projectile.id()) {
                entry.moved(from, projectile.position());
            }
        }
        self.finish_pass(bf, queue, now);
    }

    fn finish_pass(&mut self, bf: &mut Battlefield, queue: PassQueue, now: GameTime) {
        for (victim, by) in queue.intercepted {
            let Some(projectile) = self.projectiles.iter_mut().find(|p| p.id() == victim) else {
                continue;
            };
            if projectile.state() != ProjectileState::InFlight {
                continue;
            }
            projectile.set_target(None, &mut bf.objects, &bf.tables);
            projectile.deactivate(now);
            bf.events.publish(CombatEvent::ProjectileIntercepted { id: victim, by });
            debug!(projectile = victim.raw(), by = by.raw(), "projectile intercepted");
        }

        for spawn in queue.spawned {
            let id = self.allocate_id();
            let mut child = Projectile::launch(id, &spawn.order, spawn.destination, &self.config, bf);
            child.inherit_damaged(spawn.damaged);
            bf.events.publish(CombatEvent::ProjectileLaunched {
                id,
                player: spawn.order.player,
                weapon: spawn.order.weapon.id.clone(),
            });
            debug!(projectile = id.raw(), "penetrating projectile continues");
            self.projectiles.push(child);
        }

        for projectile in &mut self.projectiles {
            projectile.damaged_mut().retain(|&h| bf.objects.is_alive(h));
            if projectile.target().is_some_and(|t| !bf.objects.is_alive(t)) {
                projectile.set_target(None, &mut bf.objects, &bf.tables);
            }
        }
    }
}

/// Runs the state machine of one projectile for one tick.
fn step(
    projectile: &mut Projectile,
    bf: &mut Battlefield,
    config: &ProjectileConfig,
    snapshot: &[ProjectileSnapshot],
    now: GameTime,
    queue: &mut PassQueue,
) {
    if projectile.state() == ProjectileState::InFlight {
        fly(projectile, bf, config, snapshot, now, queue);
    }
    if projectile.state() == ProjectileState::Impact {
        detonate(projectile, bf, now, queue);
    }
    if projectile.state() == ProjectileState::PostImpact {
        smoulder(projectile, bf, now);
    }
}

fn fly(
    projectile: &mut Projectile,
    bf: &mut Battlefield,
    config: &ProjectileConfig,
    snapshot: &[ProjectileSnapshot],
    now: GameTime,
    queue: &mut PassQueue,
) {
    if projectile.target().is_some_and(|t| !bf.objects.is_alive(t)) {
        projectile.set_target(None, &mut bf.objects, &bf.tables);
    }

    let motion = projectile.plan_motion(bf, config, now);
    projectile.move_to(motion.next, now);

    let hit = {
        let probe = CollisionProbe {
            id: projectile.id(),
            player: projectile.player(),
            weapon: projectile.weapon(),
            from: projectile.previous().pos,
            to: projectile.position(),
            target: projectile.target(),
            damaged: projectile.damaged(),
        };
        CollisionDetector::new(config).find_earliest(&probe, bf, snapshot)
    };

    if let Some(hit) = hit {
        projectile.snap_to_fraction(hit.fraction);
        let struck = match hit.target {
            CollisionTarget::Object(handle) => Some(handle),
            CollisionTarget::Projectile(other) => {
                queue.intercepted.push((other, projectile.id()));
                None
            },
            CollisionTarget::Terrain => None,
        };
        projectile.set_target(struck, &mut bf.objects, &bf.tables);
        projectile.mark_impact(now);
        return;
    }

    let out_of_range =
        i64::from(projectile.travelled()) > projectile.weapon().max_travel(config.range_extension_percent);
    if out_of_range || motion.arrived {
        if out_of_range {
            debug!(projectile = projectile.id().raw(), travelled = projectile.travelled(), "projectile out of range");
        }
        projectile.set_target(None, &mut bf.objects, &bf.tables);
        projectile.mark_impact(now);
    }
}

fn detonate(projectile: &mut Projectile, bf: &mut Battlefield, now: GameTime, queue: &mut PassQueue) {
    let weapon = Arc::clone(projectile.weapon_arc());
    let ctx = ImpactContext {
        projectile: projectile.id(),
        player: projectile.player(),
        weapon: &weapon,
        source: projectile.source(),
        target: projectile.target(),
        position: projectile.position(),
        time: now,
    };
    let outcome = ImpactResolver::resolve_impact(bf, &ctx, projectile.damaged_mut());
    bf.events.publish(CombatEvent::ProjectileImpact {
        id: projectile.id(),
        position: ctx.position,
        target: ctx.target,
    });

    if outcome.penetrates {
        if let Some(spawn) = penetration_child(projectile, &weapon, now) {
            queue.spawned.push(spawn);
        }
    }
    projectile.set_target(None, &mut bf.objects, &bf.tables);

    if weapon.has_aftermath() {
        projectile.set_state(ProjectileState::PostImpact);
    } else {
        projectile.deactivate(now);
    }
}

/// The continuation of a penetrating shot: same line of flight, from the
/// impact point out to the weapon's long range.
fn penetration_child(projectile: &Projectile, weapon: &Arc<WeaponStats>, now: GameTime) -> Option<Spawn> {
    let line = projectile.destination() - projectile.origin();
    let run = line.horizontal_length();
    if run == 0 {
        return None;
    }
    let destination = projectile.origin() + line.scale(i64::from(weapon.long_range.max(run)), i64::from(run));
    let mut order = LaunchOrder::new(
        Arc::clone(weapon),
        projectile.player(),
        projectile.position(),
        AimPoint::Point(destination),
    )
    .with_visible(projectile.is_visible())
    .with_fire_time(now);
    order.attacker = projectile.source();
    Some(Spawn {
        order,
        destination,
        damaged: projectile.damaged().to_vec(),
    })
}

/// Burns the impact area while the aftermath lasts.
fn smoulder(projectile: &mut Projectile, bf: &mut Battlefield, now: GameTime) {
    let weapon = Arc::clone(projectile.weapon_arc());
    let age = projectile.aftermath_age(now);
    if age < weapon.periodic_damage_time {
        let ctx = ImpactContext {
            projectile: projectile.id(),
            player: projectile.player(),
            weapon: &weapon,
            source: projectile.source(),
            target: None,
            position: projectile.position(),
            time: now,
        };
        ImpactResolver::apply_periodic_damage(bf, &ctx);
    }
    if age >= weapon.aftermath_time() {
        projectile.deactivate(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Droid, WorldObject};
    use crate::weapon::{MovementModel, SurfaceToAir, WeaponClass, WeaponSubClass};
    use barrage_common::PlayerId;
    use barrage_kernel::FlatTerrain;

    fn p(i: u8) -> PlayerId {
        PlayerId::from_raw(i)
    }

    /// Ground well below the firing height.
    fn lowland() -> Battlefield {
        Battlefield::new(FlatTerrain::new(-100), 42)
    }

    fn shoot(world: &mut ProjectileWorld, bf: &mut Battlefield, weapon: WeaponStats, origin: Vec3i, aim: AimPoint) -> ProjectileId {
        let order = LaunchOrder::new(Arc::new(weapon), p(0), origin, aim).with_fire_time(bf.now());
        assert!(world.launch(bf, order));
        world.iter().last().map(Projectile::id).expect("just launched")
    }

    fn body(bf: &Battlefield, h: ObjectHandle) -> u32 {
        bf.objects.get(h).map_or(0, |o| o.core().body)
    }

    #[test]
    fn test_direct_flight_midway() {
        let mut bf = Battlefield::flat(0);
        let mut world = ProjectileWorld::default();
        world.init();
        let weapon = WeaponStats::new("c", "Cannon").with_ballistics(2000, 300);
        let id = shoot(&mut world, &mut bf, weapon, Vec3i::ZERO, AimPoint::Point(Vec3i::new(900, 0, 0)));

        for _ in 0..15 {
            world.advance_all(&mut bf);
        }
        let shot = world.get(id).expect("still flying");
        assert_eq!(bf.now().millis(), 1500);
        assert_eq!(shot.position(), Vec3i::new(450, 0, 0));
        assert_eq!(shot.state(), ProjectileState::InFlight);
        assert!(shot.previous().time < shot.spacetime().time);

        // Skimming level ground all the way, it detonates at the destination.
        for _ in 0..15 {
            world.advance_all(&mut bf);
        }
        let shot = world.get(id).expect("pruned only next tick");
        assert!(shot.is_inactive());
        assert_eq!(shot.died(), Some(GameTime::from_millis(3000)));
        assert!(bf.events.drain().contains(&CombatEvent::ProjectileImpact {
            id,
            position: Vec3i::new(900, 0, 0),
            target: None,
        }));
    }

    #[test]
    fn test_arcing_shell_hits_target() {
        let mut bf = Battlefield::flat(3);
        let mut world = ProjectileWorld::default();
        let victim = bf.objects.insert(Droid::new(p(1), Vec3i::new(1000, 0, 0), 100));
        let mortar = WeaponStats::new("m", "Mortar")
            .with_movement(MovementModel::Indirect)
            .with_damage(50, 0)
            .with_ballistics(1500, 1000);
        let id = shoot(&mut world, &mut bf, mortar, Vec3i::new(0, 0, 10), AimPoint::Object(victim));
        assert!(bf.objects.get(victim).is_some_and(|o| o.core().expected_damage_indirect > 0));

        for _ in 0..40 {
            world.advance_all(&mut bf);
            if world.get(id).map_or(true, Projectile::is_inactive) {
                break;
            }
        }
        assert!(body(&bf, victim) < 100);
        assert_eq!(bf.stats.player(p(0)).map(|s| (s.shots_fired, s.hits)), Some((1, 1)));
        assert_eq!(bf.objects.get(victim).map(|o| o.core().expected_damage_indirect), Some(0));

        world.advance_all(&mut bf);
        assert!(world.is_empty());
    }

    #[test]
    fn test_fire_burns_once_per_tick_then_stops() {
        let mut bf = Battlefield::flat(1);
        let mut world = ProjectileWorld::default();
        let victim = bf.objects.insert(Droid::new(p(1), Vec3i::new(300, 100, 0), 1000));
        let flamer = WeaponStats::new("fl", "Flamer")
            .with_sub_class(WeaponSubClass::Flame, WeaponClass::Heat)
            .with_periodic(200, 128, 500);
        let id = shoot(&mut world, &mut bf, flamer, Vec3i::new(0, 0, 50), AimPoint::Point(Vec3i::new(300, 0, 0)));

        let mut bodies = Vec::new();
        for _ in 0..10 {
            world.advance_all(&mut bf);
            bodies.push(body(&bf, victim));
        }
        // 200 per second is 20 per tick, 22 after the wheeled and light-body modifiers
        assert_eq!(bodies, vec![1000, 1000, 1000, 978, 956, 934, 912, 890, 890, 890]);
        assert!(world.get(id).is_none());
        let droid = bf.objects.get(victim).and_then(WorldObject::as_droid).expect("droid");
        assert!(!droid.is_burning());
    }

    #[test]
    fn test_termination_is_final() {
        let mut bf = Battlefield::flat(1);
        let mut world = ProjectileWorld::default();
        let gun = WeaponStats::new("mg", "MG").with_ballistics(1000, 1000);
        let id = shoot(&mut world, &mut bf, gun, Vec3i::new(0, 0, 50), AimPoint::Point(Vec3i::new(50, 0, 0)));

        world.advance_all(&mut bf);
        let shot = world.get(id).expect("pruned only next tick");
        assert!(shot.is_inactive());
        assert_eq!(shot.died(), Some(GameTime::from_millis(100)));
        assert!(world.render_instances().is_empty());

        world.update(&mut bf);
        assert!(world.get(id).is_none());
    }

    #[test]
    fn test_range_limit_forces_miss() {
        let mut bf = lowland();
        let mut world = ProjectileWorld::default();
        let gun = WeaponStats::new("mg", "MG").with_ballistics(100, 1000);
        let id = shoot(&mut world, &mut bf, gun, Vec3i::ZERO, AimPoint::Point(Vec3i::new(1000, 0, 0)));

        world.advance_all(&mut bf);
        assert_eq!(world.get(id).map(Projectile::state), Some(ProjectileState::InFlight));
        world.advance_all(&mut bf);
        let shot = world.get(id).expect("inactive until next prune");
        assert!(shot.is_inactive());
        assert_eq!(shot.position(), Vec3i::new(200, 0, 0));
        assert_eq!(bf.stats.player(p(0)).map(|s| s.hits), Some(0));
    }

    #[test]
    fn test_penetration_carries_on_to_next_droid() {
        let mut bf = lowland();
        let mut world = ProjectileWorld::default();
        let first = bf.objects.insert(Droid::new(p(1), Vec3i::new(300, 0, 0), 10));
        let second = bf.objects.insert(Droid::new(p(1), Vec3i::new(600, 0, 0), 1000));
        let rail = WeaponStats::new("rail", "Rail Gun")
            .with_damage(100, 0)
            .with_ballistics(2000, 1000)
            .with_penetrate(true);
        shoot(&mut world, &mut bf, rail, Vec3i::new(0, 0, 32), AimPoint::Object(first));

        for _ in 0..3 {
            world.advance_all(&mut bf);
        }
        assert!(!bf.objects.is_alive(first));
        assert_eq!(world.len(), 2);
        for shot in world.iter() {
            assert!(shot.damaged().iter().all(|&h| bf.objects.is_alive(h)));
        }

        for _ in 0..5 {
            world.advance_all(&mut bf);
        }
        assert!(body(&bf, second) < 1000);
        assert_eq!(bf.stats.player(p(0)).map(|s| (s.shots_fired, s.hits)), Some((1, 2)));
    }

    #[test]
    fn test_penetration_keeps_original_attacker() {
        let mut bf = lowland();
        let mut world = ProjectileWorld::default();
        let gunner = bf.objects.insert(Droid::new(p(0), Vec3i::new(0, -300, 0), 100));
        let first = bf.objects.insert(Droid::new(p(1), Vec3i::new(300, 0, 0), 10));
        let rail = WeaponStats::new("rail", "Rail Gun")
            .with_damage(100, 0)
            .with_ballistics(2000, 1000)
            .with_penetrate(true);
        let order = LaunchOrder::new(Arc::new(rail), p(0), Vec3i::new(0, 0, 32), AimPoint::Object(first))
            .with_attacker(gunner)
            .with_fire_time(bf.now());
        assert!(world.launch(&mut bf, order));
        let original = world.iter().last().map(Projectile::id).expect("launched");

        for _ in 0..3 {
            world.advance_all(&mut bf);
        }
        assert!(!bf.objects.is_alive(first));
        let child = world.iter().find(|s| s.id() != original).expect("penetration child");
        assert_eq!(child.source(), Some(gunner));
        assert!(bf
            .events
            .drain()
            .contains(&CombatEvent::ObjectDestroyed { target: first, attacker: Some(gunner) }));
    }

    #[test]
    fn test_flak_intercepts_rocket() {
        let mut bf = lowland();
        let mut world = ProjectileWorld::default();

        let rocket = WeaponStats::new("rk", "Rocket")
            .with_sub_class(WeaponSubClass::Rocket, WeaponClass::Kinetic)
            .with_ballistics(2000, 500);
        let order = LaunchOrder::new(
            Arc::new(rocket),
            p(1),
            Vec3i::new(1000, 0, 300),
            AimPoint::Point(Vec3i::new(0, 0, 300)),
        );
        assert!(world.launch(&mut bf, order));
        let rocket_id = world.iter().last().map(Projectile::id).expect("rocket");

        let flak = WeaponStats::new("aa", "Flak")
            .with_surface_to_air(SurfaceToAir::ALL)
            .with_ballistics(2000, 1000);
        let flak_id = shoot(&mut world, &mut bf, flak, Vec3i::new(0, 0, 300), AimPoint::Point(Vec3i::new(1000, 0, 300)));
        bf.events.drain();

        for _ in 0..8 {
            world.advance_all(&mut bf);
        }
        let events = bf.events.drain();
        assert!(events.contains(&CombatEvent::ProjectileIntercepted { id: rocket_id, by: flak_id }));
        assert!(!events
            .iter()
            .any(|e| matches!(e, CombatEvent::ProjectileImpact { id, .. } if *id == rocket_id)));
        assert!(world.get(rocket_id).map_or(true, Projectile::is_inactive));
    }

    #[test]
    fn test_emp_disables_without_damage() {
        let mut bf = lowland();
        let mut world = ProjectileWorld::default();
        let victim = bf.objects.insert(Droid::new(p(1), Vec3i::new(200, 0, 0), 100));
        let emp = WeaponStats::new("emp", "EMP Cannon")
            .with_sub_class(WeaponSubClass::Emp, WeaponClass::Kinetic)
            .with_emp(2000);
        shoot(&mut world, &mut bf, emp, Vec3i::new(0, 0, 32), AimPoint::Object(victim));

        for _ in 0..3 {
            world.advance_all(&mut bf);
        }
        let droid = bf.objects.get(victim).and_then(WorldObject::as_droid).expect("droid");
        assert_eq!(droid.core.body, 100);
        assert!(droid.is_disabled(bf.now()));
    }

    #[test]
    fn test_target_death_mid_flight_clears_target() {
        let mut bf = lowland();
        let mut world = ProjectileWorld::default();
        let victim = bf.objects.insert(Droid::new(p(1), Vec3i::new(1000, 0, 0), 100));
        let gun = WeaponStats::new("c", "Cannon").with_ballistics(2000, 500);
        let id = shoot(&mut world, &mut bf, gun, Vec3i::new(0, 0, 32), AimPoint::Object(victim));

        world.advance_all(&mut bf);
        let now = bf.now();
        if let Some(object) = bf.objects.get_mut(victim) {
            object.core_mut().died = Some(now);
        }
        world.advance_all(&mut bf);
        assert_eq!(world.get(id).and_then(Projectile::target), None);
        assert_eq!(world.get(id).map(Projectile::state), Some(ProjectileState::InFlight));
    }

    #[test]
    fn test_rejected_launches() {
        let mut bf = lowland();
        let mut world = ProjectileWorld::default();
        let dead = bf.objects.insert(Droid::new(p(1), Vec3i::ZERO, 100));
        if let Some(object) = bf.objects.get_mut(dead) {
            object.core_mut().died = Some(GameTime::ZERO);
        }
        let gun = Arc::new(WeaponStats::new("c", "Cannon"));
        let stalled = Arc::new(WeaponStats::new("x", "Broken").with_ballistics(1000, 0));

        assert!(!world.launch(&mut bf, LaunchOrder::new(Arc::clone(&gun), p(1), Vec3i::ZERO, AimPoint::Object(dead))));
        assert!(!world.launch(&mut bf, LaunchOrder::new(Arc::clone(&gun), p(42), Vec3i::ZERO, AimPoint::Point(Vec3i::ZERO))));
        assert!(!world.launch(&mut bf, LaunchOrder::new(stalled, p(0), Vec3i::ZERO, AimPoint::Point(Vec3i::ZERO))));
        assert!(world.is_empty());
        assert_eq!(bf.stats.totals().shots_fired, 0);
    }

    #[test]
    fn test_replay_is_deterministic() {
        fn run() -> (Vec<ProjectileInstance>, u32, u64) {
            let mut bf = Battlefield::flat(99);
            let mut world = ProjectileWorld::default();
            let victim = bf.objects.insert(Droid::new(p(1), Vec3i::new(1500, 300, 0), 2000));
            let mortar = Arc::new(
                WeaponStats::new("m", "Mortar")
                    .with_movement(MovementModel::Indirect)
                    .with_damage(40, 0)
                    .with_splash(128, 20, 0)
                    .with_ballistics(2000, 900),
            );
            for tick in 0..6 {
                let origin = Vec3i::new(0, tick * 40, 20);
                let order = LaunchOrder::new(Arc::clone(&mortar), p(0), origin, AimPoint::Object(victim))
                    .with_fire_time(bf.now());
                world.launch(&mut bf, order);
                world.advance_all(&mut bf);
            }
            for _ in 0..10 {
                world.advance_all(&mut bf);
            }
            (world.render_instances(), body(&bf, victim), bf.rng.checksum().draws)
        }

        let a = run();
        let b = run();
        assert_eq!(a, b);
        assert_eq!(a.2, 6);
    }

    #[test]
    fn test_shutdown_withdraws_expected_damage() {
        let mut bf = lowland();
        let mut world = ProjectileWorld::default();
        let victim = bf.objects.insert(Droid::new(p(1), Vec3i::new(1000, 0, 0), 100));
        shoot(&mut world, &mut bf, WeaponStats::new("c", "Cannon"), Vec3i::new(0, 0, 32), AimPoint::Object(victim));
        assert!(bf.objects.get(victim).is_some_and(|o| o.core().expected_damage_direct > 0));

        world.shutdown(&mut bf);
        assert!(world.is_empty());
        assert_eq!(bf.objects.get(victim).map(|o| o.core().expected_damage_direct), Some(0));
    }
}
