//! Impact resolution: primary hit, splash and burn damage.

use barrage_common::{GameTime, ObjectHandle, PlayerId, ProjectileId, Vec3i};
use tracing::debug;

use crate::battlefield::Battlefield;
use crate::damage_calc::{apply_damage, DamageRequest};
use crate::entity::{Combatant, ObjectKind, WorldObject};
use crate::events::CombatEvent;
use crate::experience::{attribute_damage, HitReport};
use crate::match_stats::StatsSink;
use crate::weapon::{WeaponClass, WeaponStats};

/// A detonation, or the burning area it leaves behind.
#[derive(Debug, Clone, Copy)]
pub struct ImpactContext<'a> {
    /// Projectile that detonated
    pub projectile: ProjectileId,
    /// Firing player
    pub player: PlayerId,
    /// Weapon that fired it
    pub weapon: &'a WeaponStats,
    /// Object the shot came from, if known
    pub source: Option<ObjectHandle>,
    /// Object struck directly, if any
    pub target: Option<ObjectHandle>,
    /// Detonation point
    pub position: Vec3i,
    /// Game time of the damage
    pub time: GameTime,
}

/// What a detonation did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImpactOutcome {
    /// Relative damage to the struck object
    pub primary: Option<i32>,
    /// Objects caught in the splash, in query order
    pub splashed: Vec<ObjectHandle>,
    /// Whether the shot carries on past the struck droid
    pub penetrates: bool,
}

/// Applies the damage a projectile deals when it lands.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImpactResolver;

impl ImpactResolver {
    /// Damages the struck object and everything in the splash radius.
    ///
    /// The struck object is appended to `damaged`. A target that is already
    /// dead is ignored and the shot counts as a miss.
    pub fn resolve_impact(
        bf: &mut Battlefield,
        ctx: &ImpactContext<'_>,
        damaged: &mut Vec<ObjectHandle>,
    ) -> ImpactOutcome {
        let mut outcome = ImpactOutcome::default();
        let weapon = ctx.weapon;

        if let Some(target) = ctx.target.filter(|&t| bf.objects.is_alive(t)) {
            let penetrable = bf.objects.get(target).is_some_and(is_penetrable);
            bf.stats.record_hit(ctx.player);
            let relative = Self::hit(bf, ctx, target, weapon.damage, weapon.class, false);
            damaged.push(target);
            outcome.primary = Some(relative);
            outcome.penetrates = weapon.penetrate && penetrable;
        }

        if weapon.radius > 0 && weapon.radius_damage > 0 {
            for handle in bf.objects.query_centres(ctx.position.xy(), weapon.radius) {
                if ctx.target == Some(handle) || damaged.contains(&handle) {
                    continue;
                }
                if !Self::area_candidate(bf, ctx, handle) {
                    continue;
                }
                Self::hit(bf, ctx, handle, weapon.radius_damage, weapon.class, false);
                outcome.splashed.push(handle);
            }
        }

        debug!(
            projectile = ctx.projectile.raw(),
            primary = ?outcome.primary,
            splashed = outcome.splashed.len(),
            "impact resolved"
        );
        outcome
    }

    /// Burns everything eligible inside the periodic damage radius.
    ///
    /// Returns how many objects were burned this tick.
    pub fn apply_periodic_damage(bf: &mut Battlefield, ctx: &ImpactContext<'_>) -> usize {
        let weapon = ctx.weapon;
        if weapon.periodic_damage == 0 || weapon.periodic_damage_radius <= 0 {
            return 0;
        }
        let mut burned = 0;
        for handle in bf.objects.query_centres(ctx.position.xy(), weapon.periodic_damage_radius) {
            if !Self::area_candidate(bf, ctx, handle) {
                continue;
            }
            let relative = Self::hit(
                bf,
                ctx,
                handle,
                weapon.periodic_damage,
                weapon.periodic_damage_class,
                true,
            );
            if relative != 0 {
                burned += 1;
            }
        }
        burned
    }

    /// Splash and burn eligibility: alive, damageable, hostile and in an
    /// altitude band the weapon can reach.
    fn area_candidate(bf: &Battlefield, ctx: &ImpactContext<'_>, handle: ObjectHandle) -> bool {
        let Some(object) = bf.objects.get(handle) else {
            return false;
        };
        if object.is_dead() || !object.is_damageable() {
            return false;
        }
        if bf.alliances.allied(ctx.player, object.player()) {
            return false;
        }
        ctx.weapon.surface_to_air.can_hit(object.is_airborne())
    }

    fn hit(
        bf: &mut Battlefield,
        ctx: &ImpactContext<'_>,
        target: ObjectHandle,
        base_damage: u32,
        class: WeaponClass,
        is_periodic: bool,
    ) -> i32 {
        let request = DamageRequest {
            attacker: ctx.source,
            attacker_player: ctx.player,
            target,
            base_damage,
            effect: ctx.weapon.effect,
            class,
            sub_class: ctx.weapon.sub_class,
            time: ctx.time,
            is_periodic,
            min_damage_percent: ctx.weapon.min_damage_percent,
            emp_disable_time: ctx.weapon.emp_disable_time,
        };
        let relative = apply_damage(&mut bf.objects, &bf.tables, &request);
        if relative == 0 {
            return 0;
        }

        bf.events.publish(CombatEvent::ObjectDamaged {
            target,
            attacker: ctx.source,
            relative,
            periodic: is_periodic,
        });
        if relative < 0 {
            bf.events.publish(CombatEvent::ObjectDestroyed {
                target,
                attacker: ctx.source,
            });
        }
        attribute_damage(
            &mut bf.objects,
            &bf.alliances,
            &bf.rules,
            &mut bf.stats,
            &HitReport {
                attacker: ctx.source,
                attacker_player: ctx.player,
                target,
                relative,
            },
        );
        relative
    }
}

/// Whether `object` is a droid a penetrating shot may pass through.
#[must_use]
pub fn is_penetrable(object: &WorldObject) -> bool {
    object.kind() == ObjectKind::Droid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{BodySize, Droid, Feature, Propulsion, Structure};
    use crate::faction::AllianceTable;
    use crate::weapon::SurfaceToAir;

    fn p(i: u8) -> PlayerId {
        PlayerId::from_raw(i)
    }

    fn ctx<'a>(weapon: &'a WeaponStats, target: Option<ObjectHandle>, position: Vec3i) -> ImpactContext<'a> {
        ImpactContext {
            projectile: ProjectileId::from_raw(1),
            player: p(0),
            weapon,
            source: None,
            target,
            position,
            time: GameTime::from_millis(1000),
        }
    }

    fn body(bf: &Battlefield, h: ObjectHandle) -> u32 {
        bf.objects.get(h).map_or(0, |o| o.core().body)
    }

    #[test]
    fn test_splash_hits_enemies_in_radius_only() {
        let mut bf = Battlefield::flat(0).with_alliances(AllianceTable::from_teams(&[0, 1, 0]));
        let u1 = bf.objects.insert(Droid::new(p(1), Vec3i::new(1000, 1000, 0), 500));
        let u2 = bf.objects.insert(Droid::new(p(1), Vec3i::new(1100, 1000, 0), 500));
        let u3_far = bf.objects.insert(Droid::new(p(1), Vec3i::new(1400, 1000, 0), 500));
        let u3_ally = bf.objects.insert(Droid::new(p(2), Vec3i::new(1000, 1100, 0), 500));
        let weapon = WeaponStats::new("he", "HE Shell").with_damage(100, 0).with_splash(192, 40, 0);

        let mut damaged = Vec::new();
        let outcome = ImpactResolver::resolve_impact(
            &mut bf,
            &ctx(&weapon, Some(u1), Vec3i::new(1000, 1000, 32)),
            &mut damaged,
        );

        assert!(outcome.primary.is_some_and(|r| r > 0));
        assert_eq!(outcome.splashed, vec![u2]);
        assert_eq!(damaged, vec![u1]);
        assert!(body(&bf, u1) < 500);
        assert!(body(&bf, u2) < 500);
        assert_eq!(body(&bf, u3_far), 500);
        assert_eq!(body(&bf, u3_ally), 500);
    }

    #[test]
    fn test_dead_target_is_a_miss() {
        let mut bf = Battlefield::flat(0);
        let u = bf.objects.insert(Droid::new(p(1), Vec3i::ZERO, 100));
        if let Some(o) = bf.objects.get_mut(u) {
            o.core_mut().died = Some(GameTime::from_millis(500));
        }
        let weapon = WeaponStats::new("c", "Cannon").with_penetrate(true);
        let mut damaged = Vec::new();
        let outcome = ImpactResolver::resolve_impact(&mut bf, &ctx(&weapon, Some(u), Vec3i::ZERO), &mut damaged);
        assert_eq!(outcome, ImpactOutcome::default());
        assert!(damaged.is_empty());
    }

    #[test]
    fn test_penetration_only_through_droids() {
        let mut bf = Battlefield::flat(0);
        let droid = bf.objects.insert(Droid::new(p(1), Vec3i::ZERO, 1000));
        let wall = bf.objects.insert(Feature::new(p(1), Vec3i::new(500, 0, 0), 1000));
        let weapon = WeaponStats::new("rail", "Rail Gun").with_penetrate(true);

        let mut damaged = Vec::new();
        let through = ImpactResolver::resolve_impact(&mut bf, &ctx(&weapon, Some(droid), Vec3i::ZERO), &mut damaged);
        assert!(through.penetrates);
        let stopped = ImpactResolver::resolve_impact(
            &mut bf,
            &ctx(&weapon, Some(wall), Vec3i::new(500, 0, 0)),
            &mut damaged,
        );
        assert!(!stopped.penetrates);
        assert_eq!(damaged, vec![droid, wall]);
        assert!(bf.objects.get(droid).is_some_and(is_penetrable));
    }

    #[test]
    fn test_structures_stop_penetrating_shots() {
        let mut bf = Battlefield::flat(0);
        let bunker = bf.objects.insert(Structure::new(p(1), Vec3i::ZERO, 5000));
        let weapon = WeaponStats::new("rail", "Rail Gun").with_damage(50, 0).with_penetrate(true);

        let mut damaged = Vec::new();
        let outcome = ImpactResolver::resolve_impact(&mut bf, &ctx(&weapon, Some(bunker), Vec3i::ZERO), &mut damaged);
        assert!(outcome.primary.is_some());
        assert!(!outcome.penetrates);
        assert!(!bf.objects.get(bunker).is_some_and(is_penetrable));
    }

    #[test]
    fn test_periodic_skips_allies_and_aircraft() {
        let mut bf = Battlefield::flat(0);
        let enemy = bf.objects.insert(Droid::new(p(1), Vec3i::new(10, 0, 0), 1000));
        let own = bf.objects.insert(Droid::new(p(0), Vec3i::new(20, 0, 0), 1000));
        let vtol = bf.objects.insert(
            Droid::new(p(1), Vec3i::new(30, 0, 0), 1000).with_chassis(Propulsion::Lift, BodySize::Light),
        );
        let weapon = WeaponStats::new("fl", "Flamer")
            .with_surface_to_air(SurfaceToAir::GROUND)
            .with_periodic(200, 128, 500);

        let burned = ImpactResolver::apply_periodic_damage(&mut bf, &ctx(&weapon, None, Vec3i::ZERO));
        assert_eq!(burned, 1);
        assert!(body(&bf, enemy) < 1000);
        assert_eq!(body(&bf, own), 1000);
        assert_eq!(body(&bf, vtol), 1000);
        let droid = bf.objects.get(enemy).and_then(WorldObject::as_droid).expect("droid");
        assert!(droid.is_burning());
    }

    #[test]
    fn test_events_published() {
        let mut bf = Battlefield::flat(0);
        let u = bf.objects.insert(Droid::new(p(1), Vec3i::ZERO, 10));
        let weapon = WeaponStats::new("c", "Cannon").with_damage(100, 0);
        let mut damaged = Vec::new();
        ImpactResolver::resolve_impact(&mut bf, &ctx(&weapon, Some(u), Vec3i::ZERO), &mut damaged);
        let events = bf.events.drain();
        assert!(matches!(events[0], CombatEvent::ObjectDamaged { relative, .. } if relative < 0));
        assert!(matches!(events[1], CombatEvent::ObjectDestroyed { .. }));
        assert_eq!(bf.stats.player(p(0)).map(|s| s.kills), Some(1));
    }
}
