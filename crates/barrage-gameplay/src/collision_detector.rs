//! Earliest-hit search for one projectile step.
//!
//! Candidates are tested in a fixed order: world objects in arena slot
//! order, then interceptable projectiles in creation order, then terrain.
//! Only a strictly earlier hit replaces the current best, so ties go to
//! whatever was found first.

use barrage_common::{ObjectHandle, PlayerId, ProjectileId, Vec3i};
use barrage_kernel::{sweep_shape, terrain_intersection, CollisionShape, Interval};
use tracing::trace;

use crate::battlefield::Battlefield;
use crate::config::ProjectileConfig;
use crate::entity::{Combatant, ObjectKind, WorldObject};
use crate::faction::AllianceTable;
use crate::weapon::WeaponStats;

/// What a projectile ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionTarget {
    /// A world object
    Object(ObjectHandle),
    /// Another projectile
    Projectile(ProjectileId),
    /// The ground
    Terrain,
}

/// Earliest collision of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionHit {
    /// What was hit
    pub target: CollisionTarget,
    /// Fraction of the step at which it was hit, out of
    /// [`FRACTION_ONE`](barrage_kernel::FRACTION_ONE)
    pub fraction: i32,
}

/// Movement of an interceptable projectile during the current pass.
///
/// Until the projectile has taken its step, `from` and `to` are both its
/// position at the start of the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectileSnapshot {
    /// Projectile ID
    pub id: ProjectileId,
    /// Owning player
    pub player: PlayerId,
    /// Position before its step
    pub from: Vec3i,
    /// Position after its step
    pub to: Vec3i,
}

impl ProjectileSnapshot {
    /// A projectile that has not moved yet this pass.
    #[must_use]
    pub const fn at_rest(id: ProjectileId, player: PlayerId, pos: Vec3i) -> Self {
        Self {
            id,
            player,
            from: pos,
            to: pos,
        }
    }

    /// Records the step the projectile just took.
    pub fn moved(&mut self, from: Vec3i, to: Vec3i) {
        self.from = from;
        self.to = to;
    }
}

/// The moving projectile being tested.
#[derive(Debug, Clone, Copy)]
pub struct CollisionProbe<'a> {
    /// Its own ID, never a candidate
    pub id: ProjectileId,
    /// Firing player
    pub player: PlayerId,
    /// Weapon that fired it
    pub weapon: &'a WeaponStats,
    /// Position at the start of the step
    pub from: Vec3i,
    /// Position at the end of the step
    pub to: Vec3i,
    /// Intended victim, which may be allied
    pub target: Option<ObjectHandle>,
    /// Objects this flight has already hit
    pub damaged: &'a [ObjectHandle],
}

/// Swept collision search against objects, projectiles and terrain.
#[derive(Debug, Clone, Copy)]
pub struct CollisionDetector<'a> {
    config: &'a ProjectileConfig,
}

impl<'a> CollisionDetector<'a> {
    /// Creates a detector using the given settings.
    #[must_use]
    pub const fn new(config: &'a ProjectileConfig) -> Self {
        Self { config }
    }

    /// Whether `object` may be hit by the probe at all.
    #[must_use]
    pub fn is_candidate(
        probe: &CollisionProbe<'_>,
        handle: ObjectHandle,
        object: &WorldObject,
        alliances: &AllianceTable,
    ) -> bool {
        if probe.damaged.contains(&handle) || object.is_dead() {
            return false;
        }
        if object.kind() == ObjectKind::Feature && !object.is_damageable() {
            return false;
        }
        if alliances.allied(probe.player, object.player()) && probe.target != Some(handle) {
            return false;
        }
        probe.weapon.surface_to_air.can_hit(object.is_airborne())
    }

    /// Finds the earliest collision along the probe's step.
    #[must_use]
    pub fn find_earliest(
        &self,
        probe: &CollisionProbe<'_>,
        bf: &Battlefield,
        projectiles: &[ProjectileSnapshot],
    ) -> Option<CollisionHit> {
        let mut best: Option<CollisionHit> = None;
        let mut consider = |target: CollisionTarget, interval: Interval| {
            if interval.is_empty() {
                return;
            }
            if best.map_or(true, |b| interval.begin < b.fraction) {
                best = Some(CollisionHit {
                    target,
                    fraction: interval.begin,
                });
            }
        };

        let mid = probe.from.lerp(probe.to, 1, 2);
        let reach = self.config.neighbour_radius + (probe.to - probe.from).length() / 2;
        for handle in bf.objects.query_radius(mid.xy(), reach) {
            let Some(object) = bf.objects.get(handle) else {
                continue;
            };
            if !Self::is_candidate(probe, handle, object, &bf.alliances) {
                continue;
            }
            let centre = object.aim_point();
            let half_height = object.target_height() / 2;
            let interval = sweep_shape(
                object.collision_shape(),
                probe.from - centre,
                probe.to - centre,
                half_height,
            );
            consider(CollisionTarget::Object(handle), interval);
        }

        if probe.weapon.surface_to_air.hits_air() {
            let radius = self.config.projectile_radius;
            let shape = CollisionShape::circle(radius * 2);
            for other in projectiles {
                if other.id == probe.id || bf.alliances.allied(probe.player, other.player) {
                    continue;
                }
                // Both move over the same step, so sweep the relative motion.
                let interval = sweep_shape(shape, probe.from - other.from, probe.to - other.to, radius * 2);
                consider(CollisionTarget::Projectile(other.id), interval);
            }
        }

        if let Some(fraction) = terrain_intersection(
            bf.terrain.as_ref(),
            probe.from,
            probe.to,
            self.config.terrain_sample_step,
        ) {
            consider(CollisionTarget::Terrain, Interval::new(i64::from(fraction), i64::from(fraction)));
        }

        if let Some(hit) = best {
            trace!(projectile = probe.id.raw(), ?hit, "collision");
        }
        best
    }
}
