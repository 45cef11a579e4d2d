//! Damage model.
//!
//! This module provides:
//! - Weapon effect versus target modifier tables
//! - Base damage scaling with a floor of one
//! - Armour reduction with an armour-proof share
//! - Per-tick sampling of burn damage
//! - Hit point reduction and destruction
//!
//! Damage results are reported as relative damage: Q16 fractions of the
//! victim's undamaged body points, negative when the hit destroyed it.

use barrage_common::{
    GameTime, ObjectHandle, PlayerId, GAME_TICKS_PER_SEC, GAME_TICKS_PER_UPDATE, Q16_ONE,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::{Combatant, DamageTarget, ObjectArena, WorldObject};
use crate::weapon::{WeaponClass, WeaponEffect, WeaponSubClass};

const EFFECTS: usize = WeaponEffect::ALL.len();

// ============================================================================
// Modifier tables
// ============================================================================

/// Percentage modifiers per weapon effect.
///
/// Rows follow [`WeaponEffect::ALL`]. Columns follow the order of
/// [`Propulsion`](crate::entity::Propulsion), [`BodySize`](crate::entity::BodySize)
/// and [`StructureStrength`](crate::entity::StructureStrength).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageTables {
    /// Against droid propulsion
    pub propulsion: [[u32; 6]; EFFECTS],
    /// Against droid body size
    pub body: [[u32; 4]; EFFECTS],
    /// Against structure strength
    pub structure: [[u32; 4]; EFFECTS],
}

impl Default for DamageTables {
    fn default() -> Self {
        Self {
            // wheeled, half-tracked, tracked, hover, legged, lift
            propulsion: [
                [100, 85, 60, 110, 125, 75],
                [120, 110, 100, 120, 90, 60],
                [40, 40, 40, 40, 40, 20],
                [100, 90, 75, 110, 115, 20],
                [110, 100, 75, 125, 130, 20],
                [30, 30, 30, 30, 30, 150],
            ],
            // light, medium, heavy, super heavy
            body: [
                [110, 100, 90, 80],
                [90, 100, 110, 120],
                [100, 100, 100, 100],
                [100, 100, 100, 100],
                [110, 100, 90, 85],
                [100, 100, 100, 100],
            ],
            // soft, medium, hard, bunker
            structure: [
                [100, 50, 35, 25],
                [100, 75, 60, 50],
                [150, 200, 250, 300],
                [100, 75, 50, 40],
                [100, 60, 40, 25],
                [50, 30, 20, 10],
            ],
        }
    }
}

impl DamageTables {
    /// Modifiers that apply to a hit, as percentages.
    #[must_use]
    pub fn modifiers(&self, effect: WeaponEffect, target: DamageTarget) -> [Option<u32>; 2] {
        let row = effect.index();
        match target {
            DamageTarget::Unit { propulsion, body } => [
                Some(self.propulsion[row][propulsion.index()]),
                Some(self.body[row][body.index()]),
            ],
            DamageTarget::Structure { strength } => {
                [Some(self.structure[row][strength.index()]), None]
            },
            DamageTarget::Feature => [None, None],
        }
    }
}

/// Scales base damage by the modifiers for `target`.
///
/// Returns 0 for 0 base damage and never less than 1 otherwise, however
/// harsh the modifiers.
#[must_use]
pub fn calc_damage(
    base_damage: u32,
    effect: WeaponEffect,
    target: DamageTarget,
    tables: &DamageTables,
) -> u32 {
    if base_damage == 0 {
        return 0;
    }
    let base = i64::from(base_damage);
    let mut scaled = base * 100;
    for modifier in tables.modifiers(effect, target).into_iter().flatten() {
        scaled += base * (i64::from(modifier) - 100);
    }
    (scaled / 100).clamp(1, i64::from(u32::MAX)) as u32
}

// ============================================================================
// Applying damage
// ============================================================================

/// One hit, created per impact and consumed immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageRequest {
    /// Object the shot came from, if still known
    pub attacker: Option<ObjectHandle>,
    /// Player that fired
    pub attacker_player: PlayerId,
    /// Object being hit
    pub target: ObjectHandle,
    /// Damage before modifiers, or the damage rate for burn damage
    pub base_damage: u32,
    /// Modifier table row
    pub effect: WeaponEffect,
    /// Armour class
    pub class: WeaponClass,
    /// Weapon family
    pub sub_class: WeaponSubClass,
    /// Time of the hit
    pub time: GameTime,
    /// Burn damage sampled once per tick
    pub is_periodic: bool,
    /// Share of damage that armour cannot stop, in percent
    pub min_damage_percent: u32,
    /// How long a struck droid is disabled
    pub emp_disable_time: u32,
}

/// Applies one hit to its target and returns the relative damage.
///
/// Returns 0 if the target is gone, already dead, or the hit only disabled
/// it. A negative result means the hit destroyed the target.
pub fn apply_damage(objects: &mut ObjectArena, tables: &DamageTables, request: &DamageRequest) -> i32 {
    let Some(object) = objects.get_mut(request.target) else {
        return 0;
    };
    if object.is_dead() {
        return 0;
    }

    if request.emp_disable_time > 0 && !request.is_periodic {
        if let Some(droid) = object.as_droid_mut() {
            droid.disable_until(request.time.plus(request.emp_disable_time));
        }
    }
    if request.sub_class.is_emp() {
        return 0;
    }

    let mut damage = calc_damage(request.base_damage, request.effect, object.damage_target(), tables);
    if request.is_periodic {
        damage = match sample_periodic(object, damage, request.time) {
            Some(d) => d,
            None => return 0,
        };
    }

    let armour = object.core().armour.against(request.class);
    let floor = (u64::from(damage) * u64::from(request.min_damage_percent.min(100)) / 100) as u32;
    let actual = damage.saturating_sub(armour).max(floor).max(1);

    let core = object.core_mut();
    let lost = actual.min(core.body);
    core.body -= lost;
    let relative = (i64::from(actual) * i64::from(Q16_ONE) / i64::from(core.original_body))
        .clamp(1, i64::from(i32::MAX)) as i32;

    if core.body == 0 {
        core.died = Some(request.time);
        debug!(victim = ?request.target, attacker = ?request.attacker, "object destroyed");
        return -relative;
    }
    relative
}

/// Damage for this tick from a burn rate, or `None` if an equal or hotter
/// fire already burned the target this tick.
fn sample_periodic(object: &mut WorldObject, rate: u32, now: GameTime) -> Option<u32> {
    let window = &mut object.core_mut().periodic;
    if window.tick != now {
        window.tick = now;
        window.rate_applied = 0;
    }
    if rate <= window.rate_applied {
        return None;
    }
    let delta = rate - window.rate_applied;
    window.rate_applied = rate;

    if let Some(droid) = object.as_droid_mut() {
        droid.mark_burning(now);
    }
    Some((delta * GAME_TICKS_PER_UPDATE / GAME_TICKS_PER_SEC).max(1))
}
