//! Experience and kill attribution.
//!
//! Experience is measured in the same Q16 units as relative damage: dealing
//! a victim's whole body in damage is worth 65536 at a 100% gain modifier.

use barrage_common::{ObjectHandle, PlayerId, MAX_PLAYERS, Q16_ONE};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::entity::{Combatant, Droid, ObjectArena, ObjectKind, WorldObject};
use crate::faction::AllianceTable;
use crate::match_stats::StatsSink;

/// Quality factor bounds, Q16.
const QUALITY_MIN: i64 = (Q16_ONE / 2) as i64;
const QUALITY_MAX: i64 = (Q16_ONE * 2) as i64;

/// Match-wide experience settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceRules {
    /// Scale experience by the relative cost of attacker and victim
    pub multiplayer: bool,
    /// Experience gain per player, in percent
    pub gain_percent: [u32; MAX_PLAYERS],
}

impl Default for ExperienceRules {
    fn default() -> Self {
        Self {
            multiplayer: false,
            gain_percent: [100; MAX_PLAYERS],
        }
    }
}

impl ExperienceRules {
    /// Gain modifier for a player; 0 for invalid players.
    #[must_use]
    pub fn gain(&self, player: PlayerId) -> u32 {
        self.gain_percent.get(player.index()).copied().unwrap_or(0)
    }
}

/// Ratio of victim to attacker value, Q16.
///
/// The power-cost ratio and the build-points ratio are each clamped to
/// `[0.5, 2.0]` and averaged.
#[must_use]
pub fn quality_factor(attacker: &Droid, target: &Droid) -> i32 {
    let ratio = |victim: u32, own: u32| {
        (i64::from(victim) * i64::from(Q16_ONE) / i64::from(own.max(1)))
            .clamp(QUALITY_MIN, QUALITY_MAX)
    };
    let power = ratio(target.power_cost, attacker.power_cost);
    let points = ratio(target.build_points, attacker.build_points);
    ((power + points) / 2) as i32
}

/// Outcome of one resolved hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitReport {
    /// Object the shot came from, if known
    pub attacker: Option<ObjectHandle>,
    /// Player that fired
    pub attacker_player: PlayerId,
    /// Object that was hit
    pub target: ObjectHandle,
    /// Relative damage from the damage model
    pub relative: i32,
}

/// Books statistics, experience and kills for a resolved hit.
///
/// Returns the experience granted to the attacker.
pub fn attribute_damage(
    objects: &mut ObjectArena,
    alliances: &AllianceTable,
    rules: &ExperienceRules,
    stats: &mut dyn StatsSink,
    hit: &HitReport,
) -> u32 {
    if hit.relative == 0 {
        return 0;
    }
    let Some(target) = objects.get(hit.target) else {
        return 0;
    };
    if target.kind() == ObjectKind::Feature {
        return 0;
    }
    let victim = target.player();
    let killed = hit.relative < 0;

    stats.record_damage(hit.attacker_player, victim, hit.relative.unsigned_abs());
    if killed {
        stats.record_kill(hit.attacker_player, victim);
    }

    if alliances.allied(hit.attacker_player, victim) {
        return 0;
    }
    let Some(attacker_handle) = hit.attacker else {
        return 0;
    };
    let Some(attacker) = objects.get_alive(attacker_handle) else {
        return 0;
    };

    let mut experience =
        u64::from(hit.relative.unsigned_abs()) * u64::from(rules.gain(hit.attacker_player)) / 100;
    if rules.multiplayer {
        if let (Some(a), Some(t)) = (attacker.as_droid(), target.as_droid()) {
            experience = experience * quality_factor(a, t) as u64 / Q16_ONE as u64;
        }
    }
    let experience = experience.min(u64::from(u32::MAX)) as u32;

    // Who else shares in the credit.
    let (linked, kill_credit): (Vec<ObjectHandle>, Vec<ObjectHandle>) = match attacker {
        WorldObject::Droid(d) => {
            let linked = d.commander.into_iter().chain(d.sensor_link).collect();
            let credit = std::iter::once(attacker_handle).chain(d.commander).collect();
            (linked, credit)
        },
        WorldObject::Structure(s) => (s.designator.into_iter().collect(), s.designator.into_iter().collect()),
        WorldObject::Feature(_) => (Vec::new(), Vec::new()),
    };

    if let Some(d) = objects.get_mut(attacker_handle).and_then(WorldObject::as_droid_mut) {
        d.experience = d.experience.saturating_add(experience);
    }
    for handle in linked {
        if let Some(d) = objects.get_mut(handle).and_then(WorldObject::as_droid_mut) {
            if !d.core.is_dead() {
                d.experience = d.experience.saturating_add(experience);
            }
        }
    }
    if killed {
        for handle in kill_credit {
            if let Some(d) = objects.get_mut(handle).and_then(WorldObject::as_droid_mut) {
                if !d.core.is_dead() {
                    d.kills += 1;
                }
            }
        }
    }

    trace!(attacker = ?attacker_handle, experience, killed, "experience attributed");
    experience
}
