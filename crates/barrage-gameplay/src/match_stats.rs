//! Per-player match statistics.

use barrage_common::{PlayerId, MAX_PLAYERS};
use serde::{Deserialize, Serialize};

/// Collaborator that aggregates combat statistics.
pub trait StatsSink {
    /// A projectile was launched.
    fn record_shot(&mut self, player: PlayerId);

    /// A projectile struck its intended or an incidental target.
    fn record_hit(&mut self, player: PlayerId);

    /// Damage was dealt, as Q16 relative damage.
    fn record_damage(&mut self, attacker: PlayerId, victim: PlayerId, relative: u32);

    /// An object was destroyed.
    fn record_kill(&mut self, attacker: PlayerId, victim: PlayerId);
}

/// Totals for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Projectiles launched
    pub shots_fired: u64,
    /// Projectiles that hit an object
    pub hits: u64,
    /// Relative damage dealt, Q16
    pub damage_dealt: u64,
    /// Relative damage taken, Q16
    pub damage_received: u64,
    /// Enemy objects destroyed
    pub kills: u64,
    /// Own objects lost
    pub losses: u64,
}

/// Statistics for every player slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    players: Vec<PlayerStats>,
}

impl Default for MatchStats {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchStats {
    /// Empty statistics for every slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            players: vec![PlayerStats::default(); MAX_PLAYERS],
        }
    }

    /// Totals for one player.
    #[must_use]
    pub fn player(&self, player: PlayerId) -> Option<&PlayerStats> {
        self.players.get(player.index())
    }

    /// Every slot, in player order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &PlayerStats)> {
        self.players
            .iter()
            .enumerate()
            .map(|(i, s)| (PlayerId::from_raw(i as u8), s))
    }

    /// Sum over all players.
    #[must_use]
    pub fn totals(&self) -> PlayerStats {
        self.players.iter().fold(PlayerStats::default(), |mut acc, s| {
            acc.shots_fired += s.shots_fired;
            acc.hits += s.hits;
            acc.damage_dealt += s.damage_dealt;
            acc.damage_received += s.damage_received;
            acc.kills += s.kills;
            acc.losses += s.losses;
            acc
        })
    }

    fn slot(&mut self, player: PlayerId) -> Option<&mut PlayerStats> {
        self.players.get_mut(player.index())
    }
}

impl StatsSink for MatchStats {
    fn record_shot(&mut self, player: PlayerId) {
        if let Some(s) = self.slot(player) {
            s.shots_fired += 1;
        }
    }

    fn record_hit(&mut self, player: PlayerId) {
        if let Some(s) = self.slot(player) {
            s.hits += 1;
        }
    }

    fn record_damage(&mut self, attacker: PlayerId, victim: PlayerId, relative: u32) {
        if let Some(s) = self.slot(attacker) {
            s.damage_dealt += u64::from(relative);
        }
        if let Some(s) = self.slot(victim) {
            s.damage_received += u64::from(relative);
        }
    }

    fn record_kill(&mut self, attacker: PlayerId, victim: PlayerId) {
        if let Some(s) = self.slot(attacker) {
            s.kills += 1;
        }
        if let Some(s) = self.slot(victim) {
            s.losses += 1;
        }
    }
}
