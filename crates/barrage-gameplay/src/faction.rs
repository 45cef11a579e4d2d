//! Player alliances.

use barrage_common::{PlayerId, MAX_PLAYERS};
use serde::{Deserialize, Serialize};

/// Symmetric alliance matrix. Every player is allied with itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllianceTable {
    allied: [[bool; MAX_PLAYERS]; MAX_PLAYERS],
}

impl Default for AllianceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl AllianceTable {
    /// Every player for themselves.
    #[must_use]
    pub fn new() -> Self {
        let mut allied = [[false; MAX_PLAYERS]; MAX_PLAYERS];
        for (i, row) in allied.iter_mut().enumerate() {
            row[i] = true;
        }
        Self { allied }
    }

    /// Builds alliances from a team number per player slot.
    #[must_use]
    pub fn from_teams(teams: &[u8]) -> Self {
        let mut table = Self::new();
        for (a, team_a) in teams.iter().enumerate().take(MAX_PLAYERS) {
            for (b, team_b) in teams.iter().enumerate().take(MAX_PLAYERS) {
                if team_a == team_b {
                    table.allied[a][b] = true;
                }
            }
        }
        table
    }

    /// Forms or breaks an alliance in both directions.
    pub fn set_alliance(&mut self, a: PlayerId, b: PlayerId, allied: bool) {
        if !a.is_valid() || !b.is_valid() || a == b {
            return;
        }
        self.allied[a.index()][b.index()] = allied;
        self.allied[b.index()][a.index()] = allied;
    }

    /// Whether `a` and `b` are on the same side.
    ///
    /// Out-of-range players are only allied with themselves.
    #[must_use]
    pub fn allied(&self, a: PlayerId, b: PlayerId) -> bool {
        if a == b {
            return true;
        }
        if !a.is_valid() || !b.is_valid() {
            return false;
        }
        self.allied[a.index()][b.index()]
    }
}
