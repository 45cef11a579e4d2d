//! The simulation context projectiles act upon.

use barrage_common::{GameTime, SyncedRng};
use barrage_kernel::{FlatTerrain, Terrain};

use crate::config::ProjectileConfig;
use crate::damage_calc::DamageTables;
use crate::entity::ObjectArena;
use crate::events::CombatEventBus;
use crate::experience::ExperienceRules;
use crate::faction::AllianceTable;
use crate::match_stats::MatchStats;

/// Everything outside the projectile set that a projectile update reads or
/// mutates: objects, terrain, alliances, statistics, randomness and time.
pub struct Battlefield {
    /// World objects
    pub objects: ObjectArena,
    /// Ground heights
    pub terrain: Box<dyn Terrain>,
    /// Who is on whose side
    pub alliances: AllianceTable,
    /// Damage modifier tables
    pub tables: DamageTables,
    /// Experience settings
    pub rules: ExperienceRules,
    /// Statistics sink
    pub stats: MatchStats,
    /// Network-synchronized random source
    pub rng: SyncedRng,
    /// Combat notifications
    pub events: CombatEventBus,
    now: GameTime,
}

impl Battlefield {
    /// Creates a battlefield over `terrain` seeded with the match seed.
    #[must_use]
    pub fn new(terrain: impl Terrain + 'static, seed: u64) -> Self {
        Self {
            objects: ObjectArena::new(),
            terrain: Box::new(terrain),
            alliances: AllianceTable::new(),
            tables: DamageTables::default(),
            rules: ExperienceRules::default(),
            stats: MatchStats::new(),
            rng: SyncedRng::new(seed),
            events: CombatEventBus::default(),
            now: GameTime::ZERO,
        }
    }

    /// Flat ground at height zero.
    #[must_use]
    pub fn flat(seed: u64) -> Self {
        Self::new(FlatTerrain::new(0), seed)
    }

    /// Sets alliances.
    #[must_use]
    pub fn with_alliances(mut self, alliances: AllianceTable) -> Self {
        self.alliances = alliances;
        self
    }

    /// Sets the damage tables.
    #[must_use]
    pub fn with_tables(mut self, tables: DamageTables) -> Self {
        self.tables = tables;
        self
    }

    /// Sets the experience rules.
    #[must_use]
    pub fn with_rules(mut self, rules: ExperienceRules) -> Self {
        self.rules = rules;
        self
    }

    /// Sizes the event bus from the projectile settings.
    #[must_use]
    pub fn with_config(mut self, config: &ProjectileConfig) -> Self {
        self.events = CombatEventBus::new(config.event_capacity);
        self
    }

    /// Current game time.
    #[must_use]
    pub const fn now(&self) -> GameTime {
        self.now
    }

    /// Sets the game time.
    pub fn set_now(&mut self, now: GameTime) {
        self.now = now;
    }

    /// Moves the clock to the next logical update.
    pub fn advance_clock(&mut self) -> GameTime {
        self.now = self.now.next_update();
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock() {
        let mut bf = Battlefield::flat(1);
        assert_eq!(bf.now(), GameTime::ZERO);
        assert_eq!(bf.advance_clock().millis(), 100);
        bf.set_now(GameTime::from_millis(5000));
        assert_eq!(bf.advance_clock().millis(), 5100);
        assert_eq!(bf.terrain.height_at(10, 10), 0);
    }
}
