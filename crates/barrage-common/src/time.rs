//! Game time.
//!
//! Game time advances in whole logical ticks and is measured in
//! milliseconds. It never reads the wall clock.

use serde::{Deserialize, Serialize};

/// Game-time units per second.
pub const GAME_TICKS_PER_SEC: u32 = 1000;

/// Length of one logical update in game-time units.
pub const GAME_TICKS_PER_UPDATE: u32 = 100;

/// Logical updates per second.
pub const GAME_UPDATES_PER_SEC: u32 = GAME_TICKS_PER_SEC / GAME_TICKS_PER_UPDATE;

/// A point in game time, in milliseconds since the start of the match.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct GameTime(u32);

impl GameTime {
    /// Start of the match.
    pub const ZERO: Self = Self(0);

    /// Creates a game time from milliseconds.
    #[must_use]
    pub const fn from_millis(ms: u32) -> Self {
        Self(ms)
    }

    /// Milliseconds since match start.
    #[must_use]
    pub const fn millis(self) -> u32 {
        self.0
    }

    /// Time after `ms` more milliseconds.
    #[must_use]
    pub const fn plus(self, ms: u32) -> Self {
        Self(self.0.saturating_add(ms))
    }

    /// Time `ms` milliseconds earlier, stopping at zero.
    #[must_use]
    pub const fn minus(self, ms: u32) -> Self {
        Self(self.0.saturating_sub(ms))
    }

    /// Milliseconds elapsed since `earlier`, or zero if `earlier` is later.
    #[must_use]
    pub const fn since(self, earlier: Self) -> u32 {
        self.0.saturating_sub(earlier.0)
    }

    /// The following logical update.
    #[must_use]
    pub const fn next_update(self) -> Self {
        self.plus(GAME_TICKS_PER_UPDATE)
    }
}
