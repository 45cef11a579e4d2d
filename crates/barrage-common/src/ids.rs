//! ID types for projectiles, players and world objects.
//!
//! IDs are handed out by their owning container in creation order. There is
//! no global counter: two peers replaying the same commands must allocate
//! the same IDs.

use serde::{Deserialize, Serialize};

use crate::error::{BarrageError, BarrageResult};

/// Maximum number of players in a match.
pub const MAX_PLAYERS: usize = 10;

/// Unique identifier for a projectile, assigned in launch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a projectile ID from a raw value.
    #[must_use]
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The ID that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Index of a player slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(u8);

impl PlayerId {
    /// Creates a player ID, rejecting out-of-range indices.
    pub fn new(index: u8) -> BarrageResult<Self> {
        if usize::from(index) < MAX_PLAYERS {
            Ok(Self(index))
        } else {
            Err(BarrageError::PlayerOutOfRange {
                player: index,
                max: MAX_PLAYERS,
            })
        }
    }

    /// Creates a player ID without range checking.
    ///
    /// Use [`PlayerId::is_valid`] before indexing per-player tables.
    #[must_use]
    pub const fn from_raw(index: u8) -> Self {
        Self(index)
    }

    /// Returns the slot index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Checks the index against [`MAX_PLAYERS`].
    #[must_use]
    pub const fn is_valid(self) -> bool {
        (self.0 as usize) < MAX_PLAYERS
    }
}

/// Generation-checked reference to a world object.
///
/// A handle stays comparable after its object is removed, but resolving it
/// fails once the slot has been reused, so a stale reference can never reach
/// a different object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectHandle {
    index: u32,
    generation: u32,
}

impl ObjectHandle {
    /// Creates a handle from its parts.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the owning arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Generation of the slot when this handle was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}
