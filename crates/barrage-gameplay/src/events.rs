//! Combat event bus for scripting and other listeners.
//!
//! Publishing never blocks and never fails: when nobody drains the bus and
//! it fills up, further events are dropped.

use barrage_common::{ObjectHandle, PlayerId, ProjectileId, Vec3i};
use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

/// Something that happened during a projectile update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// A projectile was created
    ProjectileLaunched {
        /// Projectile ID
        id: ProjectileId,
        /// Firing player
        player: PlayerId,
        /// Weapon identifier
        weapon: String,
    },
    /// A projectile hit something or reached its aim point
    ProjectileImpact {
        /// Projectile ID
        id: ProjectileId,
        /// Where it detonated
        position: Vec3i,
        /// Object struck, if any
        target: Option<ObjectHandle>,
    },
    /// A projectile was shot down by another
    ProjectileIntercepted {
        /// The destroyed projectile
        id: ProjectileId,
        /// The projectile that hit it
        by: ProjectileId,
    },
    /// An object took damage
    ObjectDamaged {
        /// Victim
        target: ObjectHandle,
        /// Object the shot came from, if known
        attacker: Option<ObjectHandle>,
        /// Q16 relative damage
        relative: i32,
        /// Burn damage rather than a hit
        periodic: bool,
    },
    /// An object was destroyed
    ObjectDestroyed {
        /// Victim
        target: ObjectHandle,
        /// Object the shot came from, if known
        attacker: Option<ObjectHandle>,
    },
}

/// Bounded event bus for combat notifications.
#[derive(Debug)]
pub struct CombatEventBus {
    /// Sender for broadcasting events
    sender: Sender<CombatEvent>,
    /// Receiver for collecting events
    receiver: Receiver<CombatEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for CombatEventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl CombatEventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            capacity: capacity.max(1),
        }
    }

    /// Publishes an event; drops it if the bus is full.
    pub fn publish(&self, event: CombatEvent) {
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<CombatEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<CombatEvent> {
        self.sender.clone()
    }
}
