//! Pocket Platformer - engine-independent core of a small 2D platformer
//!
//! Core modules:
//! - `sim`: Game/level/player state machines, projectile pool, trigger zones,
//!   interaction gate and the fixed-step `tick`
//! - `host`: Narrow contracts for scene loading, time, process and physics
//! - `events`: Typed publish/subscribe registry
//! - `input`: Per-tick input snapshots
//! - `settings`: JSON settings and level layouts

pub mod error;
pub mod events;
pub mod host;
pub mod input;
pub mod settings;
pub mod sim;

pub use error::CoreError;
pub use events::{EventBus, EventKind, GameEvent, SubscriptionId};
pub use input::{Action, InputSource, ScriptedInput, TickInput};
pub use settings::Settings;

use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Shortest allowed spawn interval
    pub const MIN_SPAWN_INTERVAL: f32 = SIM_DT;
    /// Speeds below this count as standing still
    pub const VELOCITY_EPSILON: f32 = 0.01;
}

/// Opaque handle to a game entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic entity ID source
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    /// Allocate a new entity ID
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}
