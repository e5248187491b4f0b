//! Deterministic game core
//!
//! All gameplay logic lives here:
//! - Fixed timestep only, driven by `tick`
//! - Single root `World`, no globals
//! - No rendering, physics integration or scene file access

pub mod game;
pub mod interaction;
pub mod level;
pub mod player;
pub mod pool;
pub mod state;
pub mod tick;
pub mod zones;

pub use game::{GameState, GameStateMachine, SceneChange, SceneKind, TransitionOutcome};
pub use interaction::{Door, InteractOutcome, Interactable, Interactables, InteractionGate};
pub use level::LevelManager;
pub use player::{AnimFlag, PlayerController, PlayerState, VisualFlags};
pub use pool::{Projectile, ProjectilePool, SpawnOutcome, SpawnTask};
pub use state::{HostServices, World};
pub use tick::tick;
pub use zones::{Aabb, ContactPhase, OneShotLatch, Tag, TriggerZone, ZoneContact, ZoneKind, ZoneSet};
