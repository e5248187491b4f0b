//! Single-button interaction gate
//!
//! Tracks which interactable is in range and, on interact, fires its effect
//! if the key requirement is met. One attempt per press, no queuing.

use std::collections::BTreeMap;

use crate::EntityId;

/// Something the player can activate
pub trait Interactable {
    fn requires_key(&self) -> bool;
    fn activate(&mut self);
}

/// Interactables of the active scene by entity
pub type Interactables = BTreeMap<EntityId, Box<dyn Interactable>>;

/// A door, optionally locked behind the key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Door {
    pub requires_key: bool,
    pub open: bool,
    /// Times the door was activated
    pub activations: u32,
}

impl Door {
    pub fn new(requires_key: bool) -> Self {
        Self {
            requires_key,
            ..Default::default()
        }
    }
}

impl Interactable for Door {
    fn requires_key(&self) -> bool {
        self.requires_key
    }

    fn activate(&mut self) {
        self.open = true;
        self.activations += 1;
    }
}

/// Result of an interact press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractOutcome {
    /// Nothing in range
    NoTarget,
    /// Tracked target no longer exists
    MissingTarget(EntityId),
    /// Target needs the key and the player has none
    Locked(EntityId),
    Activated(EntityId),
}

/// In-range target tracker. Last writer wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionGate {
    target: Option<EntityId>,
}

impl InteractionGate {
    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub fn set_target(&mut self, target: EntityId) {
        self.target = Some(target);
    }

    /// Any exit clears the target, even if it was set by another zone
    pub fn clear_target(&mut self) {
        self.target = None;
    }

    pub fn interact(&self, has_key: bool, targets: &mut Interactables) -> InteractOutcome {
        let Some(id) = self.target else {
            return InteractOutcome::NoTarget;
        };
        let Some(target) = targets.get_mut(&id) else {
            log::error!("Interaction target {} has no interactable", id);
            return InteractOutcome::MissingTarget(id);
        };
        if target.requires_key() && !has_key {
            log::info!("Interactable {} is locked", id);
            return InteractOutcome::Locked(id);
        }
        target.activate();
        InteractOutcome::Activated(id)
    }
}
