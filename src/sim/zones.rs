//! Trigger zones
//!
//! Non-blocking regions that detect tagged entities entering and leaving.
//! Only the player's overlaps have side effects. Latched zones fire at most
//! once per scene instance, however many overlap callbacks arrive.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::EntityId;

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Build from any two opposite corners
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

/// Tag read by zones to decide whether an overlap counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Player,
    Projectile,
}

/// Boolean guard: fires at most once
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OneShotLatch {
    fired: bool,
}

impl OneShotLatch {
    /// True on the first call only
    pub fn try_fire(&mut self) -> bool {
        if self.fired {
            return false;
        }
        self.fired = true;
        true
    }

    pub fn is_fired(&self) -> bool {
        self.fired
    }
}

/// What a zone does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneKind {
    /// Kills the player
    Deadzone,
    /// Completes the level
    FinishZone,
    /// Grants the key
    KeyPickup,
    /// Marks an interactable as in range
    Interaction(EntityId),
}

impl ZoneKind {
    /// Latched zones fire once; interaction ranges fire on every enter
    pub fn is_latched(&self) -> bool {
        !matches!(self, ZoneKind::Interaction(_))
    }
}

/// Enter or exit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Enter,
    Exit,
}

/// Overlap change reported by `ZoneSet::update_overlaps`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneContact {
    pub zone: usize,
    pub kind: ZoneKind,
    pub phase: ContactPhase,
    pub entity: EntityId,
    pub tag: Tag,
}

/// A single trigger zone
#[derive(Debug, Clone)]
pub struct TriggerZone {
    pub kind: ZoneKind,
    pub bounds: Aabb,
    latch: OneShotLatch,
    occupants: BTreeSet<EntityId>,
}

impl TriggerZone {
    pub fn new(kind: ZoneKind, bounds: Aabb) -> Self {
        Self {
            kind,
            bounds,
            latch: OneShotLatch::default(),
            occupants: BTreeSet::new(),
        }
    }

    /// Overlap callback. Returns true when the zone's side effect should run.
    pub fn on_enter(&mut self, tag: Tag) -> bool {
        if tag != Tag::Player {
            return false;
        }
        if self.kind.is_latched() {
            self.latch.try_fire()
        } else {
            true
        }
    }

    pub fn has_fired(&self) -> bool {
        self.latch.is_fired()
    }
}

/// Spatial index of the scene's trigger zones
#[derive(Debug, Clone, Default)]
pub struct ZoneSet {
    zones: Vec<TriggerZone>,
}

impl ZoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: ZoneKind, bounds: Aabb) -> usize {
        self.zones.push(TriggerZone::new(kind, bounds));
        self.zones.len() - 1
    }

    pub fn clear(&mut self) {
        self.zones.clear();
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn get(&self, zone: usize) -> Option<&TriggerZone> {
        self.zones.get(zone)
    }

    pub fn get_mut(&mut self, zone: usize) -> Option<&mut TriggerZone> {
        self.zones.get_mut(zone)
    }

    /// Indices of zones containing `point`
    pub fn query(&self, point: Vec2) -> impl Iterator<Item = usize> + '_ {
        self.zones
            .iter()
            .enumerate()
            .filter(move |(_, z)| z.bounds.contains(point))
            .map(|(i, _)| i)
    }

    /// Track one entity's overlap against every zone and report changes.
    /// Exits are reported before enters.
    pub fn update_overlaps(&mut self, entity: EntityId, tag: Tag, pos: Vec2) -> Vec<ZoneContact> {
        let mut exits = Vec::new();
        let mut enters = Vec::new();
        for (idx, zone) in self.zones.iter_mut().enumerate() {
            let inside = zone.bounds.contains(pos);
            if inside == zone.occupants.contains(&entity) {
                continue;
            }
            if inside {
                zone.occupants.insert(entity);
            } else {
                zone.occupants.remove(&entity);
            }
            let contact = ZoneContact {
                zone: idx,
                kind: zone.kind,
                phase: if inside {
                    ContactPhase::Enter
                } else {
                    ContactPhase::Exit
                },
                entity,
                tag,
            };
            if inside {
                enters.push(contact);
            } else {
                exits.push(contact);
            }
        }
        exits.extend(enters);
        exits
    }
}
