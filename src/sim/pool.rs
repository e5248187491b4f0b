//! Enemy projectile pool and timed spawn task
//!
//! The pool is a bounded FIFO of projectile entries. Below capacity a spawn
//! creates a new entry; at capacity the oldest entry is reset and moved to
//! the back. Entries are never destroyed by the pool, only hidden.
//!
//! `SpawnTask` replaces a wait-then-check coroutine: every elapsed interval
//! it re-checks the gating state and finishes for good once the gate fails.

use std::collections::VecDeque;

use glam::Vec2;

use super::game::GameState;
use crate::consts::MIN_SPAWN_INTERVAL;
use crate::{EntityId, IdAllocator};

/// A pooled enemy projectile
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: EntityId,
    pub pos: Vec2,
    /// Unit direction of travel
    pub dir: Vec2,
    /// Visible and moving
    pub active: bool,
    /// Distance covered since the last reset
    pub travelled: f32,
}

impl Projectile {
    fn new(id: EntityId, spawn: Vec2, target: Vec2) -> Self {
        let mut projectile = Self {
            id,
            pos: spawn,
            dir: Vec2::ZERO,
            active: false,
            travelled: 0.0,
        };
        projectile.reset(spawn, target);
        projectile
    }

    /// Back to the spawn point, visible, aimed at `target`
    pub fn reset(&mut self, spawn: Vec2, target: Vec2) {
        self.pos = spawn;
        self.dir = (target - spawn).normalize_or_zero();
        self.active = true;
        self.travelled = 0.0;
    }
}

/// What a spawn request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    Created(EntityId),
    Reused(EntityId),
}

impl SpawnOutcome {
    pub fn id(&self) -> EntityId {
        match self {
            SpawnOutcome::Created(id) | SpawnOutcome::Reused(id) => *id,
        }
    }
}

/// Bounded round-robin projectile pool
#[derive(Debug, Clone)]
pub struct ProjectilePool {
    entries: VecDeque<Projectile>,
    capacity: usize,
    spawn_point: Vec2,
    created: usize,
    reused: usize,
}

impl ProjectilePool {
    pub fn new(capacity: usize, spawn_point: Vec2) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            spawn_point,
            created: 0,
            reused: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn spawn_point(&self) -> Vec2 {
        self.spawn_point
    }

    /// Live entries (active or hidden)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|p| p.active).count()
    }

    /// Entries created over the pool's lifetime
    pub fn created_count(&self) -> usize {
        self.created
    }

    /// Reuse cycles performed over the pool's lifetime
    pub fn reuse_count(&self) -> usize {
        self.reused
    }

    /// Live check against capacity, so externally removed entries are refilled
    pub fn can_instantiate(&self) -> bool {
        self.entries.len() < self.capacity
    }

    /// Entries from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.entries.iter()
    }

    pub fn get(&self, id: EntityId) -> Option<&Projectile> {
        self.entries.iter().find(|p| p.id == id)
    }

    /// Create or recycle one projectile aimed at `target`.
    /// Returns None only for a zero-capacity pool.
    pub fn spawn(&mut self, target: Vec2, ids: &mut IdAllocator) -> Option<SpawnOutcome> {
        if self.can_instantiate() {
            let projectile = Projectile::new(ids.next_id(), self.spawn_point, target);
            let id = projectile.id;
            self.entries.push_back(projectile);
            self.created += 1;
            log::debug!("Projectile {} created ({}/{})", id, self.entries.len(), self.capacity);
            return Some(SpawnOutcome::Created(id));
        }

        let mut projectile = self.entries.pop_front()?;
        projectile.reset(self.spawn_point, target);
        let id = projectile.id;
        self.entries.push_back(projectile);
        self.reused += 1;
        log::debug!("Projectile {} reused", id);
        Some(SpawnOutcome::Reused(id))
    }

    /// Remove an entry destroyed outside the pool
    pub fn despawn(&mut self, id: EntityId) -> bool {
        match self.entries.iter().position(|p| p.id == id) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Move active projectiles; hide those past `range`
    pub fn advance(&mut self, dt: f32, speed: f32, range: f32) {
        for projectile in self.entries.iter_mut().filter(|p| p.active) {
            let step = speed * dt;
            projectile.pos += projectile.dir * step;
            projectile.travelled += step;
            if projectile.travelled >= range {
                projectile.active = false;
            }
        }
    }
}

/// Timed spawn loop gated on a game state
#[derive(Debug, Clone)]
pub struct SpawnTask {
    interval: f32,
    elapsed: f32,
    gate: GameState,
    finished: bool,
}

impl SpawnTask {
    pub fn new(interval_secs: f32, gate: GameState) -> Self {
        Self {
            interval: interval_secs.max(MIN_SPAWN_INTERVAL),
            elapsed: 0.0,
            gate,
            finished: false,
        }
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Once finished the task never spawns again
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance the timer and return how many spawns are due.
    ///
    /// The gate is evaluated at the end of each wait; the first failed check
    /// finishes the task.
    pub fn poll(&mut self, dt: f32, current: GameState) -> u32 {
        if self.finished {
            return 0;
        }
        self.elapsed += dt;

        let mut due = 0;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            if current != self.gate {
                log::debug!("Spawn task finished: state is {}", current);
                self.finished = true;
                break;
            }
            due += 1;
        }
        due
    }
}
