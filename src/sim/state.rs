//! World: the single root object
//!
//! Owns every controller and host service for the run and hands each
//! collaborator what it needs as parameters. Nothing is global.

use glam::Vec2;

use super::game::{GameState, GameStateMachine, SceneKind, TransitionOutcome};
use super::interaction::{Door, InteractOutcome, InteractionGate, Interactables};
use super::level::LevelManager;
use super::player::{PlayerController, PlayerState};
use super::pool::{ProjectilePool, SpawnTask};
use super::zones::{ContactPhase, Tag, ZoneContact, ZoneKind, ZoneSet};
use crate::error::CoreError;
use crate::events::{EventBus, GameEvent};
use crate::host::{
    Body, PhysicsBody, ProcessControl, ProcessHandle, SceneCatalog, SceneLoader, TimeControl,
    TimeScale,
};
use crate::settings::Settings;
use crate::{EntityId, IdAllocator};

/// Host collaborators injected into the world
pub struct HostServices {
    pub scenes: Box<dyn SceneLoader>,
    pub time: Box<dyn TimeControl>,
    pub process: Box<dyn ProcessControl>,
    pub player_body: Box<dyn PhysicsBody>,
}

impl HostServices {
    /// In-memory services: manifest built from the settings' scene list
    pub fn in_memory(settings: &Settings) -> Self {
        Self {
            scenes: Box::new(SceneCatalog::new(settings.scene_names())),
            time: Box::new(TimeScale::default()),
            process: Box::new(ProcessHandle::new(settings.editor_host)),
            player_body: Box::new(Body::default()),
        }
    }
}

/// Complete game core state
pub struct World {
    pub settings: Settings,
    pub game: GameStateMachine,
    pub level: LevelManager,
    pub player: PlayerController,
    pub pool: ProjectilePool,
    /// Spawn loop of the current level scene
    pub spawn_task: Option<SpawnTask>,
    pub zones: ZoneSet,
    pub interactables: Interactables,
    pub gate: InteractionGate,
    pub events: EventBus,
    /// Simulation tick counter
    pub time_ticks: u64,
    ids: IdAllocator,
}

impl World {
    pub fn new(settings: Settings, services: HostServices) -> Self {
        let mut ids = IdAllocator::default();
        let game = GameStateMachine::new(
            settings.main_menu_scene.clone(),
            settings.credits_scene.clone(),
        )
        .with_scene_loader(services.scenes)
        .with_time_control(services.time)
        .with_process_control(services.process);
        let player = PlayerController::new(ids.next_id(), services.player_body);

        Self {
            level: LevelManager::new(settings.game_over_fade_secs),
            pool: ProjectilePool::new(0, Vec2::ZERO),
            spawn_task: None,
            zones: ZoneSet::new(),
            interactables: Interactables::new(),
            gate: InteractionGate::default(),
            events: EventBus::new(),
            time_ticks: 0,
            game,
            player,
            settings,
            ids,
        }
    }

    /// World wired to the in-memory host services
    pub fn in_memory(settings: Settings) -> Self {
        let services = HostServices::in_memory(&settings);
        Self::new(settings, services)
    }

    //--- Game flow ---------------------------------------------------------

    /// Load the main menu
    pub fn boot(&mut self) -> Result<TransitionOutcome, CoreError> {
        let outcome = self.game.transition(GameState::LoadMainMenu, &mut self.events)?;
        self.apply_scene_changes();
        Ok(outcome)
    }

    /// Load a level by name and start playing
    pub fn start_level(&mut self, name: &str) -> Result<TransitionOutcome, CoreError> {
        self.game.set_pending_level(name);
        let outcome = self.game.transition(GameState::LoadLevel, &mut self.events)?;
        self.apply_scene_changes();
        Ok(outcome)
    }

    pub fn restart_level(&mut self) -> Result<TransitionOutcome, CoreError> {
        let outcome = self.level.restart_level(&mut self.game, &mut self.events)?;
        self.apply_scene_changes();
        Ok(outcome)
    }

    pub fn return_to_menu(&mut self) -> Result<TransitionOutcome, CoreError> {
        let outcome = self.level.return_to_menu(&mut self.game, &mut self.events)?;
        self.apply_scene_changes();
        Ok(outcome)
    }

    pub fn game_over(&mut self) -> Result<TransitionOutcome, CoreError> {
        self.game.transition(GameState::GameOver, &mut self.events)
    }

    pub fn quit(&mut self) -> Result<TransitionOutcome, CoreError> {
        self.game.transition(GameState::QuitGame, &mut self.events)
    }

    /// Leave the finished level for the next one, or the credits after the last
    pub fn complete_level(&mut self) -> Result<TransitionOutcome, CoreError> {
        self.level.end_level(&mut self.events);
        let next = self
            .level
            .scene()
            .and_then(|scene| self.settings.next_level(scene))
            .map(|layout| layout.name.clone());
        match next {
            Some(name) => self.start_level(&name),
            None => {
                let outcome = self.game.transition(GameState::Credits, &mut self.events)?;
                self.apply_scene_changes();
                Ok(outcome)
            }
        }
    }

    //--- Scene setup -------------------------------------------------------

    /// Run per-scene setup for scene loads performed by entry actions
    pub fn apply_scene_changes(&mut self) {
        for change in self.game.take_scene_changes() {
            match change.kind {
                SceneKind::Level => self.enter_scene(&change.name),
                SceneKind::Menu | SceneKind::Credits => self.unload_scene(),
            }
        }
    }

    fn enter_scene(&mut self, name: &str) {
        self.unload_scene();
        let Some(layout) = self.settings.level(name).cloned() else {
            log::error!(
                "Level '{}' loaded without setup: {}",
                name,
                CoreError::EmptyConfiguration("level layout")
            );
            return;
        };

        for bounds in &layout.deadzones {
            self.zones.add(ZoneKind::Deadzone, *bounds);
        }
        if let Some(bounds) = layout.finish_zone {
            self.zones.add(ZoneKind::FinishZone, bounds);
        }
        for bounds in &layout.keys {
            self.zones.add(ZoneKind::KeyPickup, *bounds);
        }
        for door in &layout.doors {
            let id = self.ids.next_id();
            self.interactables.insert(id, Box::new(Door::new(door.requires_key)));
            self.zones.add(ZoneKind::Interaction(id), door.bounds);
        }

        let spawner = &self.settings.spawner;
        self.pool = ProjectilePool::new(spawner.capacity, layout.projectile_spawn);
        self.spawn_task = Some(SpawnTask::new(spawner.interval_secs, GameState::Playing));

        self.level
            .enter_level(name, layout.player_spawn, &mut self.player, &mut self.events);
    }

    fn unload_scene(&mut self) {
        self.zones.clear();
        self.interactables.clear();
        self.gate.clear_target();
        self.pool = ProjectilePool::new(0, Vec2::ZERO);
        self.spawn_task = None;
        self.player.disable_control();
        self.level.leave();
    }

    //--- Per-tick handlers -------------------------------------------------

    /// Handle an overlap change reported by the zone index
    pub fn dispatch_contact(&mut self, contact: ZoneContact) {
        match contact.phase {
            ContactPhase::Enter => {
                let Some(zone) = self.zones.get_mut(contact.zone) else {
                    return;
                };
                if !zone.on_enter(contact.tag) {
                    return;
                }
                match contact.kind {
                    ZoneKind::Deadzone => self.kill_player(),
                    ZoneKind::FinishZone => {
                        let scene = self.level.scene().unwrap_or_default().to_string();
                        log::info!("Level '{}' complete", scene);
                        self.events.publish(GameEvent::LevelComplete { scene });
                    }
                    ZoneKind::KeyPickup => self.player.grant_key(),
                    ZoneKind::Interaction(id) => self.gate.set_target(id),
                }
            }
            ContactPhase::Exit => {
                if contact.tag == Tag::Player && matches!(contact.kind, ZoneKind::Interaction(_)) {
                    self.gate.clear_target();
                }
            }
        }
    }

    /// Overlap changes of the player and every live projectile
    pub fn update_zone_overlaps(&mut self) -> Vec<ZoneContact> {
        let mut contacts = self
            .zones
            .update_overlaps(self.player.id(), Tag::Player, self.player.position());
        let shots: Vec<(EntityId, Vec2)> = self
            .pool
            .iter()
            .filter(|p| p.active)
            .map(|p| (p.id, p.pos))
            .collect();
        for (id, pos) in shots {
            contacts.extend(self.zones.update_overlaps(id, Tag::Projectile, pos));
        }
        contacts
    }

    /// Deadzone effect: dead, no control, game-over overlay
    pub fn kill_player(&mut self) {
        self.player.change_state(PlayerState::Dead);
        self.player.disable_control();
        self.level.show_game_over_screen();
        log::info!("Player died");
        self.events.publish(GameEvent::PlayerDied);
    }

    /// Interact press
    pub fn interact(&mut self) -> InteractOutcome {
        let outcome = self
            .gate
            .interact(self.player.has_key(), &mut self.interactables);
        if let InteractOutcome::Activated(target) = outcome {
            self.events.publish(GameEvent::TargetActivated { target });
        }
        outcome
    }

    /// Advance the spawn loop and spawn whatever is due
    pub fn run_spawner(&mut self, dt: f32) {
        let Some(task) = self.spawn_task.as_mut() else {
            return;
        };
        let due = task.poll(dt, self.game.current());
        let target = self.player.position();
        for _ in 0..due {
            self.pool.spawn(target, &mut self.ids);
        }
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("game", &self.game)
            .field("level", &self.level)
            .field("player", &self.player)
            .field("pool_len", &self.pool.len())
            .field("zones", &self.zones.len())
            .field("time_ticks", &self.time_ticks)
            .finish()
    }
}
