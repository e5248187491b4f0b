//! Level sub-machine
//!
//! Per-scene setup and the game-over overlay fade. Restart, menu and end
//! requests only forward to the game state machine or the event bus.

use glam::Vec2;

use super::game::{GameState, GameStateMachine, TransitionOutcome};
use super::player::{PlayerController, PlayerState};
use crate::EntityId;
use crate::error::CoreError;
use crate::events::{EventBus, GameEvent};

/// Level manager for the active scene
#[derive(Debug, Clone)]
pub struct LevelManager {
    scene: Option<String>,
    spawn_point: Vec2,
    camera_target: Option<EntityId>,
    game_over_visible: bool,
    fade_alpha: f32,
    fade_secs: f32,
}

impl LevelManager {
    /// Non-finite or negative fade durations make the overlay instant
    pub fn new(fade_secs: f32) -> Self {
        let fade_secs = if fade_secs.is_finite() {
            fade_secs.max(0.0)
        } else {
            log::warn!("Invalid game-over fade duration {}, using an instant fade", fade_secs);
            0.0
        };
        Self {
            scene: None,
            spawn_point: Vec2::ZERO,
            camera_target: None,
            game_over_visible: false,
            fade_alpha: 0.0,
            fade_secs,
        }
    }

    pub fn scene(&self) -> Option<&str> {
        self.scene.as_deref()
    }

    pub fn spawn_point(&self) -> Vec2 {
        self.spawn_point
    }

    /// Entity the camera follows
    pub fn camera_target(&self) -> Option<EntityId> {
        self.camera_target
    }

    /// Scene entry: place the player, hand over control, notify listeners
    pub fn enter_level(
        &mut self,
        scene: &str,
        spawn_point: Vec2,
        player: &mut PlayerController,
        events: &mut EventBus,
    ) {
        self.scene = Some(scene.to_string());
        self.spawn_point = spawn_point;
        self.game_over_visible = false;
        self.fade_alpha = 0.0;

        player.respawn(spawn_point);
        player.change_state(PlayerState::Idle);
        player.enable_control();
        self.camera_target = Some(player.id());

        log::info!("Entered level '{}' at {:?}", scene, spawn_point);
        events.publish(GameEvent::LevelEntered {
            scene: scene.to_string(),
        });
    }

    /// Scene left for a non-level scene
    pub fn leave(&mut self) {
        self.scene = None;
        self.camera_target = None;
        self.game_over_visible = false;
        self.fade_alpha = 0.0;
    }

    /// Start fading in the game-over overlay
    pub fn show_game_over_screen(&mut self) {
        self.game_over_visible = true;
    }

    pub fn game_over_visible(&self) -> bool {
        self.game_over_visible
    }

    /// Advance the overlay fade by wall-clock `dt`
    pub fn update_fade(&mut self, dt: f32) {
        if !self.game_over_visible {
            return;
        }
        if self.fade_secs <= 0.0 {
            self.fade_alpha = 1.0;
            return;
        }
        self.fade_alpha = (self.fade_alpha + dt / self.fade_secs).min(1.0);
    }

    /// Overlay visibility in [0, 1]
    pub fn fade_alpha(&self) -> f32 {
        self.fade_alpha
    }

    pub fn is_fade_complete(&self) -> bool {
        self.game_over_visible && self.fade_alpha >= 1.0
    }

    pub fn restart_level(
        &self,
        game: &mut GameStateMachine,
        events: &mut EventBus,
    ) -> Result<TransitionOutcome, CoreError> {
        game.transition(GameState::RestartLevel, events)
    }

    pub fn return_to_menu(
        &self,
        game: &mut GameStateMachine,
        events: &mut EventBus,
    ) -> Result<TransitionOutcome, CoreError> {
        game.transition(GameState::LoadMainMenu, events)
    }

    pub fn end_level(&self, events: &mut EventBus) {
        match &self.scene {
            Some(scene) => {
                events.publish(GameEvent::LevelEnded {
                    scene: scene.clone(),
                });
            }
            None => log::error!("end_level called with no active level"),
        }
    }
}
