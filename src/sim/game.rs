//! Game state machine
//!
//! One explicitly owned controller holds the current `GameState`. Transitions
//! are guarded: re-entering the current state is a no-op, and entry actions
//! run exactly once per applied transition.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::events::{EventBus, GameEvent};
use crate::host::{ProcessControl, SceneLoader, TimeControl};

/// Top-level game flow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameState {
    /// Initial value before boot; never enterable
    #[default]
    None,
    LoadMainMenu,
    MainMenu,
    LoadLevel,
    Playing,
    RestartLevel,
    GameOver,
    Credits,
    QuitGame,
}

impl GameState {
    /// All states in declaration order (index = raw value)
    pub const ALL: [GameState; 9] = [
        GameState::None,
        GameState::LoadMainMenu,
        GameState::MainMenu,
        GameState::LoadLevel,
        GameState::Playing,
        GameState::RestartLevel,
        GameState::GameOver,
        GameState::Credits,
        GameState::QuitGame,
    ];

    /// Convert a raw state value. Values outside the enumeration are invalid.
    pub fn from_index(index: u8) -> Result<Self, CoreError> {
        Self::ALL
            .get(index as usize)
            .copied()
            .ok_or_else(|| CoreError::InvalidState(index.to_string()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameState::None => "None",
            GameState::LoadMainMenu => "LoadMainMenu",
            GameState::MainMenu => "MainMenu",
            GameState::LoadLevel => "LoadLevel",
            GameState::Playing => "Playing",
            GameState::RestartLevel => "RestartLevel",
            GameState::GameOver => "GameOver",
            GameState::Credits => "Credits",
            GameState::QuitGame => "QuitGame",
        }
    }
}

impl FromStr for GameState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|state| state.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::InvalidState(s.to_string()))
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a loaded scene is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    Menu,
    Level,
    Credits,
}

/// A scene load performed by an entry action, awaiting per-scene setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneChange {
    pub name: String,
    pub kind: SceneKind,
}

/// Result of a transition request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// State changed and the entry action ran
    Applied,
    /// Requested state equals the current one
    Unchanged,
    /// A precondition failed (logged); nothing changed
    Skipped,
}

/// Game flow controller
pub struct GameStateMachine {
    current: GameState,
    pending_level: Option<String>,
    main_menu_scene: String,
    credits_scene: Option<String>,
    scenes: Option<Box<dyn SceneLoader>>,
    time: Option<Box<dyn TimeControl>>,
    process: Option<Box<dyn ProcessControl>>,
    scene_changes: Vec<SceneChange>,
    /// Use of the scene currently on screen
    scene_kind: Option<SceneKind>,
}

impl GameStateMachine {
    pub fn new(main_menu_scene: impl Into<String>, credits_scene: Option<String>) -> Self {
        Self {
            current: GameState::None,
            pending_level: None,
            main_menu_scene: main_menu_scene.into(),
            credits_scene,
            scenes: None,
            time: None,
            process: None,
            scene_changes: Vec::new(),
            scene_kind: None,
        }
    }

    pub fn with_scene_loader(mut self, scenes: Box<dyn SceneLoader>) -> Self {
        self.scenes = Some(scenes);
        self
    }

    pub fn with_time_control(mut self, time: Box<dyn TimeControl>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_process_control(mut self, process: Box<dyn ProcessControl>) -> Self {
        self.process = Some(process);
        self
    }

    pub fn current(&self) -> GameState {
        self.current
    }

    pub fn is_playing(&self) -> bool {
        self.current == GameState::Playing
    }

    /// Name of the level the next `LoadLevel` will load
    pub fn set_pending_level(&mut self, name: impl Into<String>) {
        self.pending_level = Some(name.into());
    }

    pub fn pending_level(&self) -> Option<&str> {
        self.pending_level.as_deref()
    }

    pub fn active_scene(&self) -> Option<&str> {
        self.scenes.as_ref().and_then(|s| s.active_scene())
    }

    /// What the active scene is used for, if one was loaded
    pub fn scene_kind(&self) -> Option<SceneKind> {
        self.scene_kind
    }

    /// Current time scale (1.0 when no time control is attached)
    pub fn time_scale(&self) -> f32 {
        self.time.as_ref().map_or(1.0, |t| t.time_scale())
    }

    /// Scene loads since the last call, oldest first
    pub fn take_scene_changes(&mut self) -> Vec<SceneChange> {
        std::mem::take(&mut self.scene_changes)
    }

    /// Transition using a raw state value
    pub fn transition_index(
        &mut self,
        index: u8,
        events: &mut EventBus,
    ) -> Result<TransitionOutcome, CoreError> {
        let next = GameState::from_index(index)?;
        self.transition(next, events)
    }

    /// Move to `next` and run its entry action.
    ///
    /// Scene load failures leave the state unchanged and are returned as
    /// errors. `None` is not enterable and yields `InvalidState`.
    pub fn transition(
        &mut self,
        next: GameState,
        events: &mut EventBus,
    ) -> Result<TransitionOutcome, CoreError> {
        if next == self.current {
            return Ok(TransitionOutcome::Unchanged);
        }

        match next {
            GameState::None => {
                return Err(CoreError::InvalidState(format!(
                    "{} is not an enterable state",
                    next
                )));
            }
            GameState::LoadMainMenu => {
                let scene = self.main_menu_scene.clone();
                if scene.is_empty() {
                    log::error!("Cannot load main menu: {}", CoreError::EmptyConfiguration("main menu scene"));
                    return Ok(TransitionOutcome::Skipped);
                }
                if !self.load_scene(&scene, SceneKind::Menu)? {
                    return Ok(TransitionOutcome::Skipped);
                }
                self.resume_time();
                self.commit(next, events);
                self.transition(GameState::MainMenu, events)?;
            }
            GameState::LoadLevel => {
                let Some(level) = self.pending_level.clone().filter(|n| !n.is_empty()) else {
                    log::error!("Cannot load level: {}", CoreError::EmptyConfiguration("pending level name"));
                    return Ok(TransitionOutcome::Skipped);
                };
                if !self.load_scene(&level, SceneKind::Level)? {
                    return Ok(TransitionOutcome::Skipped);
                }
                self.resume_time();
                self.commit(next, events);
                self.transition(GameState::Playing, events)?;
            }
            GameState::RestartLevel => {
                if self.scene_kind != Some(SceneKind::Level) {
                    log::error!("Cannot restart level: no level is active ({:?})", self.scene_kind);
                    return Ok(TransitionOutcome::Skipped);
                }
                let Some(active) = self.active_scene().map(str::to_string) else {
                    log::error!("Cannot restart level: no active scene");
                    return Ok(TransitionOutcome::Skipped);
                };
                if !self.load_scene(&active, SceneKind::Level)? {
                    return Ok(TransitionOutcome::Skipped);
                }
                self.resume_time();
                self.commit(next, events);
                self.transition(GameState::Playing, events)?;
            }
            GameState::GameOver => {
                self.commit(next, events);
                match self.time.as_mut() {
                    Some(time) => time.set_time_scale(0.0),
                    None => log::error!("Cannot freeze time: {}", CoreError::MissingCollaborator("time control")),
                }
            }
            GameState::Credits => {
                match self.credits_scene.clone().filter(|n| !n.is_empty()) {
                    Some(scene) => {
                        if !self.load_scene(&scene, SceneKind::Credits)? {
                            return Ok(TransitionOutcome::Skipped);
                        }
                    }
                    None => {
                        // No credits scene: the last level stays on screen but is torn down
                        let name = self.active_scene().unwrap_or_default().to_string();
                        self.record_scene_change(name, SceneKind::Credits);
                    }
                }
                self.commit(next, events);
            }
            GameState::QuitGame => {
                self.commit(next, events);
                match self.process.as_mut() {
                    Some(process) => process.quit(),
                    None => log::error!("Cannot quit: {}", CoreError::MissingCollaborator("process control")),
                }
            }
            GameState::MainMenu | GameState::Playing => {
                self.commit(next, events);
            }
        }

        Ok(TransitionOutcome::Applied)
    }

    fn commit(&mut self, next: GameState, events: &mut EventBus) {
        let from = self.current;
        self.current = next;
        log::info!("Game state: {} -> {}", from, next);
        events.publish(GameEvent::GameStateChanged { from, to: next });
    }

    /// Returns Ok(false) when no loader is attached (logged and skipped)
    fn load_scene(&mut self, name: &str, kind: SceneKind) -> Result<bool, CoreError> {
        let Some(scenes) = self.scenes.as_mut() else {
            log::error!("Cannot load scene '{}': {}", name, CoreError::MissingCollaborator("scene loader"));
            return Ok(false);
        };
        if let Err(e) = scenes.load_scene(name) {
            log::error!("Scene load failed: {}", e);
            return Err(e);
        }
        self.record_scene_change(name.to_string(), kind);
        Ok(true)
    }

    fn record_scene_change(&mut self, name: String, kind: SceneKind) {
        self.scene_kind = Some(kind);
        self.scene_changes.push(SceneChange { name, kind });
    }

    fn resume_time(&mut self) {
        if let Some(time) = self.time.as_mut() {
            time.set_time_scale(1.0);
        }
    }
}

impl std::fmt::Debug for GameStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameStateMachine")
            .field("current", &self.current)
            .field("pending_level", &self.pending_level)
            .field("active_scene", &self.active_scene())
            .field("scene_kind", &self.scene_kind)
            .finish()
    }
}
