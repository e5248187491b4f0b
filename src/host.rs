//! Host collaborator contracts
//!
//! The game core never renders, simulates physics or reads scene files. It
//! talks to the host through these narrow traits. Each trait ships with a
//! plain in-memory implementation used by the demo binary and the tests.

use std::collections::BTreeSet;

use glam::Vec2;

use crate::error::CoreError;

/// Loads scenes by name from the build manifest
pub trait SceneLoader {
    /// Load a scene, replacing the active one. Empty or unknown names fail.
    fn load_scene(&mut self, name: &str) -> Result<(), CoreError>;

    /// Name of the currently active scene, if any
    fn active_scene(&self) -> Option<&str>;
}

/// Global simulation time scale
pub trait TimeControl {
    fn set_time_scale(&mut self, scale: f32);
    fn time_scale(&self) -> f32;
}

/// Process lifecycle control
pub trait ProcessControl {
    /// Request process termination
    fn quit(&mut self);
    /// True when running under an interactive editor host (quit is ignored)
    fn is_editor(&self) -> bool;
}

/// Physics query provider for a single body
///
/// The host physics engine owns integration; the core reads the results and
/// only ever overrides velocity.
pub trait PhysicsBody {
    fn position(&self) -> Vec2;
    fn set_position(&mut self, pos: Vec2);
    fn velocity(&self) -> Vec2;
    fn set_velocity(&mut self, vel: Vec2);
    /// Ground overlap test result from the last physics step
    fn is_grounded(&self) -> bool;

    /// Host-side integration hook, called by the host before each tick.
    /// Bodies integrated elsewhere leave this empty.
    fn step(&mut self, _dt: f32) {}
}

/// In-memory build manifest
#[derive(Debug, Clone, Default)]
pub struct SceneCatalog {
    known: BTreeSet<String>,
    active: Option<String>,
    loads: u32,
}

impl SceneCatalog {
    pub fn new<I, S>(scenes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: scenes.into_iter().map(Into::into).collect(),
            active: None,
            loads: 0,
        }
    }

    /// Total successful loads (reloads included)
    pub fn load_count(&self) -> u32 {
        self.loads
    }

    pub fn contains(&self, name: &str) -> bool {
        self.known.contains(name)
    }
}

impl SceneLoader for SceneCatalog {
    fn load_scene(&mut self, name: &str) -> Result<(), CoreError> {
        if name.is_empty() {
            return Err(CoreError::EmptyConfiguration("scene name"));
        }
        if !self.known.contains(name) {
            return Err(CoreError::UnknownScene(name.to_string()));
        }
        log::debug!("Scene loaded: {}", name);
        self.active = Some(name.to_string());
        self.loads += 1;
        Ok(())
    }

    fn active_scene(&self) -> Option<&str> {
        self.active.as_deref()
    }
}

/// Time scale value (1.0 = running, 0.0 = frozen)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale(pub f32);

impl Default for TimeScale {
    fn default() -> Self {
        Self(1.0)
    }
}

impl TimeControl for TimeScale {
    fn set_time_scale(&mut self, scale: f32) {
        self.0 = scale.max(0.0);
    }

    fn time_scale(&self) -> f32 {
        self.0
    }
}

/// Process handle that records quit requests
#[derive(Debug, Clone, Default)]
pub struct ProcessHandle {
    editor: bool,
    quit_requested: bool,
}

impl ProcessHandle {
    pub fn new(editor: bool) -> Self {
        Self {
            editor,
            quit_requested: false,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }
}

impl ProcessControl for ProcessHandle {
    fn quit(&mut self) {
        if self.editor {
            log::info!("Quit ignored under editor host");
            return;
        }
        self.quit_requested = true;
    }

    fn is_editor(&self) -> bool {
        self.editor
    }
}

/// Plain body written by the host physics step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub grounded: bool,
}

impl Body {
    pub fn grounded_at(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            grounded: true,
        }
    }
}

impl PhysicsBody for Body {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    fn velocity(&self) -> Vec2 {
        self.vel
    }

    fn set_velocity(&mut self, vel: Vec2) {
        self.vel = vel;
    }

    fn is_grounded(&self) -> bool {
        self.grounded
    }
}
