//! Game settings and level layouts
//!
//! Loaded from a JSON file next to the binary. Missing fields fall back to
//! defaults so partial files stay valid.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::sim::Aabb;

/// Projectile spawner tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerSettings {
    /// Maximum simultaneous projectiles before reuse replaces creation
    pub capacity: usize,
    /// Seconds between spawns while playing
    pub interval_secs: f32,
    /// Projectile speed (units/s)
    pub projectile_speed: f32,
    /// Distance travelled before a projectile hides itself
    pub projectile_range: f32,
}

impl Default for SpawnerSettings {
    fn default() -> Self {
        Self {
            capacity: 3,
            interval_secs: 1.5,
            projectile_speed: 6.0,
            projectile_range: 30.0,
        }
    }
}

/// Player movement tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub run_speed: f32,
    pub jump_speed: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            run_speed: 5.0,
            jump_speed: 9.0,
        }
    }
}

/// A door placed in a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorLayout {
    /// Interaction range around the door
    pub bounds: Aabb,
    #[serde(default)]
    pub requires_key: bool,
}

/// Per-scene layout data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    /// Scene name in the build manifest
    pub name: String,
    pub player_spawn: Vec2,
    pub projectile_spawn: Vec2,
    #[serde(default)]
    pub deadzones: Vec<Aabb>,
    #[serde(default)]
    pub finish_zone: Option<Aabb>,
    #[serde(default)]
    pub keys: Vec<Aabb>,
    #[serde(default)]
    pub doors: Vec<DoorLayout>,
}

impl LevelLayout {
    /// Flat test level: pit on the left, door mid-way, finish on the right
    pub fn sample(name: &str) -> Self {
        Self {
            name: name.to_string(),
            player_spawn: Vec2::new(0.0, 0.0),
            projectile_spawn: Vec2::new(20.0, 6.0),
            deadzones: vec![Aabb::new(Vec2::new(-40.0, -20.0), Vec2::new(-10.0, -5.0))],
            finish_zone: Some(Aabb::new(Vec2::new(28.0, -1.0), Vec2::new(32.0, 4.0))),
            keys: vec![Aabb::new(Vec2::new(4.0, -1.0), Vec2::new(6.0, 2.0))],
            doors: vec![DoorLayout {
                bounds: Aabb::new(Vec2::new(12.0, -1.0), Vec2::new(16.0, 3.0)),
                requires_key: true,
            }],
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub main_menu_scene: String,
    /// Credits scene loaded after the last level (optional)
    pub credits_scene: Option<String>,
    /// Levels in play order
    pub levels: Vec<LevelLayout>,
    pub spawner: SpawnerSettings,
    pub player: PlayerTuning,
    /// Seconds for the game-over overlay to fade fully in
    pub game_over_fade_secs: f32,
    /// Running under an interactive editor (quit is a no-op)
    pub editor_host: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            main_menu_scene: "MainMenu".to_string(),
            credits_scene: Some("Credits".to_string()),
            levels: vec![LevelLayout::sample("Level1"), LevelLayout::sample("Level2")],
            spawner: SpawnerSettings::default(),
            player: PlayerTuning::default(),
            game_over_fade_secs: 1.0,
            editor_host: false,
        }
    }
}

impl Settings {
    /// Parse settings from JSON
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize settings to pretty JSON
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("No settings at {} ({}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write settings to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CoreError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Every scene name the build manifest must contain
    pub fn scene_names(&self) -> Vec<String> {
        let mut names = vec![self.main_menu_scene.clone()];
        names.extend(self.levels.iter().map(|l| l.name.clone()));
        names.extend(self.credits_scene.iter().cloned());
        names
    }

    /// Layout for a level scene
    pub fn level(&self, name: &str) -> Option<&LevelLayout> {
        self.levels.iter().find(|l| l.name == name)
    }

    /// Level following `name` in play order
    pub fn next_level(&self, name: &str) -> Option<&LevelLayout> {
        let idx = self.levels.iter().position(|l| l.name == name)?;
        self.levels.get(idx + 1)
    }
}
