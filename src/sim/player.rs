//! Player sub-machine
//!
//! Tracks locomotion state, control and key flags, and the visual flag set
//! handed to the animation driver each frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::EntityId;
use crate::consts::VELOCITY_EPSILON;
use crate::host::PhysicsBody;
use crate::input::TickInput;
use crate::settings::PlayerTuning;

/// Player locomotion state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerState {
    #[default]
    None,
    Idle,
    Running,
    Jump,
    /// Descending after a jump
    JumpFall,
    /// Descending without having jumped (walked off a ledge)
    FreeFall,
    Dead,
}

/// Boolean animation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimFlag {
    Idle,
    Running,
    Jumping,
    Falling,
    Dead,
}

impl PlayerState {
    /// Visual flag for this state. JumpFall and FreeFall share `Falling`.
    pub fn anim_flag(self) -> Option<AnimFlag> {
        match self {
            PlayerState::None => None,
            PlayerState::Idle => Some(AnimFlag::Idle),
            PlayerState::Running => Some(AnimFlag::Running),
            PlayerState::Jump => Some(AnimFlag::Jumping),
            PlayerState::JumpFall | PlayerState::FreeFall => Some(AnimFlag::Falling),
            PlayerState::Dead => Some(AnimFlag::Dead),
        }
    }
}

/// Per-frame animation flag set. At most one flag is set at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisualFlags {
    pub idle: bool,
    pub running: bool,
    pub jumping: bool,
    pub falling: bool,
    pub dead: bool,
}

impl VisualFlags {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn set(&mut self, flag: AnimFlag, value: bool) {
        match flag {
            AnimFlag::Idle => self.idle = value,
            AnimFlag::Running => self.running = value,
            AnimFlag::Jumping => self.jumping = value,
            AnimFlag::Falling => self.falling = value,
            AnimFlag::Dead => self.dead = value,
        }
    }

    pub fn is_set(&self, flag: AnimFlag) -> bool {
        match flag {
            AnimFlag::Idle => self.idle,
            AnimFlag::Running => self.running,
            AnimFlag::Jumping => self.jumping,
            AnimFlag::Falling => self.falling,
            AnimFlag::Dead => self.dead,
        }
    }

    /// Number of flags currently raised
    pub fn count(&self) -> usize {
        [self.idle, self.running, self.jumping, self.falling, self.dead]
            .iter()
            .filter(|f| **f)
            .count()
    }
}

/// The player's controller
pub struct PlayerController {
    id: EntityId,
    state: PlayerState,
    control_enabled: bool,
    has_key: bool,
    flags: VisualFlags,
    body: Box<dyn PhysicsBody>,
}

impl PlayerController {
    pub fn new(id: EntityId, body: Box<dyn PhysicsBody>) -> Self {
        Self {
            id,
            state: PlayerState::None,
            control_enabled: false,
            has_key: false,
            flags: VisualFlags::default(),
            body,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn visual_flags(&self) -> VisualFlags {
        self.flags
    }

    pub fn body(&self) -> &dyn PhysicsBody {
        self.body.as_ref()
    }

    /// Host physics writes through this
    pub fn body_mut(&mut self) -> &mut dyn PhysicsBody {
        self.body.as_mut()
    }

    pub fn position(&self) -> Vec2 {
        self.body.position()
    }

    pub fn control_enabled(&self) -> bool {
        self.control_enabled
    }

    pub fn enable_control(&mut self) {
        self.control_enabled = true;
    }

    pub fn disable_control(&mut self) {
        self.control_enabled = false;
    }

    pub fn has_key(&self) -> bool {
        self.has_key
    }

    pub fn grant_key(&mut self) {
        if !self.has_key {
            log::info!("Player picked up the key");
        }
        self.has_key = true;
    }

    /// Change state. Returns false if `next` equals the current state.
    pub fn change_state(&mut self, next: PlayerState) -> bool {
        if next == self.state {
            return false;
        }
        log::debug!("Player state: {:?} -> {:?}", self.state, next);

        self.flags.clear();
        self.state = next;
        if let Some(flag) = next.anim_flag() {
            self.flags.set(flag, true);
        }
        if next == PlayerState::Dead {
            self.body.set_velocity(Vec2::ZERO);
        }
        true
    }

    /// Place the player at a spawn point, at rest, with scene-local flags reset
    pub fn respawn(&mut self, pos: Vec2) {
        self.body.set_position(pos);
        self.body.set_velocity(Vec2::ZERO);
        self.has_key = false;
    }

    /// Apply movement intent to the body velocity
    pub fn drive(&mut self, input: &TickInput, tuning: &PlayerTuning) {
        if !self.control_enabled {
            return;
        }
        let mut vel = self.body.velocity();
        vel.x = input.move_axis.clamp(-1.0, 1.0) * tuning.run_speed;
        if input.jump && self.body.is_grounded() {
            vel.y = tuning.jump_speed;
        }
        self.body.set_velocity(vel);
    }

    /// Derive locomotion state from the physics query
    pub fn update_locomotion(&mut self) {
        if matches!(self.state, PlayerState::None | PlayerState::Dead) {
            return;
        }
        let vel = self.body.velocity();
        let next = if self.body.is_grounded() {
            if vel.x.abs() > VELOCITY_EPSILON {
                PlayerState::Running
            } else {
                PlayerState::Idle
            }
        } else if vel.y > VELOCITY_EPSILON {
            PlayerState::Jump
        } else if matches!(self.state, PlayerState::Jump | PlayerState::JumpFall) {
            PlayerState::JumpFall
        } else {
            PlayerState::FreeFall
        };
        self.change_state(next);
    }
}

impl std::fmt::Debug for PlayerController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerController")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("control_enabled", &self.control_enabled)
            .field("has_key", &self.has_key)
            .field("pos", &self.body.position())
            .field("vel", &self.body.velocity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Body;
    use proptest::prelude::*;

    fn player_with(body: Body) -> PlayerController {
        PlayerController::new(EntityId(1), Box::new(body))
    }

    #[test]
    fn test_change_state_is_idempotent() {
        let mut player = player_with(Body::default());
        assert!(player.change_state(PlayerState::Idle));
        assert!(!player.change_state(PlayerState::Idle));
        assert!(player.visual_flags().idle);
        assert_eq!(player.visual_flags().count(), 1);
    }

    #[test]
    fn test_previous_flag_cleared_on_change() {
        let mut player = player_with(Body::default());
        player.change_state(PlayerState::Running);
        player.change_state(PlayerState::Jump);
        let flags = player.visual_flags();
        assert!(!flags.running);
        assert!(flags.jumping);
        assert_eq!(flags.count(), 1);
    }

    #[test]
    fn test_both_fall_states_share_flag() {
        assert_eq!(PlayerState::JumpFall.anim_flag(), PlayerState::FreeFall.anim_flag());

        let mut player = player_with(Body::default());
        player.change_state(PlayerState::JumpFall);
        assert!(player.visual_flags().falling);
        player.change_state(PlayerState::FreeFall);
        assert!(player.visual_flags().falling);
        assert_eq!(player.visual_flags().count(), 1);
    }

    #[test]
    fn test_drive_ignored_without_control() {
        let mut player = player_with(Body::grounded_at(Vec2::ZERO));
        let input = TickInput {
            move_axis: 1.0,
            jump: true,
            interact: false,
        };
        player.drive(&input, &PlayerTuning::default());
        assert_eq!(player.body().velocity(), Vec2::ZERO);

        player.enable_control();
        player.drive(&input, &PlayerTuning::default());
        assert_eq!(player.body().velocity(), Vec2::new(5.0, 9.0));
    }

    #[test]
    fn test_locomotion_from_physics() {
        let mut player = player_with(Body::grounded_at(Vec2::ZERO));
        player.change_state(PlayerState::Idle);

        player.body_mut().set_velocity(Vec2::new(3.0, 0.0));
        player.update_locomotion();
        assert_eq!(player.state(), PlayerState::Running);

        player.body_mut().set_velocity(Vec2::ZERO);
        player.update_locomotion();
        assert_eq!(player.state(), PlayerState::Idle);
    }

    #[test]
    fn test_walking_off_ledge_is_free_fall() {
        let mut player = player_with(Body {
            pos: Vec2::ZERO,
            vel: Vec2::new(3.0, -1.0),
            grounded: false,
        });
        player.change_state(PlayerState::Running);
        player.update_locomotion();
        assert_eq!(player.state(), PlayerState::FreeFall);
    }

    #[test]
    fn test_jump_then_fall_is_jump_fall() {
        let mut player = player_with(Body {
            pos: Vec2::ZERO,
            vel: Vec2::new(0.0, 4.0),
            grounded: false,
        });
        player.change_state(PlayerState::Idle);
        player.update_locomotion();
        assert_eq!(player.state(), PlayerState::Jump);

        player.body_mut().set_velocity(Vec2::new(0.0, -2.0));
        player.update_locomotion();
        assert_eq!(player.state(), PlayerState::JumpFall);
    }

    #[test]
    fn test_dead_is_terminal_for_locomotion() {
        let mut player = player_with(Body::grounded_at(Vec2::ZERO));
        player.change_state(PlayerState::Dead);
        player.body_mut().set_velocity(Vec2::new(2.0, 0.0));
        player.update_locomotion();
        assert_eq!(player.state(), PlayerState::Dead);
    }

    proptest! {
        #[test]
        fn prop_dead_zeroes_velocity(
            vx in -100.0f32..100.0,
            vy in -100.0f32..100.0,
            grounded in any::<bool>(),
            prior in 0usize..6,
        ) {
            let mut player = player_with(Body { pos: Vec2::ZERO, vel: Vec2::ZERO, grounded });
            let prior = [
                PlayerState::None,
                PlayerState::Idle,
                PlayerState::Running,
                PlayerState::Jump,
                PlayerState::JumpFall,
                PlayerState::FreeFall,
            ][prior];
            player.change_state(prior);
            player.body_mut().set_velocity(Vec2::new(vx, vy));

            prop_assert!(player.change_state(PlayerState::Dead));
            prop_assert_eq!(player.body().velocity(), Vec2::ZERO);
            prop_assert!(player.visual_flags().dead);
            prop_assert_eq!(player.visual_flags().count(), 1);
        }
    }
}
