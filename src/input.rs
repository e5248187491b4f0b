//! Per-tick input snapshot
//!
//! The host polls its devices once per frame and hands the core a `TickInput`.

/// Named actions the core reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move,
    Jump,
    Interact,
}

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Horizontal axis in [-1, 1]
    pub move_axis: f32,
    /// Jump pressed this tick
    pub jump: bool,
    /// Interact pressed this tick
    pub interact: bool,
}

impl TickInput {
    pub fn moving(axis: f32) -> Self {
        Self {
            move_axis: axis.clamp(-1.0, 1.0),
            ..Default::default()
        }
    }

    /// Whether an action is active this tick
    pub fn pressed(&self, action: Action) -> bool {
        match action {
            Action::Move => self.move_axis.abs() > f32::EPSILON,
            Action::Jump => self.jump,
            Action::Interact => self.interact,
        }
    }
}

/// Source of input snapshots, polled once per tick
pub trait InputSource {
    fn poll(&mut self) -> TickInput;
}

/// Replays a fixed sequence of inputs, then idles
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: Vec<TickInput>,
    cursor: usize,
}

impl ScriptedInput {
    pub fn new(frames: Vec<TickInput>) -> Self {
        Self { frames, cursor: 0 }
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> TickInput {
        let input = self.frames.get(self.cursor).copied().unwrap_or_default();
        self.cursor += 1;
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressed_actions() {
        let input = TickInput {
            move_axis: -0.5,
            jump: true,
            interact: false,
        };
        assert!(input.pressed(Action::Move));
        assert!(input.pressed(Action::Jump));
        assert!(!input.pressed(Action::Interact));
        assert!(!TickInput::default().pressed(Action::Move));
    }

    #[test]
    fn test_scripted_input_idles_after_end() {
        let mut source = ScriptedInput::new(vec![TickInput::moving(3.0)]);
        assert_eq!(source.poll().move_axis, 1.0);
        assert!(source.is_finished());
        assert_eq!(source.poll(), TickInput::default());
    }
}
