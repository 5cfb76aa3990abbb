//! Per-tick input snapshot.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Button bits for a single input sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputButtons(pub u8);

impl InputButtons {
    pub const JUMP: u8 = 1 << 0;
    pub const DASH: u8 = 1 << 1;

    /// Crouch intent. Hosts that toggle crouch resolve the toggle before
    /// setting this bit.
    pub const CROUCH: u8 = 1 << 2;

    #[inline]
    pub fn has(self, button: u8) -> bool {
        (self.0 & button) != 0
    }

    #[inline]
    pub fn set(&mut self, button: u8, value: bool) {
        if value {
            self.0 |= button;
        } else {
            self.0 &= !button;
        }
    }

    #[inline]
    pub fn with(mut self, button: u8) -> Self {
        self.set(button, true);
        self
    }
}

/// Raw input for one tick, as sampled by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotorInput {
    /// Forward/back axis in `-1..=1`.
    pub move_axis_forward: f32,

    /// Right/left axis in `-1..=1`.
    pub move_axis_right: f32,

    /// Desired move direction in world space, length at most 1.
    pub move_world: Vec3,

    /// Camera look direction (world space).
    pub camera_forward: Vec3,

    /// Camera position (world space).
    pub camera_position: Vec3,

    pub buttons: InputButtons,
}

impl Default for MotorInput {
    fn default() -> Self {
        Self {
            move_axis_forward: 0.0,
            move_axis_right: 0.0,
            move_world: Vec3::ZERO,
            camera_forward: Vec3::Z,
            camera_position: Vec3::ZERO,
            buttons: InputButtons::default(),
        }
    }
}

/// Input for one tick together with button edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    pub input: MotorInput,

    /// Buttons that went down this tick.
    pub pressed: InputButtons,

    /// Buttons that went up this tick.
    pub released: InputButtons,
}

impl InputFrame {
    /// Build a frame by comparing against the previous tick's buttons.
    pub fn from_edges(previous: InputButtons, input: MotorInput) -> Self {
        let held = input.buttons.0;
        Self {
            input,
            pressed: InputButtons(held & !previous.0),
            released: InputButtons(previous.0 & !held),
        }
    }

    #[inline]
    pub fn jump_down(&self) -> bool {
        self.pressed.has(InputButtons::JUMP)
    }

    #[inline]
    pub fn dash_down(&self) -> bool {
        self.pressed.has(InputButtons::DASH)
    }

    #[inline]
    pub fn crouch_down(&self) -> bool {
        self.pressed.has(InputButtons::CROUCH)
    }

    #[inline]
    pub fn crouch_up(&self) -> bool {
        self.released.has(InputButtons::CROUCH)
    }

    #[inline]
    pub fn crouch(&self) -> bool {
        self.input.buttons.has(InputButtons::CROUCH)
    }

    /// Move input in character-local space: `(right, 0, forward)`.
    #[inline]
    pub fn move_local(&self) -> Vec3 {
        Vec3::new(self.input.move_axis_right, 0.0, self.input.move_axis_forward)
    }

    #[inline]
    pub fn move_world(&self) -> Vec3 {
        self.input.move_world
    }

    #[inline]
    pub fn camera_forward(&self) -> Vec3 {
        self.input.camera_forward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(bits: u8) -> MotorInput {
        MotorInput {
            buttons: InputButtons(bits),
            ..Default::default()
        }
    }

    #[test]
    fn test_press_and_release_edges() {
        let first = InputFrame::from_edges(InputButtons::default(), held(InputButtons::CROUCH));
        assert!(first.crouch_down());
        assert!(first.crouch());
        assert!(!first.crouch_up());

        let second = InputFrame::from_edges(first.input.buttons, held(InputButtons::CROUCH));
        assert!(!second.crouch_down());
        assert!(second.crouch());

        let third = InputFrame::from_edges(second.input.buttons, held(0));
        assert!(third.crouch_up());
        assert!(!third.crouch());
    }

    #[test]
    fn test_held_jump_is_not_a_new_press() {
        let prev = InputButtons::default().with(InputButtons::JUMP);
        let frame = InputFrame::from_edges(prev, held(InputButtons::JUMP | InputButtons::DASH));
        assert!(!frame.jump_down());
        assert!(frame.dash_down());
    }
}
