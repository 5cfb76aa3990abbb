//! Fire-and-forget side effects raised by the motor.
//!
//! Movement never plays audio, shakes the camera or drives the animator
//! itself. It pushes [`MotorEvent`]s into an [`EventQueue`] and the host
//! drains them once per tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::ability::AbilityKind;
use crate::host::SurfaceId;
use crate::movement::MoveMode;

/// One-shot sound cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCue {
    Jump,
    WallJump,
    /// Surface-specific jump layer, played on top of `Jump`/`WallJump`.
    SurfaceJump(SurfaceId),
    BeginWallRun,
    ClingStart,
    AirJump,
    Dash,
    Dodge,
    SlideStart,
    Vault,
}

/// Animator parameters the motor toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimatorParam {
    IsGrounded,
    Wallrunning,
    Vaulting,
}

/// Camera shake flavour, used by the host to pick a shake profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShakeTag {
    Subtle,
    Movement,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotorEvent {
    ModeChanged {
        from: MoveMode,
        to: MoveMode,
    },

    /// Raised when entering Grounded, WallRunning or Clinging.
    ///
    /// `hard` is set for stable ground contact and for wall modes, which
    /// count as grounding for ability resets.
    Grounded {
        hard: bool,
        normal: Vec3,
    },

    Jumped,

    AbilityActivated(AbilityKind),

    AbilityStopped(AbilityKind),

    Audio(AudioCue),

    /// Start the looping slide sounds for the given ground surface.
    SlideLoopStart(SurfaceId),

    SlideLoopStop,

    ScreenShake {
        amount: f32,
        tag: ShakeTag,
    },

    AnimatorBool {
        param: AnimatorParam,
        value: bool,
    },

    AnimatorJumpTrigger,

    /// Add `delta` degrees to the camera field of view.
    FovModifier {
        delta: f32,
    },

    /// Crouch state changed; `head_height` is the new eye height above the feet.
    Crouched {
        crouching: bool,
        head_height: f32,
    },

    Invulnerable(bool),
}

/// Ordered buffer of events raised during a tick.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<MotorEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: MotorEvent) {
        trace!(?event, "motor event");
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MotorEvent> {
        self.events.iter()
    }

    /// Take every queued event, oldest first.
    pub fn drain(&mut self) -> std::vec::Drain<'_, MotorEvent> {
        self.events.drain(..)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_order() {
        let mut queue = EventQueue::new();
        queue.push(MotorEvent::Jumped);
        queue.push(MotorEvent::Audio(AudioCue::Jump));
        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(
            drained,
            vec![MotorEvent::Jumped, MotorEvent::Audio(AudioCue::Jump)]
        );
        assert!(queue.is_empty());
    }
}
