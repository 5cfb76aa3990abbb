//! Borrowed view of everything a movement handler may touch during a tick.

use glam::Vec3;

use crate::events::{EventQueue, MotorEvent};
use crate::host::{ActorResources, CharacterMotor, ColliderId, Momentum, ProbeBuffer};
use crate::movement::{InputFrame, MotorConfig, Unlocks};
use crate::wall::{WallReport, WallTracker};

/// Collaborators and per-tick data handed to the state machine and abilities.
pub struct MotorContext<'a> {
    pub motor: &'a mut dyn CharacterMotor,
    pub resources: &'a mut dyn ActorResources,
    pub events: &'a mut EventQueue,
    pub input: &'a InputFrame,
    pub walls: &'a WallTracker,
    pub unlocks: &'a Unlocks,
    pub config: &'a MotorConfig,
    pub ignored_colliders: &'a [ColliderId],

    /// Controller clock in seconds.
    pub now: f32,

    pub delta_time: f32,
}

impl MotorContext<'_> {
    #[inline]
    pub fn emit(&mut self, event: MotorEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn gravity(&self) -> Vec3 {
        self.config.controller.gravity
    }

    #[inline]
    pub fn momentum(&self) -> Momentum {
        self.resources.momentum()
    }

    #[inline]
    pub fn wall(&self) -> &WallReport {
        self.walls.current()
    }

    /// Whether a standing-height capsule fits at the current position.
    pub fn can_stand(&self) -> bool {
        let mut hits = ProbeBuffer::new();
        let position = self.motor.position();
        self.motor
            .character_overlap(position, self.config.crouch.standing_height, &mut hits);
        !hits.iter().any(|id| !self.ignored_colliders.contains(id))
    }
}
