//! Climbing onto ledges in front of the character.
//!
//! A vault starts when the player pushes forward into a ledge while
//! airborne or on a wall. The character is moved along a straight line from
//! its position to a point on top of the ledge over `climb_time`, with
//! collision solving disabled.

use glam::Vec3;

use crate::context::MotorContext;
use crate::events::{AnimatorParam, AudioCue, MotorEvent};
use crate::host::ProbeBuffer;
use crate::math::{angle_deg, flatten};
use crate::movement::{AbilityFlags, MoveMode, MoveStateMachine};

use super::{AbilityBehavior, AbilityCore, AbilityKind, SiblingStop};

/// Distance to the ledge target that counts as arrived (meters).
const ARRIVAL_DISTANCE: f32 = 0.01;

/// A vault still running after this many climb times is abandoned.
const TIMEOUT_FACTOR: f32 = 2.0;

#[derive(Debug, Clone)]
pub struct Vault {
    core: AbilityCore,
    start_position: Vec3,
    target: Vec3,
    climb_elapsed: f32,
    should_stop: bool,
}

impl Vault {
    pub fn new(flags: AbilityFlags) -> Self {
        Self {
            core: AbilityCore::new(flags),
            start_position: Vec3::ZERO,
            target: Vec3::ZERO,
            climb_elapsed: 0.0,
            should_stop: false,
        }
    }

    /// Point on top of the ledge the current (or last) vault climbs to.
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Standing spot on a ledge in front of the character, if there is one.
    ///
    /// The head-height ray forward must be clear, a ray cast down from above
    /// and beyond the head must land on a shallow surface, and a standing
    /// capsule must fit there.
    pub fn find_ledge(cx: &MotorContext) -> Option<Vec3> {
        let settings = &cx.config.abilities.vault;
        let up = cx.motor.up();
        let forward = flatten(cx.input.camera_forward(), up).normalize_or_zero();
        if forward == Vec3::ZERO {
            return None;
        }

        let head = cx.motor.position() + up * cx.config.crouch.standing_head_height;
        if let Some(hit) = cx.motor.raycast(head, forward, settings.ledge_check_distance) {
            if !cx.ignored_colliders.contains(&hit.collider) {
                return None;
            }
        }

        let probe = head + up * settings.ledge_check_height + forward * settings.ledge_check_distance;
        let depth = cx.config.crouch.standing_head_height - settings.ledge_depth_check_distance;
        let hit = cx.motor.raycast(probe, -up, depth)?;
        if angle_deg(hit.normal, up) > settings.max_ledge_slope {
            return None;
        }

        let ledge = hit.point + up * settings.ledge_clearance;
        let mut overlaps = ProbeBuffer::new();
        cx.motor
            .character_overlap(ledge, cx.config.crouch.standing_height, &mut overlaps);
        if overlaps.iter().any(|id| !cx.ignored_colliders.contains(id)) {
            return None;
        }

        Some(ledge)
    }
}

impl AbilityBehavior for Vault {
    fn kind(&self) -> AbilityKind {
        AbilityKind::Vault
    }

    fn core(&self) -> &AbilityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AbilityCore {
        &mut self.core
    }

    fn can_start(&self, movement: &MoveStateMachine, cx: &MotorContext) -> bool {
        !self.is_active()
            && movement.mode() != MoveMode::Grounded
            && !movement.is_crouching()
            && cx.input.input.move_axis_forward > 0.0
            && Self::find_ledge(cx).is_some()
    }

    fn stops_on_start(&self) -> SiblingStop {
        SiblingStop::Kind(AbilityKind::Dash)
    }

    fn reserve(&mut self, _movement: &MoveStateMachine, cx: &mut MotorContext) -> bool {
        match Self::find_ledge(cx) {
            Some(ledge) => {
                self.target = ledge;
                true
            }
            None => false,
        }
    }

    fn on_start(&mut self, _movement: &mut MoveStateMachine, cx: &mut MotorContext) {
        self.start_position = cx.motor.position();
        self.climb_elapsed = 0.0;
        self.should_stop = false;

        cx.motor.set_collision_solving(false);
        cx.emit(MotorEvent::Audio(AudioCue::Vault));
        cx.emit(MotorEvent::AnimatorBool {
            param: AnimatorParam::Vaulting,
            value: true,
        });
    }

    fn update_velocity(
        &mut self,
        velocity: &mut Vec3,
        _movement: &mut MoveStateMachine,
        cx: &mut MotorContext,
    ) {
        if self.should_stop {
            *velocity = Vec3::ZERO;
            return;
        }

        let climb_time = cx.config.abilities.vault.climb_time;
        self.climb_elapsed = (self.climb_elapsed + cx.delta_time).min(climb_time);
        let t = self.climb_elapsed / climb_time;
        let position = cx.motor.position();
        let next = self.start_position.lerp(self.target, t);
        *velocity = cx.motor.velocity_for_move(position, next, cx.delta_time);

        if position.distance(self.target) < ARRIVAL_DISTANCE
            || self.core.time_active(cx.now) >= climb_time * TIMEOUT_FACTOR
        {
            self.should_stop = true;
        }
    }

    fn after_update(&mut self, movement: &mut MoveStateMachine, cx: &mut MotorContext) {
        if self.should_stop {
            self.stop(movement, cx);
        }
    }

    fn on_stop(&mut self, _movement: &mut MoveStateMachine, cx: &mut MotorContext) {
        self.should_stop = false;
        cx.motor.set_collision_solving(true);
        cx.emit(MotorEvent::AnimatorBool {
            param: AnimatorParam::Vaulting,
            value: false,
        });
    }
}
