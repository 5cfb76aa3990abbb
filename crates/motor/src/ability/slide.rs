//! Crouch slide.
//!
//! Takes over velocity while grounded and moving fast enough. Gravity is
//! projected onto the ground so slopes speed the slide up, friction scales
//! with slope steepness through `friction_slope_coef`, and the strafe axis
//! tilts gravity to steer.

use glam::Vec3;

use crate::context::MotorContext;
use crate::events::{AudioCue, MotorEvent, ShakeTag};
use crate::host::{HitReport, SurfaceId};
use crate::math::{angle_deg, inverse_lerp, project, project_on_plane};
use crate::movement::{AbilityFlags, MoveMode, MoveStateMachine};

use super::{AbilityBehavior, AbilityCore, AbilityKind};

/// Slope friction coefficient above which the ground counts as flat.
const FLAT_SLOPE_COEF: f32 = 0.95;

/// Hits opposing the slide direction by more than this stop the slide.
const BLOCKING_HIT_DOT: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct Slide {
    core: AbilityCore,

    must_stop: bool,

    /// Inside `min_slide_time`; crouch edges are ignored.
    is_starting: bool,
    started_this_frame: bool,

    /// Strafe axis sampled in `set_inputs`.
    steer: f32,

    /// Crouch held while airborne.
    slide_requested: bool,
    time_requested: f32,

    surface: Option<SurfaceId>,
    speed_ratio: f32,
    shake_at: Option<f32>,
}

impl Slide {
    pub fn new(flags: AbilityFlags) -> Self {
        Self {
            core: AbilityCore::new(flags),
            must_stop: false,
            is_starting: false,
            started_this_frame: false,
            steer: 0.0,
            slide_requested: false,
            time_requested: 0.0,
            surface: None,
            speed_ratio: 0.0,
            shake_at: None,
        }
    }

    /// A landing slide is still wanted.
    pub fn is_slide_pending(&self, cx: &MotorContext) -> bool {
        self.slide_requested
            && cx.now - self.time_requested < cx.config.abilities.slide.pre_grounding_grace
    }

    /// Where the current speed sits between the minimum and maximum slide speed.
    pub fn speed_ratio(&self) -> f32 {
        self.speed_ratio
    }

    /// Playback pitch for the slide loop at the current speed.
    pub fn loop_pitch(&self, cx: &MotorContext) -> f32 {
        let [low, high] = cx.config.abilities.slide.pitch_range;
        let pitch = low + (high - low) * self.speed_ratio;
        pitch * pitch
    }

    fn ground_surface(cx: &MotorContext) -> SurfaceId {
        cx.motor.grounding().surface.unwrap_or(SurfaceId::DEFAULT)
    }
}

impl AbilityBehavior for Slide {
    fn kind(&self) -> AbilityKind {
        AbilityKind::Slide
    }

    fn core(&self) -> &AbilityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AbilityCore {
        &mut self.core
    }

    fn can_start(&self, movement: &MoveStateMachine, cx: &MotorContext) -> bool {
        if self.is_active() || !cx.unlocks.can_combat_slide {
            return false;
        }
        if !cx.input.crouch_down() && !self.is_slide_pending(cx) {
            return false;
        }

        movement.mode() == MoveMode::Grounded
            && cx.motor.velocity().length() >= cx.config.abilities.slide.min_speed_for_slide
            && !(movement.is_crouching() && !movement.crouched_this_update())
    }

    fn can_stop(&self, _movement: &MoveStateMachine, cx: &MotorContext) -> bool {
        cx.can_stand()
    }

    fn on_start(&mut self, movement: &mut MoveStateMachine, cx: &mut MotorContext) {
        self.must_stop = false;
        self.is_starting = true;
        self.started_this_frame = true;
        self.slide_requested = false;

        movement.crouch(cx);

        let surface = Self::ground_surface(cx);
        self.surface = Some(surface);
        cx.emit(MotorEvent::Audio(AudioCue::SlideStart));
        cx.emit(MotorEvent::SlideLoopStart(surface));
        self.shake_at = Some(cx.now + cx.config.abilities.slide.screen_shake_delay);
    }

    fn on_stop(&mut self, movement: &mut MoveStateMachine, cx: &mut MotorContext) {
        movement.set_should_crouch(cx.input.crouch());
        self.surface = None;
        self.must_stop = false;
        cx.emit(MotorEvent::SlideLoopStop);
    }

    fn set_inputs(&mut self, movement: &mut MoveStateMachine, cx: &mut MotorContext) {
        let input = cx.input;
        if !self.is_active() {
            // Hold crouch to slide on landing
            if movement.mode() == MoveMode::Airborne {
                self.slide_requested = input.crouch();
                if self.slide_requested {
                    self.time_requested = cx.now;
                }
            }
            return;
        }

        self.steer = input.input.move_axis_right;

        let toggle = cx.config.abilities.slide.toggle_slide;
        if input.jump_down() && !movement.jump().is_consumed() && self.can_stop(movement, cx) {
            self.stop(movement, cx);
            movement.request_jump();
        } else if !self.is_starting && (input.crouch_down() || (!toggle && input.crouch_up())) {
            self.stop(movement, cx);
        } else if !toggle && !input.crouch() {
            self.stop(movement, cx);
        }
    }

    fn passive_update(&mut self, _movement: &mut MoveStateMachine, cx: &mut MotorContext) {
        if let Some(at) = self.shake_at {
            if cx.now >= at {
                self.shake_at = None;
                cx.emit(MotorEvent::ScreenShake {
                    amount: cx.config.abilities.slide.screen_shake,
                    tag: ShakeTag::Movement,
                });
            }
        }
    }

    fn before_update(&mut self, _movement: &mut MoveStateMachine, cx: &mut MotorContext) {
        let surface = Self::ground_surface(cx);
        if self.surface != Some(surface) {
            cx.emit(MotorEvent::SlideLoopStop);
            cx.emit(MotorEvent::SlideLoopStart(surface));
            self.surface = Some(surface);
        }
    }

    fn update_velocity(
        &mut self,
        velocity: &mut Vec3,
        _movement: &mut MoveStateMachine,
        cx: &mut MotorContext,
    ) {
        if self.must_stop {
            *velocity = Vec3::ZERO;
            return;
        }

        let settings = &cx.config.abilities.slide;
        let gravity = cx.gravity();
        let normal = cx.motor.grounding().ground_normal;
        let up = cx.motor.up();
        let dt = cx.delta_time;

        let down_slope = project_on_plane(gravity, normal);
        let across_slope = (-gravity.normalize_or_zero()).cross(down_slope).normalize_or_zero();
        let slope_coef = settings
            .friction_slope_coef
            .evaluate(angle_deg(up, normal) / 90.0);

        // Strafing tilts gravity to steer
        let mut steered_gravity = gravity;
        if self.steer != 0.0 {
            let tilt = cx.motor.right() * self.steer * settings.max_movement_contribution;
            steered_gravity = (gravity.normalize_or_zero() + tilt).normalize_or_zero() * gravity.length();
        }

        let gravity_step = project_on_plane(steered_gravity, normal) * dt;
        let motor_velocity = cx.motor.velocity();
        let friction = -motor_velocity.normalize_or_zero() * settings.friction * slope_coef * dt;
        let side_friction = if slope_coef < FLAT_SLOPE_COEF {
            -project(motor_velocity, across_slope) * settings.side_friction * dt
        } else {
            Vec3::ZERO
        };

        *velocity += gravity_step + friction + side_friction;

        if velocity.length() > settings.max_slide_speed {
            *velocity -= gravity_step;
        }

        if self.started_this_frame && settings.start_boost > 0.0 {
            *velocity += velocity.normalize_or_zero() * settings.start_boost;
        }

        self.speed_ratio = inverse_lerp(
            settings.min_speed_for_slide,
            settings.max_slide_speed,
            velocity.length(),
        );
    }

    fn after_update(&mut self, movement: &mut MoveStateMachine, cx: &mut MotorContext) {
        let settings = &cx.config.abilities.slide;
        let stop_speed = settings.slide_stop_speed;
        let min_slide_time = settings.min_slide_time;

        if cx.motor.velocity().length() < stop_speed
            || !cx.motor.grounding().found_any_ground
            || self.must_stop
        {
            self.stop(movement, cx);
        }

        if self.core.time_active(cx.now) > min_slide_time {
            self.is_starting = false;
        }
        self.started_this_frame = false;
    }

    fn on_movement_hit(
        &mut self,
        hit: &HitReport,
        _movement: &mut MoveStateMachine,
        cx: &mut MotorContext,
    ) {
        if !self.is_active() {
            return;
        }

        let direction = cx.motor.velocity().normalize_or_zero();
        if !hit.is_stable && (-hit.normal).dot(direction) > BLOCKING_HIT_DOT {
            self.must_stop = true;
            cx.emit(MotorEvent::ScreenShake {
                amount: cx.config.abilities.slide.screen_shake,
                tag: ShakeTag::Movement,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::InputButtons;
    use crate::test_support::Harness;

    fn sliding(h: &mut Harness) -> (Slide, MoveStateMachine) {
        let mut sm = MoveStateMachine::new(MoveMode::Grounded);
        let mut slide = Slide::new(AbilityFlags::blocking());
        h.motor.velocity = Vec3::new(0.0, 0.0, 8.0);
        h.press(InputButtons::CROUCH);
        assert!(slide.can_start(&sm, &h.cx()));
        slide.start(&mut sm, &mut h.cx());
        (slide, sm)
    }

    #[test]
    fn test_start_crouches_and_plays_cues() {
        let mut h = Harness::new();
        let (slide, sm) = sliding(&mut h);
        assert!(slide.is_active());
        assert!(sm.is_crouching());
        assert_eq!(sm.mode(), MoveMode::Grounded);
        assert!(h.events.iter().any(|e| *e == MotorEvent::Audio(AudioCue::SlideStart)));
        assert!(h
            .events
            .iter()
            .any(|e| *e == MotorEvent::SlideLoopStart(SurfaceId::DEFAULT)));
    }

    #[test]
    fn test_too_slow_to_slide() {
        let mut h = Harness::new();
        let sm = MoveStateMachine::new(MoveMode::Grounded);
        let slide = Slide::new(AbilityFlags::blocking());
        h.motor.velocity = Vec3::new(0.0, 0.0, 3.0);
        h.press(InputButtons::CROUCH);
        assert!(!slide.can_start(&sm, &h.cx()));
    }

    #[test]
    fn test_locked_slide() {
        let mut h = Harness::new();
        h.unlocks.can_combat_slide = false;
        let sm = MoveStateMachine::new(MoveMode::Grounded);
        let slide = Slide::new(AbilityFlags::blocking());
        h.motor.velocity = Vec3::new(0.0, 0.0, 8.0);
        h.press(InputButtons::CROUCH);
        assert!(!slide.can_start(&sm, &h.cx()));
    }

    #[test]
    fn test_flat_ground_slows_down() {
        let mut h = Harness::new();
        let (mut slide, mut sm) = sliding(&mut h);
        let mut velocity = h.motor.velocity;
        slide.update_velocity(&mut velocity, &mut sm, &mut h.cx());
        // Start boost on the first frame.
        assert!(velocity.z > 8.0);
        slide.after_update(&mut sm, &mut h.cx());

        h.motor.velocity = velocity;
        let before = velocity.length();
        slide.update_velocity(&mut velocity, &mut sm, &mut h.cx());
        assert!(velocity.length() < before);
        assert!(velocity.y.abs() < 1e-4);
    }

    #[test]
    fn test_downhill_speeds_up() {
        let mut h = Harness::new();
        let (mut slide, mut sm) = sliding(&mut h);
        slide.after_update(&mut sm, &mut h.cx());

        // Ground tilted so +Z is downhill.
        let normal = Vec3::new(0.0, 1.0, 0.5).normalize();
        h.motor.grounding.ground_normal = normal;
        let mut velocity = Vec3::new(0.0, -4.0, 8.0);
        h.motor.velocity = velocity;
        let before = velocity.length();
        slide.update_velocity(&mut velocity, &mut sm, &mut h.cx());
        assert!(velocity.length() > before);
    }

    #[test]
    fn test_stops_below_stop_speed_or_off_ground() {
        let mut h = Harness::new();
        let (mut slide, mut sm) = sliding(&mut h);
        h.motor.velocity = Vec3::new(0.0, 0.0, 1.0);
        slide.after_update(&mut sm, &mut h.cx());
        assert!(!slide.is_active());
        assert!(h.events.iter().any(|e| *e == MotorEvent::SlideLoopStop));

        let (mut slide, mut sm) = sliding(&mut h);
        h.motor.grounding = crate::host::GroundingReport::airborne();
        slide.after_update(&mut sm, &mut h.cx());
        assert!(!slide.is_active());
    }

    #[test]
    fn test_crouch_edges_ignored_while_starting() {
        let mut h = Harness::new();
        let (mut slide, mut sm) = sliding(&mut h);

        // Still holding crouch, a fresh press edge inside min_slide_time.
        h.release(InputButtons::CROUCH);
        h.press(InputButtons::CROUCH);
        slide.set_inputs(&mut sm, &mut h.cx());
        assert!(slide.is_active());

        h.now += h.config.abilities.slide.min_slide_time + 0.01;
        slide.after_update(&mut sm, &mut h.cx());
        h.release(InputButtons::CROUCH);
        h.press(InputButtons::CROUCH);
        slide.set_inputs(&mut sm, &mut h.cx());
        assert!(!slide.is_active());
    }

    #[test]
    fn test_release_stops_slide() {
        let mut h = Harness::new();
        let (mut slide, mut sm) = sliding(&mut h);
        h.release(InputButtons::CROUCH);
        slide.set_inputs(&mut sm, &mut h.cx());
        assert!(!slide.is_active());
        // Released crouch: the state machine stands back up when it can.
        assert!(!sm.crouch_state().should_crouch);
    }

    #[test]
    fn test_jump_cancel_wins_over_release() {
        let mut h = Harness::new();
        let (mut slide, mut sm) = sliding(&mut h);
        h.set_buttons(InputButtons::JUMP);
        assert!(h.input.jump_down() && h.input.crouch_up());

        slide.set_inputs(&mut sm, &mut h.cx());
        assert!(!slide.is_active());
        assert!(sm.jump().is_requested());
        let stops = h
            .events
            .iter()
            .filter(|e| **e == MotorEvent::AbilityStopped(AbilityKind::Slide))
            .count();
        assert_eq!(stops, 1);
    }

    #[test]
    fn test_jump_cancel_needs_headroom() {
        let mut h = Harness::new();
        let (mut slide, mut sm) = sliding(&mut h);
        h.motor.ceiling = Some(1.2);
        h.set_buttons(InputButtons::JUMP | InputButtons::CROUCH);
        slide.set_inputs(&mut sm, &mut h.cx());
        assert!(slide.is_active());
        assert!(!sm.jump().is_requested());
    }

    #[test]
    fn test_obstruction_stops_slide() {
        let mut h = Harness::new();
        let (mut slide, mut sm) = sliding(&mut h);
        slide.on_movement_hit(&h.hit(Vec3::NEG_Z, false), &mut sm, &mut h.cx());
        let mut velocity = h.motor.velocity;
        slide.update_velocity(&mut velocity, &mut sm, &mut h.cx());
        assert_eq!(velocity, Vec3::ZERO);
        slide.after_update(&mut sm, &mut h.cx());
        assert!(!slide.is_active());
    }

    #[test]
    fn test_landing_slide_request() {
        let mut h = Harness::new();
        let mut slide = Slide::new(AbilityFlags::blocking());
        let mut air = MoveStateMachine::new(MoveMode::Airborne);
        h.set_buttons(InputButtons::CROUCH);
        slide.set_inputs(&mut air, &mut h.cx());
        assert!(slide.is_slide_pending(&h.cx()));

        // Next tick on the ground, crouch still held but no new press edge.
        h.set_buttons(InputButtons::CROUCH);
        h.now += h.dt;
        h.motor.velocity = Vec3::new(0.0, 0.0, 9.0);
        let grounded = MoveStateMachine::new(MoveMode::Grounded);
        assert!(slide.can_start(&grounded, &h.cx()));

        h.now += 1.0;
        assert!(!slide.is_slide_pending(&h.cx()));
    }

    #[test]
    fn test_surface_change_restarts_loop() {
        let mut h = Harness::new();
        let (mut slide, mut sm) = sliding(&mut h);
        h.events.clear();
        slide.before_update(&mut sm, &mut h.cx());
        assert!(h.events.is_empty());

        h.motor.grounding.surface = Some(SurfaceId(4));
        slide.before_update(&mut sm, &mut h.cx());
        let events: Vec<_> = h.events.drain().collect();
        assert_eq!(
            events,
            vec![
                MotorEvent::SlideLoopStop,
                MotorEvent::SlideLoopStart(SurfaceId(4))
            ]
        );
    }

    #[test]
    fn test_delayed_shake() {
        let mut h = Harness::new();
        let (mut slide, mut sm) = sliding(&mut h);
        let is_shake = |e: &MotorEvent| matches!(e, MotorEvent::ScreenShake { .. });
        slide.passive_update(&mut sm, &mut h.cx());
        assert!(!h.events.iter().any(is_shake));

        h.now += h.config.abilities.slide.screen_shake_delay;
        slide.passive_update(&mut sm, &mut h.cx());
        slide.passive_update(&mut sm, &mut h.cx());
        assert_eq!(h.events.iter().filter(|e| is_shake(*e)).count(), 1);
    }
}
