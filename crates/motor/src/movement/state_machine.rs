//! Movement mode state machine.
//!
//! Owns the current [`MoveMode`], the per-mode velocity laws, jump
//! arbitration, crouching and the wall-run transition rules. Mode changes
//! are only ever applied inside [`MoveStateMachine::check_current_state`],
//! which runs once per tick at the end of the after-update phase.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::context::MotorContext;
use crate::events::{AnimatorParam, AudioCue, MotorEvent};
use crate::host::{GroundingReport, HitReport, SurfaceId};
use crate::math::{angle_deg, flatten, project, project_on_plane, reflect, tangent_to_surface};
use crate::wall::WallSide;

use super::config::JumpSettings;
use super::crouch::CrouchState;
use super::jump::JumpBuffer;

/// Time the motor skips ground snapping after a jump (seconds).
const JUMP_UNGROUND_TIME: f32 = 0.1;

/// Horizontal speed above which grabbing a wall plays a scrape.
const CLING_SCRAPE_SPEED: f32 = 4.0;

/// Stamina needed to stay on a wall.
const WALL_STAMINA_UNIT: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MoveMode {
    #[default]
    Grounded,
    Airborne,
    WallRunning,
    Clinging,
    Swimming,
}

impl MoveMode {
    #[inline]
    pub fn is_on_wall(self) -> bool {
        matches!(self, Self::WallRunning | Self::Clinging)
    }
}

/// Grounding qualifier attached to a transition into Grounded or a wall mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grounding {
    pub hard: bool,
    pub normal: Vec3,
}

/// A mode change applied during the after-update phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from: MoveMode,
    pub to: MoveMode,
    pub grounding: Option<Grounding>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveStateMachine {
    current: MoveMode,
    previous: MoveMode,
    time_entered: f32,
    requested: Option<MoveMode>,

    jump: JumpBuffer,
    crouch: CrouchState,
    wall_side: WallSide,

    // External velocity
    velocity_add: Vec3,
    velocity_force: Vec3,
    velocity_force_applied: Vec3,

    velocity_at_frame_start: Vec3,
    velocity_on_enter: Vec3,

    // Wall running
    height_last_frame: f32,
    last_ran_direction: Vec3,
    has_grounded_since_last_wall_run: bool,
    time_last_stamina_drained: Option<f32>,
}

impl Default for MoveStateMachine {
    fn default() -> Self {
        Self::new(MoveMode::Grounded)
    }
}

impl MoveStateMachine {
    pub fn new(mode: MoveMode) -> Self {
        Self {
            current: mode,
            previous: mode,
            time_entered: 0.0,
            requested: None,
            jump: JumpBuffer::new(),
            crouch: CrouchState::default(),
            wall_side: WallSide::default(),
            velocity_add: Vec3::ZERO,
            velocity_force: Vec3::ZERO,
            velocity_force_applied: Vec3::ZERO,
            velocity_at_frame_start: Vec3::ZERO,
            velocity_on_enter: Vec3::ZERO,
            height_last_frame: 0.0,
            last_ran_direction: Vec3::Z,
            has_grounded_since_last_wall_run: true,
            time_last_stamina_drained: None,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn mode(&self) -> MoveMode {
        self.current
    }

    pub fn previous_mode(&self) -> MoveMode {
        self.previous
    }

    /// Controller time at which the current mode was entered.
    pub fn time_entered(&self) -> f32 {
        self.time_entered
    }

    pub fn time_in_state(&self, now: f32) -> f32 {
        now - self.time_entered
    }

    pub fn requested_mode(&self) -> Option<MoveMode> {
        self.requested
    }

    pub fn jump(&self) -> &JumpBuffer {
        &self.jump
    }

    pub fn crouch_state(&self) -> &CrouchState {
        &self.crouch
    }

    pub fn is_crouching(&self) -> bool {
        self.crouch.is_crouching()
    }

    pub fn crouched_this_update(&self) -> bool {
        self.crouch.crouched_this_update()
    }

    pub fn set_should_crouch(&mut self, value: bool) {
        self.crouch.should_crouch = value;
    }

    /// Side of the character the current (or last) wall is on.
    pub fn wall_side(&self) -> WallSide {
        self.wall_side
    }

    pub fn has_grounded_since_last_wall_run(&self) -> bool {
        self.has_grounded_since_last_wall_run
    }

    pub fn has_external_forces(&self) -> bool {
        self.velocity_add.length_squared() > 0.0 || self.velocity_force.length_squared() > 0.0
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Queue a mode change for the end of this tick. Requesting the current
    /// mode does nothing.
    pub fn request_state_change(&mut self, mode: MoveMode) {
        if mode == self.current {
            return;
        }
        self.requested = Some(mode);
    }

    pub fn request_jump(&mut self) {
        self.jump.request();
    }

    /// One-shot velocity added at the end of the next velocity update.
    pub fn add_velocity(&mut self, velocity: Vec3) {
        self.velocity_add += velocity;
    }

    /// Velocity applied every update until replaced.
    pub fn set_continuous_velocity(&mut self, velocity: Vec3) {
        self.velocity_force = velocity;
    }

    /// A blocking ability owned this tick's velocity, so the continuous
    /// force from the last update is no longer part of it.
    pub fn skip_velocity_update(&mut self) {
        self.velocity_force_applied = Vec3::ZERO;
    }

    // ========================================================================
    // Phases
    // ========================================================================

    /// Translate this tick's input into requests.
    pub fn process_input(&mut self, cx: &mut MotorContext) {
        let input = cx.input;
        match self.current {
            MoveMode::Grounded => {
                self.crouch.should_crouch = input.crouch();
                if input.jump_down() && (!self.crouch.is_crouching() || cx.can_stand()) {
                    self.request_jump();
                }
            }
            MoveMode::WallRunning => {
                let can_cling = cx.unlocks.can_wall_cling;
                if input.input.move_axis_forward < 0.0 && can_cling {
                    self.request_state_change(MoveMode::Clinging);
                }
                if input.jump_down() {
                    let look_angle =
                        cx.wall().look_angle(input.camera_forward(), cx.motor.up());
                    if look_angle > cx.config.wall_run.cling_angle_limit || !can_cling {
                        self.request_jump();
                    } else {
                        self.request_state_change(MoveMode::Clinging);
                    }
                }
                if input.crouch_down() {
                    self.request_state_change(MoveMode::Airborne);
                }
            }
            MoveMode::Clinging => {
                if input.jump_down() {
                    self.request_jump();
                }
                if input.crouch_down() {
                    self.request_state_change(MoveMode::Airborne);
                }
            }
            MoveMode::Airborne => {
                self.crouch.should_crouch = input.crouch();
                if input.jump_down() {
                    self.request_jump();
                }
            }
            MoveMode::Swimming => {}
        }
    }

    pub fn before_update(&mut self, cx: &mut MotorContext) {
        self.velocity_at_frame_start = cx.motor.velocity();

        match self.current {
            MoveMode::Grounded => {
                self.crouch.begin_update();
                if self.crouch.wants_to_crouch() {
                    self.crouch(cx);
                }
            }
            MoveMode::WallRunning | MoveMode::Clinging => {
                let interval = if self.current == MoveMode::Clinging {
                    cx.config.wall_run.cling_stamina_drain
                } else {
                    cx.config.wall_run.wallrun_stamina_drain
                };
                let due = self
                    .time_last_stamina_drained
                    .map_or(true, |last| cx.now - last > interval);
                if due {
                    if cx.resources.try_spend_stamina(WALL_STAMINA_UNIT) {
                        self.time_last_stamina_drained = Some(cx.now);
                    } else {
                        debug!(mode = ?self.current, "out of stamina, dropping off wall");
                        self.request_state_change(MoveMode::Airborne);
                    }
                }
            }
            MoveMode::Airborne | MoveMode::Swimming => {}
        }
    }

    /// Compute this tick's velocity for the current mode.
    pub fn update_velocity(&mut self, velocity: &mut Vec3, cx: &mut MotorContext) {
        let external = !cx.config.controller.ignore_external_velocity;

        // Remove last update's continuous force so it does not accumulate.
        if external {
            *velocity -= self.velocity_force_applied;
            self.velocity_force_applied = Vec3::ZERO;
        }

        self.jump.begin_frame(cx.delta_time);

        let mut jumped = false;
        if self.jump.is_pending() {
            let honored = match self.current {
                MoveMode::Grounded => {
                    can_jump_from_ground(&cx.motor.grounding(), &cx.config.jump)
                }
                MoveMode::Airborne => {
                    self.time_in_state(cx.now) < cx.config.jump.post_grounding_grace
                }
                MoveMode::WallRunning | MoveMode::Clinging => true,
                MoveMode::Swimming => false,
            };
            if honored {
                jumped = self.perform_jump(velocity, cx);
            }
        }

        if !jumped {
            match self.current {
                MoveMode::Grounded => self.grounded_velocity(velocity, cx),
                MoveMode::Airborne => self.airborne_velocity(velocity, cx),
                MoveMode::WallRunning => self.wallrun_velocity(velocity, cx),
                MoveMode::Clinging => self.cling_velocity(velocity, cx),
                MoveMode::Swimming => {}
            }
        }

        if external {
            if self.velocity_add.length_squared() > 0.0 {
                *velocity += self.velocity_add;
                self.velocity_add = Vec3::ZERO;
            }
            *velocity += self.velocity_force;
            self.velocity_force_applied = self.velocity_force;
        }

        trace!(mode = ?self.current, ?velocity, "velocity updated");
    }

    /// Expire stale requests, settle crouching and check wall curvature, then
    /// apply any mode change.
    pub fn after_update(&mut self, cx: &mut MotorContext) -> Option<Transition> {
        let config = cx.config;
        let jump_settings = &config.jump;
        match self.current {
            MoveMode::Grounded => {
                self.jump.expire_grounded(jump_settings.pre_grounding_grace);
                if !self.jump.jumped_this_frame()
                    && can_jump_from_ground(&cx.motor.grounding(), jump_settings)
                {
                    self.jump.reset_consumed();
                }

                if self.crouch.wants_to_stand() {
                    if cx.can_stand() {
                        self.uncrouch(cx);
                    } else {
                        self.crouch(cx);
                    }
                }
            }
            MoveMode::Airborne => {
                self.jump.expire_airborne(
                    self.time_in_state(cx.now),
                    jump_settings.pre_grounding_grace,
                    jump_settings.post_grounding_grace,
                );
            }
            MoveMode::WallRunning | MoveMode::Clinging => self.check_wall_curvature(cx),
            MoveMode::Swimming => {}
        }

        self.check_current_state(cx)
    }

    /// Apply a pending request, or the automatic transition rules if none.
    pub fn check_current_state(&mut self, cx: &mut MotorContext) -> Option<Transition> {
        if let Some(requested) = self.requested.take() {
            if requested != self.current {
                return Some(self.change_state(requested, cx));
            }
        }

        let config = cx.config;
        let grounding = cx.motor.grounding();
        let wall = *cx.wall();
        let wall_settings = &config.wall_run;

        match self.current {
            MoveMode::Grounded => {
                if !grounding.is_stable_on_ground || cx.motor.must_unground() {
                    return Some(self.change_state(MoveMode::Airborne, cx));
                }
            }
            MoveMode::Airborne => {
                if let Some(mode) = self.wall_candidate(cx) {
                    return Some(self.change_state(mode, cx));
                }
                if grounding.is_stable_on_ground && !cx.motor.must_unground() {
                    return Some(self.change_state(MoveMode::Grounded, cx));
                }
            }
            MoveMode::WallRunning | MoveMode::Clinging => {
                let slope = angle_deg(cx.motor.up(), wall.hit_normal);
                let [min_slope, max_slope] = wall_settings.slope_limits;
                let timed_out = self.current == MoveMode::WallRunning
                    && self.time_in_state(cx.now) > wall_settings.run_time;

                if !wall.is_touched()
                    || slope < min_slope
                    || slope > max_slope
                    || timed_out
                    || wall.close_to_ground
                {
                    debug!(
                        mode = ?self.current,
                        touched = wall.is_touched(),
                        slope,
                        timed_out,
                        close_to_ground = wall.close_to_ground,
                        "leaving wall"
                    );
                    return Some(self.change_state(MoveMode::Airborne, cx));
                }
            }
            MoveMode::Swimming => {}
        }

        None
    }

    /// Ground probing found a hit while the motor was moving.
    pub fn on_ground_hit(&mut self, hit: &HitReport) {
        if self.current == MoveMode::WallRunning && hit.is_stable {
            self.request_state_change(MoveMode::Grounded);
        }
    }

    /// Shrink to crouch height.
    pub fn crouch(&mut self, cx: &mut MotorContext) {
        if self.crouch.crouch() {
            let height = cx.config.crouch.crouch_height;
            cx.motor.set_capsule_height(height);
            cx.emit(MotorEvent::Crouched {
                crouching: true,
                head_height: cx.config.crouch.head_height(true),
            });
        }
    }

    /// Grow back to standing height without checking for room.
    pub fn uncrouch(&mut self, cx: &mut MotorContext) {
        if self.crouch.uncrouch() {
            cx.motor.set_capsule_height(cx.config.crouch.standing_height);
            cx.emit(MotorEvent::Crouched {
                crouching: false,
                head_height: cx.config.crouch.head_height(false),
            });
        }
    }

    // ========================================================================
    // Velocity laws
    // ========================================================================

    fn grounded_velocity(&mut self, velocity: &mut Vec3, cx: &mut MotorContext) {
        let settings = *cx.config.move_settings(MoveMode::Grounded);
        let grounding = cx.motor.grounding();
        let normal = grounding.ground_normal;
        let up = cx.motor.up();

        // Reorient velocity on slope
        let speed = velocity.length();
        *velocity = tangent_to_surface(*velocity, normal, up) * speed;

        let move_world = cx.input.move_world();
        let input_right = move_world.cross(up);
        let reoriented = normal.cross(input_right).normalize_or_zero() * move_world.length();
        let max_speed = if self.crouch.is_crouching() {
            cx.config.crouch.max_crouched_speed
        } else {
            settings.max_speed
        };
        let target = reoriented * max_speed * cx.momentum().speed_multiplier;

        let diff = project_on_plane(target - *velocity, cx.gravity());
        *velocity += diff * settings.acceleration * cx.delta_time;
        *velocity *= drag(settings.friction, cx.delta_time);
    }

    fn airborne_velocity(&mut self, velocity: &mut Vec3, cx: &mut MotorContext) {
        let settings = *cx.config.move_settings(MoveMode::Airborne);
        let move_world = cx.input.move_world();

        if move_world.length_squared() > 0.0 {
            let mut target = move_world * settings.max_speed * cx.momentum().speed_multiplier;

            // Prevent climbing unstable slopes with air control
            let grounding = cx.motor.grounding();
            if grounding.found_any_ground {
                let up = cx.motor.up();
                let obstruction = up.cross(grounding.ground_normal).cross(up).normalize_or_zero();
                target = project_on_plane(target, obstruction);
            }

            let diff = project_on_plane(target - *velocity, cx.gravity());
            *velocity += diff * settings.acceleration * cx.delta_time;
        }

        *velocity += cx.gravity() * cx.delta_time;
        *velocity *= drag(settings.friction, cx.delta_time);
    }

    fn wallrun_velocity(&mut self, velocity: &mut Vec3, cx: &mut MotorContext) {
        let config = cx.config;
        let settings = &config.wall_run;
        let normal = cx.wall().hit_normal;
        let up = cx.motor.up();

        let speed = flatten(self.velocity_on_enter, up)
            .length()
            .max(settings.movement.max_speed * cx.momentum().speed_multiplier);

        // Travel along the wall, level with the character
        let mut direction = project_on_plane(*velocity, normal).normalize_or_zero();
        direction = project_on_plane(direction, up).normalize_or_zero();
        if direction == Vec3::ZERO {
            direction = project_on_plane(project_on_plane(cx.motor.forward(), normal), up)
                .normalize_or_zero();
        }
        *velocity = direction * speed;

        let t = self.time_in_state(cx.now) / settings.run_time;
        let height = settings.height_curve.evaluate(t) * settings.run_height;
        if cx.delta_time > 0.0 {
            *velocity += up * ((height - self.height_last_frame) / cx.delta_time);
        }
        self.height_last_frame = height;
    }

    fn cling_velocity(&mut self, velocity: &mut Vec3, cx: &mut MotorContext) {
        let config = cx.config;
        let settings = &config.wall_run;
        let normal = cx.wall().hit_normal;

        *velocity *= drag(settings.movement.friction, cx.delta_time);
        *velocity += cx.gravity().normalize_or_zero() * settings.cling_gravity * cx.delta_time;
        *velocity = project_on_plane(*velocity, normal);
    }

    // ========================================================================
    // Jumping
    // ========================================================================

    /// Apply the jump impulse for the current mode. Returns `false` if the
    /// jump was refused.
    fn perform_jump(&mut self, velocity: &mut Vec3, cx: &mut MotorContext) -> bool {
        let config = cx.config;
        let settings = &config.jump;
        let on_wall = self.current.is_on_wall();

        if on_wall && !cx.resources.try_spend_stamina(settings.wall_jump_stamina_cost) {
            debug!(mode = ?self.current, "wall jump refused, not enough stamina");
            self.jump.cancel();
            return false;
        }

        if self.crouch.should_crouch {
            self.uncrouch(cx);
        }

        let grounding = cx.motor.grounding();
        let up = cx.motor.up();
        let wall = *cx.wall();
        let jump_multiplier = cx.momentum().jump_multiplier;

        let mut direction = up;
        if grounding.found_any_ground && !grounding.is_stable_on_ground {
            direction = grounding.ground_normal;
        }

        cx.motor.force_unground(JUMP_UNGROUND_TIME);

        if on_wall {
            let blended = flatten(cx.input.camera_forward(), cx.motor.up())
                + wall.hit_normal * settings.wall_jump_normal_blend;
            let speed = velocity.length().max(settings.jump_speed);
            let launch = blended.normalize_or_zero() * speed;

            // Looking into the wall: bounce off it instead
            *velocity = if blended.dot(wall.hit_normal) < 0.0 {
                reflect(launch, wall.hit_normal)
            } else {
                launch
            };
            *velocity += up * settings.wall_jump_vertical_modifier * jump_multiplier;
        } else {
            *velocity += direction.normalize_or_zero() * settings.jump_speed * jump_multiplier
                - project(*velocity, up);
        }

        self.jump.consume();
        debug!(mode = ?self.current, ?velocity, "jumped");

        cx.emit(MotorEvent::Jumped);
        cx.emit(MotorEvent::AnimatorJumpTrigger);
        cx.emit(MotorEvent::AnimatorBool {
            param: AnimatorParam::IsGrounded,
            value: false,
        });
        cx.emit(MotorEvent::Audio(if on_wall {
            AudioCue::WallJump
        } else {
            AudioCue::Jump
        }));
        let surface = if grounding.found_any_ground {
            Some(grounding.surface.unwrap_or(SurfaceId::DEFAULT))
        } else if wall.is_touched() {
            Some(wall.surface.unwrap_or(SurfaceId::DEFAULT))
        } else {
            None
        };
        if let Some(surface) = surface {
            cx.emit(MotorEvent::Audio(AudioCue::SurfaceJump(surface)));
        }

        self.request_state_change(MoveMode::Airborne);
        true
    }

    // ========================================================================
    // Walls
    // ========================================================================

    /// Request Airborne if the wall bends away from (or into) the direction
    /// of travel faster than allowed.
    fn check_wall_curvature(&mut self, cx: &mut MotorContext) {
        let config = cx.config;
        let settings = &config.wall_run;
        let delta = cx.walls.normal_delta();
        if delta <= 0.0 {
            return;
        }

        let travel = flatten(cx.motor.velocity(), cx.motor.up()).normalize_or_zero();
        let dot = travel.dot(cx.wall().hit_normal);
        let limit = if dot > 0.0 {
            settings.max_outer_angle_change
        } else if dot < 0.0 {
            settings.max_inner_angle_change
        } else {
            return;
        };

        if delta > limit {
            debug!(delta, curving_out = dot > 0.0, "wall curves too sharply");
            self.request_state_change(MoveMode::Airborne);
        }
    }

    /// Wall mode the character may enter from Airborne this tick, if any.
    fn wall_candidate(&self, cx: &MotorContext) -> Option<MoveMode> {
        let settings = &cx.config.wall_run;
        let time_airborne = self.time_in_state(cx.now);
        if time_airborne <= settings.cooldown {
            return None;
        }

        let wall = cx.wall();
        if !wall.is_valid() || !wall.grippable {
            return None;
        }

        // Refuse to run the same wall direction twice in a row
        let direction = flatten(-wall.hit_normal, cx.motor.up());
        if time_airborne < settings.same_side_cooldown
            && !self.has_grounded_since_last_wall_run
            && angle_deg(self.last_ran_direction, direction) < settings.repeat_limit_angle
        {
            debug!(time_airborne, "same-side wall run refused");
            return None;
        }

        if !cx.resources.can_spend_stamina(WALL_STAMINA_UNIT) {
            return None;
        }

        let look_angle = wall.look_angle(cx.input.camera_forward(), cx.motor.up());
        if look_angle <= settings.cling_angle_limit && cx.unlocks.can_wall_cling {
            Some(MoveMode::Clinging)
        } else if look_angle < settings.wallrun_angle_limit && cx.unlocks.can_wall_run {
            Some(MoveMode::WallRunning)
        } else {
            None
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn change_state(&mut self, next: MoveMode, cx: &mut MotorContext) -> Transition {
        if self.current == MoveMode::WallRunning {
            cx.emit(MotorEvent::AnimatorBool {
                param: AnimatorParam::Wallrunning,
                value: false,
            });
        }

        let wall = *cx.wall();
        let mut grounding = None;
        match next {
            MoveMode::Grounded => {
                let report = cx.motor.grounding();
                let hard = report.is_stable_on_ground;
                grounding = Some(Grounding {
                    hard,
                    normal: report.ground_normal,
                });
                if hard {
                    self.has_grounded_since_last_wall_run = true;
                }
                self.jump.reset_consumed();
                self.crouch.mark_crouched_this_update();
            }
            MoveMode::Airborne => {
                cx.emit(MotorEvent::AnimatorBool {
                    param: AnimatorParam::IsGrounded,
                    value: false,
                });
            }
            MoveMode::WallRunning | MoveMode::Clinging => {
                grounding = Some(Grounding {
                    hard: true,
                    normal: wall.hit_normal,
                });
                self.has_grounded_since_last_wall_run = false;
                self.last_ran_direction =
                    flatten(-wall.hit_normal, cx.motor.up()).normalize_or_zero();
                self.wall_side = wall.side(cx.motor.right());
                self.jump.reset_consumed();

                if next == MoveMode::WallRunning {
                    cx.emit(MotorEvent::Audio(AudioCue::BeginWallRun));
                    cx.emit(MotorEvent::AnimatorBool {
                        param: AnimatorParam::Wallrunning,
                        value: true,
                    });
                } else if flatten(self.velocity_at_frame_start, cx.motor.up()).length()
                    > CLING_SCRAPE_SPEED
                {
                    cx.emit(MotorEvent::Audio(AudioCue::ClingStart));
                }
            }
            MoveMode::Swimming => {}
        }

        let from = self.current;
        self.time_entered = cx.now;
        self.height_last_frame = 0.0;
        self.velocity_on_enter = cx.motor.velocity();
        self.previous = from;
        self.current = next;

        debug!(?from, to = ?next, hard = grounding.map(|g| g.hard), "move mode changed");
        cx.emit(MotorEvent::ModeChanged { from, to: next });
        if let Some(g) = grounding {
            cx.emit(MotorEvent::Grounded {
                hard: g.hard,
                normal: g.normal,
            });
            cx.emit(MotorEvent::AnimatorBool {
                param: AnimatorParam::IsGrounded,
                value: true,
            });
        }

        Transition {
            from,
            to: next,
            grounding,
        }
    }
}

#[inline]
fn drag(friction: f32, delta_time: f32) -> f32 {
    1.0 / (1.0 + friction * delta_time)
}

/// Ground contact good enough to jump from under the slip policy.
fn can_jump_from_ground(grounding: &GroundingReport, settings: &JumpSettings) -> bool {
    if settings.allow_jumping_when_slipping {
        grounding.found_any_ground
    } else {
        grounding.is_stable_on_ground
    }
}
