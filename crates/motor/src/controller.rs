//! Motor controller.
//!
//! This is the main entry point for character movement. The host's collision
//! solver calls the phase methods in a fixed order each physics tick:
//!
//! ```text
//! set_inputs -> before_update -> update_rotation -> update_velocity
//!            -> (collision solve) -> after_update
//! ```
//!
//! Each phase goes to the [`MoveStateMachine`] unless an active ability is
//! blocking, then to the active abilities in registration order, stopping
//! after the first one that is not passthrough.

use glam::{Quat, Vec3};
use tracing::{debug, trace};

use crate::ability::{Ability, AbilityBehavior, AbilityKind, AbilityVariant, SiblingStop};
use crate::context::MotorContext;
use crate::events::{EventQueue, MotorEvent};
use crate::host::{ActorResources, CharacterMotor, ColliderId, HitReport};
use crate::math::{flatten, look_rotation, slerp_direction};
use crate::movement::{
    InputButtons, InputFrame, MotorConfig, MotorInput, MoveMode, MoveStateMachine, Transition,
    Unlocks,
};
use crate::snapshot::MovementSnapshot;
use crate::wall::{WallProbe, WallTracker};

/// Disjoint borrows of the controller for one phase.
struct Phase<'a> {
    movement: &'a mut MoveStateMachine,
    abilities: &'a mut [Ability],
    cx: MotorContext<'a>,
}

/// Owns the movement state machine and the ability stack for one character.
///
/// # Example
///
/// ```ignore
/// let mut controller = MotorController::new(config, Unlocks::all(), vitals, probe);
///
/// // Each physics tick:
/// controller.set_inputs(input, &mut motor);
/// controller.before_update(delta_time, &mut motor);
/// controller.update_rotation(&mut rotation, &mut motor);
/// controller.update_velocity(&mut velocity, &mut motor);
/// // ...solve collisions...
/// controller.after_update(&mut motor);
/// ```
pub struct MotorController<R: ActorResources, W: WallProbe> {
    config: MotorConfig,
    unlocks: Unlocks,
    movement: MoveStateMachine,

    /// Registration order is priority order.
    abilities: Vec<Ability>,

    walls: WallTracker,
    probe: W,
    resources: R,
    events: EventQueue,

    input: InputFrame,
    previous_buttons: InputButtons,

    ignored_colliders: Vec<ColliderId>,
    zero_velocity_requested: bool,

    now: f32,
    delta_time: f32,
}

impl<R: ActorResources, W: WallProbe> MotorController<R, W> {
    /// Create a controller with abilities registered in `config.abilities.order`.
    pub fn new(config: MotorConfig, unlocks: Unlocks, resources: R, probe: W) -> Self {
        let abilities = config
            .abilities
            .order
            .iter()
            .map(|&kind| Ability::new(kind, &config.abilities))
            .collect();
        debug!(order = ?config.abilities.order, "motor controller created");

        Self {
            config,
            unlocks,
            movement: MoveStateMachine::default(),
            abilities,
            walls: WallTracker::default(),
            probe,
            resources,
            events: EventQueue::new(),
            input: InputFrame::default(),
            previous_buttons: InputButtons::default(),
            ignored_colliders: Vec::new(),
            zero_velocity_requested: false,
            now: 0.0,
            delta_time: 0.0,
        }
    }

    fn phase<'a>(&'a mut self, motor: &'a mut dyn CharacterMotor) -> Phase<'a> {
        let Self {
            config,
            unlocks,
            movement,
            abilities,
            walls,
            resources,
            events,
            input,
            ignored_colliders,
            now,
            delta_time,
            ..
        } = self;

        Phase {
            movement,
            abilities,
            cx: MotorContext {
                motor,
                resources,
                events,
                input,
                walls,
                unlocks,
                config,
                ignored_colliders,
                now: *now,
                delta_time: *delta_time,
            },
        }
    }

    /// Whether an active ability hides the state machine this tick.
    fn is_blocked(&self) -> bool {
        self.abilities.iter().any(|a| {
            let a = a.behavior();
            a.is_active() && !a.flags().passthrough
        })
    }

    // ========================================================================
    // Phases
    // ========================================================================

    /// Sample this tick's input.
    pub fn set_inputs(&mut self, input: MotorInput, motor: &mut dyn CharacterMotor) {
        self.input = InputFrame::from_edges(self.previous_buttons, input);
        self.previous_buttons = input.buttons;

        let blocked = self.is_blocked();
        let Phase {
            movement,
            abilities,
            mut cx,
        } = self.phase(motor);

        if !blocked {
            movement.process_input(&mut cx);
        }
        for ability in abilities.iter_mut() {
            ability.behavior_mut().set_inputs(movement, &mut cx);
        }
    }

    /// Advance the clock, start abilities and refresh the wall probe.
    pub fn before_update(&mut self, delta_time: f32, motor: &mut dyn CharacterMotor) {
        self.now += delta_time;
        self.delta_time = delta_time;

        let blocked = self.is_blocked();
        {
            let Phase {
                movement,
                abilities,
                mut cx,
            } = self.phase(motor);

            if !blocked {
                movement.before_update(&mut cx);
            }
            start_abilities(abilities, movement, &mut cx);
            fan_out(abilities, movement, &mut cx, |a, m, cx| a.before_update(m, cx));
        }

        let report = self.probe.probe(&*motor);
        self.walls.update(report);
    }

    /// Turn toward the camera, then let abilities override.
    pub fn update_rotation(&mut self, rotation: &mut Quat, motor: &mut dyn CharacterMotor) {
        let settings = &self.config.controller;
        let sharpness = settings.orientation_sharpness;
        let orient_towards_gravity = settings.orient_towards_gravity;
        let gravity = settings.gravity;

        let look = flatten(self.input.camera_forward(), motor.up()).normalize_or_zero();
        if look != Vec3::ZERO && sharpness > 0.0 {
            let t = 1.0 - (-sharpness * self.delta_time).exp();
            let forward = slerp_direction(motor.forward(), look, t);
            *rotation = look_rotation(forward, motor.up());
        }

        let Phase {
            movement,
            abilities,
            mut cx,
        } = self.phase(motor);
        fan_out(abilities, movement, &mut cx, |a, m, cx| {
            a.update_rotation(rotation, m, cx)
        });

        if orient_towards_gravity {
            let target = -gravity.normalize_or_zero();
            if target != Vec3::ZERO {
                let up = (*rotation * Vec3::Y).normalize();
                *rotation = Quat::from_rotation_arc(up, target) * *rotation;
            }
        }
    }

    /// Compute this tick's velocity.
    pub fn update_velocity(&mut self, velocity: &mut Vec3, motor: &mut dyn CharacterMotor) {
        if self.zero_velocity_requested {
            self.zero_velocity_requested = false;
            *velocity = Vec3::ZERO;
            return;
        }

        let blocked = self.is_blocked();
        let Phase {
            movement,
            abilities,
            mut cx,
        } = self.phase(motor);

        if blocked {
            movement.skip_velocity_update();
        } else {
            movement.update_velocity(velocity, &mut cx);
        }
        fan_out(abilities, movement, &mut cx, |a, m, cx| {
            a.update_velocity(velocity, m, cx)
        });

        trace!(?velocity, blocked, "controller velocity");
    }

    /// Settle the tick after the solver moved the character. Returns the mode
    /// change applied this tick, if any.
    pub fn after_update(&mut self, motor: &mut dyn CharacterMotor) -> Option<Transition> {
        let blocked = self.is_blocked();
        let Phase {
            movement,
            abilities,
            mut cx,
        } = self.phase(motor);

        let transition = if blocked {
            movement.check_current_state(&mut cx)
        } else {
            movement.after_update(&mut cx)
        };

        if let Some(grounding) = transition.and_then(|t| t.grounding) {
            for ability in abilities.iter_mut() {
                ability
                    .behavior_mut()
                    .on_grounded(grounding.hard, movement, &mut cx);
            }
        }

        fan_out(abilities, movement, &mut cx, |a, m, cx| a.after_update(m, cx));
        transition
    }

    // ========================================================================
    // Solver callbacks
    // ========================================================================

    pub fn on_ground_hit(&mut self, hit: &HitReport, motor: &mut dyn CharacterMotor) {
        let Phase {
            movement,
            abilities,
            mut cx,
        } = self.phase(motor);

        movement.on_ground_hit(hit);
        for ability in abilities.iter_mut() {
            ability.behavior_mut().on_ground_hit(hit, movement, &mut cx);
        }
    }

    pub fn on_movement_hit(&mut self, hit: &HitReport, motor: &mut dyn CharacterMotor) {
        let Phase {
            movement,
            abilities,
            mut cx,
        } = self.phase(motor);

        for ability in abilities.iter_mut() {
            ability.behavior_mut().on_movement_hit(hit, movement, &mut cx);
        }
    }

    pub fn post_grounding_update(&mut self, motor: &mut dyn CharacterMotor) {
        let Phase {
            movement,
            abilities,
            mut cx,
        } = self.phase(motor);
        fan_out(abilities, movement, &mut cx, |a, m, cx| {
            a.post_grounding_update(m, cx)
        });
    }

    pub fn on_discrete_collision(&mut self, collider: ColliderId, motor: &mut dyn CharacterMotor) {
        let Phase {
            movement,
            abilities,
            mut cx,
        } = self.phase(motor);
        fan_out(abilities, movement, &mut cx, |a, m, cx| {
            a.on_discrete_collision(collider, m, cx)
        });
    }

    /// Let abilities override the solver's stability verdict for a hit.
    pub fn process_hit_stability_report(
        &mut self,
        hit: &HitReport,
        is_stable: &mut bool,
        motor: &mut dyn CharacterMotor,
    ) {
        let Phase {
            movement,
            abilities,
            mut cx,
        } = self.phase(motor);
        fan_out(abilities, movement, &mut cx, |a, m, cx| {
            a.process_hit_stability_report(hit, is_stable, m, cx)
        });
    }

    pub fn is_collider_valid_for_collisions(&self, collider: ColliderId) -> bool {
        !self.ignored_colliders.contains(&collider)
    }

    pub fn ignore_collider(&mut self, collider: ColliderId) {
        if !self.ignored_colliders.contains(&collider) {
            self.ignored_colliders.push(collider);
        }
    }

    pub fn unignore_collider(&mut self, collider: ColliderId) {
        self.ignored_colliders.retain(|c| *c != collider);
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// One-shot velocity for the next update. Dropped while an ability blocks.
    pub fn add_velocity(&mut self, velocity: Vec3) {
        if !self.is_blocked() {
            self.movement.add_velocity(velocity);
        }
    }

    pub fn set_continuous_velocity(&mut self, velocity: Vec3) {
        self.movement.set_continuous_velocity(velocity);
    }

    /// Zero the velocity on the next update, skipping every handler.
    pub fn request_zero_velocity(&mut self) {
        self.zero_velocity_requested = true;
    }

    pub fn request_jump(&mut self) {
        self.movement.request_jump();
    }

    pub fn request_state_change(&mut self, mode: MoveMode) {
        self.movement.request_state_change(mode);
    }

    /// Whether a standing capsule fits at the character's position.
    pub fn can_stand(&mut self, motor: &mut dyn CharacterMotor) -> bool {
        self.phase(motor).cx.can_stand()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn config(&self) -> &MotorConfig {
        &self.config
    }

    pub fn movement(&self) -> &MoveStateMachine {
        &self.movement
    }

    pub fn mode(&self) -> MoveMode {
        self.movement.mode()
    }

    /// Controller clock in seconds.
    pub fn now(&self) -> f32 {
        self.now
    }

    pub fn input(&self) -> &InputFrame {
        &self.input
    }

    pub fn walls(&self) -> &WallTracker {
        &self.walls
    }

    pub fn unlocks(&self) -> &Unlocks {
        &self.unlocks
    }

    pub fn set_unlocks(&mut self, unlocks: Unlocks) {
        self.unlocks = unlocks;
    }

    pub fn resources(&self) -> &R {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut R {
        &mut self.resources
    }

    pub fn probe_mut(&mut self) -> &mut W {
        &mut self.probe
    }

    /// First registered ability of type `T`.
    pub fn ability<T: AbilityVariant>(&self) -> Option<&T> {
        self.abilities.iter().find_map(T::from_ability)
    }

    pub fn ability_mut<T: AbilityVariant>(&mut self) -> Option<&mut T> {
        self.abilities.iter_mut().find_map(T::from_ability_mut)
    }

    pub fn active_abilities(&self) -> impl Iterator<Item = AbilityKind> + '_ {
        self.abilities
            .iter()
            .map(Ability::behavior)
            .filter(|a| a.is_active())
            .map(|a| a.kind())
    }

    pub fn any_abilities_active(&self) -> bool {
        self.active_abilities().next().is_some()
    }

    /// Footsteps play unless an active ability suppresses them.
    pub fn plays_footsteps(&self) -> bool {
        self.abilities
            .iter()
            .map(Ability::behavior)
            .filter(|a| a.is_active())
            .all(|a| a.flags().plays_footsteps)
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Take every event raised since the last drain.
    pub fn drain_events(&mut self) -> impl Iterator<Item = MotorEvent> + '_ {
        self.events.drain()
    }

    /// Serializable view of the movement state.
    pub fn snapshot(&self, motor: &dyn CharacterMotor) -> MovementSnapshot {
        let jump = self.movement.jump();
        MovementSnapshot {
            time: self.now,
            mode: self.movement.mode(),
            previous_mode: self.movement.previous_mode(),
            time_in_state: self.movement.time_in_state(self.now),
            jump_requested: jump.is_requested(),
            jump_consumed: jump.is_consumed(),
            crouching: self.movement.is_crouching(),
            wall_side: self.movement.wall_side(),
            active_abilities: self.active_abilities().collect(),
            position: motor.position(),
            velocity: motor.velocity(),
        }
    }
}

/// Offer every ability the per-tick start check, in priority order.
///
/// A blocking ability cannot start while another blocking ability is active
/// unless its start stops that one.
fn start_abilities(abilities: &mut [Ability], movement: &mut MoveStateMachine, cx: &mut MotorContext) {
    for i in 0..abilities.len() {
        abilities[i].behavior_mut().passive_update(movement, cx);

        let candidate = abilities[i].behavior();
        let flags = candidate.flags();
        if !flags.self_starts || !candidate.can_start(&*movement, &*cx) {
            continue;
        }
        let kind = candidate.kind();
        let stop = if flags.stop_others {
            SiblingStop::All
        } else {
            candidate.stops_on_start()
        };

        let stoppable = |other: &dyn AbilityBehavior, movement: &MoveStateMachine, cx: &MotorContext| {
            other.is_active()
                && other.flags().self_starts
                && stops(stop, other.kind())
                && other.can_stop(movement, cx)
        };

        if !flags.passthrough {
            let blocked_by = abilities.iter().enumerate().find_map(|(j, other)| {
                let other = other.behavior();
                let blocks = j != i
                    && other.is_active()
                    && !other.flags().passthrough
                    && !stoppable(other, &*movement, &*cx);
                blocks.then(|| other.kind())
            });
            if let Some(blocker) = blocked_by {
                trace!(?kind, ?blocker, "ability start blocked");
                continue;
            }
        }

        if !abilities[i].behavior_mut().reserve(&*movement, cx) {
            trace!(?kind, "ability start refused");
            continue;
        }

        for (j, other) in abilities.iter_mut().enumerate() {
            let other = other.behavior_mut();
            if j != i && stoppable(&*other, &*movement, &*cx) {
                other.stop(movement, cx);
            }
        }

        abilities[i].behavior_mut().activate(movement, cx);
    }
}

fn stops(stop: SiblingStop, kind: AbilityKind) -> bool {
    match stop {
        SiblingStop::None => false,
        SiblingStop::All => true,
        SiblingStop::Kind(k) => k == kind,
    }
}

/// Run `hook` on active abilities in order, stopping after the first one
/// that is not passthrough.
fn fan_out(
    abilities: &mut [Ability],
    movement: &mut MoveStateMachine,
    cx: &mut MotorContext,
    mut hook: impl FnMut(&mut dyn AbilityBehavior, &mut MoveStateMachine, &mut MotorContext<'_>),
) {
    for ability in abilities.iter_mut() {
        let ability = ability.behavior_mut();
        if !ability.is_active() {
            continue;
        }
        let passthrough = ability.flags().passthrough;
        hook(&mut *ability, &mut *movement, &mut *cx);
        if !passthrough {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{AirJump, Dash, DashVariant, Slide, Vault};
    use crate::host::GroundingReport;
    use crate::resources::ActorVitals;
    use crate::test_support::{tick, TestMotor, TestWallProbe};

    type Controller = MotorController<ActorVitals, TestWallProbe>;

    const DT: f32 = 1.0 / 60.0;

    fn controller() -> Controller {
        MotorController::new(
            MotorConfig::default(),
            Unlocks::all(),
            ActorVitals::default(),
            TestWallProbe::default(),
        )
    }

    fn forward_input(buttons: u8) -> MotorInput {
        MotorInput {
            move_axis_forward: 1.0,
            move_world: Vec3::Z,
            buttons: InputButtons(buttons),
            ..MotorInput::default()
        }
    }

    #[test]
    fn test_state_machine_drives_without_abilities() {
        let mut c = controller();
        let mut motor = TestMotor::default();
        let input = MotorInput {
            move_world: Vec3::X,
            move_axis_right: 1.0,
            ..MotorInput::default()
        };

        tick(&mut c, &mut motor, input, DT);
        assert!(motor.velocity.x > 1.0);
        assert!(!c.any_abilities_active());
        assert_eq!(c.mode(), MoveMode::Grounded);
    }

    #[test]
    fn test_slide_starts_at_eight_meters_per_second() {
        let mut c = controller();
        let mut motor = TestMotor::default();
        motor.velocity = Vec3::new(0.0, 0.0, 8.0);
        // Strafing would pull velocity sideways if the state machine ran
        let input = MotorInput {
            move_world: Vec3::X,
            buttons: InputButtons(InputButtons::CROUCH),
            ..MotorInput::default()
        };

        tick(&mut c, &mut motor, input, DT);

        assert!(c.ability::<Slide>().is_some_and(|s| s.is_active()));
        assert_eq!(c.active_abilities().collect::<Vec<_>>(), vec![AbilityKind::Slide]);
        assert_eq!(c.mode(), MoveMode::Grounded);
        assert!(c.movement().is_crouching());
        assert!(motor.velocity.x.abs() < 1e-4);
        assert!(motor.velocity.z > 7.0);
        assert!(!c.plays_footsteps());
    }

    #[test]
    fn test_dash_and_dodge_are_invulnerable_for_their_whole_duration() {
        let mut c = controller();
        let mut motor = TestMotor::default();

        for expected in [DashVariant::Dash, DashVariant::Dodge] {
            tick(&mut c, &mut motor, forward_input(InputButtons::DASH), DT);
            assert_eq!(c.ability::<Dash>().map(|d| d.variant()), Some(expected));

            let mut ticks = 0;
            while c.ability::<Dash>().is_some_and(|d| d.is_active()) {
                assert!(c.resources().invulnerable);
                tick(&mut c, &mut motor, forward_input(0), DT);
                ticks += 1;
                assert!(ticks < 60);
            }
            assert!(!c.resources().invulnerable);

            // Past the dodge recharge but short of the dash recharge
            for _ in 0..36 {
                tick(&mut c, &mut motor, MotorInput::default(), DT);
            }
        }
    }

    #[test]
    fn test_dash_stops_slide() {
        let mut c = controller();
        let mut motor = TestMotor::default();
        motor.velocity = Vec3::new(0.0, 0.0, 8.0);
        tick(&mut c, &mut motor, forward_input(InputButtons::CROUCH), DT);
        assert!(c.ability::<Slide>().is_some_and(|s| s.is_active()));
        c.drain_events().for_each(drop);

        tick(
            &mut c,
            &mut motor,
            forward_input(InputButtons::CROUCH | InputButtons::DASH),
            DT,
        );
        assert_eq!(c.active_abilities().collect::<Vec<_>>(), vec![AbilityKind::Dash]);
        let events: Vec<_> = c.drain_events().collect();
        assert!(events.contains(&MotorEvent::AbilityStopped(AbilityKind::Slide)));
        assert!(events.contains(&MotorEvent::AbilityActivated(AbilityKind::Dash)));
    }

    #[test]
    fn test_blocking_ability_refuses_other_blocking_starts() {
        let mut c = controller();
        let mut motor = TestMotor::default();
        tick(&mut c, &mut motor, forward_input(InputButtons::DASH), DT);
        assert!(c.ability::<Dash>().is_some_and(|d| d.is_active()));

        // Wait out the unground window while the dash keeps going
        for _ in 0..20 {
            if c.mode() == MoveMode::Grounded {
                break;
            }
            tick(&mut c, &mut motor, forward_input(0), DT);
        }
        assert_eq!(c.mode(), MoveMode::Grounded);
        assert!(c.ability::<Dash>().is_some_and(|d| d.is_active()));

        // Fast enough to slide, but the dash is in charge
        tick(&mut c, &mut motor, forward_input(InputButtons::CROUCH), DT);
        assert!(!c.ability::<Slide>().is_some_and(|s| s.is_active()));
    }

    #[test]
    fn test_vault_takes_over_from_dash() {
        let mut c = controller();
        let mut motor = TestMotor::default();
        motor.world.add_box(Vec3::new(0.0, 0.75, 2.5), Vec3::new(5.0, 0.75, 2.0));
        motor.grounding = GroundingReport::airborne();
        motor.position = Vec3::new(0.0, 0.2, 0.0);

        tick(&mut c, &mut motor, MotorInput::default(), DT);
        assert_eq!(c.mode(), MoveMode::Airborne);
        motor.position = Vec3::new(0.0, 0.2, 0.0);
        c.drain_events().for_each(drop);

        tick(&mut c, &mut motor, forward_input(InputButtons::DASH), DT);
        assert_eq!(c.active_abilities().collect::<Vec<_>>(), vec![AbilityKind::Vault]);
        let events: Vec<_> = c.drain_events().collect();
        assert!(events.contains(&MotorEvent::AbilityStopped(AbilityKind::Dash)));
        assert!(!c.resources().invulnerable);
        assert!(!motor.collision_solving);
        assert!(c.ability::<Vault>().is_some_and(|v| v.target().y > 1.5));
    }

    #[test]
    fn test_air_jump_runs_on_top_of_state_machine() {
        let mut c = controller();
        let mut motor = TestMotor::default();
        motor.grounding = GroundingReport::airborne();
        for _ in 0..16 {
            tick(&mut c, &mut motor, MotorInput::default(), DT);
        }
        assert_eq!(c.mode(), MoveMode::Airborne);
        let stamina = c.resources().stamina.current();
        c.drain_events().for_each(drop);

        tick(&mut c, &mut motor, forward_input(InputButtons::JUMP), DT);
        assert!((motor.velocity.y - 10.0).abs() < 1e-3);
        // The state machine still steered toward the input
        assert!(motor.velocity.z > 0.0);
        assert_eq!(c.resources().stamina.current(), stamina - 1);
        assert_eq!(c.ability::<AirJump>().map(|a| a.jumps_consumed()), Some(1));

        let events: Vec<_> = c.drain_events().collect();
        assert!(events.contains(&MotorEvent::AbilityActivated(AbilityKind::AirJump)));
        assert!(events.contains(&MotorEvent::AbilityStopped(AbilityKind::AirJump)));
    }

    #[test]
    fn test_zero_velocity_request_is_one_shot() {
        let mut c = controller();
        let mut motor = TestMotor::default();
        motor.velocity = Vec3::new(5.0, 0.0, 0.0);

        c.request_zero_velocity();
        tick(&mut c, &mut motor, forward_input(0), DT);
        assert_eq!(motor.velocity, Vec3::ZERO);

        tick(&mut c, &mut motor, forward_input(0), DT);
        assert!(motor.velocity.z > 0.0);
    }

    #[test]
    fn test_add_velocity_dropped_while_blocked() {
        let mut c = controller();
        let mut motor = TestMotor::default();
        c.add_velocity(Vec3::new(0.0, 5.0, 0.0));
        assert!(c.movement().has_external_forces());

        let mut c = controller();
        motor.velocity = Vec3::new(0.0, 0.0, 8.0);
        tick(&mut c, &mut motor, forward_input(InputButtons::CROUCH), DT);
        c.add_velocity(Vec3::new(0.0, 5.0, 0.0));
        assert!(!c.movement().has_external_forces());
    }

    #[test]
    fn test_ignored_colliders() {
        let mut c = controller();
        let mut motor = TestMotor::default();
        c.ignore_collider(ColliderId(7));
        assert!(!c.is_collider_valid_for_collisions(ColliderId(7)));
        assert!(c.is_collider_valid_for_collisions(ColliderId(8)));

        // A ceiling that is ignored does not keep the character crouched
        motor.ceiling = Some(1.0);
        assert!(!c.can_stand(&mut motor));
        c.ignore_collider(crate::test_support::CEILING);
        assert!(c.can_stand(&mut motor));

        c.unignore_collider(ColliderId(7));
        assert!(c.is_collider_valid_for_collisions(ColliderId(7)));
    }

    #[test]
    fn test_faces_camera_direction() {
        let mut c = controller();
        let mut motor = TestMotor::default();
        let input = MotorInput {
            camera_forward: Vec3::X,
            ..MotorInput::default()
        };
        for _ in 0..120 {
            tick(&mut c, &mut motor, input, DT);
        }
        let forward = motor.rotation * Vec3::Z;
        assert!(forward.distance(Vec3::X) < 1e-2);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut c = controller();
        let mut motor = TestMotor::default();
        motor.velocity = Vec3::new(0.0, 0.0, 8.0);
        tick(&mut c, &mut motor, forward_input(InputButtons::CROUCH), DT);

        let snapshot = c.snapshot(&motor);
        assert_eq!(snapshot.mode, MoveMode::Grounded);
        assert!(snapshot.crouching);
        assert_eq!(snapshot.active_abilities, vec![AbilityKind::Slide]);
        assert_eq!(snapshot.velocity, motor.velocity);
    }
}
