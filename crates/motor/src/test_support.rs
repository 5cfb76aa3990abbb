//! Scripted collaborators for unit tests.

use glam::{Quat, Vec3};

use crate::context::MotorContext;
use crate::controller::MotorController;
use crate::events::EventQueue;
use crate::host::{
    ActorResources, Capsule, CharacterMotor, ColliderId, GroundingReport, HitReport, ProbeBuffer,
    RayHit,
};
use crate::movement::{InputButtons, InputFrame, MotorConfig, MotorInput, Transition, Unlocks};
use crate::resources::{ActorVitals, StaminaPool};
use crate::sandbox::BoxWorld;
use crate::wall::{WallProbe, WallReport, WallTracker};

/// Collider reported by the scripted ceiling.
pub const CEILING: ColliderId = ColliderId(99);

/// Motor whose state is set directly by the test.
///
/// Grounding is whatever the test assigns; geometry queries go to `world`,
/// plus an optional flat ceiling at `ceiling` meters.
#[derive(Debug, Clone)]
pub struct TestMotor {
    pub grounding: GroundingReport,
    pub position: Vec3,
    pub velocity: Vec3,
    pub rotation: Quat,
    pub capsule: Capsule,
    pub ceiling: Option<f32>,
    pub world: BoxWorld,
    pub collision_solving: bool,
    unground_timer: f32,
}

impl Default for TestMotor {
    fn default() -> Self {
        Self {
            grounding: GroundingReport::stable(Vec3::Y),
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            capsule: Capsule {
                radius: 0.4,
                height: 1.8,
            },
            ceiling: None,
            world: BoxWorld::new(),
            collision_solving: true,
            unground_timer: 0.0,
        }
    }
}

impl TestMotor {
    pub fn force_unground_for(&mut self, seconds: f32) {
        self.unground_timer = seconds;
    }

    pub fn must_unground(&self) -> bool {
        self.unground_timer > 0.0
    }

    /// Advance the unground timer.
    pub fn tick(&mut self, delta_time: f32) {
        self.unground_timer = (self.unground_timer - delta_time).max(0.0);
    }
}

impl CharacterMotor for TestMotor {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn capsule(&self) -> Capsule {
        self.capsule
    }

    fn grounding(&self) -> GroundingReport {
        self.grounding
    }

    fn must_unground(&self) -> bool {
        TestMotor::must_unground(self)
    }

    fn force_unground(&mut self, seconds: f32) {
        self.force_unground_for(seconds);
    }

    fn set_capsule_height(&mut self, height: f32) {
        self.capsule.height = height;
    }

    fn set_collision_solving(&mut self, enabled: bool) {
        self.collision_solving = enabled;
    }

    fn character_overlap(&self, position: Vec3, height: f32, hits: &mut ProbeBuffer) -> usize {
        let (min, max) = crate::sandbox::character_bounds(position, self.capsule.radius, height);
        self.world.overlap(min, max, hits);
        if let Some(ceiling) = self.ceiling {
            if position.y + height > ceiling {
                let _ = hits.try_push(CEILING);
            }
        }
        hits.len()
    }

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        self.world.raycast(origin, direction, max_distance)
    }
}

/// Wall probe that returns whatever report the test set.
#[derive(Debug, Clone)]
pub struct TestWallProbe {
    pub report: WallReport,
}

impl Default for TestWallProbe {
    fn default() -> Self {
        Self {
            report: WallReport::none(),
        }
    }
}

impl WallProbe for TestWallProbe {
    fn probe(&mut self, _motor: &dyn CharacterMotor) -> WallReport {
        self.report
    }
}

/// Everything a [`MotorContext`] borrows, owned in one place.
pub struct Harness {
    pub motor: TestMotor,
    pub resources: ActorVitals,
    pub events: EventQueue,
    pub input: InputFrame,
    pub walls: WallTracker,
    pub unlocks: Unlocks,
    pub config: MotorConfig,
    pub ignored: Vec<ColliderId>,
    pub now: f32,
    pub dt: f32,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            motor: TestMotor::default(),
            resources: ActorVitals::new(StaminaPool::new(5)),
            events: EventQueue::new(),
            input: InputFrame::default(),
            walls: WallTracker::default(),
            unlocks: Unlocks::all(),
            config: MotorConfig::default(),
            ignored: Vec::new(),
            now: 0.0,
            dt: 1.0 / 60.0,
        }
    }

    pub fn cx(&mut self) -> MotorContext<'_> {
        MotorContext {
            motor: &mut self.motor,
            resources: &mut self.resources,
            events: &mut self.events,
            input: &self.input,
            walls: &self.walls,
            unlocks: &self.unlocks,
            config: &self.config,
            ignored_colliders: &self.ignored,
            now: self.now,
            delta_time: self.dt,
        }
    }

    /// Hold `button`, producing a down edge even if it was already held.
    pub fn press(&mut self, button: u8) {
        let mut previous = self.input.input.buttons;
        previous.set(button, false);
        let mut input = self.input.input;
        input.buttons.set(button, true);
        self.input = InputFrame::from_edges(previous, input);
    }

    /// Let go of `button`, producing an up edge.
    pub fn release(&mut self, button: u8) {
        let mut previous = self.input.input.buttons;
        previous.set(button, true);
        let mut input = self.input.input;
        input.buttons.set(button, false);
        self.input = InputFrame::from_edges(previous, input);
    }

    /// Replace the held buttons, with edges against the current ones.
    pub fn set_buttons(&mut self, buttons: u8) {
        let previous = self.input.input.buttons;
        let mut input = self.input.input;
        input.buttons = InputButtons(buttons);
        self.input = InputFrame::from_edges(previous, input);
    }

    pub fn hit(&self, normal: Vec3, is_stable: bool) -> HitReport {
        HitReport {
            collider: ColliderId(1),
            normal,
            point: self.motor.position,
            is_stable,
        }
    }
}

/// Run one full controller tick against a [`TestMotor`].
///
/// The motor moves by `velocity * delta_time` with no collision; grounding
/// stays whatever the test set.
pub fn tick<R: ActorResources, W: WallProbe>(
    controller: &mut MotorController<R, W>,
    motor: &mut TestMotor,
    input: MotorInput,
    delta_time: f32,
) -> Option<Transition> {
    controller.set_inputs(input, motor);
    controller.before_update(delta_time, motor);

    let mut rotation = motor.rotation;
    controller.update_rotation(&mut rotation, motor);
    motor.rotation = rotation;

    let mut velocity = motor.velocity;
    controller.update_velocity(&mut velocity, motor);
    motor.velocity = velocity;
    motor.position += velocity * delta_time;
    motor.tick(delta_time);

    controller.after_update(motor)
}
