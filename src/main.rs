//! Strider sandbox
//!
//! Runs the movement motor headless through a scripted obstacle course and
//! logs what it does. Pass a JSON config path to try other tunings.

use glam::{Quat, Vec3};
use strider_motor::sandbox::{BoxWorld, SandboxMotor, SandboxWallProbe};
use strider_motor::{
    ActorVitals, CharacterMotor, InputButtons, MotorConfig, MotorController, MotorEvent,
    MotorInput, Unlocks,
};

const TICK_RATE: f32 = 60.0;

/// One stretch of scripted input.
struct Phase {
    name: &'static str,
    seconds: f32,
    forward: f32,
    yaw_deg: f32,
    buttons: u8,
}

const SCRIPT: &[Phase] = &[
    Phase { name: "settle", seconds: 0.5, forward: 0.0, yaw_deg: 0.0, buttons: 0 },
    Phase { name: "run", seconds: 1.0, forward: 1.0, yaw_deg: 0.0, buttons: 0 },
    Phase { name: "jump", seconds: 0.1, forward: 1.0, yaw_deg: 0.0, buttons: InputButtons::JUMP },
    Phase { name: "air", seconds: 0.3, forward: 1.0, yaw_deg: 0.0, buttons: 0 },
    Phase { name: "air jump", seconds: 0.1, forward: 1.0, yaw_deg: 0.0, buttons: InputButtons::JUMP },
    Phase { name: "land", seconds: 1.0, forward: 1.0, yaw_deg: 0.0, buttons: 0 },
    Phase { name: "dash", seconds: 0.1, forward: 1.0, yaw_deg: 0.0, buttons: InputButtons::DASH },
    Phase { name: "recover", seconds: 0.6, forward: 1.0, yaw_deg: 0.0, buttons: 0 },
    Phase { name: "slide", seconds: 0.8, forward: 1.0, yaw_deg: 0.0, buttons: InputButtons::CROUCH },
    Phase { name: "stand", seconds: 0.4, forward: 0.0, yaw_deg: 0.0, buttons: 0 },
    Phase { name: "face wall", seconds: 0.3, forward: 0.0, yaw_deg: 90.0, buttons: 0 },
    Phase { name: "jump at ledge", seconds: 0.1, forward: 1.0, yaw_deg: 90.0, buttons: InputButtons::JUMP },
    Phase { name: "vault", seconds: 1.5, forward: 1.0, yaw_deg: 90.0, buttons: 0 },
];

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("strider=debug".parse()?))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!("Loading motor config from {path}");
            MotorConfig::from_json_str(&std::fs::read_to_string(&path)?)?
        }
        None => MotorConfig::default(),
    };

    let mut motor = SandboxMotor::new(course(), Vec3::ZERO);
    let mut controller = MotorController::new(
        config,
        Unlocks::all(),
        ActorVitals::default(),
        SandboxWallProbe::default(),
    );

    let dt = 1.0 / TICK_RATE;
    let mut hits = Vec::new();

    for phase in SCRIPT {
        tracing::info!("Phase: {}", phase.name);
        let ticks = (phase.seconds * TICK_RATE).round() as u32;
        for _ in 0..ticks {
            let input = script_input(phase, &motor);
            controller.set_inputs(input, &mut motor);
            controller.before_update(dt, &mut motor);

            let mut rotation = motor.rotation();
            controller.update_rotation(&mut rotation, &mut motor);
            motor.set_rotation(rotation);

            let mut velocity = motor.velocity();
            controller.update_velocity(&mut velocity, &mut motor);

            hits.clear();
            motor.step(velocity, dt, &mut hits);
            controller.post_grounding_update(&mut motor);
            for hit in &hits {
                if hit.is_stable {
                    controller.on_ground_hit(hit, &mut motor);
                } else {
                    controller.on_movement_hit(hit, &mut motor);
                }
            }

            controller.after_update(&mut motor);
            controller.resources_mut().stamina.update(dt);

            for event in controller.drain_events() {
                log_event(&event);
            }
        }

        tracing::debug!(
            position = ?motor.position(),
            velocity = ?motor.velocity(),
            mode = ?controller.mode(),
            stamina = controller.resources().stamina.current(),
            "End of {}",
            phase.name
        );
    }

    let snapshot = controller.snapshot(&motor);
    let bytes = snapshot.encode()?;
    tracing::info!(
        "Final state {:?} at {:?}, snapshot is {} bytes",
        snapshot.mode,
        snapshot.position,
        bytes.len()
    );

    Ok(())
}

/// Floor, a long wall to the left of the run, and a ledge to the right.
fn course() -> BoxWorld {
    let mut world = BoxWorld::new();

    // Floor
    world.add_box(Vec3::new(0.0, -0.5, 0.0), Vec3::new(100.0, 0.5, 100.0));

    // Wall along the run
    world.add_box(Vec3::new(-1.5, 2.5, 20.0), Vec3::new(0.25, 2.5, 20.0));

    // Ledge box, 1.5m tall
    world.add_box(Vec3::new(8.0, 0.75, 30.0), Vec3::new(3.0, 0.75, 20.0));

    world
}

fn script_input(phase: &Phase, motor: &SandboxMotor) -> MotorInput {
    let camera_forward = Quat::from_rotation_y(phase.yaw_deg.to_radians()) * Vec3::Z;
    MotorInput {
        move_axis_forward: phase.forward,
        move_axis_right: 0.0,
        move_world: camera_forward * phase.forward,
        camera_forward,
        camera_position: motor.position() + Vec3::Y * 1.6,
        buttons: InputButtons(phase.buttons),
    }
}

fn log_event(event: &MotorEvent) {
    match event {
        MotorEvent::ModeChanged { from, to } => tracing::info!("Mode {from:?} -> {to:?}"),
        MotorEvent::AbilityActivated(kind) => tracing::info!("Ability started: {kind:?}"),
        MotorEvent::AbilityStopped(kind) => tracing::info!("Ability stopped: {kind:?}"),
        other => tracing::debug!("{other:?}"),
    }
}
