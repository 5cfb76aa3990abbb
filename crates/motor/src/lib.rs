//! Strider Movement Motor
//!
//! A tick-driven character movement state machine with layered abilities,
//! meant to sit on top of a kinematic capsule collision solver.
//!
//! # Architecture
//!
//! The motor is split into three layers:
//!
//! - **Movement**: the [`MoveStateMachine`] owns the movement mode
//!   (grounded, airborne, wall running, clinging), the per-mode velocity
//!   laws, jumping and crouching
//! - **Abilities**: air jump, dash, slide and vault, each able to start
//!   itself and override the state machine's velocity while active
//! - **Controller**: the [`MotorController`] fans each solver phase out to
//!   the state machine and the abilities in priority order
//!
//! The collision solver, wall detection and the actor's stamina are external
//! and plug in through [`CharacterMotor`], [`WallProbe`] and
//! [`ActorResources`]. Side effects (audio, camera shake, animator) are
//! emitted as [`MotorEvent`]s.

pub mod ability;
pub mod context;
pub mod controller;
pub mod curve;
pub mod error;
pub mod events;
pub mod host;
pub mod math;
pub mod movement;
pub mod resources;
pub mod sandbox;
pub mod snapshot;
pub mod wall;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use ability::{Ability, AbilityBehavior, AbilityKind, AirJump, Dash, DashVariant, Slide, Vault};
pub use context::MotorContext;
pub use controller::MotorController;
pub use error::{ConfigError, SnapshotError};
pub use events::{EventQueue, MotorEvent};
pub use host::{ActorResources, CharacterMotor, ColliderId, GroundingReport, HitReport, SurfaceId};
pub use movement::{InputButtons, MotorConfig, MotorInput, MoveMode, MoveStateMachine, Unlocks};
pub use resources::{ActorVitals, StaminaPool};
pub use snapshot::MovementSnapshot;
pub use wall::{WallProbe, WallReport};
