//! Base movement: modes, velocity laws, jumping and crouching.
//!
//! The [`MoveStateMachine`] owns the movement mode and computes velocity for
//! each of them:
//!
//! - Grounded: acceleration toward the input direction, tangent to the ground
//! - Airborne: air control, gravity and drag
//! - WallRunning: constant-speed travel along a wall with a height curve
//! - Clinging: slow slide down a wall the player is facing
//! - Swimming: placeholder mode with its own tuning but no velocity law
//!
//! Abilities in [`crate::ability`] layer on top of this and may override the
//! velocity it produces.

mod config;
mod crouch;
mod input;
mod jump;
mod state_machine;

pub use config::{
    AbilityFlags, AbilitySettings, AirJumpSettings, ControllerSettings, CrouchSettings,
    DashAbilitySettings, DashSettings, JumpSettings, MotorConfig, MoveSettings, SlideSettings,
    Unlocks, VaultSettings, WallRunSettings,
};
pub use crouch::CrouchState;
pub use input::{InputButtons, InputFrame, MotorInput};
pub use jump::JumpBuffer;
pub use state_machine::{Grounding, MoveMode, MoveStateMachine, Transition};
