//! Interfaces to the systems the motor depends on but does not own.
//!
//! The host's capsule collision solver implements [`CharacterMotor`] and
//! drives the [`crate::MotorController`] phases each physics tick. Wall
//! detection and the actor's resources (stamina, momentum, health flags) are
//! injected as [`WallProbe`] and [`ActorResources`].

use arrayvec::ArrayVec;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Maximum number of colliders reported by a single overlap query.
pub const PROBE_CAPACITY: usize = 8;

/// Identifier for a collider in the host's world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ColliderId(pub u32);

/// Identifier for a physical surface type (used for audio and grip lookups).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SurfaceId(pub u32);

impl SurfaceId {
    /// Fallback surface when a collider carries no surface data.
    pub const DEFAULT: Self = Self(0);
}

/// Reusable buffer for overlap results.
pub type ProbeBuffer = ArrayVec<ColliderId, PROBE_CAPACITY>;

/// Ground probing result for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundingReport {
    /// Touching ground that is flat enough to stand on.
    pub is_stable_on_ground: bool,

    /// Touching any ground at all, stable or not.
    pub found_any_ground: bool,

    /// Normal of the ground surface. `Vec3::Y` when nothing was found.
    pub ground_normal: Vec3,

    /// Surface type of the ground, if any.
    pub surface: Option<SurfaceId>,

    /// Collider that was hit, if any.
    pub collider: Option<ColliderId>,
}

impl Default for GroundingReport {
    fn default() -> Self {
        Self::airborne()
    }
}

impl GroundingReport {
    /// Nothing below the character.
    pub fn airborne() -> Self {
        Self {
            is_stable_on_ground: false,
            found_any_ground: false,
            ground_normal: Vec3::Y,
            surface: None,
            collider: None,
        }
    }

    /// Standing on stable ground with the given normal.
    pub fn stable(normal: Vec3) -> Self {
        Self {
            is_stable_on_ground: true,
            found_any_ground: true,
            ground_normal: normal,
            surface: Some(SurfaceId::DEFAULT),
            collider: None,
        }
    }

    /// Touching ground that is too steep to stand on.
    pub fn slipping(normal: Vec3) -> Self {
        Self {
            is_stable_on_ground: false,
            found_any_ground: true,
            ground_normal: normal,
            surface: Some(SurfaceId::DEFAULT),
            collider: None,
        }
    }
}

/// A collision reported by the solver while moving or probing ground.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitReport {
    pub collider: ColliderId,
    pub normal: Vec3,
    pub point: Vec3,
    /// Whether the solver considers the hit surface stable ground.
    pub is_stable: bool,
}

/// Result of a ray query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
    pub collider: ColliderId,
    pub surface: SurfaceId,
}

/// Capsule dimensions of the character.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capsule {
    pub radius: f32,
    pub height: f32,
}

/// The capsule collision solver that moves the character through the world.
///
/// The motor owns position and collision; the controller only ever proposes
/// velocity and rotation, and asks for geometry queries.
pub trait CharacterMotor {
    /// Feet position in world space.
    fn position(&self) -> Vec3;

    /// Velocity after the last solve.
    fn velocity(&self) -> Vec3;

    fn rotation(&self) -> Quat;

    fn up(&self) -> Vec3 {
        self.rotation() * Vec3::Y
    }

    fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::Z
    }

    fn right(&self) -> Vec3 {
        self.rotation() * Vec3::X
    }

    fn capsule(&self) -> Capsule;

    fn grounding(&self) -> GroundingReport;

    /// Whether ground snapping is currently suppressed.
    fn must_unground(&self) -> bool;

    /// Skip ground probing and snapping for `seconds`.
    fn force_unground(&mut self, seconds: f32);

    /// Resize the capsule, keeping the feet in place.
    fn set_capsule_height(&mut self, height: f32);

    /// Enable or disable collision solving against the world.
    fn set_collision_solving(&mut self, enabled: bool);

    /// Colliders overlapping a capsule of `height` placed at `position`.
    ///
    /// Fills `hits` (at most [`PROBE_CAPACITY`]) and returns how many were found.
    fn character_overlap(&self, position: Vec3, height: f32, hits: &mut ProbeBuffer) -> usize;

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit>;

    /// Velocity needed to reach `to` from `from` in exactly `delta_time`.
    fn velocity_for_move(&self, from: Vec3, to: Vec3, delta_time: f32) -> Vec3 {
        if delta_time <= 0.0 {
            return Vec3::ZERO;
        }
        (to - from) / delta_time
    }
}

/// Momentum-derived scalars supplied by the actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Momentum {
    pub speed_multiplier: f32,
    pub jump_multiplier: f32,
}

impl Default for Momentum {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            jump_multiplier: 1.0,
        }
    }
}

/// Resources owned by the actor that movement consumes.
///
/// Stamina uses reservation semantics: `try_spend_stamina` either deducts the
/// full cost and returns `true`, or leaves the balance untouched.
pub trait ActorResources {
    fn can_spend_stamina(&self, cost: u32) -> bool;

    fn try_spend_stamina(&mut self, cost: u32) -> bool;

    fn momentum(&self) -> Momentum;

    fn set_invulnerable(&mut self, invulnerable: bool);
}
