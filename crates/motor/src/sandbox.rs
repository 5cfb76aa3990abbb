//! Analytic box world for running the motor without a physics engine.
//!
//! Geometry is limited to axis-aligned boxes, and the character is treated as
//! an axis-aligned box the size of its capsule. That is enough to exercise
//! grounding, walls, ceilings and ledges from the sandbox binary and from
//! tests, without pulling in a collision library.

use glam::{Quat, Vec3};
use tracing::trace;

use crate::host::{
    Capsule, CharacterMotor, ColliderId, GroundingReport, HitReport, ProbeBuffer, RayHit,
    SurfaceId,
};
use crate::math::angle_deg;
use crate::wall::{WallProbe, WallReport, WallStatus};

/// Pushes resolved positions this far clear of the surface they hit.
const SKIN: f32 = 1e-4;

/// Ground probes start this far above the feet.
const PROBE_LIFT: f32 = 0.05;

/// An axis-aligned solid box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBox {
    pub id: ColliderId,
    pub min: Vec3,
    pub max: Vec3,
    pub surface: SurfaceId,
}

impl WorldBox {
    /// Strict overlap test; touching faces do not count.
    pub fn intersects(&self, min: Vec3, max: Vec3) -> bool {
        min.x < self.max.x
            && max.x > self.min.x
            && min.y < self.max.y
            && max.y > self.min.y
            && min.z < self.max.z
            && max.z > self.min.z
    }

    /// Distance and entry normal of a ray hitting this box from outside.
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<(f32, Vec3)> {
        let mut t_enter = 0.0f32;
        let mut t_exit = max_distance;
        let mut normal = Vec3::ZERO;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            if d.abs() < 1e-8 {
                if o < self.min[axis] || o > self.max[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (self.min[axis] - o) * inv;
            let mut t1 = (self.max[axis] - o) * inv;
            let mut sign = -1.0;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
                sign = 1.0;
            }

            if t0 > t_enter {
                t_enter = t0;
                normal = Vec3::ZERO;
                normal[axis] = sign;
            }
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }

        // Origin inside the box
        if normal == Vec3::ZERO {
            return None;
        }
        Some((t_enter, normal))
    }
}

/// Static geometry made of [`WorldBox`]es.
#[derive(Debug, Clone, Default)]
pub struct BoxWorld {
    boxes: Vec<WorldBox>,
    next_id: u32,
}

impl BoxWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a box and return its collider id.
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3) -> ColliderId {
        let id = ColliderId(self.next_id);
        self.next_id += 1;
        self.boxes.push(WorldBox {
            id,
            min: center - half_extents,
            max: center + half_extents,
            surface: SurfaceId::DEFAULT,
        });
        id
    }

    pub fn set_surface(&mut self, id: ColliderId, surface: SurfaceId) {
        if let Some(b) = self.boxes.iter_mut().find(|b| b.id == id) {
            b.surface = surface;
        }
    }

    pub fn get(&self, id: ColliderId) -> Option<&WorldBox> {
        self.boxes.iter().find(|b| b.id == id)
    }

    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    /// Nearest box hit along a ray, if any.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        self.boxes
            .iter()
            .filter_map(|b| {
                b.cast_ray(origin, direction, max_distance)
                    .map(|(distance, normal)| RayHit {
                        point: origin + direction * distance,
                        normal,
                        distance,
                        collider: b.id,
                        surface: b.surface,
                    })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Boxes overlapping the given bounds, up to the buffer's capacity.
    pub fn overlap(&self, min: Vec3, max: Vec3, hits: &mut ProbeBuffer) -> usize {
        hits.clear();
        for b in &self.boxes {
            if b.intersects(min, max) && hits.try_push(b.id).is_err() {
                break;
            }
        }
        hits.len()
    }
}

/// Bounds of a character standing at `position` (feet).
pub fn character_bounds(position: Vec3, radius: f32, height: f32) -> (Vec3, Vec3) {
    let extent = Vec3::new(radius, 0.0, radius);
    (position - extent, position + extent + Vec3::Y * height)
}

// ============================================================================
// Motor
// ============================================================================

/// [`CharacterMotor`] that moves an upright box through a [`BoxWorld`].
#[derive(Debug, Clone)]
pub struct SandboxMotor {
    pub world: BoxWorld,
    position: Vec3,
    velocity: Vec3,
    rotation: Quat,
    capsule: Capsule,
    grounding: GroundingReport,
    unground_timer: f32,
    collision_solving: bool,

    /// Steepest ground (degrees) that counts as stable.
    pub max_stable_slope: f32,

    /// How far below the feet ground is still detected.
    pub ground_probe_distance: f32,
}

impl SandboxMotor {
    pub fn new(world: BoxWorld, position: Vec3) -> Self {
        let mut motor = Self {
            world,
            position,
            velocity: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            capsule: Capsule {
                radius: 0.4,
                height: 1.8,
            },
            grounding: GroundingReport::airborne(),
            unground_timer: 0.0,
            collision_solving: true,
            max_stable_slope: 60.0,
            ground_probe_distance: 0.1,
        };
        motor.update_grounding();
        motor
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    /// Move with `velocity` for `delta_time`, resolving collisions axis by
    /// axis. Collisions are appended to `hits`.
    pub fn step(&mut self, velocity: Vec3, delta_time: f32, hits: &mut Vec<HitReport>) {
        self.unground_timer = (self.unground_timer - delta_time).max(0.0);
        self.velocity = velocity;

        if !self.collision_solving {
            self.position += velocity * delta_time;
            self.grounding = GroundingReport::airborne();
            return;
        }

        let stable_cos = self.max_stable_slope.to_radians().cos();
        let mut overlaps = ProbeBuffer::new();

        // Vertical first so landing resolves before sliding along walls
        for axis in [1, 0, 2] {
            let delta = self.velocity[axis] * delta_time;
            if delta == 0.0 {
                continue;
            }
            self.position[axis] += delta;

            let (min, max) = character_bounds(self.position, self.capsule.radius, self.capsule.height);
            self.world.overlap(min, max, &mut overlaps);
            for id in &overlaps {
                let Some(b) = self.world.get(*id) else {
                    continue;
                };
                let (offset_min, offset_max) = (min[axis] - self.position[axis], max[axis] - self.position[axis]);
                let mut normal = Vec3::ZERO;
                if delta > 0.0 {
                    self.position[axis] = b.min[axis] - offset_max - SKIN;
                    normal[axis] = -1.0;
                } else {
                    self.position[axis] = b.max[axis] - offset_min + SKIN;
                    normal[axis] = 1.0;
                }
                self.velocity[axis] = 0.0;
                hits.push(HitReport {
                    collider: *id,
                    normal,
                    point: self.position,
                    is_stable: normal.dot(self.up()) >= stable_cos,
                });
            }
        }

        self.update_grounding();
        trace!(position = ?self.position, grounded = self.grounding.is_stable_on_ground, "sandbox step");
    }

    fn update_grounding(&mut self) {
        if self.unground_timer > 0.0 {
            self.grounding = GroundingReport::airborne();
            return;
        }

        let up = self.up();
        let origin = self.position + up * PROBE_LIFT;
        self.grounding = match self
            .world
            .raycast(origin, -up, PROBE_LIFT + self.ground_probe_distance)
        {
            Some(hit) => {
                let stable = angle_deg(hit.normal, up) <= self.max_stable_slope;
                if stable && self.velocity.dot(up) <= 0.0 {
                    self.position = hit.point;
                }
                GroundingReport {
                    is_stable_on_ground: stable,
                    found_any_ground: true,
                    ground_normal: hit.normal,
                    surface: Some(hit.surface),
                    collider: Some(hit.collider),
                }
            }
            None => GroundingReport::airborne(),
        };
    }
}

impl CharacterMotor for SandboxMotor {
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
        self.unground_timer > 0.0
    }

    fn force_unground(&mut self, seconds: f32) {
        self.unground_timer = self.unground_timer.max(seconds);
    }

    fn set_capsule_height(&mut self, height: f32) {
        self.capsule.height = height;
    }

    fn set_collision_solving(&mut self, enabled: bool) {
        self.collision_solving = enabled;
    }

    fn character_overlap(&self, position: Vec3, height: f32, hits: &mut ProbeBuffer) -> usize {
        let (min, max) = character_bounds(position, self.capsule.radius, height);
        self.world.overlap(min, max, hits)
    }

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        self.world.raycast(origin, direction, max_distance)
    }
}

// ============================================================================
// Wall probe
// ============================================================================

/// [`WallProbe`] that casts short rays to the sides and front of the character.
#[derive(Debug, Clone)]
pub struct SandboxWallProbe {
    /// Distance beyond the capsule radius a wall is detected at.
    pub reach: f32,

    /// Height above the feet the rays start from.
    pub chest_height: f32,

    /// Ground within this distance below the feet disengages wall modes.
    pub ground_clearance: f32,

    /// Walls that can be touched but not run on.
    pub slippery: Vec<ColliderId>,
}

impl Default for SandboxWallProbe {
    fn default() -> Self {
        Self {
            reach: 0.3,
            chest_height: 1.0,
            ground_clearance: 0.5,
            slippery: Vec::new(),
        }
    }
}

impl WallProbe for SandboxWallProbe {
    fn probe(&mut self, motor: &dyn CharacterMotor) -> WallReport {
        let up = motor.up();
        let origin = motor.position() + up * self.chest_height;
        let reach = motor.capsule().radius + self.reach;

        let hit = [motor.right(), -motor.right(), motor.forward()]
            .into_iter()
            .filter_map(|dir| motor.raycast(origin, dir, reach))
            .filter(|hit| hit.normal.dot(up).abs() < 0.5)
            .min_by(|a, b| a.distance.total_cmp(&b.distance));

        let Some(hit) = hit else {
            return WallReport::none();
        };

        let grippable = !self.slippery.contains(&hit.collider);
        let close_to_ground = motor
            .raycast(motor.position() + up * PROBE_LIFT, -up, PROBE_LIFT + self.ground_clearance)
            .is_some();

        WallReport {
            status: if grippable {
                WallStatus::FoundValidWall
            } else {
                WallStatus::InvalidWall
            },
            hit_normal: hit.normal,
            collider: Some(hit.collider),
            surface: Some(hit.surface),
            grippable,
            close_to_ground,
        }
    }
}
