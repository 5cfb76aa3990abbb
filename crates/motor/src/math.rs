//! Vector helpers shared by the state machine and the abilities.
//!
//! Angles are in degrees to match how the tuning values are authored.

use glam::{Mat3, Quat, Vec3};

const EPSILON_SQ: f32 = 1e-10;

/// Component of `v` along `onto`. Zero when `onto` is degenerate.
#[inline]
pub fn project(v: Vec3, onto: Vec3) -> Vec3 {
    let len_sq = onto.length_squared();
    if len_sq < EPSILON_SQ {
        return Vec3::ZERO;
    }
    onto * (v.dot(onto) / len_sq)
}

/// Remove the component of `v` along `normal`.
#[inline]
pub fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    v - project(v, normal)
}

/// Mirror `direction` off the plane described by `normal`.
#[inline]
pub fn reflect(direction: Vec3, normal: Vec3) -> Vec3 {
    direction - 2.0 * direction.dot(normal) * normal
}

/// Unsigned angle between two vectors in degrees. Zero if either is degenerate.
pub fn angle_deg(a: Vec3, b: Vec3) -> f32 {
    let denom = (a.length_squared() * b.length_squared()).sqrt();
    if denom < EPSILON_SQ {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Drop the component of `v` along `up`, leaving its horizontal part.
#[inline]
pub fn flatten(v: Vec3, up: Vec3) -> Vec3 {
    project_on_plane(v, up)
}

/// Direction of `direction` re-oriented to run tangent to a surface.
///
/// Keeps the heading of `direction` as seen from `up` while laying it on
/// the plane of `surface_normal`.
pub fn tangent_to_surface(direction: Vec3, surface_normal: Vec3, up: Vec3) -> Vec3 {
    let direction_right = direction.cross(up);
    surface_normal.cross(direction_right).normalize_or_zero()
}

/// Rotation whose local +Z looks along `forward` with local +Y close to `up`.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let forward = forward.normalize_or_zero();
    if forward == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let right = up.cross(forward).normalize_or_zero();
    if right == Vec3::ZERO {
        return Quat::from_rotation_arc(Vec3::Z, forward);
    }
    let up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, forward))
}

/// Spherical interpolation between two directions.
pub fn slerp_direction(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    let from = from.normalize_or_zero();
    let to = to.normalize_or_zero();
    if from == Vec3::ZERO || to == Vec3::ZERO {
        return to;
    }
    let dot = from.dot(to).clamp(-1.0, 1.0);
    if dot > 0.9995 {
        return from.lerp(to, t).normalize_or_zero();
    }
    if dot < -0.9995 {
        // Opposite directions: pick any perpendicular axis to turn around.
        let axis = from.any_orthonormal_vector();
        return Quat::from_axis_angle(axis, std::f32::consts::PI * t) * from;
    }
    let axis = from.cross(to).normalize();
    let angle = dot.acos();
    Quat::from_axis_angle(axis, angle * t) * from
}

/// Fraction of `value` between `a` and `b`, clamped to `0..=1`.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() < f32::EPSILON {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_on_plane_removes_normal_component() {
        let v = Vec3::new(3.0, -4.0, 1.0);
        let flat = project_on_plane(v, Vec3::Y);
        assert!((flat - Vec3::new(3.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_flatten_follows_up_axis() {
        let v = Vec3::new(3.0, -4.0, 1.0);
        assert!((flatten(v, Vec3::Y) - Vec3::new(3.0, 0.0, 1.0)).length() < 1e-5);
        // Character standing on a +X wall
        assert!((flatten(v, Vec3::X) - Vec3::new(0.0, -4.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_project_degenerate_axis() {
        assert_eq!(project(Vec3::ONE, Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn test_reflect_off_wall() {
        let d = Vec3::new(1.0, 0.0, 1.0);
        let r = reflect(d, Vec3::NEG_X);
        assert!((r - Vec3::new(-1.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_angle_deg() {
        assert!((angle_deg(Vec3::X, Vec3::Z) - 90.0).abs() < 1e-3);
        assert!(angle_deg(Vec3::X, Vec3::X) < 1e-2);
        assert_eq!(angle_deg(Vec3::ZERO, Vec3::X), 0.0);
    }

    #[test]
    fn test_tangent_on_flat_ground_keeps_heading() {
        let t = tangent_to_surface(Vec3::new(2.0, -1.0, 0.0), Vec3::Y, Vec3::Y);
        assert!((t - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_look_rotation_maps_z_to_forward() {
        let q = look_rotation(Vec3::X, Vec3::Y);
        assert!((q * Vec3::Z - Vec3::X).length() < 1e-5);
        assert!((q * Vec3::Y - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_slerp_direction_halfway() {
        let mid = slerp_direction(Vec3::X, Vec3::Z, 0.5);
        let expected = Vec3::new(1.0, 0.0, 1.0).normalize();
        assert!((mid - expected).length() < 1e-4);
    }
}
