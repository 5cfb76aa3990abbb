//! Wall contact reports and their tick-to-tick tracking.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::host::{CharacterMotor, ColliderId, SurfaceId};
use crate::math::{angle_deg, flatten};

/// Outcome of the wall probe for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WallStatus {
    #[default]
    NoWall,
    /// Something was hit but it is not a runnable wall (wrong layer, too small).
    InvalidWall,
    FoundValidWall,
}

/// Which side of the character a wall is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WallSide {
    #[default]
    Left,
    Right,
}

/// Wall contact data supplied by a [`WallProbe`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallReport {
    pub status: WallStatus,

    /// Surface normal of the wall, pointing away from it.
    pub hit_normal: Vec3,

    pub collider: Option<ColliderId>,

    pub surface: Option<SurfaceId>,

    /// Whether the wall surface can be gripped for running or clinging.
    pub grippable: bool,

    /// The character is close enough to the ground that wall modes disengage.
    pub close_to_ground: bool,
}

impl Default for WallReport {
    fn default() -> Self {
        Self::none()
    }
}

impl WallReport {
    pub fn none() -> Self {
        Self {
            status: WallStatus::NoWall,
            hit_normal: Vec3::ZERO,
            collider: None,
            surface: None,
            grippable: false,
            close_to_ground: false,
        }
    }

    /// A grippable wall with the given normal.
    pub fn valid(normal: Vec3) -> Self {
        Self {
            status: WallStatus::FoundValidWall,
            hit_normal: normal.normalize_or_zero(),
            collider: None,
            surface: Some(SurfaceId::DEFAULT),
            grippable: true,
            close_to_ground: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status == WallStatus::FoundValidWall
    }

    pub fn is_touched(&self) -> bool {
        self.status != WallStatus::NoWall
    }

    /// Angle in degrees between a look direction and facing straight into the wall.
    ///
    /// 0 means looking directly at the wall, 90 means looking along it.
    pub fn look_angle(&self, look_direction: Vec3, up: Vec3) -> f32 {
        angle_deg(flatten(look_direction, up), flatten(-self.hit_normal, up))
    }

    /// Angle in degrees between a travel direction and moving straight into the wall.
    pub fn approach_angle(&self, velocity: Vec3, up: Vec3) -> f32 {
        angle_deg(flatten(velocity, up), flatten(-self.hit_normal, up))
    }

    /// Side of the character (given its right axis) the wall is on.
    pub fn side(&self, character_right: Vec3) -> WallSide {
        if (-self.hit_normal).dot(character_right) > 0.0 {
            WallSide::Right
        } else {
            WallSide::Left
        }
    }
}

/// Supplies wall contact data each tick.
pub trait WallProbe {
    fn probe(&mut self, motor: &dyn CharacterMotor) -> WallReport;
}

/// A probe that never finds a wall.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWalls;

impl WallProbe for NoWalls {
    fn probe(&mut self, _motor: &dyn CharacterMotor) -> WallReport {
        WallReport::none()
    }
}

/// Keeps the current and previous tick's wall reports.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WallTracker {
    current: WallReport,
    last: WallReport,
}

impl WallTracker {
    pub fn update(&mut self, report: WallReport) {
        self.last = self.current;
        self.current = report;
    }

    pub fn current(&self) -> &WallReport {
        &self.current
    }

    pub fn last(&self) -> &WallReport {
        &self.last
    }

    /// Change in wall normal between the last two reports, in degrees.
    pub fn normal_delta(&self) -> f32 {
        angle_deg(self.last.hit_normal, self.current.hit_normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_look_angle() {
        let wall = WallReport::valid(Vec3::NEG_X);
        // Wall is to the +X side, looking at it head on.
        assert!(wall.look_angle(Vec3::X, Vec3::Y) < 1e-3);
        assert!((wall.look_angle(Vec3::Z, Vec3::Y) - 90.0).abs() < 1e-3);
        // Pitch is ignored.
        assert!(wall.look_angle(Vec3::new(1.0, 5.0, 0.0), Vec3::Y) < 1e-3);
    }

    #[test]
    fn test_look_angle_uses_character_up() {
        // Gravity along -Z: the wall is still to +X, "vertical" is now Z.
        let wall = WallReport::valid(Vec3::NEG_X);
        assert!(wall.look_angle(Vec3::new(1.0, 0.0, 5.0), Vec3::Z) < 1e-3);
        assert!((wall.look_angle(Vec3::Y, Vec3::Z) - 90.0).abs() < 1e-3);
        assert!((wall.approach_angle(Vec3::new(1.0, 1.0, 0.0), Vec3::Z) - 45.0).abs() < 1e-2);
    }

    #[test]
    fn test_side() {
        let wall = WallReport::valid(Vec3::NEG_X);
        assert_eq!(wall.side(Vec3::X), WallSide::Right);
        assert_eq!(wall.side(Vec3::NEG_X), WallSide::Left);
    }

    #[test]
    fn test_tracker_keeps_last() {
        let mut tracker = WallTracker::default();
        tracker.update(WallReport::valid(Vec3::NEG_X));
        tracker.update(WallReport::valid(Vec3::new(-1.0, 0.0, 1.0)));
        assert!((tracker.normal_delta() - 45.0).abs() < 1e-2);
        assert_eq!(tracker.last().hit_normal, Vec3::NEG_X);
    }
}
