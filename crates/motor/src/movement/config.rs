//! Movement and ability tuning.
//!
//! All parameters are grouped here for easy tuning. Values use metric
//! units (meters, seconds) and angles are in degrees.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ability::AbilityKind;
use crate::curve::{Curve, Keyframe};
use crate::error::ConfigError;

use super::MoveMode;

/// Speed, acceleration and drag for one movement mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveSettings {
    /// Target speed at full input (meters/second).
    pub max_speed: f32,

    /// How quickly velocity closes on the target (1/second).
    pub acceleration: f32,

    /// Isotropic drag coefficient, applied as `v *= 1 / (1 + friction * dt)`.
    pub friction: f32,
}

impl MoveSettings {
    pub const fn new(max_speed: f32, acceleration: f32, friction: f32) -> Self {
        Self {
            max_speed,
            acceleration,
            friction,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpSettings {
    /// Vertical take-off speed (meters/second).
    pub jump_speed: f32,

    /// How long a jump request may wait for ground (seconds).
    pub pre_grounding_grace: f32,

    /// How long after leaving ground a jump is still honored (seconds).
    pub post_grounding_grace: f32,

    /// Allow jumping off ground that is too steep to stand on.
    pub allow_jumping_when_slipping: bool,

    /// Extra upward speed added to wall jumps (meters/second).
    pub wall_jump_vertical_modifier: f32,

    pub wall_jump_stamina_cost: u32,

    /// How much of the wall normal is blended into the wall jump direction.
    pub wall_jump_normal_blend: f32,
}

impl Default for JumpSettings {
    fn default() -> Self {
        Self {
            jump_speed: 10.0,
            pre_grounding_grace: 0.1,
            post_grounding_grace: 0.15,
            allow_jumping_when_slipping: false,
            wall_jump_vertical_modifier: 8.0,
            wall_jump_stamina_cost: 1,
            wall_jump_normal_blend: 0.25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WallRunSettings {
    /// Speed and drag while running or clinging.
    pub movement: MoveSettings,

    /// Maximum wall-run duration (seconds).
    pub run_time: f32,

    /// Peak height gained over a run (meters), shaped by `height_curve`.
    pub run_height: f32,

    /// Height fraction over normalized run time.
    pub height_curve: Curve,

    /// Look angles at or below this cling to the wall instead of running.
    pub cling_angle_limit: f32,

    /// Look angles below this may start a wall run.
    pub wallrun_angle_limit: f32,

    /// Window after leaving a wall in which the same wall direction is refused.
    pub same_side_cooldown: f32,

    /// Wall directions closer than this count as the same side.
    pub repeat_limit_angle: f32,

    /// Minimum airborne time before a wall can be grabbed (seconds).
    pub cooldown: f32,

    /// Seconds per stamina unit drained while wall-running.
    pub wallrun_stamina_drain: f32,

    /// Seconds per stamina unit drained while clinging.
    pub cling_stamina_drain: f32,

    /// Gravity acceleration while clinging (meters/second²).
    pub cling_gravity: f32,

    /// Allowed angle between character up and the wall normal, `[min, max]`.
    pub slope_limits: [f32; 2],

    /// Largest normal change per tick when the wall curves towards travel.
    pub max_inner_angle_change: f32,

    /// Largest normal change per tick when the wall curves away from travel.
    pub max_outer_angle_change: f32,
}

impl Default for WallRunSettings {
    fn default() -> Self {
        Self {
            movement: MoveSettings::new(12.0, 10.0, 4.0),
            run_time: 1.5,
            run_height: 1.0,
            height_curve: Curve::new(vec![
                Keyframe::new(0.0, 0.0),
                Keyframe::new(0.4, 1.0),
                Keyframe::new(1.0, 0.0),
            ]),
            cling_angle_limit: 20.0,
            wallrun_angle_limit: 90.0,
            same_side_cooldown: 1.0,
            repeat_limit_angle: 30.0,
            cooldown: 0.2,
            wallrun_stamina_drain: 1.0,
            cling_stamina_drain: 0.5,
            cling_gravity: 2.0,
            slope_limits: [75.0, 105.0],
            max_inner_angle_change: 30.0,
            max_outer_angle_change: 15.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrouchSettings {
    /// Speed cap while crouched (meters/second).
    pub max_crouched_speed: f32,

    /// Capsule height when standing (meters).
    pub standing_height: f32,

    /// Capsule height when crouched (meters).
    pub crouch_height: f32,

    /// Eye height above the feet when standing (meters).
    pub standing_head_height: f32,
}

impl Default for CrouchSettings {
    fn default() -> Self {
        Self {
            max_crouched_speed: 7.0,
            standing_height: 1.8,
            crouch_height: 0.8,
            standing_head_height: 1.5,
        }
    }
}

impl CrouchSettings {
    pub fn head_height(&self, is_crouching: bool) -> f32 {
        if is_crouching {
            self.crouch_height
        } else {
            self.standing_head_height
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    /// Gravity acceleration (meters/second²).
    pub gravity: Vec3,

    /// Exponential turn rate toward the camera heading. Zero disables turning.
    pub orientation_sharpness: f32,

    /// Keep the character's up axis aligned against gravity.
    pub orient_towards_gravity: bool,

    /// Ignore `add_velocity` and `set_continuous_velocity` contributions.
    pub ignore_external_velocity: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -30.0, 0.0),
            orientation_sharpness: 10.0,
            orient_towards_gravity: false,
            ignore_external_velocity: false,
        }
    }
}

// ============================================================================
// Abilities
// ============================================================================

/// Scheduling flags shared by every ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityFlags {
    /// May activate from the per-tick start check without an explicit request.
    pub self_starts: bool,

    /// Lower-priority handlers still run while this ability is active.
    pub passthrough: bool,

    /// Stop other active self-starting abilities when this one starts.
    pub stop_others: bool,

    /// Footsteps keep playing while this ability is active.
    pub plays_footsteps: bool,
}

impl AbilityFlags {
    /// Takes over velocity and rotation while active.
    pub const fn blocking() -> Self {
        Self {
            self_starts: true,
            passthrough: false,
            stop_others: false,
            plays_footsteps: false,
        }
    }

    /// Runs on top of the state machine.
    pub const fn passthrough() -> Self {
        Self {
            self_starts: true,
            passthrough: true,
            stop_others: false,
            plays_footsteps: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AirJumpSettings {
    pub flags: AbilityFlags,
    pub jump_speed: f32,
    pub stamina_cost: u32,
    pub screen_shake: f32,
}

impl Default for AirJumpSettings {
    fn default() -> Self {
        Self {
            flags: AbilityFlags::passthrough(),
            jump_speed: 10.0,
            stamina_cost: 1,
            screen_shake: 0.5,
        }
    }
}

/// Parameters for one dash variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashSettings {
    /// Dash speed (meters/second).
    pub speed: f32,

    /// Dash duration (seconds).
    pub max_time: f32,

    /// Time after a dash before this variant is ready again (seconds).
    pub recharge_time: f32,

    pub stamina_cost: u32,

    pub can_use_while_airborne: bool,

    pub screen_shake: f32,

    /// Field-of-view kick while dashing (degrees).
    pub fov_change: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashAbilitySettings {
    pub flags: AbilityFlags,

    /// The unlockable long dash.
    pub dash: DashSettings,

    /// The always-available short dodge.
    pub dodge: DashSettings,
}

impl Default for DashAbilitySettings {
    fn default() -> Self {
        Self {
            flags: AbilityFlags {
                stop_others: true,
                ..AbilityFlags::blocking()
            },
            dash: DashSettings {
                speed: 30.0,
                max_time: 0.2,
                recharge_time: 1.0,
                stamina_cost: 1,
                can_use_while_airborne: true,
                screen_shake: 0.4,
                fov_change: 10.0,
            },
            dodge: DashSettings {
                speed: 15.0,
                max_time: 0.15,
                recharge_time: 0.5,
                stamina_cost: 1,
                can_use_while_airborne: false,
                screen_shake: 0.2,
                fov_change: 4.0,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideSettings {
    pub flags: AbilityFlags,

    /// Ground speed needed to start a slide (meters/second).
    pub min_speed_for_slide: f32,

    pub max_slide_speed: f32,

    /// The slide ends below this speed (meters/second).
    pub slide_stop_speed: f32,

    /// Sliding friction (meters/second²), scaled by `friction_slope_coef`.
    pub friction: f32,

    /// Drag on motion across the fall line of a slope (1/second).
    pub side_friction: f32,

    /// Friction scale over slope angle / 90°.
    pub friction_slope_coef: Curve,

    /// How far strafe input tilts gravity for steering.
    pub max_movement_contribution: f32,

    /// Speed added on the first tick of a slide (meters/second).
    pub start_boost: f32,

    /// Crouch input cannot end the slide before this much time (seconds).
    pub min_slide_time: f32,

    /// Crouch input stops the slide only on a fresh press.
    pub toggle_slide: bool,

    /// How long a slide requested in the air stays pending after landing.
    pub pre_grounding_grace: f32,

    pub screen_shake: f32,

    /// Delay before the start shake is raised (seconds).
    pub screen_shake_delay: f32,

    /// Slide loop pitch at minimum and maximum slide speed.
    pub pitch_range: [f32; 2],
}

impl Default for SlideSettings {
    fn default() -> Self {
        Self {
            flags: AbilityFlags::blocking(),
            min_speed_for_slide: 6.0,
            max_slide_speed: 20.0,
            slide_stop_speed: 2.0,
            friction: 6.0,
            side_friction: 4.0,
            friction_slope_coef: Curve::linear(1.0, 0.0),
            max_movement_contribution: 0.3,
            start_boost: 2.0,
            min_slide_time: 0.25,
            toggle_slide: false,
            pre_grounding_grace: 0.2,
            screen_shake: 0.3,
            screen_shake_delay: 0.1,
            pitch_range: [0.8, 1.2],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultSettings {
    pub flags: AbilityFlags,

    /// Height above the head of the ledge probe (meters).
    pub ledge_check_height: f32,

    /// Forward reach of the ledge probe (meters).
    pub ledge_check_distance: f32,

    /// Stop the downward probe this far above the feet (meters).
    pub ledge_depth_check_distance: f32,

    /// Steepest ledge surface that can be climbed onto (degrees).
    pub max_ledge_slope: f32,

    /// Time to climb onto the ledge (seconds).
    pub climb_time: f32,

    /// Lift applied to the ledge point so the capsule clears shallow slopes.
    pub ledge_clearance: f32,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            flags: AbilityFlags::blocking(),
            ledge_check_height: 0.5,
            ledge_check_distance: 0.8,
            ledge_depth_check_distance: 0.3,
            max_ledge_slope: 40.0,
            climb_time: 0.35,
            ledge_clearance: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilitySettings {
    /// Registration order. Earlier abilities take priority.
    pub order: Vec<AbilityKind>,
    pub air_jump: AirJumpSettings,
    pub dash: DashAbilitySettings,
    pub slide: SlideSettings,
    pub vault: VaultSettings,
}

impl Default for AbilitySettings {
    fn default() -> Self {
        Self {
            order: vec![
                AbilityKind::Dash,
                AbilityKind::Vault,
                AbilityKind::Slide,
                AbilityKind::AirJump,
            ],
            air_jump: AirJumpSettings::default(),
            dash: DashAbilitySettings::default(),
            slide: SlideSettings::default(),
            vault: VaultSettings::default(),
        }
    }
}

/// Which abilities the player has unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unlocks {
    pub can_dash: bool,
    pub can_wall_run: bool,
    pub can_wall_cling: bool,
    pub can_combat_slide: bool,
    pub additional_air_jumps: u32,
}

impl Unlocks {
    pub const fn all() -> Self {
        Self {
            can_dash: true,
            can_wall_run: true,
            can_wall_cling: true,
            can_combat_slide: true,
            additional_air_jumps: 1,
        }
    }

    pub const fn none() -> Self {
        Self {
            can_dash: false,
            can_wall_run: false,
            can_wall_cling: false,
            can_combat_slide: false,
            additional_air_jumps: 0,
        }
    }
}

impl Default for Unlocks {
    fn default() -> Self {
        Self::all()
    }
}

// ============================================================================
// Aggregate
// ============================================================================

/// Complete motor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorConfig {
    pub grounded: MoveSettings,
    pub airborne: MoveSettings,
    pub swimming: MoveSettings,
    pub wall_run: WallRunSettings,
    pub jump: JumpSettings,
    pub crouch: CrouchSettings,
    pub controller: ControllerSettings,
    pub abilities: AbilitySettings,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            grounded: MoveSettings::new(10.0, 12.0, 1.0),
            airborne: MoveSettings::new(10.0, 2.0, 0.1),
            swimming: MoveSettings::new(5.0, 4.0, 2.0),
            wall_run: WallRunSettings::default(),
            jump: JumpSettings::default(),
            crouch: CrouchSettings::default(),
            controller: ControllerSettings::default(),
            abilities: AbilitySettings::default(),
        }
    }
}

impl MotorConfig {
    /// Fast, floaty movement with generous air control and grace windows.
    pub fn arcade() -> Self {
        let mut config = Self::default();
        config.grounded = MoveSettings::new(14.0, 15.0, 1.0);
        config.airborne = MoveSettings::new(14.0, 4.0, 0.05);
        config.jump.jump_speed = 12.0;
        config.jump.post_grounding_grace = 0.25;
        config.jump.allow_jumping_when_slipping = true;
        config.wall_run.run_time = 2.5;
        config.controller.gravity = Vec3::new(0.0, -25.0, 0.0);
        config
    }

    /// Slow, weighty movement with little air control and short wall runs.
    pub fn heavy() -> Self {
        let mut config = Self::default();
        config.grounded = MoveSettings::new(7.0, 8.0, 2.0);
        config.airborne = MoveSettings::new(7.0, 0.5, 0.2);
        config.jump.jump_speed = 8.0;
        config.jump.post_grounding_grace = 0.08;
        config.wall_run.run_time = 0.8;
        config.wall_run.wallrun_stamina_drain = 0.5;
        config.controller.gravity = Vec3::new(0.0, -35.0, 0.0);
        config
    }

    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Settings used by the velocity law of `mode`.
    pub fn move_settings(&self, mode: MoveMode) -> &MoveSettings {
        match mode {
            MoveMode::Grounded => &self.grounded,
            MoveMode::Airborne => &self.airborne,
            MoveMode::WallRunning | MoveMode::Clinging => &self.wall_run.movement,
            MoveMode::Swimming => &self.swimming,
        }
    }

    /// Reject values the motor cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, settings) in [
            ("grounded", &self.grounded),
            ("airborne", &self.airborne),
            ("swimming", &self.swimming),
            ("wall_run.movement", &self.wall_run.movement),
        ] {
            if settings.max_speed < 0.0 || settings.acceleration < 0.0 || settings.friction < 0.0 {
                return Err(ConfigError::invalid(field, "speeds and coefficients must be non-negative"));
            }
        }

        let wall = &self.wall_run;
        if wall.run_time <= 0.0 {
            return Err(ConfigError::invalid("wall_run.run_time", "must be positive"));
        }
        if wall.height_curve.is_empty() {
            return Err(ConfigError::invalid("wall_run.height_curve", "needs at least one key"));
        }
        if wall.cling_angle_limit > wall.wallrun_angle_limit {
            return Err(ConfigError::invalid(
                "wall_run.cling_angle_limit",
                "must not exceed wallrun_angle_limit",
            ));
        }
        if wall.slope_limits[0] > wall.slope_limits[1] {
            return Err(ConfigError::invalid("wall_run.slope_limits", "min exceeds max"));
        }

        if self.jump.pre_grounding_grace < 0.0 || self.jump.post_grounding_grace < 0.0 {
            return Err(ConfigError::invalid("jump", "grace windows must be non-negative"));
        }

        let crouch = &self.crouch;
        if crouch.crouch_height <= 0.0 || crouch.crouch_height > crouch.standing_height {
            return Err(ConfigError::invalid(
                "crouch.crouch_height",
                "must be positive and no taller than standing_height",
            ));
        }

        let abilities = &self.abilities;
        for (i, kind) in abilities.order.iter().enumerate() {
            if abilities.order[..i].contains(kind) {
                return Err(ConfigError::invalid("abilities.order", "duplicate ability"));
            }
        }
        if abilities.dash.dash.max_time <= 0.0 || abilities.dash.dodge.max_time <= 0.0 {
            return Err(ConfigError::invalid("abilities.dash", "max_time must be positive"));
        }
        if abilities.vault.climb_time <= 0.0 {
            return Err(ConfigError::invalid("abilities.vault.climb_time", "must be positive"));
        }
        if abilities.slide.slide_stop_speed > abilities.slide.min_speed_for_slide {
            return Err(ConfigError::invalid(
                "abilities.slide.slide_stop_speed",
                "must not exceed min_speed_for_slide",
            ));
        }
        if abilities.slide.friction_slope_coef.is_empty() {
            warn!("slide friction curve is empty, slides will not slow down");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(MotorConfig::default().validate().is_ok());
        assert!(MotorConfig::arcade().validate().is_ok());
        assert!(MotorConfig::heavy().validate().is_ok());
    }

    #[test]
    fn test_move_settings_by_mode() {
        let config = MotorConfig::default();
        assert_eq!(config.move_settings(MoveMode::Grounded), &config.grounded);
        assert_eq!(config.move_settings(MoveMode::Clinging), &config.wall_run.movement);
        assert_eq!(config.move_settings(MoveMode::WallRunning), &config.wall_run.movement);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = MotorConfig::from_json_str(r#"{ "jump": { "jump_speed": 14.0 } }"#).unwrap();
        assert_eq!(config.jump.jump_speed, 14.0);
        assert_eq!(config.jump.post_grounding_grace, JumpSettings::default().post_grounding_grace);
        assert_eq!(config.grounded, MotorConfig::default().grounded);
    }

    #[test]
    fn test_json_round_trip_preserves_order() {
        let mut config = MotorConfig::default();
        config.abilities.order = vec![AbilityKind::Slide, AbilityKind::Dash];
        let json = config.to_json_string().unwrap();
        let parsed = MotorConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed.abilities.order, config.abilities.order);
    }

    #[test]
    fn test_rejects_cling_wider_than_wallrun() {
        let mut config = MotorConfig::default();
        config.wall_run.cling_angle_limit = 95.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "wall_run.cling_angle_limit", .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_abilities() {
        let mut config = MotorConfig::default();
        config.abilities.order.push(AbilityKind::Dash);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            MotorConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
