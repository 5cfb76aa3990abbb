//! Dash and its weaker fallback, the dodge.
//!
//! Both variants share one ability: a short burst of fixed velocity along the
//! input direction with invulnerability for its duration. The full dash
//! needs the unlock and a complete recharge; otherwise the dodge is used.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::context::MotorContext;
use crate::events::{AudioCue, MotorEvent, ShakeTag};
use crate::host::HitReport;
use crate::math::inverse_lerp;
use crate::movement::{AbilityFlags, DashSettings, MoveStateMachine};

use super::{AbilityBehavior, AbilityCore, AbilityKind, SiblingStop};

/// Time the motor skips ground snapping when a dash starts (seconds).
const DASH_UNGROUND_TIME: f32 = 0.1;

/// Hits opposing the dash direction by more than this end the dash.
const BLOCKING_HIT_DOT: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DashVariant {
    #[default]
    Dash,
    Dodge,
}

#[derive(Debug, Clone)]
pub struct Dash {
    core: AbilityCore,
    variant: DashVariant,

    direction: Vec3,
    velocity: Vec3,
    elapsed: f32,

    time_since_last_dashed: f32,
    has_grounded_since_last_dash: bool,

    /// Hand velocity back to the movement mode on the next update.
    must_stop: bool,
    stopped: bool,
}

impl Dash {
    pub fn new(flags: AbilityFlags) -> Self {
        Self {
            core: AbilityCore::new(flags),
            variant: DashVariant::Dash,
            direction: Vec3::ZERO,
            velocity: Vec3::ZERO,
            elapsed: 0.0,
            time_since_last_dashed: f32::MAX,
            has_grounded_since_last_dash: true,
            must_stop: false,
            stopped: false,
        }
    }

    /// Variant in use, or the one a start right now would pick.
    pub fn variant(&self) -> DashVariant {
        self.variant
    }

    pub fn time_since_last_dashed(&self) -> f32 {
        self.time_since_last_dashed
    }

    /// Full-dash readiness in `0..=1`.
    pub fn recharge_ratio(&self, cx: &MotorContext) -> f32 {
        inverse_lerp(
            0.0,
            cx.config.abilities.dash.dash.recharge_time,
            self.time_since_last_dashed,
        )
    }

    fn next_variant(&self, cx: &MotorContext) -> DashVariant {
        let dash = &cx.config.abilities.dash.dash;
        if cx.unlocks.can_dash && self.time_since_last_dashed > dash.recharge_time {
            DashVariant::Dash
        } else {
            DashVariant::Dodge
        }
    }

    fn settings<'c>(cx: &MotorContext<'c>, variant: DashVariant) -> &'c DashSettings {
        let config = cx.config;
        match variant {
            DashVariant::Dash => &config.abilities.dash.dash,
            DashVariant::Dodge => &config.abilities.dash.dodge,
        }
    }
}

impl AbilityBehavior for Dash {
    fn kind(&self) -> AbilityKind {
        AbilityKind::Dash
    }

    fn core(&self) -> &AbilityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AbilityCore {
        &mut self.core
    }

    fn can_start(&self, _movement: &MoveStateMachine, cx: &MotorContext) -> bool {
        if self.is_active() || !self.has_grounded_since_last_dash {
            return false;
        }

        let settings = Self::settings(cx, self.next_variant(cx));
        self.time_since_last_dashed >= settings.recharge_time
            && (cx.motor.grounding().is_stable_on_ground || settings.can_use_while_airborne)
            && cx.input.dash_down()
            && cx.input.move_local().length_squared() > 0.0
            && cx.resources.can_spend_stamina(settings.stamina_cost)
    }

    fn stops_on_start(&self) -> SiblingStop {
        SiblingStop::All
    }

    fn reserve(&mut self, _movement: &MoveStateMachine, cx: &mut MotorContext) -> bool {
        let variant = self.next_variant(cx);
        let cost = Self::settings(cx, variant).stamina_cost;
        if !cx.resources.try_spend_stamina(cost) {
            return false;
        }
        self.variant = variant;
        true
    }

    fn on_start(&mut self, _movement: &mut MoveStateMachine, cx: &mut MotorContext) {
        let settings = *Self::settings(cx, self.variant);

        self.elapsed = 0.0;
        self.must_stop = false;
        self.stopped = false;
        self.has_grounded_since_last_dash = false;

        self.direction = (cx.motor.rotation() * cx.input.move_local()).normalize_or_zero();
        self.velocity = self.direction * settings.speed * cx.momentum().speed_multiplier;

        cx.motor.force_unground(DASH_UNGROUND_TIME);
        cx.resources.set_invulnerable(true);
        cx.emit(MotorEvent::Invulnerable(true));

        cx.emit(MotorEvent::Audio(match self.variant {
            DashVariant::Dash => AudioCue::Dash,
            DashVariant::Dodge => AudioCue::Dodge,
        }));
        cx.emit(MotorEvent::ScreenShake {
            amount: settings.screen_shake,
            tag: ShakeTag::Movement,
        });
        cx.emit(MotorEvent::FovModifier {
            delta: settings.fov_change,
        });
    }

    fn on_stop(&mut self, _movement: &mut MoveStateMachine, cx: &mut MotorContext) {
        let settings = Self::settings(cx, self.variant);
        cx.emit(MotorEvent::FovModifier {
            delta: -settings.fov_change,
        });
        self.time_since_last_dashed = 0.0;
        cx.resources.set_invulnerable(false);
        cx.emit(MotorEvent::Invulnerable(false));
    }

    fn passive_update(&mut self, _movement: &mut MoveStateMachine, cx: &mut MotorContext) {
        self.time_since_last_dashed += cx.delta_time;
        if !self.is_active() {
            self.variant = self.next_variant(cx);
        }
    }

    fn before_update(&mut self, _movement: &mut MoveStateMachine, cx: &mut MotorContext) {
        self.elapsed += cx.delta_time;
    }

    fn update_velocity(
        &mut self,
        velocity: &mut Vec3,
        movement: &mut MoveStateMachine,
        cx: &mut MotorContext,
    ) {
        if self.must_stop {
            // Leave at the current mode's cruising speed instead of dash speed.
            let max_speed = cx.config.move_settings(movement.mode()).max_speed;
            *velocity = self.direction * max_speed;
            self.must_stop = false;
            self.stopped = true;
        } else if !self.stopped {
            *velocity = self.velocity;
        }
    }

    fn after_update(&mut self, movement: &mut MoveStateMachine, cx: &mut MotorContext) {
        let max_time = Self::settings(cx, self.variant).max_time;
        if self.stopped {
            self.stop(movement, cx);
        } else if self.elapsed > max_time {
            self.must_stop = true;
        }
    }

    fn on_grounded(&mut self, _hard: bool, _movement: &mut MoveStateMachine, _cx: &mut MotorContext) {
        self.has_grounded_since_last_dash = true;
    }

    fn on_ground_hit(
        &mut self,
        hit: &HitReport,
        _movement: &mut MoveStateMachine,
        _cx: &mut MotorContext,
    ) {
        if !self.is_active() && hit.is_stable {
            self.has_grounded_since_last_dash = true;
        }
    }

    fn on_movement_hit(
        &mut self,
        hit: &HitReport,
        _movement: &mut MoveStateMachine,
        _cx: &mut MotorContext,
    ) {
        if self.is_active()
            && !self.stopped
            && !hit.is_stable
            && (-hit.normal).dot(self.direction) > BLOCKING_HIT_DOT
        {
            self.must_stop = true;
        }
    }
}
