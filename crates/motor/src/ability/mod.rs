//! Abilities layered on top of the movement state machine.
//!
//! Each ability is a small state machine of its own that can start itself
//! from input, override the velocity or rotation the [`MoveStateMachine`]
//! produces, and stop itself (or be stopped by a sibling). The controller
//! offers every ability the same hooks each tick in registration order; an
//! active ability that is not *passthrough* hides later handlers, including
//! the state machine, for that phase.
//!
//! The set of abilities is closed: [`Ability`] is an enum over the concrete
//! types, and [`AbilityBehavior`] is the capability interface they share.

mod air_jump;
mod dash;
mod slide;
mod vault;

pub use air_jump::AirJump;
pub use dash::{Dash, DashVariant};
pub use slide::Slide;
pub use vault::Vault;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::MotorContext;
use crate::events::MotorEvent;
use crate::host::{ColliderId, HitReport};
use crate::movement::{AbilityFlags, AbilitySettings, MoveStateMachine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    AirJump,
    Dash,
    Slide,
    Vault,
}

/// Siblings an ability stops when it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiblingStop {
    None,
    /// Every other active self-starting ability that allows it.
    All,
    Kind(AbilityKind),
}

/// Runtime state every ability carries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbilityCore {
    active: bool,
    flags: AbilityFlags,
    time_started: f32,
}

impl AbilityCore {
    pub fn new(flags: AbilityFlags) -> Self {
        Self {
            active: false,
            flags,
            time_started: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn flags(&self) -> AbilityFlags {
        self.flags
    }

    pub fn time_started(&self) -> f32 {
        self.time_started
    }

    /// Seconds since the ability last started.
    pub fn time_active(&self, now: f32) -> f32 {
        now - self.time_started
    }

    fn activate(&mut self, now: f32) {
        self.active = true;
        self.time_started = now;
    }

    fn deactivate(&mut self) {
        self.active = false;
    }
}

/// Capability interface shared by every ability.
///
/// Every hook has a no-op default; abilities override what they need. Hooks
/// receive the state machine so they can request jumps, crouch or mode
/// changes, and a [`MotorContext`] for everything else.
pub trait AbilityBehavior {
    fn kind(&self) -> AbilityKind;

    fn core(&self) -> &AbilityCore;

    fn core_mut(&mut self) -> &mut AbilityCore;

    /// Whether the ability may start this tick.
    fn can_start(&self, movement: &MoveStateMachine, cx: &MotorContext) -> bool;

    /// Siblings to stop before this ability's start takes effect.
    fn stops_on_start(&self) -> SiblingStop {
        SiblingStop::None
    }

    /// Whether the ability allows itself to be stopped right now.
    fn can_stop(&self, _movement: &MoveStateMachine, _cx: &MotorContext) -> bool {
        true
    }

    /// Commit whatever the start costs (stamina, a ledge target). Runs before
    /// activation; returning `false` leaves the ability inactive and silent.
    fn reserve(&mut self, _movement: &MoveStateMachine, _cx: &mut MotorContext) -> bool {
        true
    }

    fn on_start(&mut self, _movement: &mut MoveStateMachine, _cx: &mut MotorContext) {}

    fn on_stop(&mut self, _movement: &mut MoveStateMachine, _cx: &mut MotorContext) {}

    fn set_inputs(&mut self, _movement: &mut MoveStateMachine, _cx: &mut MotorContext) {}

    /// Runs every tick, active or not, before the start check.
    fn passive_update(&mut self, _movement: &mut MoveStateMachine, _cx: &mut MotorContext) {}

    fn before_update(&mut self, _movement: &mut MoveStateMachine, _cx: &mut MotorContext) {}

    fn update_rotation(
        &mut self,
        _rotation: &mut Quat,
        _movement: &mut MoveStateMachine,
        _cx: &mut MotorContext,
    ) {
    }

    fn update_velocity(
        &mut self,
        _velocity: &mut Vec3,
        _movement: &mut MoveStateMachine,
        _cx: &mut MotorContext,
    ) {
    }

    fn after_update(&mut self, _movement: &mut MoveStateMachine, _cx: &mut MotorContext) {}

    fn post_grounding_update(&mut self, _movement: &mut MoveStateMachine, _cx: &mut MotorContext) {
    }

    /// The state machine entered Grounded or a wall mode.
    fn on_grounded(&mut self, _hard: bool, _movement: &mut MoveStateMachine, _cx: &mut MotorContext) {
    }

    fn on_ground_hit(
        &mut self,
        _hit: &HitReport,
        _movement: &mut MoveStateMachine,
        _cx: &mut MotorContext,
    ) {
    }

    fn on_movement_hit(
        &mut self,
        _hit: &HitReport,
        _movement: &mut MoveStateMachine,
        _cx: &mut MotorContext,
    ) {
    }

    fn on_discrete_collision(
        &mut self,
        _collider: ColliderId,
        _movement: &mut MoveStateMachine,
        _cx: &mut MotorContext,
    ) {
    }

    /// May override the solver's stability verdict for a hit.
    fn process_hit_stability_report(
        &mut self,
        _hit: &HitReport,
        _is_stable: &mut bool,
        _movement: &mut MoveStateMachine,
        _cx: &mut MotorContext,
    ) {
    }

    // ========================================================================
    // Provided
    // ========================================================================

    fn is_active(&self) -> bool {
        self.core().is_active()
    }

    fn flags(&self) -> AbilityFlags {
        self.core().flags()
    }

    /// Reserve, then activate. Returns whether the ability started.
    ///
    /// Callers check [`Self::can_start`] first.
    fn start(&mut self, movement: &mut MoveStateMachine, cx: &mut MotorContext) -> bool {
        if !self.reserve(movement, cx) {
            debug!(kind = ?self.kind(), "ability start refused");
            return false;
        }
        self.activate(movement, cx);
        true
    }

    /// Activate after a successful [`Self::reserve`].
    fn activate(&mut self, movement: &mut MoveStateMachine, cx: &mut MotorContext) {
        let kind = self.kind();
        self.core_mut().activate(cx.now);
        debug!(?kind, mode = ?movement.mode(), "ability started");
        cx.emit(MotorEvent::AbilityActivated(kind));
        self.on_start(movement, cx);
    }

    /// Deactivate if active.
    fn stop(&mut self, movement: &mut MoveStateMachine, cx: &mut MotorContext) {
        if !self.is_active() {
            return;
        }
        let kind = self.kind();
        self.core_mut().deactivate();
        self.on_stop(movement, cx);
        debug!(?kind, "ability stopped");
        cx.emit(MotorEvent::AbilityStopped(kind));
    }
}

/// The closed set of abilities.
#[derive(Debug, Clone)]
pub enum Ability {
    AirJump(AirJump),
    Dash(Dash),
    Slide(Slide),
    Vault(Vault),
}

macro_rules! dispatch {
    ($self:expr, $ability:ident => $body:expr) => {
        match $self {
            Ability::AirJump($ability) => $body,
            Ability::Dash($ability) => $body,
            Ability::Slide($ability) => $body,
            Ability::Vault($ability) => $body,
        }
    };
}

impl Ability {
    /// Build an inactive ability of `kind` using its configured flags.
    pub fn new(kind: AbilityKind, settings: &AbilitySettings) -> Self {
        match kind {
            AbilityKind::AirJump => Self::AirJump(AirJump::new(settings.air_jump.flags)),
            AbilityKind::Dash => Self::Dash(Dash::new(settings.dash.flags)),
            AbilityKind::Slide => Self::Slide(Slide::new(settings.slide.flags)),
            AbilityKind::Vault => Self::Vault(Vault::new(settings.vault.flags)),
        }
    }

    pub fn behavior(&self) -> &dyn AbilityBehavior {
        dispatch!(self, a => a)
    }

    pub fn behavior_mut(&mut self) -> &mut dyn AbilityBehavior {
        dispatch!(self, a => a)
    }
}

/// Typed access to one variant of [`Ability`].
pub trait AbilityVariant: AbilityBehavior + Sized {
    fn from_ability(ability: &Ability) -> Option<&Self>;

    fn from_ability_mut(ability: &mut Ability) -> Option<&mut Self>;
}

macro_rules! impl_variant {
    ($variant:ident) => {
        impl AbilityVariant for $variant {
            fn from_ability(ability: &Ability) -> Option<&Self> {
                match ability {
                    Ability::$variant(a) => Some(a),
                    _ => None,
                }
            }

            fn from_ability_mut(ability: &mut Ability) -> Option<&mut Self> {
                match ability {
                    Ability::$variant(a) => Some(a),
                    _ => None,
                }
            }
        }
    };
}

impl_variant!(AirJump);
impl_variant!(Dash);
impl_variant!(Slide);
impl_variant!(Vault);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_configured_flags() {
        let mut settings = AbilitySettings::default();
        settings.slide.flags.plays_footsteps = true;
        let slide = Ability::new(AbilityKind::Slide, &settings);
        assert_eq!(slide.behavior().kind(), AbilityKind::Slide);
        assert!(slide.behavior().flags().plays_footsteps);
        assert!(!slide.behavior().is_active());
    }

    #[test]
    fn test_typed_lookup() {
        let settings = AbilitySettings::default();
        let mut dash = Ability::new(AbilityKind::Dash, &settings);
        assert!(Dash::from_ability(&dash).is_some());
        assert!(Vault::from_ability(&dash).is_none());
        assert!(Dash::from_ability_mut(&mut dash).is_some());
    }
}
