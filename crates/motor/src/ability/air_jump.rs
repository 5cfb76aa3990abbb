//! Extra jumps while airborne.

use glam::Vec3;

use crate::context::MotorContext;
use crate::events::{AudioCue, MotorEvent, ShakeTag};
use crate::math::project_on_plane;
use crate::movement::{AbilityFlags, MoveMode, MoveStateMachine};

use super::{AbilityBehavior, AbilityCore, AbilityKind};

#[derive(Debug, Clone)]
pub struct AirJump {
    core: AbilityCore,

    /// Air jumps used since the last hard grounding.
    jumps_consumed: u32,

    /// Impulse waiting for this tick's velocity update.
    jump_requested: bool,
}

impl AirJump {
    pub fn new(flags: AbilityFlags) -> Self {
        Self {
            core: AbilityCore::new(flags),
            jumps_consumed: 0,
            jump_requested: false,
        }
    }

    pub fn jumps_consumed(&self) -> u32 {
        self.jumps_consumed
    }

    /// Air jumps left before the next hard grounding.
    pub fn charges_left(&self, cx: &MotorContext) -> u32 {
        cx.unlocks.additional_air_jumps.saturating_sub(self.jumps_consumed)
    }
}

impl AbilityBehavior for AirJump {
    fn kind(&self) -> AbilityKind {
        AbilityKind::AirJump
    }

    fn core(&self) -> &AbilityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AbilityCore {
        &mut self.core
    }

    fn can_start(&self, movement: &MoveStateMachine, cx: &MotorContext) -> bool {
        let settings = &cx.config.abilities.air_jump;
        !self.is_active()
            && self.charges_left(cx) > 0
            && movement.mode() == MoveMode::Airborne
            && movement.time_in_state(cx.now) >= cx.config.jump.post_grounding_grace
            && cx.resources.can_spend_stamina(settings.stamina_cost)
            && cx.input.jump_down()
    }

    fn reserve(&mut self, _movement: &MoveStateMachine, cx: &mut MotorContext) -> bool {
        let cost = cx.config.abilities.air_jump.stamina_cost;
        cx.resources.try_spend_stamina(cost)
    }

    fn on_start(&mut self, _movement: &mut MoveStateMachine, _cx: &mut MotorContext) {
        self.jump_requested = true;
    }

    fn update_velocity(
        &mut self,
        velocity: &mut Vec3,
        _movement: &mut MoveStateMachine,
        cx: &mut MotorContext,
    ) {
        if !self.jump_requested {
            return;
        }
        self.jump_requested = false;

        let settings = &cx.config.abilities.air_jump;
        let up = cx.motor.up();
        *velocity = project_on_plane(*velocity, up) + up * settings.jump_speed;
        self.jumps_consumed += 1;

        cx.emit(MotorEvent::ScreenShake {
            amount: settings.screen_shake,
            tag: ShakeTag::Subtle,
        });
        cx.emit(MotorEvent::Audio(AudioCue::AirJump));
    }

    fn after_update(&mut self, movement: &mut MoveStateMachine, cx: &mut MotorContext) {
        self.stop(movement, cx);
    }

    fn on_grounded(&mut self, hard: bool, _movement: &mut MoveStateMachine, _cx: &mut MotorContext) {
        if hard {
            self.jumps_consumed = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::GroundingReport;
    use crate::movement::InputButtons;
    use crate::test_support::Harness;

    fn airborne(h: &mut Harness) -> MoveStateMachine {
        h.motor.grounding = GroundingReport::airborne();
        h.now = 1.0;
        MoveStateMachine::new(MoveMode::Airborne)
    }

    #[test]
    fn test_air_jump_replaces_vertical_speed() {
        let mut h = Harness::new();
        let mut sm = airborne(&mut h);
        let mut air_jump = AirJump::new(AbilityFlags::passthrough());
        h.press(InputButtons::JUMP);

        assert!(air_jump.can_start(&sm, &h.cx()));
        air_jump.start(&mut sm, &mut h.cx());
        assert_eq!(h.resources.stamina.current(), 4);

        let mut velocity = Vec3::new(3.0, -12.0, 0.0);
        air_jump.update_velocity(&mut velocity, &mut sm, &mut h.cx());
        assert!((velocity - Vec3::new(3.0, 10.0, 0.0)).length() < 1e-4);
        assert_eq!(air_jump.jumps_consumed(), 1);

        air_jump.after_update(&mut sm, &mut h.cx());
        assert!(!air_jump.is_active());
    }

    #[test]
    fn test_charges_reset_on_hard_grounding_only() {
        let mut h = Harness::new();
        let mut sm = airborne(&mut h);
        let mut air_jump = AirJump::new(AbilityFlags::passthrough());
        h.press(InputButtons::JUMP);
        air_jump.start(&mut sm, &mut h.cx());
        let mut velocity = Vec3::ZERO;
        air_jump.update_velocity(&mut velocity, &mut sm, &mut h.cx());
        air_jump.after_update(&mut sm, &mut h.cx());

        // One unlocked charge, now used.
        assert!(!air_jump.can_start(&sm, &h.cx()));

        air_jump.on_grounded(false, &mut sm, &mut h.cx());
        assert!(!air_jump.can_start(&sm, &h.cx()));
        air_jump.on_grounded(true, &mut sm, &mut h.cx());
        assert!(air_jump.can_start(&sm, &h.cx()));
    }

    #[test]
    fn test_needs_stamina_and_airborne() {
        let mut h = Harness::new();
        let sm = airborne(&mut h);
        let air_jump = AirJump::new(AbilityFlags::passthrough());
        h.press(InputButtons::JUMP);

        h.resources.stamina.set_current(0);
        assert!(!air_jump.can_start(&sm, &h.cx()));

        h.resources.stamina.set_current(3);
        let grounded = MoveStateMachine::new(MoveMode::Grounded);
        assert!(!air_jump.can_start(&grounded, &h.cx()));
    }

    #[test]
    fn test_start_without_stamina_stays_inactive() {
        let mut h = Harness::new();
        let mut sm = airborne(&mut h);
        let mut air_jump = AirJump::new(AbilityFlags::passthrough());
        h.press(InputButtons::JUMP);
        h.resources.stamina.set_current(0);

        assert!(!air_jump.start(&mut sm, &mut h.cx()));
        assert!(!air_jump.is_active());
        assert!(h.events.is_empty());

        let mut velocity = Vec3::new(0.0, -5.0, 0.0);
        air_jump.update_velocity(&mut velocity, &mut sm, &mut h.cx());
        assert_eq!(velocity, Vec3::new(0.0, -5.0, 0.0));
        assert_eq!(air_jump.jumps_consumed(), 0);
    }

    #[test]
    fn test_waits_for_post_grounding_grace() {
        let mut h = Harness::new();
        let sm = airborne(&mut h);
        let air_jump = AirJump::new(AbilityFlags::passthrough());
        h.press(InputButtons::JUMP);
        // The ground jump still owns the first moments after leaving ground.
        h.now = 0.05;
        assert!(!air_jump.can_start(&sm, &h.cx()));
    }
}
