//! Crouch intent and crouch state.
//!
//! `should_crouch` is what the player wants; `is_crouching` is what the
//! capsule currently is. Standing back up is deferred until an overlap test
//! at full height passes, so the two can disagree for several ticks.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrouchState {
    pub should_crouch: bool,
    is_crouching: bool,
    crouched_this_update: bool,
}

impl CrouchState {
    pub fn is_crouching(&self) -> bool {
        self.is_crouching
    }

    /// Crouch began (or was re-applied) during the current update.
    pub fn crouched_this_update(&self) -> bool {
        self.crouched_this_update
    }

    /// Enter the crouched state. Returns `true` if the capsule must shrink.
    pub fn crouch(&mut self) -> bool {
        let changed = !self.is_crouching;
        self.should_crouch = true;
        self.is_crouching = true;
        self.crouched_this_update = true;
        changed
    }

    /// Leave the crouched state. Returns `true` if the capsule must grow.
    pub fn uncrouch(&mut self) -> bool {
        let changed = self.is_crouching;
        self.should_crouch = false;
        self.is_crouching = false;
        changed
    }

    pub fn begin_update(&mut self) {
        self.crouched_this_update = false;
    }

    pub fn mark_crouched_this_update(&mut self) {
        if self.is_crouching {
            self.crouched_this_update = true;
        }
    }

    /// Wants to stand but is still crouched.
    pub fn wants_to_stand(&self) -> bool {
        self.is_crouching && !self.should_crouch
    }

    /// Wants to crouch but is still standing.
    pub fn wants_to_crouch(&self) -> bool {
        self.should_crouch && !self.is_crouching
    }
}
