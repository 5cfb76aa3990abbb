//! Jump request buffering.
//!
//! A press is stored as a request and stays pending until it is either
//! honored by the velocity update or expires against the grace windows.
//! Once honored the jump is marked consumed, so a request can never
//! produce more than one impulse before ground (or a wall) resets it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JumpBuffer {
    /// A jump press is waiting to be honored.
    requested: bool,

    /// A jump has been performed since the last ground or wall contact.
    consumed: bool,

    /// Seconds since the last request.
    time_since_requested: f32,

    /// A jump was performed during the current velocity update.
    jumped_this_frame: bool,
}

impl JumpBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press. Repeated presses only restart the request timer.
    pub fn request(&mut self) {
        self.requested = true;
        self.time_since_requested = 0.0;
    }

    /// Start a velocity update: advance the request timer and clear the
    /// per-frame jump flag.
    pub fn begin_frame(&mut self, delta_time: f32) {
        self.jumped_this_frame = false;
        self.time_since_requested += delta_time;
    }

    /// A request exists that has not been honored yet.
    pub fn is_pending(&self) -> bool {
        self.requested && !self.consumed
    }

    pub fn is_requested(&self) -> bool {
        self.requested
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    pub fn jumped_this_frame(&self) -> bool {
        self.jumped_this_frame
    }

    pub fn time_since_requested(&self) -> f32 {
        self.time_since_requested
    }

    /// Honor the pending request.
    pub fn consume(&mut self) {
        self.requested = false;
        self.consumed = true;
        self.jumped_this_frame = true;
    }

    /// Drop the pending request without jumping.
    pub fn cancel(&mut self) {
        self.requested = false;
    }

    /// Allow the next request to be honored again.
    pub fn reset_consumed(&mut self) {
        self.consumed = false;
    }

    /// Expire a request that has waited on the ground for too long.
    pub fn expire_grounded(&mut self, pre_grounding_grace: f32) {
        if self.requested && self.time_since_requested > pre_grounding_grace {
            self.requested = false;
        }
    }

    /// Expire a request made in the air once both grace windows have passed.
    pub fn expire_airborne(
        &mut self,
        time_airborne: f32,
        pre_grounding_grace: f32,
        post_grounding_grace: f32,
    ) {
        if self.requested
            && time_airborne > post_grounding_grace
            && self.time_since_requested > pre_grounding_grace
        {
            self.requested = false;
        }
    }
}
