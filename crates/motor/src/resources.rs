//! Concrete actor resources: an integer stamina pool with regeneration.

use serde::{Deserialize, Serialize};

use crate::host::{ActorResources, Momentum};

/// Stamina measured in whole units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaminaPool {
    current: u32,
    max: u32,

    /// Seconds per regenerated unit. Zero disables regeneration.
    regen_interval: f32,

    /// Seconds to wait after spending before regeneration resumes.
    regen_delay: f32,

    #[serde(skip)]
    since_spent: f32,
    #[serde(skip)]
    regen_progress: f32,
}

impl StaminaPool {
    pub fn new(max: u32) -> Self {
        Self {
            current: max,
            max,
            regen_interval: 0.0,
            regen_delay: 0.0,
            since_spent: 0.0,
            regen_progress: 0.0,
        }
    }

    pub fn with_regen(mut self, interval: f32, delay: f32) -> Self {
        self.regen_interval = interval;
        self.regen_delay = delay;
        self
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn set_current(&mut self, value: u32) {
        self.current = value.min(self.max);
    }

    pub fn can_spend(&self, cost: u32) -> bool {
        self.current >= cost
    }

    pub fn try_spend(&mut self, cost: u32) -> bool {
        if !self.can_spend(cost) {
            return false;
        }
        self.current -= cost;
        if cost > 0 {
            self.since_spent = 0.0;
            self.regen_progress = 0.0;
        }
        true
    }

    /// Advance regeneration by `delta_time` seconds.
    pub fn update(&mut self, delta_time: f32) {
        self.since_spent += delta_time;
        if self.regen_interval <= 0.0 || self.current >= self.max {
            self.regen_progress = 0.0;
            return;
        }
        if self.since_spent < self.regen_delay {
            return;
        }
        self.regen_progress += delta_time;
        while self.regen_progress >= self.regen_interval && self.current < self.max {
            self.regen_progress -= self.regen_interval;
            self.current += 1;
        }
    }
}

/// Stamina, momentum and the invulnerability flag for a single actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorVitals {
    pub stamina: StaminaPool,
    pub momentum: Momentum,
    pub invulnerable: bool,
}

impl ActorVitals {
    pub fn new(stamina: StaminaPool) -> Self {
        Self {
            stamina,
            momentum: Momentum::default(),
            invulnerable: false,
        }
    }
}

impl Default for ActorVitals {
    fn default() -> Self {
        Self::new(StaminaPool::new(5).with_regen(1.0, 0.75))
    }
}

impl ActorResources for ActorVitals {
    fn can_spend_stamina(&self, cost: u32) -> bool {
        self.stamina.can_spend(cost)
    }

    fn try_spend_stamina(&mut self, cost: u32) -> bool {
        self.stamina.try_spend(cost)
    }

    fn momentum(&self) -> Momentum {
        self.momentum
    }

    fn set_invulnerable(&mut self, invulnerable: bool) {
        self.invulnerable = invulnerable;
    }
}
