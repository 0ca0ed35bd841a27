//! Player health: continuous regeneration vs. level-scaled passive depletion

use crate::consts::*;
use crate::level_scale;

/// Player health pool
pub trait HealthRegulator {
    fn initialize(&mut self, max_health: f32, regen_rate: f32);
    /// Restore to a new max, keeping regen and level settings
    fn reset(&mut self, max_health: f32);
    /// Apply regeneration and any due depletion ticks
    fn update(&mut self, dt: f32);
    /// Immediate loss from an external source, clamped at zero
    fn reduce(&mut self, amount: f32);
    fn restore_to_max(&mut self);
    fn set_max_health(&mut self, max_health: f32);
    fn set_regen_rate(&mut self, regen_rate: f32);
    /// Affects future depletion ticks only
    fn set_current_level(&mut self, level: u32);

    fn current(&self) -> f32;
    fn max(&self) -> f32;
    fn regen_rate(&self) -> f32;
    fn is_zero(&self) -> bool;
}

#[derive(Debug, Clone)]
pub struct PlayerHealth {
    current: f32,
    max: f32,
    regen_rate: f32,
    level: u32,
    /// Time accumulated toward the next depletion tick
    depletion_timer: f32,
}

impl Default for PlayerHealth {
    fn default() -> Self {
        Self {
            current: HEALTH_DEFAULT,
            max: HEALTH_DEFAULT,
            regen_rate: 0.0,
            level: 1,
            depletion_timer: 0.0,
        }
    }
}

impl PlayerHealth {
    pub fn new(max_health: f32, regen_rate: f32) -> Self {
        let mut health = Self::default();
        health.initialize(max_health, regen_rate);
        health
    }

    /// Health removed by one depletion tick at the current level
    pub fn depletion_per_tick(&self) -> f32 {
        BASE_DEPLETION_RATE * level_scale(self.level)
    }

    fn apply_regeneration(&mut self, dt: f32) {
        if self.regen_rate > 0.0 {
            self.current = (self.current + self.regen_rate * dt).min(self.max);
        }
    }

    fn apply_depletion(&mut self, dt: f32) {
        self.depletion_timer += dt;
        while self.depletion_timer >= DEPLETION_INTERVAL {
            self.depletion_timer -= DEPLETION_INTERVAL;
            self.current = (self.current - self.depletion_per_tick()).max(0.0);
        }
    }
}

impl HealthRegulator for PlayerHealth {
    fn initialize(&mut self, max_health: f32, regen_rate: f32) {
        self.max = max_health.max(0.0);
        self.current = self.max;
        self.regen_rate = regen_rate.max(0.0);
        self.depletion_timer = 0.0;
    }

    fn reset(&mut self, max_health: f32) {
        self.max = max_health.max(0.0);
        self.current = self.max;
        self.depletion_timer = 0.0;
    }

    fn update(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.apply_regeneration(dt);
        self.apply_depletion(dt);
    }

    fn reduce(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }

    fn restore_to_max(&mut self) {
        self.current = self.max;
    }

    fn set_max_health(&mut self, max_health: f32) {
        self.max = max_health.max(0.0);
        self.current = self.current.min(self.max);
    }

    fn set_regen_rate(&mut self, regen_rate: f32) {
        self.regen_rate = regen_rate.max(0.0);
    }

    fn set_current_level(&mut self, level: u32) {
        self.level = level.max(1);
    }

    fn current(&self) -> f32 {
        self.current
    }

    fn max(&self) -> f32 {
        self.max
    }

    fn regen_rate(&self) -> f32 {
        self.regen_rate
    }

    fn is_zero(&self) -> bool {
        self.current <= 0.0
    }
}
