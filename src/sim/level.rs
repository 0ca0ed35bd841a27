//! Level timer and boss gating
//!
//! The timer runs while no boss is active. Once it reaches the level duration
//! the boss is due; the timer then stays frozen until the boss is beaten and
//! the next level starts.

use crate::consts::*;

const MAX_PROGRESS_PERCENTAGE: f32 = 100.0;

/// Level progression
pub trait LevelProgressor {
    fn initialize(&mut self, start_level: u32);
    /// Advance the level timer unless a boss fight is in progress
    fn update(&mut self, dt: f32, boss_active: bool);
    /// Jump to `level` with all per-level state cleared
    fn reset(&mut self, level: u32);
    fn increment_nodes_destroyed(&mut self);
    fn set_boss_active(&mut self, active: bool);
    fn set_level_completed(&mut self, completed: bool);
    fn start_next_level(&mut self);

    fn current_level(&self) -> u32;
    fn nodes_destroyed_this_level(&self) -> u32;
    fn is_boss_active(&self) -> bool;
    fn is_level_completed(&self) -> bool;
    fn should_spawn_boss(&self) -> bool;
    /// Level timer as a percentage of the duration, capped at 100
    fn progress_percentage(&self) -> f32;
    fn elapsed(&self) -> f32;
}

#[derive(Debug, Clone)]
pub struct LevelTracker {
    level: u32,
    nodes_destroyed: u32,
    boss_active: bool,
    level_completed: bool,
    timer: f32,
    duration: f32,
}

impl Default for LevelTracker {
    fn default() -> Self {
        Self::with_duration(LEVEL_DURATION)
    }
}

impl LevelTracker {
    pub fn new(start_level: u32) -> Self {
        let mut tracker = Self::default();
        tracker.initialize(start_level);
        tracker
    }

    pub fn with_duration(duration: f32) -> Self {
        Self {
            level: 1,
            nodes_destroyed: 0,
            boss_active: false,
            level_completed: false,
            timer: 0.0,
            duration,
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}

impl LevelProgressor for LevelTracker {
    fn initialize(&mut self, start_level: u32) {
        self.level = start_level.max(1);
    }

    fn update(&mut self, dt: f32, boss_active: bool) {
        if !boss_active && dt > 0.0 {
            self.timer += dt;
        }
    }

    fn reset(&mut self, level: u32) {
        self.level = level.max(1);
        self.nodes_destroyed = 0;
        self.boss_active = false;
        self.level_completed = false;
        self.timer = 0.0;
    }

    fn increment_nodes_destroyed(&mut self) {
        self.nodes_destroyed += 1;
    }

    fn set_boss_active(&mut self, active: bool) {
        self.boss_active = active;
    }

    fn set_level_completed(&mut self, completed: bool) {
        self.level_completed = completed;
    }

    fn start_next_level(&mut self) {
        self.level += 1;
        self.nodes_destroyed = 0;
        self.level_completed = false;
        self.timer = 0.0;
        self.boss_active = false;
    }

    fn current_level(&self) -> u32 {
        self.level
    }

    fn nodes_destroyed_this_level(&self) -> u32 {
        self.nodes_destroyed
    }

    fn is_boss_active(&self) -> bool {
        self.boss_active
    }

    fn is_level_completed(&self) -> bool {
        self.level_completed
    }

    fn should_spawn_boss(&self) -> bool {
        self.timer >= self.duration && !self.boss_active
    }

    fn progress_percentage(&self) -> f32 {
        if self.duration <= 0.0 {
            return MAX_PROGRESS_PERCENTAGE;
        }
        (self.timer / self.duration * MAX_PROGRESS_PERCENTAGE).min(MAX_PROGRESS_PERCENTAGE)
    }

    fn elapsed(&self) -> f32 {
        self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_initialize_clamps_to_level_one() {
        assert_eq!(LevelTracker::new(0).current_level(), 1);
        assert_eq!(LevelTracker::new(4).current_level(), 4);
    }

    #[test]
    fn test_boss_due_after_duration() {
        let mut level = LevelTracker::new(1);
        for _ in 0..59 {
            level.update(1.0, level.is_boss_active());
        }
        assert!(!level.should_spawn_boss());
        level.update(1.0, level.is_boss_active());
        assert!(level.should_spawn_boss());

        level.set_boss_active(true);
        assert!(!level.should_spawn_boss());
    }

    #[test]
    fn test_timer_frozen_during_boss_fight() {
        let mut level = LevelTracker::new(1);
        level.update(10.0, false);
        level.set_boss_active(true);
        level.update(30.0, level.is_boss_active());
        assert_eq!(level.elapsed(), 10.0);
        level.update(-5.0, false);
        assert_eq!(level.elapsed(), 10.0);
    }

    #[test]
    fn test_start_next_level_clears_cycle() {
        let mut level = LevelTracker::new(2);
        level.update(61.0, false);
        level.set_boss_active(true);
        level.increment_nodes_destroyed();
        level.increment_nodes_destroyed();
        level.set_level_completed(true);
        assert_eq!(level.nodes_destroyed_this_level(), 2);

        level.start_next_level();

        assert_eq!(level.current_level(), 3);
        assert_eq!(level.nodes_destroyed_this_level(), 0);
        assert!(!level.is_level_completed());
        assert!(!level.is_boss_active());
        assert_eq!(level.elapsed(), 0.0);
    }

    #[test]
    fn test_reset_to_level() {
        let mut level = LevelTracker::new(5);
        level.update(20.0, false);
        level.set_level_completed(true);
        level.reset(0);
        assert_eq!(level.current_level(), 1);
        assert_eq!(level.elapsed(), 0.0);
        assert!(!level.is_level_completed());
    }

    #[test]
    fn test_progress_percentage() {
        let mut level = LevelTracker::new(1);
        assert_eq!(level.progress_percentage(), 0.0);
        level.update(30.0, false);
        assert!((level.progress_percentage() - 50.0).abs() < 1e-4);
        level.update(90.0, false);
        assert_eq!(level.progress_percentage(), 100.0);
    }

    #[test]
    fn test_zero_duration_is_saturated() {
        let level = LevelTracker::with_duration(0.0);
        assert_eq!(level.progress_percentage(), 100.0);
    }

    proptest! {
        #[test]
        fn prop_progress_within_bounds(steps in proptest::collection::vec(0.0f32..10.0, 0..40)) {
            let mut level = LevelTracker::new(1);
            for dt in steps {
                level.update(dt, false);
                let pct = level.progress_percentage();
                prop_assert!((0.0..=100.0).contains(&pct));
            }
        }
    }
}
