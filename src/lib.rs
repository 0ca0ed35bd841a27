//! Node Zero - A top-down survival arcade game core
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (nodes, damage zone, pickups, levels, upgrades)
//! - `persistence`: Save/load of player progression
//! - `settings`: Runtime configuration for the headless runner

pub mod persistence;
pub mod settings;
pub mod sim;

pub use persistence::{FileSaveStore, MemorySaveStore, SaveData, SaveError, SaveStore};
pub use settings::Settings;

use glam::Vec2;

/// Game balance constants
pub mod consts {
    /// Base movement speed of ordinary nodes (pixels/s)
    pub const NODE_DEFAULT_SPEED: f32 = 75.0;
    /// Ordinary node HP before level scaling
    pub const NODE_BASE_HP: f32 = 100.0;
    /// Node size as a fraction of screen height
    pub const NODE_SIZE_FACTOR: f32 = 0.0375;
    /// Visual rotation rate (degrees/s)
    pub const NODE_ROTATION_SPEED: f32 = 30.0;

    /// Boss defaults
    pub const BOSS_SPEED: f32 = 35.0;
    pub const BOSS_HP_BASE: f32 = 200.0;
    pub const BOSS_HP_PER_LEVEL: f32 = 100.0;
    pub const BOSS_SIZE_FACTOR: f32 = 0.15;
    /// Boss spawns this many boss-sizes outside the screen
    pub const BOSS_EDGE_OFFSET_FACTOR: f32 = 1.5;

    /// Non-boss nodes left of this x are dropped
    pub const OFFSCREEN_LIMIT_X: f32 = -200.0;

    /// Scoring
    pub const POINTS_NODE: u32 = 100;
    pub const POINTS_BOSS: u32 = 500;

    /// Shared difficulty slope (+20% per level above 1)
    pub const LEVEL_SCALING_FACTOR: f32 = 0.20;
    /// Survival time before the boss appears (seconds)
    pub const LEVEL_DURATION: f32 = 60.0;

    /// Pickups
    pub const PICKUP_LIFETIME: f32 = 10.0;
    /// Minimum age before a pickup can be collected (seconds)
    pub const PICKUP_COLLECT_DELAY: f32 = 0.1;
    pub const PICKUP_MIN_RADIUS_FACTOR: f32 = 0.0125;
    pub const PICKUP_MAX_RADIUS_FACTOR: f32 = 0.05;
    pub const PICKUP_SIZE_FACTOR: f32 = 0.0075;
    pub const PICKUP_CLUSTER_MIN: u32 = 5;
    pub const PICKUP_CLUSTER_MAX: u32 = 10;

    /// Player health
    pub const HEALTH_DEFAULT: f32 = 10.0;
    pub const HEALTH_UPGRADE_COST: u32 = 50;
    pub const HEALTH_UPGRADE_AMOUNT: f32 = 1.0;
    pub const REGEN_UPGRADE_COST: u32 = 100;
    /// Health per second added per regen upgrade
    pub const REGEN_UPGRADE_AMOUNT: f32 = 0.1;
    pub const BASE_DEPLETION_RATE: f32 = 0.1;
    /// Passive depletion cadence (seconds)
    pub const DEPLETION_INTERVAL: f32 = 0.3;

    /// Damage zone
    pub const DAMAGE_ZONE_DEFAULT_SIZE: f32 = 70.0;
    pub const DAMAGE_ZONE_UPGRADE_COST: u32 = 75;
    pub const DAMAGE_ZONE_UPGRADE_AMOUNT: f32 = 10.0;
    pub const DAMAGE_ZONE_MAX_SIZE: f32 = 300.0;
    pub const DAMAGE_PER_TICK_DEFAULT: f32 = 50.0;
    pub const DAMAGE_UPGRADE_COST: u32 = 60;
    pub const DAMAGE_UPGRADE_AMOUNT: f32 = 5.0;
    /// Seconds between damage zone applications
    pub const DAMAGE_INTERVAL: f32 = 1.5;
    /// Player health lost per node hit, before multipliers
    pub const BASE_HEALTH_COST: f32 = 0.5;
    pub const BOSS_COST_MULTIPLIER: f32 = 8.0;

    /// Spawning
    pub const BASE_SPAWN_INTERVAL: f32 = 2.0;
    pub const MIN_SPAWN_INTERVAL: f32 = 0.5;
    pub const SPAWN_INTERVAL_DECAY: f32 = 0.15;
    /// Distance outside the screen edge where nodes appear
    pub const SPAWN_EDGE_OFFSET: f32 = 50.0;
    /// Max jitter around screen center for node aim points
    pub const TARGET_CENTER_VARIANCE: f32 = 150.0;
}

/// Difficulty multiplier for a level: 1.0 at level 1, +20% per level after
#[inline]
pub fn level_scale(level: u32) -> f32 {
    1.0 + level.saturating_sub(1) as f32 * consts::LEVEL_SCALING_FACTOR
}

/// Interpolate between `min` and `max` with `t` in [0, 1]
#[inline]
pub fn lerp_range(min: f32, max: f32, t: f32) -> f32 {
    min + (max - min) * t
}

/// Wrap an angle in degrees to [0, 360)
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Unit vector from `from` toward `to`, or zero when the points coincide
#[inline]
pub fn aim(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_scale() {
        assert_eq!(level_scale(1), 1.0);
        assert!((level_scale(5) - 1.8).abs() < 1e-6);
        // Level 0 is treated as level 1
        assert_eq!(level_scale(0), 1.0);
    }

    #[test]
    fn test_wrap_degrees() {
        assert!((wrap_degrees(370.0) - 10.0).abs() < 1e-4);
        assert!((wrap_degrees(-30.0) - 330.0).abs() < 1e-4);
        assert!(wrap_degrees(720.0) < 1e-4);
    }

    #[test]
    fn test_aim_guards_zero_length() {
        assert_eq!(aim(Vec2::new(5.0, 5.0), Vec2::new(5.0, 5.0)), Vec2::ZERO);
        let dir = aim(Vec2::ZERO, Vec2::new(3.0, 4.0));
        assert!((dir.length() - 1.0).abs() < 1e-6);
    }
}
