//! Damage zone: the square area around the cursor that hurts nodes
//!
//! Every application costs the player health, so the zone is a trade-off:
//! cheap against ordinary nodes, expensive against the boss, and slightly
//! more expensive each level.

use glam::Vec2;

use super::node::{NodeShape, NodeState, ZoneTarget};
use crate::consts::*;
use crate::level_scale;

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Square of side `size` centered on `center`
    pub fn centered_square(center: Vec2, size: f32) -> Self {
        let half = Vec2::splat(size / 2.0);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Closest point inside the rectangle to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }

    /// Circle/rectangle overlap (touching counts)
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        let delta = center - self.closest_point(center);
        delta.length_squared() <= radius * radius
    }

    /// Overlap with the box `center ± half_extent` (touching counts)
    pub fn overlaps_box(&self, center: Vec2, half_extent: f32) -> bool {
        let apart = center.x + half_extent < self.min.x
            || center.x - half_extent > self.max.x
            || center.y + half_extent < self.min.y
            || center.y - half_extent > self.max.y;
        !apart
    }
}

/// One application of the damage zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneStrike {
    pub center: Vec2,
    /// Side length of the square
    pub zone_size: f32,
    pub damage: f32,
    pub level: u32,
}

/// Player health lost for hitting a node of `shape` at `level`
pub fn health_cost(shape: NodeShape, level: u32) -> f32 {
    let multiplier = if shape == NodeShape::Boss {
        BOSS_COST_MULTIPLIER
    } else {
        1.0
    };
    BASE_HEALTH_COST * multiplier * level_scale(level)
}

/// Whether a target's bounding circle touches the zone rectangle
pub fn is_in_zone(target: &dyn ZoneTarget, zone: &Rect) -> bool {
    let radius = target.shape().bounding_radius(target.size());
    zone.overlaps_circle(target.position(), radius)
}

/// Fires the damage zone on a fixed cadence
pub trait DamageZoneProcessor {
    fn update_timer(&mut self, dt: f32);
    fn should_deal_damage(&self) -> bool;
    fn reset_timer(&mut self);

    /// Damage every active target inside the zone. `on_damaged` receives the
    /// target (after damage) and the health cost owed by the player.
    fn process_damage_zone(
        &self,
        strike: &ZoneStrike,
        targets: &mut dyn Iterator<Item = &mut dyn ZoneTarget>,
        on_damaged: &mut dyn FnMut(&dyn ZoneTarget, f32),
    );
}

#[derive(Debug, Clone)]
pub struct DamageZone {
    timer: f32,
    interval: f32,
}

impl Default for DamageZone {
    fn default() -> Self {
        Self {
            timer: 0.0,
            interval: DAMAGE_INTERVAL,
        }
    }
}

impl DamageZone {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }
}

impl DamageZoneProcessor for DamageZone {
    fn update_timer(&mut self, dt: f32) {
        self.timer += dt;
    }

    fn should_deal_damage(&self) -> bool {
        self.timer >= self.interval
    }

    fn reset_timer(&mut self) {
        self.timer = 0.0;
    }

    fn process_damage_zone(
        &self,
        strike: &ZoneStrike,
        targets: &mut dyn Iterator<Item = &mut dyn ZoneTarget>,
        on_damaged: &mut dyn FnMut(&dyn ZoneTarget, f32),
    ) {
        let zone = Rect::centered_square(strike.center, strike.zone_size);

        for target in targets {
            if target.state() != NodeState::Active {
                continue;
            }
            if !is_in_zone(&*target, &zone) {
                continue;
            }

            target.take_damage(strike.damage);
            let cost = health_cost(target.shape(), strike.level);
            on_damaged(&*target, cost);
        }
    }
}
