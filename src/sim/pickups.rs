//! Point pickups dropped by destroyed nodes

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::damage_zone::Rect;
use crate::consts::*;
use crate::{lerp_range, polar_to_cartesian};

/// A collectible worth points, expiring after its lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointPickup {
    pub id: u32,
    pub pos: Vec2,
    /// Center of the cluster this pickup belongs to
    pub spawn_origin: Vec2,
    pub size: f32,
    pub lifetime: f32,
    pub remaining_time: f32,
    pub points: u32,
}

impl PointPickup {
    /// Fraction of life left: 1.0 fresh, 0.0 expired
    pub fn life_ratio(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 0.0;
        }
        self.remaining_time / self.lifetime
    }

    /// Seconds since spawn
    pub fn age(&self) -> f32 {
        self.lifetime - self.remaining_time
    }

    /// Past the anti-instant-collection grace period
    pub fn is_collectible(&self) -> bool {
        self.age() >= PICKUP_COLLECT_DELAY
    }
}

/// Pickup spawning, aging and collection
pub trait PickupLedger {
    fn initialize(&mut self, screen_height: f32);
    /// Age every pickup and drop the expired ones
    fn update(&mut self, dt: f32);
    /// Wipe pickups, the id counter and the collected total
    fn reset(&mut self);
    fn clear(&mut self) {
        self.reset();
    }

    /// Drop a randomly sized cluster of one-point pickups around `origin`
    fn spawn_cluster(&mut self, origin: Vec2);
    fn spawn_point_pickups(&mut self, origin: Vec2, count: u32, point_value: u32);

    /// Collect by id. Fails for unknown ids and pickups still in their grace period.
    fn collect_pickup(&mut self, id: u32) -> bool;
    /// Collect every eligible pickup overlapping the square zone at `center`
    fn process_pickup_collection(&mut self, center: Vec2, zone_size: f32) -> Vec<PointPickup>;

    fn pickups(&self) -> &[PointPickup];
    /// Total points collected since the last reset
    fn pickup_points(&self) -> u32;
}

#[derive(Debug, Clone)]
pub struct Pickups {
    pickups: Vec<PointPickup>,
    next_id: u32,
    collected_points: u32,
    screen_height: f32,
    rng: Pcg32,
}

impl Pickups {
    pub fn new(seed: u64) -> Self {
        Self {
            pickups: Vec::new(),
            next_id: 0,
            collected_points: 0,
            screen_height: 0.0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    fn random_between(&mut self, min: f32, max: f32) -> f32 {
        lerp_range(min, max, self.rng.random::<f32>())
    }
}

impl PickupLedger for Pickups {
    fn initialize(&mut self, screen_height: f32) {
        self.screen_height = screen_height;
    }

    fn update(&mut self, dt: f32) {
        for pickup in &mut self.pickups {
            pickup.remaining_time -= dt;
        }
        self.pickups.retain(|p| p.remaining_time > 0.0);
    }

    fn reset(&mut self) {
        self.pickups.clear();
        self.next_id = 0;
        self.collected_points = 0;
    }

    fn spawn_cluster(&mut self, origin: Vec2) {
        let count = self.rng.random_range(PICKUP_CLUSTER_MIN..=PICKUP_CLUSTER_MAX);
        self.spawn_point_pickups(origin, count, 1);
    }

    fn spawn_point_pickups(&mut self, origin: Vec2, count: u32, point_value: u32) {
        let min_radius = self.screen_height * PICKUP_MIN_RADIUS_FACTOR;
        let max_radius = self.screen_height * PICKUP_MAX_RADIUS_FACTOR;
        let size = self.screen_height * PICKUP_SIZE_FACTOR;

        for _ in 0..count {
            let angle = self.random_between(0.0, std::f32::consts::TAU);
            let radius = self.random_between(min_radius, max_radius);

            let id = self.next_id;
            self.next_id += 1;

            self.pickups.push(PointPickup {
                id,
                pos: origin + polar_to_cartesian(radius, angle),
                spawn_origin: origin,
                size,
                lifetime: PICKUP_LIFETIME,
                remaining_time: PICKUP_LIFETIME,
                points: point_value,
            });
        }
    }

    fn collect_pickup(&mut self, id: u32) -> bool {
        let Some(index) = self.pickups.iter().position(|p| p.id == id) else {
            return false;
        };
        if !self.pickups[index].is_collectible() {
            return false;
        }

        let pickup = self.pickups.remove(index);
        self.collected_points = self.collected_points.saturating_add(pickup.points);
        true
    }

    fn process_pickup_collection(&mut self, center: Vec2, zone_size: f32) -> Vec<PointPickup> {
        let zone = Rect::centered_square(center, zone_size);

        let hits: Vec<PointPickup> = self
            .pickups
            .iter()
            .filter(|p| p.is_collectible() && zone.overlaps_box(p.pos, p.size))
            .cloned()
            .collect();

        hits.into_iter().filter(|p| self.collect_pickup(p.id)).collect()
    }

    fn pickups(&self) -> &[PointPickup] {
        &self.pickups
    }

    fn pickup_points(&self) -> u32 {
        self.collected_points
    }
}
