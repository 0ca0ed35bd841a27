//! Auto-spawn timing and edge placement for ordinary nodes

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::node::NodeShape;
use crate::consts::*;
use crate::{aim, lerp_range, level_scale};

/// Where and how to place a new node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnInfo {
    pub position: Vec2,
    pub shape: NodeShape,
    /// Unit vector (or zero when spawn point and target coincide)
    pub direction: Vec2,
}

impl SpawnInfo {
    pub fn new(position: Vec2, shape: NodeShape, direction: Vec2) -> Self {
        Self {
            position,
            shape,
            direction,
        }
    }
}

/// Screen edge a node enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenEdge {
    Top,
    Right,
    Bottom,
    Left,
}

impl ScreenEdge {
    pub const ALL: [ScreenEdge; 4] = [
        ScreenEdge::Top,
        ScreenEdge::Right,
        ScreenEdge::Bottom,
        ScreenEdge::Left,
    ];

    /// Pick an edge uniformly
    pub fn random(rng: &mut Pcg32) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Point `offset` pixels outside this edge. `t` in [0, 1] slides along
    /// the edge between `margin` and the far end minus `margin`.
    pub fn point(&self, screen: Vec2, offset: f32, margin: f32, t: f32) -> Vec2 {
        match self {
            ScreenEdge::Top => Vec2::new(lerp_range(margin, screen.x - margin, t), -offset),
            ScreenEdge::Right => Vec2::new(screen.x + offset, lerp_range(margin, screen.y - margin, t)),
            ScreenEdge::Bottom => Vec2::new(lerp_range(margin, screen.x - margin, t), screen.y + offset),
            ScreenEdge::Left => Vec2::new(-offset, lerp_range(margin, screen.y - margin, t)),
        }
    }
}

/// Auto-spawn cadence and placement
pub trait SpawnScheduler {
    fn initialize(&mut self, screen_width: f32, screen_height: f32);
    fn update_auto_spawn(&mut self, dt: f32);
    fn reset_spawn_timer(&mut self);
    fn set_current_level(&mut self, level: u32);
    fn current_level(&self) -> u32;
    /// Seconds between spawns at the current level
    fn spawn_interval(&self) -> f32;
    fn should_auto_spawn(&self) -> bool;
    fn next_spawn(&mut self) -> SpawnInfo;
    /// Scale a base HP by the current level
    fn calculate_node_hp(&self, base_hp: f32) -> f32;
}

/// Spawns nodes just outside a random screen edge, aimed near the center
#[derive(Debug, Clone)]
pub struct EdgeSpawner {
    screen: Vec2,
    timer: f32,
    level: u32,
    rng: Pcg32,
}

impl EdgeSpawner {
    pub fn new(seed: u64) -> Self {
        Self {
            screen: Vec2::ZERO,
            timer: 0.0,
            level: 1,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Weighted pick: 60% square, 30% circle, 10% hexagon
    fn random_shape(&mut self) -> NodeShape {
        match self.rng.random_range(0..100u32) {
            0..60 => NodeShape::Square,
            60..90 => NodeShape::Circle,
            _ => NodeShape::Hexagon,
        }
    }

    fn jitter(&mut self) -> f32 {
        lerp_range(-TARGET_CENTER_VARIANCE, TARGET_CENTER_VARIANCE, self.rng.random::<f32>())
    }
}

/// Spawn interval for a level, floored at the minimum
pub fn spawn_interval_for_level(level: u32) -> f32 {
    let interval = BASE_SPAWN_INTERVAL - level.saturating_sub(1) as f32 * SPAWN_INTERVAL_DECAY;
    interval.max(MIN_SPAWN_INTERVAL)
}

impl SpawnScheduler for EdgeSpawner {
    fn initialize(&mut self, screen_width: f32, screen_height: f32) {
        self.screen = Vec2::new(screen_width, screen_height);
    }

    fn update_auto_spawn(&mut self, dt: f32) {
        self.timer += dt;
    }

    fn reset_spawn_timer(&mut self) {
        self.timer = 0.0;
    }

    fn set_current_level(&mut self, level: u32) {
        self.level = level.max(1);
    }

    fn current_level(&self) -> u32 {
        self.level
    }

    fn spawn_interval(&self) -> f32 {
        spawn_interval_for_level(self.level)
    }

    fn should_auto_spawn(&self) -> bool {
        self.timer >= self.spawn_interval()
    }

    fn next_spawn(&mut self) -> SpawnInfo {
        let edge = ScreenEdge::random(&mut self.rng);
        let t = self.rng.random::<f32>();
        let position = edge.point(self.screen, SPAWN_EDGE_OFFSET, SPAWN_EDGE_OFFSET, t);

        let center = self.screen / 2.0;
        let target = center + Vec2::new(self.jitter(), self.jitter());

        SpawnInfo {
            position,
            shape: self.random_shape(),
            direction: aim(position, target),
        }
    }

    fn calculate_node_hp(&self, base_hp: f32) -> f32 {
        base_hp * level_scale(self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn spawner() -> EdgeSpawner {
        let mut spawner = EdgeSpawner::new(42);
        spawner.initialize(800.0, 600.0);
        spawner
    }

    #[test]
    fn test_node_hp_scaling() {
        let mut spawner = spawner();
        assert_eq!(spawner.calculate_node_hp(100.0), 100.0);
        spawner.set_current_level(5);
        assert!((spawner.calculate_node_hp(100.0) - 180.0).abs() < 1e-4);
    }

    #[test]
    fn test_spawn_cadence_tightens_with_level() {
        let mut spawner = spawner();
        spawner.update_auto_spawn(1.5);
        assert!(!spawner.should_auto_spawn());

        spawner.set_current_level(5);
        assert!((spawner.spawn_interval() - 1.4).abs() < 1e-5);
        assert!(spawner.should_auto_spawn());

        spawner.reset_spawn_timer();
        assert!(!spawner.should_auto_spawn());
    }

    #[test]
    fn test_spawn_interval_floor() {
        assert_eq!(spawn_interval_for_level(1), 2.0);
        assert_eq!(spawn_interval_for_level(12), MIN_SPAWN_INTERVAL);
        assert_eq!(spawn_interval_for_level(100), MIN_SPAWN_INTERVAL);
    }

    #[test]
    fn test_spawns_outside_screen_aimed_inward() {
        let mut spawner = spawner();
        for _ in 0..200 {
            let info = spawner.next_spawn();
            let p = info.position;
            let outside = p.x <= -SPAWN_EDGE_OFFSET
                || p.x >= 800.0 + SPAWN_EDGE_OFFSET
                || p.y <= -SPAWN_EDGE_OFFSET
                || p.y >= 600.0 + SPAWN_EDGE_OFFSET;
            assert!(outside, "spawn {p:?} should be outside the screen");
            assert!((info.direction.length() - 1.0).abs() < 1e-4);

            // Heading must point toward the jittered center box
            let to_center = Vec2::new(400.0, 300.0) - p;
            assert!(info.direction.dot(to_center) > 0.0);
        }
    }

    #[test]
    fn test_shape_weights() {
        let mut spawner = spawner();
        let mut counts = [0u32; 3];
        for _ in 0..10_000 {
            match spawner.next_spawn().shape {
                NodeShape::Square => counts[0] += 1,
                NodeShape::Circle => counts[1] += 1,
                NodeShape::Hexagon => counts[2] += 1,
                NodeShape::Boss => panic!("spawner never produces bosses"),
            }
        }
        assert!((5_500..6_500).contains(&counts[0]), "{counts:?}");
        assert!((2_500..3_500).contains(&counts[1]), "{counts:?}");
        assert!((600..1_400).contains(&counts[2]), "{counts:?}");
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let mut a = spawner();
        let mut b = spawner();
        for _ in 0..20 {
            assert_eq!(a.next_spawn(), b.next_spawn());
        }
    }

    #[test]
    fn test_edge_points() {
        let screen = Vec2::new(800.0, 600.0);
        assert_eq!(ScreenEdge::Top.point(screen, 50.0, 0.0, 0.5), Vec2::new(400.0, -50.0));
        assert_eq!(ScreenEdge::Right.point(screen, 50.0, 0.0, 0.0), Vec2::new(850.0, 0.0));
        assert_eq!(ScreenEdge::Bottom.point(screen, 50.0, 0.0, 1.0), Vec2::new(800.0, 650.0));
        assert_eq!(ScreenEdge::Left.point(screen, 50.0, 0.0, 0.5), Vec2::new(-50.0, 300.0));
    }

    proptest! {
        #[test]
        fn prop_hp_scaling_law(level in 1u32..50, base in 1.0f32..500.0) {
            let mut spawner = EdgeSpawner::new(1);
            spawner.set_current_level(level);
            let expected = base * (1.0 + (level - 1) as f32 * 0.2);
            prop_assert!((spawner.calculate_node_hp(base) - expected).abs() < 1e-2);
        }

        #[test]
        fn prop_interval_never_grows_with_level(level in 1u32..100) {
            let here = spawn_interval_for_level(level);
            let next = spawn_interval_for_level(level + 1);
            prop_assert!(next <= here);
            prop_assert!(next >= MIN_SPAWN_INTERVAL);
        }
    }
}
