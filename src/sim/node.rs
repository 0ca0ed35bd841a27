//! Enemy nodes
//!
//! A node moves in a straight line at constant speed and spins for visual
//! flair. The simulation owns every node; services only borrow them for the
//! duration of a call.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::wrap_degrees;

/// Node shapes (the boss is a shape of its own)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeShape {
    Circle,
    Square,
    Hexagon,
    Boss,
}

impl NodeShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeShape::Circle => "Circle",
            NodeShape::Square => "Square",
            NodeShape::Hexagon => "Hexagon",
            NodeShape::Boss => "Boss",
        }
    }

    /// Radius that covers the shape at any rotation.
    ///
    /// Square-drawn shapes need the half-diagonal so corners still register
    /// while the node spins.
    pub fn bounding_radius(&self, size: f32) -> f32 {
        match self {
            NodeShape::Circle | NodeShape::Hexagon => size,
            NodeShape::Square | NodeShape::Boss => size * std::f32::consts::SQRT_2,
        }
    }
}

/// Lifecycle of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeState {
    /// Created but not yet placed in the world
    #[default]
    Inactive,
    Active,
    /// Waiting to be reaped by the simulation
    Dead,
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: u32,
    pos: Vec2,
    /// Unit direction; scaled by `speed` when moving
    vel: Vec2,
    shape: NodeShape,
    state: NodeState,
    size: f32,
    speed: f32,
    hp: f32,
    max_hp: f32,
    /// Degrees in [0, 360)
    rotation: f32,
    hp_assigned: bool,
}

impl Node {
    pub fn new(id: u32, shape: NodeShape, size: f32, speed: f32) -> Self {
        let base_hp = match shape {
            NodeShape::Boss => BOSS_HP_BASE,
            _ => NODE_BASE_HP,
        };
        Self {
            id,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            shape,
            state: NodeState::Inactive,
            size,
            speed,
            hp: base_hp,
            max_hp: base_hp,
            rotation: 0.0,
            hp_assigned: false,
        }
    }

    /// Place the node in the world at full health
    pub fn spawn(&mut self, x: f32, y: f32) {
        self.pos = Vec2::new(x, y);
        self.state = NodeState::Active;
        self.hp = self.max_hp;
    }

    /// Set the travel direction. Callers pass an already-normalized vector.
    pub fn set_direction(&mut self, dx: f32, dy: f32) {
        self.vel = Vec2::new(dx, dy);
    }

    /// Overwrite HP. The first call after construction also defines max HP.
    pub fn set_hp(&mut self, value: f32) {
        let value = value.max(0.0);
        if !self.hp_assigned {
            self.max_hp = value;
            self.hp_assigned = true;
        }
        self.hp = value.min(self.max_hp);
    }

    pub fn update(&mut self, dt: f32) {
        if self.state != NodeState::Active {
            return;
        }
        self.pos += self.vel * self.speed * dt;
        self.rotation = wrap_degrees(self.rotation + NODE_ROTATION_SPEED * dt);
    }

    /// Apply damage, clamping at zero. Reaching zero marks the node dead;
    /// removal is left to the owner.
    pub fn take_damage(&mut self, amount: f32) {
        self.hp = (self.hp - amount.max(0.0)).max(0.0);
        if self.hp <= 0.0 {
            self.hp = 0.0;
            self.state = NodeState::Dead;
        }
    }

    /// Mark dead regardless of HP
    pub fn kill(&mut self) {
        self.state = NodeState::Dead;
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    pub fn direction(&self) -> Vec2 {
        self.vel
    }

    pub fn shape(&self) -> NodeShape {
        self.shape
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn hp(&self) -> f32 {
        self.hp
    }

    pub fn max_hp(&self) -> f32 {
        self.max_hp
    }

    pub fn is_boss(&self) -> bool {
        self.shape == NodeShape::Boss
    }

    pub fn is_active(&self) -> bool {
        self.state == NodeState::Active
    }
}

/// What the damage zone needs from something it can hit
pub trait ZoneTarget {
    fn id(&self) -> u32;
    fn position(&self) -> Vec2;
    fn size(&self) -> f32;
    fn shape(&self) -> NodeShape;
    fn state(&self) -> NodeState;
    fn hp(&self) -> f32;
    fn take_damage(&mut self, amount: f32);
}

impl ZoneTarget for Node {
    fn id(&self) -> u32 {
        self.id
    }

    fn position(&self) -> Vec2 {
        self.pos
    }

    fn size(&self) -> f32 {
        self.size
    }

    fn shape(&self) -> NodeShape {
        self.shape
    }

    fn state(&self) -> NodeState {
        self.state
    }

    fn hp(&self) -> f32 {
        self.hp
    }

    fn take_damage(&mut self, amount: f32) {
        Node::take_damage(self, amount);
    }
}
