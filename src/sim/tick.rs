//! Per-frame simulation update
//!
//! Order matters and is fixed:
//! 1. Player health (regen/depletion) at the current level
//! 2. Level timer, frozen while a boss is active
//! 3. Auto-spawn, then boss spawn when due
//! 4. Damage zone cadence and hits
//! 5. Pickup collection under the zone, then pickup aging
//! 6. Node movement
//! 7. Removal of dead and off-screen nodes

use super::damage_zone::ZoneStrike;
use super::events::{Event, GameEvent, GamePhase};
use super::node::{Node, NodeState, ZoneTarget};
use super::state::Simulation;
use crate::consts::*;

impl Simulation {
    /// Advance the simulation by `dt` seconds. Does nothing outside
    /// `GamePhase::Playing`.
    pub fn update(&mut self, dt: f32) {
        self.collected_this_frame.clear();
        if self.phase != GamePhase::Playing {
            return;
        }

        self.update_health(dt);
        self.update_level(dt);
        self.handle_spawning(dt);
        self.handle_damage_zone(dt);
        self.handle_pickups(dt);
        self.update_nodes(dt);
        self.remove_finished_nodes();

        if self.health.is_zero() {
            self.set_phase(GamePhase::GameOver);
        }

        self.elapsed += dt;
    }

    fn update_health(&mut self, dt: f32) {
        self.health.set_current_level(self.level.current_level());
        self.health.update(dt);
    }

    fn update_level(&mut self, dt: f32) {
        let boss_active = self.level.is_boss_active();
        self.level.update(dt, boss_active);
    }

    fn handle_spawning(&mut self, dt: f32) {
        self.spawner.update_auto_spawn(dt);
        self.spawner.set_current_level(self.level.current_level());

        if self.spawner.should_auto_spawn() {
            let info = self.spawner.next_spawn();
            self.spawn_node(&info);
            self.spawner.reset_spawn_timer();
        }

        if self.level.should_spawn_boss() {
            self.spawn_boss();
        }
    }

    fn handle_damage_zone(&mut self, dt: f32) {
        self.damage_zone.update_timer(dt);
        if !self.damage_zone.should_deal_damage() {
            return;
        }
        self.damage_zone.reset_timer();

        let stats = self.upgrades.stats();
        let strike = ZoneStrike {
            center: self.mouse,
            zone_size: stats.damage_zone_size,
            damage: stats.damage_per_tick,
            level: self.level.current_level(),
        };

        let health = &mut self.health;
        let events = &self.events;
        let timestamp = self.elapsed;
        let mut targets = self.nodes.iter_mut().map(|n| n as &mut dyn ZoneTarget);

        self.damage_zone.process_damage_zone(
            &strike,
            &mut targets,
            &mut |target: &dyn ZoneTarget, cost: f32| {
                health.reduce(cost);
                events.publish(&Event {
                    timestamp,
                    payload: GameEvent::NodeDamaged {
                        id: target.id(),
                        shape: target.shape(),
                        pos: target.position(),
                        damage: strike.damage,
                        hp: target.hp(),
                        health_cost: cost,
                    },
                });
            },
        );
    }

    fn handle_pickups(&mut self, dt: f32) {
        let zone_size = self.upgrades.damage_zone_size();
        let collected = self.pickups.process_pickup_collection(self.mouse, zone_size);

        if !collected.is_empty() {
            let delta = collected.iter().map(|p| p.points).sum();
            self.emit(GameEvent::PointsChanged {
                points: self.pickups.pickup_points(),
                delta,
            });
        }
        self.collected_this_frame = collected;

        self.pickups.update(dt);
    }

    fn update_nodes(&mut self, dt: f32) {
        for node in &mut self.nodes {
            node.update(dt);
        }
    }

    /// Reap dead nodes and ordinary nodes that left the screen to the left.
    /// The boss is never dropped for position.
    fn remove_finished_nodes(&mut self) {
        let (finished, kept): (Vec<Node>, Vec<Node>) = std::mem::take(&mut self.nodes)
            .into_iter()
            .partition(|n| n.state() == NodeState::Dead || (!n.is_boss() && n.position().x < OFFSCREEN_LIMIT_X));
        self.nodes = kept;

        for node in finished {
            if node.state() != NodeState::Dead {
                log::debug!("Node {} left the screen", node.id);
                continue;
            }

            if node.is_boss() {
                self.on_boss_defeated(&node);
            } else {
                self.on_node_destroyed(&node);
            }
        }
    }

    fn on_boss_defeated(&mut self, boss: &Node) {
        let level = self.level.current_level();
        log::info!("Boss {} defeated at level {level}", boss.id);
        self.emit(GameEvent::BossDefeated {
            id: boss.id,
            pos: boss.position(),
            level,
            points: POINTS_BOSS * level,
        });

        self.level.set_boss_active(false);
        self.boss_id = None;
        self.level.set_level_completed(true);
        self.set_phase(GamePhase::LevelCompleted);
    }

    fn on_node_destroyed(&mut self, node: &Node) {
        self.emit(GameEvent::NodeDestroyed {
            id: node.id,
            shape: node.shape(),
            pos: node.position(),
            size: node.size(),
            points: POINTS_NODE,
        });

        self.pickups.spawn_cluster(node.position());
        self.nodes_destroyed += 1;
        self.level.increment_nodes_destroyed();
    }
}
