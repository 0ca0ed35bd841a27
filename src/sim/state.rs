//! Simulation state and everything outside the per-frame update
//!
//! The simulation owns the node collection and every service. Services are
//! held as trait objects so tests and alternate front ends can swap them.

use std::rc::Rc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::damage_zone::{DamageZone, DamageZoneProcessor};
use super::events::{Event, EventBus, GameEvent, GamePhase, Observer, SubscriberId};
use super::health::{HealthRegulator, PlayerHealth};
use super::level::{LevelProgressor, LevelTracker};
use super::node::{Node, NodeShape};
use super::pickups::{PickupLedger, Pickups, PointPickup};
use super::spawn::{EdgeSpawner, ScreenEdge, SpawnInfo, SpawnScheduler};
use super::upgrades::{UpgradeKind, UpgradeLedger, Upgrades};
use crate::aim;
use crate::consts::*;
use crate::persistence::{SaveData, SaveStore};

/// Stream offsets so each service draws from its own sequence
const PICKUP_SEED_OFFSET: u64 = 0x9E37_79B9;
const BOSS_SEED_OFFSET: u64 = 0x85EB_CA6B;

/// Every service the simulation drives
pub struct Services {
    pub health: Box<dyn HealthRegulator>,
    pub spawner: Box<dyn SpawnScheduler>,
    pub damage_zone: Box<dyn DamageZoneProcessor>,
    pub pickups: Box<dyn PickupLedger>,
    pub level: Box<dyn LevelProgressor>,
    pub upgrades: Box<dyn UpgradeLedger>,
    pub store: Box<dyn SaveStore>,
}

impl Services {
    /// Default implementations, all randomness derived from `seed`
    pub fn standard(seed: u64, store: Box<dyn SaveStore>) -> Self {
        Self {
            health: Box::new(PlayerHealth::default()),
            spawner: Box::new(EdgeSpawner::new(seed)),
            damage_zone: Box::new(DamageZone::new()),
            pickups: Box::new(Pickups::new(seed.wrapping_add(PICKUP_SEED_OFFSET))),
            level: Box::new(LevelTracker::default()),
            upgrades: Box::new(Upgrades::new()),
            store,
        }
    }
}

/// The game simulation
pub struct Simulation {
    pub(crate) screen: Vec2,
    /// Owned nodes in spawn order
    pub(crate) nodes: Vec<Node>,

    pub(crate) health: Box<dyn HealthRegulator>,
    pub(crate) spawner: Box<dyn SpawnScheduler>,
    pub(crate) damage_zone: Box<dyn DamageZoneProcessor>,
    pub(crate) pickups: Box<dyn PickupLedger>,
    pub(crate) level: Box<dyn LevelProgressor>,
    pub(crate) upgrades: Box<dyn UpgradeLedger>,
    pub(crate) store: Box<dyn SaveStore>,

    pub(crate) events: Rc<EventBus>,
    /// Boss placement
    pub(crate) rng: Pcg32,

    /// Damage zone and collection center
    pub(crate) mouse: Vec2,
    /// Simulation time in seconds, used as event timestamp
    pub(crate) elapsed: f32,
    /// Ordinary nodes destroyed this session
    pub(crate) nodes_destroyed: u32,
    pub(crate) high_points: u32,
    pub(crate) boss_id: Option<u32>,
    pub(crate) collected_this_frame: Vec<PointPickup>,
    pub(crate) phase: GamePhase,
    next_id: u32,

    // Session totals already written to the save record
    merged_nodes: u32,
    merged_points: u32,
}

impl Simulation {
    /// Simulation with the default services
    pub fn new(seed: u64, store: Box<dyn SaveStore>) -> Self {
        Self::with_services(Services::standard(seed, store), seed)
    }

    /// Simulation with caller-provided services. Stats, starting level and
    /// high score come from the store.
    pub fn with_services(services: Services, seed: u64) -> Self {
        let Services {
            mut health,
            mut spawner,
            damage_zone,
            pickups,
            mut level,
            mut upgrades,
            mut store,
        } = services;

        let data = store.load_progress();
        upgrades.initialize(store.as_ref());
        let stats = upgrades.stats();
        health.initialize(stats.max_health, stats.regen_rate);
        level.initialize(data.current_level);
        health.set_current_level(level.current_level());
        spawner.set_current_level(level.current_level());

        log::info!(
            "Simulation ready: level {}, {} points banked, best {}",
            level.current_level(),
            data.points,
            data.high_points
        );

        Self {
            screen: Vec2::ZERO,
            nodes: Vec::new(),
            health,
            spawner,
            damage_zone,
            pickups,
            level,
            upgrades,
            store,
            events: Rc::new(EventBus::new()),
            rng: Pcg32::seed_from_u64(seed.wrapping_add(BOSS_SEED_OFFSET)),
            mouse: Vec2::ZERO,
            elapsed: 0.0,
            nodes_destroyed: 0,
            high_points: data.high_points,
            boss_id: None,
            collected_this_frame: Vec::new(),
            phase: GamePhase::Playing,
            next_id: 1,
            merged_nodes: 0,
            merged_points: 0,
        }
    }

    /// Set the play area. Must be called before the first update.
    pub fn initialize(&mut self, screen_width: f32, screen_height: f32) {
        self.screen = Vec2::new(screen_width, screen_height);
        self.pickups.initialize(screen_height);
        self.spawner.initialize(screen_width, screen_height);
        self.spawner.set_current_level(self.level.current_level());
    }

    /// Start a fresh run at the stored level. Unsaved session progress is dropped.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.boss_id = None;
        self.collected_this_frame.clear();
        self.elapsed = 0.0;
        self.nodes_destroyed = 0;
        self.merged_nodes = 0;
        self.merged_points = 0;

        self.pickups.reset();
        self.health.reset(self.upgrades.max_health());
        self.health.set_regen_rate(self.upgrades.regen_rate());
        self.spawner.reset_spawn_timer();
        self.damage_zone.reset_timer();

        let data = self.store.load_progress();
        self.level.reset(data.current_level);
        self.spawner.set_current_level(self.level.current_level());
        self.health.set_current_level(self.level.current_level());

        self.set_phase(GamePhase::Playing);
        log::info!("Run reset at level {}", self.level.current_level());
    }

    /// Advance to the next level after a boss defeat: save, clear the field,
    /// restore health.
    pub fn start_next_level(&mut self) {
        let old_level = self.level.current_level();
        self.level.start_next_level();
        let new_level = self.level.current_level();

        self.save_progress();

        self.nodes.clear();
        self.boss_id = None;
        self.pickups.reset();
        self.merged_points = 0;
        self.spawner.reset_spawn_timer();
        self.spawner.set_current_level(new_level);
        self.health.set_current_level(new_level);
        self.health.restore_to_max();

        self.emit(GameEvent::LevelCompleted {
            level: old_level,
            next_level: new_level,
        });
        self.set_phase(GamePhase::Playing);
    }

    /// Merge session progress into the save record and write it.
    /// Returns whether the write succeeded.
    pub fn save_progress(&mut self) -> bool {
        let mut data = self.store.current_data();
        self.merge_session(&mut data);
        self.store.save_progress(&data)
    }

    /// Fold not-yet-merged session totals and current stats into `data`
    fn merge_session(&mut self, data: &mut SaveData) {
        let session_points = self.pickups.pickup_points();

        data.total_nodes_destroyed = data
            .total_nodes_destroyed
            .saturating_add(self.nodes_destroyed.saturating_sub(self.merged_nodes));
        data.points = data.points.saturating_add(session_points.saturating_sub(self.merged_points));
        self.merged_nodes = self.nodes_destroyed;
        self.merged_points = session_points;

        if session_points > data.high_points {
            data.high_points = session_points;
            log::info!("New best: {session_points} points");
        }
        self.high_points = data.high_points;

        let stats = self.upgrades.stats();
        data.current_level = self.level.current_level();
        data.max_health = stats.max_health;
        data.regen_rate = stats.regen_rate;
        data.damage_zone_size = stats.damage_zone_size;
        data.damage_per_tick = stats.damage_per_tick;
    }

    /// Buy an upgrade and apply it to the live health pool
    pub fn buy_upgrade(&mut self, kind: UpgradeKind) -> bool {
        if !self.upgrades.buy(kind, self.store.as_mut()) {
            return false;
        }
        self.health.set_max_health(self.upgrades.max_health());
        self.health.set_regen_rate(self.upgrades.regen_rate());
        true
    }

    pub fn set_mouse_position(&mut self, x: f32, y: f32) {
        self.mouse = Vec2::new(x, y);
    }

    /// Place an ordinary node with level-scaled HP. Bosses only come from
    /// `spawn_boss`, so a boss shape here is refused.
    pub fn spawn_node(&mut self, info: &SpawnInfo) -> Option<u32> {
        if info.shape == NodeShape::Boss {
            log::warn!("Refusing to spawn a boss through spawn_node");
            return None;
        }

        let id = self.next_entity_id();
        let mut node = Node::new(id, info.shape, self.screen.y * NODE_SIZE_FACTOR, NODE_DEFAULT_SPEED);
        node.set_hp(self.spawner.calculate_node_hp(node.hp()));
        node.spawn(info.position.x, info.position.y);
        node.set_direction(info.direction.x, info.direction.y);

        self.emit(GameEvent::NodeSpawned {
            id,
            shape: node.shape(),
            pos: node.position(),
            size: node.size(),
            hp: node.hp(),
        });
        self.nodes.push(node);
        Some(id)
    }

    /// Spawn the level boss just outside a random edge, aimed at the center.
    /// Returns false when a boss is already in play.
    pub fn spawn_boss(&mut self) -> bool {
        if self.level.is_boss_active() || self.boss_id.is_some() {
            return false;
        }

        let level = self.level.current_level();
        let size = self.screen.y * BOSS_SIZE_FACTOR;
        let hp = BOSS_HP_BASE + level.saturating_sub(1) as f32 * BOSS_HP_PER_LEVEL;

        let edge = ScreenEdge::random(&mut self.rng);
        let t = self.rng.random::<f32>();
        let pos = edge.point(self.screen, size * BOSS_EDGE_OFFSET_FACTOR, 0.0, t);
        let dir = aim(pos, self.screen / 2.0);

        let id = self.next_entity_id();
        let mut boss = Node::new(id, NodeShape::Boss, size, BOSS_SPEED);
        boss.set_hp(hp);
        boss.spawn(pos.x, pos.y);
        boss.set_direction(dir.x, dir.y);
        self.nodes.push(boss);

        self.boss_id = Some(id);
        self.level.set_boss_active(true);

        log::info!("Boss {id} spawned for level {level} ({hp} HP)");
        self.emit(GameEvent::BossSpawned {
            id,
            pos,
            size,
            level,
            hp,
        });
        true
    }

    /// Record a phase change and notify observers. Entering GameOver also
    /// counts the game and saves.
    pub(crate) fn set_phase(&mut self, phase: GamePhase) {
        let from = self.phase;
        if from == phase {
            return;
        }
        self.phase = phase;
        log::debug!("Phase {from:?} -> {phase:?}");
        self.emit(GameEvent::GameStateChanged { from, to: phase });

        if phase == GamePhase::GameOver {
            self.finish_game();
        }
    }

    fn finish_game(&mut self) {
        let points = self.pickups.pickup_points();
        let level = self.level.current_level();

        let mut data = self.store.current_data();
        self.merge_session(&mut data);
        data.games_played = data.games_played.saturating_add(1);
        if !self.store.save_progress(&data) {
            log::warn!("Game over could not be saved");
        }

        log::info!("Game over at level {level}: {points} points, {} nodes", self.nodes_destroyed);
        self.emit(GameEvent::GameOver { points, level });
    }

    pub(crate) fn emit(&self, payload: GameEvent) {
        self.events.publish(&Event {
            timestamp: self.elapsed,
            payload,
        });
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn attach(&self, observer: Rc<dyn Observer>) -> SubscriberId {
        self.events.attach(observer)
    }

    pub fn detach(&self, id: SubscriberId) -> bool {
        self.events.detach(id)
    }

    pub fn events(&self) -> &Rc<EventBus> {
        &self.events
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn boss(&self) -> Option<&Node> {
        let id = self.boss_id?;
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn collected_pickups_this_frame(&self) -> &[PointPickup] {
        &self.collected_this_frame
    }

    pub fn nodes_destroyed(&self) -> u32 {
        self.nodes_destroyed
    }

    pub fn high_points(&self) -> u32 {
        self.high_points
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn mouse_position(&self) -> Vec2 {
        self.mouse
    }

    pub fn screen_size(&self) -> Vec2 {
        self.screen
    }

    pub fn health(&self) -> &dyn HealthRegulator {
        self.health.as_ref()
    }

    pub fn spawner(&self) -> &dyn SpawnScheduler {
        self.spawner.as_ref()
    }

    pub fn damage_zone(&self) -> &dyn DamageZoneProcessor {
        self.damage_zone.as_ref()
    }

    pub fn pickups(&self) -> &dyn PickupLedger {
        self.pickups.as_ref()
    }

    pub fn level(&self) -> &dyn LevelProgressor {
        self.level.as_ref()
    }

    pub fn upgrades(&self) -> &dyn UpgradeLedger {
        self.upgrades.as_ref()
    }

    pub fn save_store(&self) -> &dyn SaveStore {
        self.store.as_ref()
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("screen", &self.screen)
            .field("nodes", &self.nodes.len())
            .field("phase", &self.phase)
            .field("level", &self.level.current_level())
            .field("health", &self.health.current())
            .field("elapsed", &self.elapsed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemorySaveStore;
    use crate::sim::events::{EventKind, EventLog};

    fn sim_with(data: SaveData) -> (Simulation, Rc<EventLog>) {
        let mut sim = Simulation::new(3, Box::new(MemorySaveStore::with_data(data)));
        sim.initialize(800.0, 600.0);
        let log = Rc::new(EventLog::new());
        sim.attach(log.clone());
        (sim, log)
    }

    #[test]
    fn test_new_loads_stats_from_store() {
        let (sim, _) = sim_with(SaveData {
            current_level: 3,
            max_health: 14.0,
            regen_rate: 0.2,
            high_points: 77,
            ..SaveData::default()
        });
        assert_eq!(sim.level().current_level(), 3);
        assert_eq!(sim.health().max(), 14.0);
        assert_eq!(sim.health().current(), 14.0);
        assert_eq!(sim.high_points(), 77);
        assert_eq!(sim.spawner().current_level(), 3);
        assert_eq!(sim.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_spawn_node_scales_hp_and_emits() {
        let (mut sim, log) = sim_with(SaveData {
            current_level: 5,
            ..SaveData::default()
        });
        let info = SpawnInfo::new(Vec2::new(10.0, 10.0), NodeShape::Square, Vec2::X);
        let id = sim.spawn_node(&info);

        assert!(id.is_some());
        let node = &sim.nodes()[0];
        assert!((node.hp() - 180.0).abs() < 1e-3);
        assert_eq!(node.max_hp(), node.hp());
        assert!((node.size() - 22.5).abs() < 1e-4);
        assert!(node.is_active());
        assert_eq!(log.kinds(), vec![EventKind::NodeSpawned]);
    }

    #[test]
    fn test_spawn_node_refuses_boss_shape() {
        let (mut sim, log) = sim_with(SaveData::default());
        let info = SpawnInfo::new(Vec2::ZERO, NodeShape::Boss, Vec2::X);
        assert_eq!(sim.spawn_node(&info), None);
        assert!(sim.nodes().is_empty());
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_spawn_boss_once() {
        let (mut sim, log) = sim_with(SaveData {
            current_level: 3,
            ..SaveData::default()
        });
        assert!(sim.spawn_boss());
        assert!(!sim.spawn_boss());

        let boss = sim.boss().unwrap();
        assert!(boss.is_boss());
        assert_eq!(boss.hp(), 400.0);
        assert!((boss.size() - 90.0).abs() < 1e-4);
        assert!((boss.direction().length() - 1.0).abs() < 1e-4);

        // Outside the screen by 1.5 boss sizes on some edge
        let p = boss.position();
        let offset = 135.0;
        let on_edge = (p.y + offset).abs() < 1e-3
            || (p.x - (800.0 + offset)).abs() < 1e-3
            || (p.y - (600.0 + offset)).abs() < 1e-3
            || (p.x + offset).abs() < 1e-3;
        assert!(on_edge, "{p:?}");

        assert!(sim.level().is_boss_active());
        assert_eq!(sim.nodes().iter().filter(|n| n.is_boss()).count(), 1);
        assert_eq!(log.count(EventKind::BossSpawned), 1);
        match &log.events()[0].payload {
            GameEvent::BossSpawned { level, hp, .. } => {
                assert_eq!(*level, 3);
                assert_eq!(*hp, 400.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_save_progress_merges_once() {
        let (mut sim, _) = sim_with(SaveData {
            points: 10,
            total_nodes_destroyed: 5,
            ..SaveData::default()
        });
        sim.nodes_destroyed = 3;

        assert!(sim.save_progress());
        assert!(sim.save_progress());

        let saved = sim.save_store().current_data();
        assert_eq!(saved.total_nodes_destroyed, 8);
        assert_eq!(saved.points, 10);
        assert_eq!(saved.current_level, 1);
    }

    #[test]
    fn test_buy_upgrade_updates_live_health() {
        let (mut sim, _) = sim_with(SaveData {
            points: 150,
            ..SaveData::default()
        });
        assert!(sim.buy_upgrade(UpgradeKind::Health));
        assert_eq!(sim.health().max(), HEALTH_DEFAULT + 1.0);
        assert!(sim.buy_upgrade(UpgradeKind::Regen));
        assert!((sim.health().regen_rate() - 0.1).abs() < 1e-6);
        assert!(!sim.buy_upgrade(UpgradeKind::Damage));
        assert_eq!(sim.save_store().points(), 0);
    }

    #[test]
    fn test_start_next_level() {
        let (mut sim, log) = sim_with(SaveData::default());
        sim.spawn_node(&SpawnInfo::new(Vec2::new(100.0, 100.0), NodeShape::Circle, Vec2::X));
        assert!(sim.spawn_boss());
        sim.health.reduce(4.0);
        log.clear();

        sim.start_next_level();

        assert_eq!(sim.level().current_level(), 2);
        assert!(sim.nodes().is_empty());
        assert!(sim.boss().is_none());
        assert!(!sim.level().is_boss_active());
        assert_eq!(sim.health().current(), sim.health().max());
        assert_eq!(sim.spawner().current_level(), 2);
        assert_eq!(sim.save_store().current_data().current_level, 2);
        assert_eq!(
            log.events()[0].payload,
            GameEvent::LevelCompleted { level: 1, next_level: 2 }
        );
    }

    #[test]
    fn test_reset_returns_to_stored_level() {
        let (mut sim, _) = sim_with(SaveData {
            current_level: 2,
            ..SaveData::default()
        });
        sim.start_next_level();
        assert_eq!(sim.level().current_level(), 3);
        sim.spawn_node(&SpawnInfo::new(Vec2::ZERO, NodeShape::Square, Vec2::X));
        sim.nodes_destroyed = 4;

        sim.reset();

        // start_next_level saved level 3
        assert_eq!(sim.level().current_level(), 3);
        assert!(sim.nodes().is_empty());
        assert_eq!(sim.nodes_destroyed(), 0);
        assert_eq!(sim.elapsed(), 0.0);
        assert_eq!(sim.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_game_over_counts_game_once() {
        let (mut sim, log) = sim_with(SaveData::default());
        sim.set_phase(GamePhase::GameOver);
        sim.set_phase(GamePhase::GameOver);

        assert_eq!(sim.save_store().current_data().games_played, 1);
        assert_eq!(log.count(EventKind::GameStateChanged), 1);
        assert_eq!(log.count(EventKind::GameOver), 1);

        sim.reset();
        assert_eq!(sim.phase(), GamePhase::Playing);
        assert_eq!(log.count(EventKind::GameStateChanged), 2);
    }

    #[test]
    fn test_merge_saturates_at_counter_limit() {
        let store = MemorySaveStore::with_text(
            "\"points\": 4294967295\n\"totalNodesDestroyed\": 4294967295\n\"gamesPlayed\": 4294967295\n",
        );
        let mut sim = Simulation::new(3, Box::new(store));
        sim.initialize(800.0, 600.0);

        sim.pickups.spawn_point_pickups(Vec2::new(100.0, 100.0), 1, 1);
        sim.pickups.update(0.2);
        assert!(sim.pickups.collect_pickup(0));
        sim.nodes_destroyed = 1;

        assert!(sim.save_progress());
        let saved = sim.save_store().current_data();
        assert_eq!(saved.points, u32::MAX);
        assert_eq!(saved.total_nodes_destroyed, u32::MAX);
        assert_eq!(saved.high_points, 1);

        sim.set_phase(GamePhase::GameOver);
        assert_eq!(sim.save_store().current_data().games_played, u32::MAX);
    }
}
