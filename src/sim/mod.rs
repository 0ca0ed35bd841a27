//! Frame-stepped simulation
//!
//! All gameplay logic lives here:
//! - Seeded RNG only, owned per service
//! - Nodes kept in spawn order, owned by `Simulation`
//! - No rendering, input or platform dependencies

pub mod damage_zone;
pub mod events;
pub mod health;
pub mod level;
pub mod node;
pub mod pickups;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod upgrades;

pub use damage_zone::{DamageZone, DamageZoneProcessor, Rect, ZoneStrike, health_cost, is_in_zone};
pub use events::{
    Event, EventBus, EventKind, EventLog, GameEvent, GamePhase, LogObserver, Observer, SubscriberId,
};
pub use health::{HealthRegulator, PlayerHealth};
pub use level::{LevelProgressor, LevelTracker};
pub use node::{Node, NodeShape, NodeState, ZoneTarget};
pub use pickups::{PickupLedger, Pickups, PointPickup};
pub use spawn::{EdgeSpawner, ScreenEdge, SpawnInfo, SpawnScheduler, spawn_interval_for_level};
pub use state::{Services, Simulation};
pub use upgrades::{UPGRADES, UpgradeKind, UpgradeLedger, UpgradeStats, UpgradeStrategy, Upgrades};
