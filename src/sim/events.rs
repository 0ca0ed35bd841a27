//! Synchronous publish/subscribe for simulation events
//!
//! Observers (logging, effects, audio) read events and never mutate the
//! simulation. `publish` snapshots the subscriber list first, so an observer
//! may detach itself (or others) from inside `on_event`. Observers attached
//! during a broadcast only see later events.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::node::NodeShape;

/// Coarse game flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Boss beaten, waiting for `start_next_level`
    LevelCompleted,
    GameOver,
}

/// Event tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    NodeSpawned,
    NodeDamaged,
    NodeDestroyed,
    PointsChanged,
    MultiplierChanged,
    GameStateChanged,
    GameOver,
    BossSpawned,
    BossDefeated,
    LevelCompleted,
}

/// Event payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    NodeSpawned {
        id: u32,
        shape: NodeShape,
        pos: Vec2,
        size: f32,
        hp: f32,
    },
    NodeDamaged {
        id: u32,
        shape: NodeShape,
        pos: Vec2,
        damage: f32,
        /// HP left after the hit
        hp: f32,
        /// Player health paid for the hit
        health_cost: f32,
    },
    NodeDestroyed {
        id: u32,
        shape: NodeShape,
        pos: Vec2,
        size: f32,
        points: u32,
    },
    PointsChanged {
        points: u32,
        delta: u32,
    },
    MultiplierChanged {
        multiplier: f32,
    },
    GameStateChanged {
        from: GamePhase,
        to: GamePhase,
    },
    GameOver {
        points: u32,
        level: u32,
    },
    BossSpawned {
        id: u32,
        pos: Vec2,
        size: f32,
        level: u32,
        hp: f32,
    },
    BossDefeated {
        id: u32,
        pos: Vec2,
        level: u32,
        points: u32,
    },
    LevelCompleted {
        level: u32,
        next_level: u32,
    },
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::NodeSpawned { .. } => EventKind::NodeSpawned,
            GameEvent::NodeDamaged { .. } => EventKind::NodeDamaged,
            GameEvent::NodeDestroyed { .. } => EventKind::NodeDestroyed,
            GameEvent::PointsChanged { .. } => EventKind::PointsChanged,
            GameEvent::MultiplierChanged { .. } => EventKind::MultiplierChanged,
            GameEvent::GameStateChanged { .. } => EventKind::GameStateChanged,
            GameEvent::GameOver { .. } => EventKind::GameOver,
            GameEvent::BossSpawned { .. } => EventKind::BossSpawned,
            GameEvent::BossDefeated { .. } => EventKind::BossDefeated,
            GameEvent::LevelCompleted { .. } => EventKind::LevelCompleted,
        }
    }
}

/// A timestamped event. `timestamp` is simulation time in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: f32,
    pub payload: GameEvent,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}

/// Receives published events
pub trait Observer {
    fn on_event(&self, event: &Event);
}

/// Handle returned by `EventBus::attach`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

#[derive(Default)]
pub struct EventBus {
    subscribers: RefCell<Vec<(SubscriberId, Rc<dyn Observer>)>>,
    next_id: Cell<u64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, observer: Rc<dyn Observer>) -> SubscriberId {
        let id = SubscriberId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, observer));
        id
    }

    /// Returns false if `id` was not attached
    pub fn detach(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    /// Deliver to every observer attached when the call started, in attach order
    pub fn publish(&self, event: &Event) {
        let snapshot: Vec<Rc<dyn Observer>> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();

        for observer in snapshot {
            observer.on_event(event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.borrow().is_empty()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus").field("subscribers", &self.len()).finish()
    }
}

/// Records every event it sees
#[derive(Debug, Default)]
pub struct EventLog {
    events: RefCell<Vec<Event>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.borrow().iter().map(Event::kind).collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.borrow().iter().filter(|e| e.kind() == kind).count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl Observer for EventLog {
    fn on_event(&self, event: &Event) {
        self.events.borrow_mut().push(event.clone());
    }
}

/// Writes events to the `log` facade
#[derive(Debug, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_event(&self, event: &Event) {
        match &event.payload {
            GameEvent::BossSpawned { level, hp, .. } => {
                log::info!("[{:.2}s] Boss spawned at level {level} with {hp} HP", event.timestamp)
            }
            GameEvent::BossDefeated { level, points, .. } => {
                log::info!("[{:.2}s] Boss defeated at level {level} (+{points})", event.timestamp)
            }
            GameEvent::LevelCompleted { level, next_level } => {
                log::info!("[{:.2}s] Level {level} complete, next {next_level}", event.timestamp)
            }
            GameEvent::GameOver { points, level } => {
                log::info!("[{:.2}s] Game over at level {level} with {points} points", event.timestamp)
            }
            other => log::debug!("[{:.2}s] {other:?}", event.timestamp),
        }
    }
}
