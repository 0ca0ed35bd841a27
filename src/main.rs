//! Node Zero headless runner
//!
//! Drives the simulation at a fixed step with an autopilot cursor, logging
//! events through `env_logger` (`RUST_LOG=debug` for per-node events).
//!
//! Usage: `node-zero [settings.json]`

use std::path::Path;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use glam::Vec2;

use node_zero::sim::{GamePhase, LogObserver, Simulation};
use node_zero::{FileSaveStore, Settings};

/// Cursor speed for the autopilot (pixels/s)
const AUTOPILOT_SPEED: f32 = 400.0;

fn main() {
    env_logger::init();

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(Path::new(&path)),
        None => Settings::default(),
    };
    let seed = settings.seed.unwrap_or_else(clock_seed);
    log::info!("Node Zero (headless) starting, seed {seed}");

    let store = match &settings.save_path {
        Some(path) => FileSaveStore::at(path),
        None => FileSaveStore::new(),
    };
    log::info!("Save file: {}", store.path().display());

    let mut sim = Simulation::new(seed, Box::new(store));
    sim.initialize(settings.screen_width, settings.screen_height);
    if settings.log_events {
        sim.attach(Rc::new(LogObserver));
    }

    let mut cursor = sim.screen_size() / 2.0;
    for _ in 0..settings.total_frames() {
        cursor = autopilot(&sim, cursor, settings.frame_dt);
        sim.set_mouse_position(cursor.x, cursor.y);
        sim.update(settings.frame_dt);

        match sim.phase() {
            GamePhase::Playing => {}
            GamePhase::LevelCompleted if settings.auto_advance => sim.start_next_level(),
            GamePhase::LevelCompleted | GamePhase::GameOver => break,
        }
    }

    if sim.phase() != GamePhase::GameOver && !sim.save_progress() {
        log::warn!("Final save failed");
    }

    log::info!(
        "Finished at level {} after {:.1}s: {} nodes destroyed, {} points, best {}",
        sim.level().current_level(),
        sim.elapsed(),
        sim.nodes_destroyed(),
        sim.pickups().pickup_points(),
        sim.high_points()
    );
}

/// Move the cursor toward the boss if present, else the nearest node,
/// else any pickups, else the screen center.
fn autopilot(sim: &Simulation, cursor: Vec2, dt: f32) -> Vec2 {
    let target = sim
        .boss()
        .or_else(|| {
            sim.nodes()
                .iter()
                .filter(|n| n.is_active())
                .min_by(|a, b| {
                    let da = a.position().distance_squared(cursor);
                    let db = b.position().distance_squared(cursor);
                    da.total_cmp(&db)
                })
        })
        .map(|n| n.position())
        .or_else(|| sim.pickups().pickups().first().map(|p| p.pos))
        .unwrap_or(sim.screen_size() / 2.0);

    let step = AUTOPILOT_SPEED * dt;
    let delta = target - cursor;
    if delta.length() <= step {
        target
    } else {
        cursor + delta.normalize_or_zero() * step
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
