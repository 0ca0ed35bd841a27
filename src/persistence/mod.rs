//! Save/load of player progression
//!
//! Features:
//! - One `"key": value` pair per line (valid JSON, but read line by line)
//! - Per-field tolerance: a malformed line is skipped, the rest still loads
//! - Missing or unreadable file yields defaults
//! - Platform user-data directory with a relative-path fallback

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Save file name inside the user-data directory
pub const SAVE_FILE_NAME: &str = "save.dat";
/// Directory name under the platform user-data root
pub const APP_DIR_NAME: &str = "NodeZero";

/// Errors from reading or writing save and settings files
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Persistent player progression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveData {
    /// Best single-session pickup total
    pub high_points: u32,
    /// Spendable currency
    pub points: u32,
    pub games_played: u32,
    pub total_nodes_destroyed: u32,
    pub current_level: u32,

    // Upgradable stats
    pub max_health: f32,
    pub regen_rate: f32,
    pub damage_zone_size: f32,
    pub damage_per_tick: f32,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            high_points: 0,
            points: 0,
            games_played: 0,
            total_nodes_destroyed: 0,
            current_level: 1,
            max_health: HEALTH_DEFAULT,
            regen_rate: 0.0,
            damage_zone_size: DAMAGE_ZONE_DEFAULT_SIZE,
            damage_per_tick: DAMAGE_PER_TICK_DEFAULT,
        }
    }
}

/// Render a record in the on-disk text format
pub fn encode_save(data: &SaveData) -> Result<String, SaveError> {
    let mut text = serde_json::to_string_pretty(data)?;
    text.push('\n');
    Ok(text)
}

/// Parse the on-disk text format, skipping any line that does not parse
pub fn decode_save(text: &str) -> SaveData {
    let mut data = SaveData::default();

    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key: String = key.chars().filter(|c| *c != '"' && !c.is_whitespace()).collect();
        let value: String = value.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();

        let applied = match key.as_str() {
            "highPoints" => parse_into(&value, &mut data.high_points),
            "points" => parse_into(&value, &mut data.points),
            "gamesPlayed" => parse_into(&value, &mut data.games_played),
            "totalNodesDestroyed" => parse_into(&value, &mut data.total_nodes_destroyed),
            "currentLevel" => parse_into(&value, &mut data.current_level),
            "maxHealth" => parse_into(&value, &mut data.max_health),
            "regenRate" => parse_into(&value, &mut data.regen_rate),
            "damageZoneSize" => parse_into(&value, &mut data.damage_zone_size),
            "damagePerTick" => parse_into(&value, &mut data.damage_per_tick),
            _ => true,
        };
        if !applied {
            log::debug!("Skipping malformed save field {key:?} = {value:?}");
        }
    }

    data
}

fn parse_into<T: std::str::FromStr>(value: &str, slot: &mut T) -> bool {
    match value.parse() {
        Ok(parsed) => {
            *slot = parsed;
            true
        }
        Err(_) => false,
    }
}

/// Platform user-data directory for the game, if one can be determined
pub fn user_data_dir() -> Option<PathBuf> {
    if cfg!(windows) {
        std::env::var_os("APPDATA").map(|root| PathBuf::from(root).join(APP_DIR_NAME))
    } else {
        std::env::var_os("HOME")
            .filter(|home| !home.is_empty())
            .map(|home| PathBuf::from(home).join(".local/share").join(APP_DIR_NAME))
    }
}

/// Default save location, falling back to the working directory
pub fn default_save_path() -> PathBuf {
    user_data_dir()
        .map(|dir| dir.join(SAVE_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(SAVE_FILE_NAME))
}

/// Backing store for `SaveData`
pub trait SaveStore {
    /// Re-read the stored record (defaults when absent) and cache it
    fn load_progress(&mut self) -> SaveData;
    /// Cache and persist a record. Returns whether the write succeeded.
    fn save_progress(&mut self, data: &SaveData) -> bool;
    /// Last loaded or saved record
    fn current_data(&self) -> SaveData;

    fn points(&self) -> u32 {
        self.current_data().points
    }

    fn high_points(&self) -> u32 {
        self.current_data().high_points
    }
}

/// Save store backed by a file on disk
#[derive(Debug, Clone)]
pub struct FileSaveStore {
    path: PathBuf,
    current: SaveData,
}

impl FileSaveStore {
    /// Store at the platform default location
    pub fn new() -> Self {
        Self::at(default_save_path())
    }

    /// Store at an explicit path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = read_file(&path);
        Self { path, current }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, data: &SaveData) -> Result<PathBuf, SaveError> {
        let text = encode_save(data)?;

        let target = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => match fs::create_dir_all(dir) {
                Ok(()) => self.path.clone(),
                Err(e) => {
                    log::warn!("Cannot create {}: {e}; saving to working directory", dir.display());
                    PathBuf::from(SAVE_FILE_NAME)
                }
            },
            _ => self.path.clone(),
        };

        fs::write(&target, text)?;
        Ok(target)
    }
}

impl Default for FileSaveStore {
    fn default() -> Self {
        Self::new()
    }
}

fn read_file(path: &Path) -> SaveData {
    match fs::read_to_string(path) {
        Ok(text) => decode_save(&text),
        Err(e) => {
            log::info!("No save at {} ({e}), using defaults", path.display());
            SaveData::default()
        }
    }
}

impl SaveStore for FileSaveStore {
    fn load_progress(&mut self) -> SaveData {
        self.current = read_file(&self.path);
        self.current.clone()
    }

    fn save_progress(&mut self, data: &SaveData) -> bool {
        self.current = data.clone();
        match self.write(data) {
            Ok(target) => {
                log::info!("Progress saved to {}", target.display());
                true
            }
            Err(e) => {
                log::warn!("Failed to save progress: {e}");
                false
            }
        }
    }

    fn current_data(&self) -> SaveData {
        self.current.clone()
    }
}

/// In-memory save store. Keeps the encoded text so loads go through the
/// same codec as the file store.
#[derive(Debug, Clone, Default)]
pub struct MemorySaveStore {
    stored: Option<String>,
    current: SaveData,
}

impl MemorySaveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `data`
    pub fn with_data(data: SaveData) -> Self {
        let mut store = Self::new();
        store.save_progress(&data);
        store
    }

    /// Store pre-populated with raw text, as if read from disk
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let current = decode_save(&text);
        Self {
            stored: Some(text),
            current,
        }
    }

    /// Encoded text of the last successful save
    pub fn stored_text(&self) -> Option<&str> {
        self.stored.as_deref()
    }
}

impl SaveStore for MemorySaveStore {
    fn load_progress(&mut self) -> SaveData {
        self.current = self.stored.as_deref().map(decode_save).unwrap_or_default();
        self.current.clone()
    }

    fn save_progress(&mut self, data: &SaveData) -> bool {
        self.current = data.clone();
        match encode_save(data) {
            Ok(text) => {
                self.stored = Some(text);
                true
            }
            Err(e) => {
                log::warn!("Failed to encode progress: {e}");
                false
            }
        }
    }

    fn current_data(&self) -> SaveData {
        self.current.clone()
    }
}
