//! Runtime settings for the headless runner
//!
//! Stored as JSON, separate from the save file. Balance numbers are not
//! configurable here; they live in `consts`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::persistence::SaveError;

/// Runner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Screen ===
    pub screen_width: f32,
    pub screen_height: f32,

    // === Run ===
    /// Fixed RNG seed; `None` seeds from the clock
    pub seed: Option<u64>,
    /// Fixed step per update (seconds)
    pub frame_dt: f32,
    /// Stop after this much simulated time (seconds)
    pub run_seconds: f32,
    /// Start the next level automatically after a boss kill
    pub auto_advance: bool,

    // === Persistence ===
    /// Override for the save file location
    pub save_path: Option<PathBuf>,

    // === Logging ===
    /// Attach a logging observer to the event bus
    pub log_events: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_width: 1280.0,
            screen_height: 720.0,

            seed: None,
            frame_dt: 1.0 / 60.0,
            run_seconds: 300.0,
            auto_advance: true,

            save_path: None,

            log_events: true,
        }
    }
}

impl Settings {
    /// Load from a JSON file. Missing or malformed files yield defaults.
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings.sanitized()
            }
            Err(e) => {
                log::warn!("Using default settings ({}: {e})", path.display());
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self, SaveError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), SaveError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Replace unusable values with defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.screen_width <= 0.0 || self.screen_height <= 0.0 {
            self.screen_width = defaults.screen_width;
            self.screen_height = defaults.screen_height;
        }
        if self.frame_dt.is_nan() || self.frame_dt <= 0.0 {
            self.frame_dt = defaults.frame_dt;
        }
        self.run_seconds = self.run_seconds.max(0.0);
        self
    }

    /// Number of fixed steps in one run
    pub fn total_frames(&self) -> u64 {
        (self.run_seconds / self.frame_dt).ceil() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "seed": 42, "screen_width": 800.0 }"#).unwrap();
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.screen_width, 800.0);
        assert_eq!(settings.screen_height, 720.0);
        assert!(settings.log_events);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let settings = Settings::load(Path::new("/nonexistent/node-zero/settings.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_sanitize() {
        let settings = Settings {
            screen_width: -1.0,
            frame_dt: 0.0,
            run_seconds: -5.0,
            ..Settings::default()
        }
        .sanitized();
        assert_eq!(settings.screen_width, 1280.0);
        assert!(settings.frame_dt > 0.0);
        assert_eq!(settings.run_seconds, 0.0);
        assert_eq!(settings.total_frames(), 0);
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("node-zero-settings-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");

        let settings = Settings {
            seed: Some(7),
            run_seconds: 30.0,
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);

        let _ = fs::remove_dir_all(&dir);
    }
}
