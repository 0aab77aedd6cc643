//! Runtime settings
//!
//! Read from a JSON file next to the binary. Missing fields fall back to
//! their defaults; a missing file means all defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{NUM_LEVELS, NUM_LIVES};
use crate::error::LoadError;

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Content ===
    /// Directory holding `level0.txt`, `level1.txt`, ...
    pub levels_dir: PathBuf,
    /// Number of level files to load and cycle through
    pub level_count: u32,
    /// Single-number high score file
    pub high_score_path: PathBuf,

    // === Rules ===
    /// Lives per game
    pub lives: u8,
    /// Simulation rate (ticks per second)
    pub sim_hz: u32,

    // === Demo driver ===
    /// Seed for the autopilot
    pub demo_seed: u64,
    /// How long the headless demo runs
    pub demo_seconds: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Content
            levels_dir: PathBuf::from("levels"),
            level_count: NUM_LEVELS,
            high_score_path: PathBuf::from("highscore.txt"),

            // Rules
            lives: NUM_LIVES,
            sim_hz: 30,

            // Demo
            demo_seed: 12345,
            demo_seconds: 120.0,
        }
    }
}

impl Settings {
    /// Default settings file name
    pub const FILE_NAME: &'static str = "bombjack.json";

    /// Load settings from `path`, or defaults if the file does not exist
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(LoadError::io(path, e)),
        };
        let settings = serde_json::from_str(&json).map_err(|source| LoadError::Settings {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), LoadError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| LoadError::Settings {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(|e| LoadError::io(path, e))?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Fixed timestep in seconds
    pub fn sim_dt(&self) -> f32 {
        1.0 / self.sim_hz.max(1) as f32
    }

    /// Ticks the demo runs for
    pub fn demo_ticks(&self) -> u64 {
        (self.demo_seconds.max(0.0) * self.sim_hz.max(1) as f32).round() as u64
    }

    /// Lives, never fewer than one
    pub fn effective_lives(&self) -> u8 {
        self.lives.max(1)
    }

    /// Path of level `index`
    pub fn level_path(&self, index: u32) -> PathBuf {
        self.levels_dir.join(format!("level{}.txt", index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.level_count, 5);
        assert_eq!(s.lives, 5);
        assert!((s.sim_dt() - 1.0 / 30.0).abs() < 1e-7);
        assert_eq!(s.demo_ticks(), 3600);
        assert_eq!(s.level_path(3), PathBuf::from("levels").join("level3.txt"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load(&dir.path().join(Settings::FILE_NAME)).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(Settings::FILE_NAME);
        std::fs::write(&path, r#"{ "lives": 3, "sim_hz": 60 }"#).unwrap();
        let s = Settings::load(&path).unwrap();
        assert_eq!(s.lives, 3);
        assert_eq!(s.sim_hz, 60);
        assert_eq!(s.level_count, NUM_LEVELS);
    }

    #[test]
    fn test_bad_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(Settings::FILE_NAME);
        std::fs::write(&path, "{ lives: ").unwrap();
        assert!(matches!(
            Settings::load(&path),
            Err(LoadError::Settings { .. })
        ));
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(Settings::FILE_NAME);
        let s = Settings {
            lives: 2,
            demo_seed: 9,
            ..Default::default()
        };
        s.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), s);
    }

    #[test]
    fn test_zero_rates_are_clamped() {
        let s = Settings {
            sim_hz: 0,
            lives: 0,
            ..Default::default()
        };
        assert_eq!(s.sim_dt(), 1.0);
        assert_eq!(s.effective_lives(), 1);
    }
}
