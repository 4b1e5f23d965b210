//! # Configuration
//!
//! Game and logging settings read from a TOML file. Every field has a serde
//! default so a partial file (or none at all) still loads.
//!
//! ```toml
//! [game]
//! save_dir = "saves"
//! autosave = true
//! seed = 42
//!
//! [logging]
//! level = "debug"
//! file = "aethel.log"
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

use crate::rpg::session::{SaveSettings, DEFAULT_AUTOSAVE, DEFAULT_SAVEGAME};
use crate::rpg::world_seed::START_LOCATION;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    /// Directory for save files.
    #[serde(default = "default_save_dir")]
    pub save_dir: String,
    #[serde(default = "default_savegame_file")]
    pub savegame_file: String,
    #[serde(default = "default_autosave_file")]
    pub autosave_file: String,
    /// Write the autosave file after every journey.
    #[serde(default = "default_true")]
    pub autosave: bool,
    /// Optional directory holding items.json / enemies.json / quests.json /
    /// recipes.json / locations.json / npcs.json overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_dir: Option<String>,
    /// Fixed RNG seed for reproducible runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default = "default_start_location")]
    pub start_location: String,
}

fn default_save_dir() -> String {
    ".".to_string()
}

fn default_savegame_file() -> String {
    DEFAULT_SAVEGAME.to_string()
}

fn default_autosave_file() -> String {
    DEFAULT_AUTOSAVE.to_string()
}

fn default_true() -> bool {
    true
}

fn default_start_location() -> String {
    START_LOCATION.to_string()
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            save_dir: default_save_dir(),
            savegame_file: default_savegame_file(),
            autosave_file: default_autosave_file(),
            autosave: true,
            catalog_dir: None,
            seed: None,
            start_location: default_start_location(),
        }
    }
}

impl GameConfig {
    pub fn save_settings(&self) -> SaveSettings {
        SaveSettings {
            dir: Some(PathBuf::from(&self.save_dir)),
            savegame_file: self.savegame_file.clone(),
            autosave_file: self.autosave_file.clone(),
            autosave: self.autosave,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub async fn load_or_default(path: &str) -> Result<Self> {
        if fs::try_exists(path).await.unwrap_or(false) {
            Self::load(path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: Config = toml::from_str("[game]\nseed = 9\n").unwrap();
        assert_eq!(config.game.seed, Some(9));
        assert_eq!(config.game.savegame_file, "savegame.json");
        assert!(config.game.autosave);
        assert_eq!(config.game.start_location, "forest");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn empty_file_is_the_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn default_file_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();
        Config::create_default(path).await.unwrap();
        let loaded = Config::load(path).await.unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[tokio::test]
    async fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let config = Config::load_or_default(path.to_str().unwrap()).await.unwrap();
        assert_eq!(config.game.save_dir, ".");
    }
}
