//! Application settings loaded from the user's config directory.

use std::path::{Path, PathBuf};

use cadence_core::{Error, Result, Track};
use cadence_engine::EngineConfig;
use cadence_player::PlayerConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const CONFIG_FILE: &str = "config.json";

/// Settings for every layer of the app.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub player: PlayerConfig,
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Default location of the config file, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "cadence", "Cadence").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Load from the default location, falling back to defaults when absent.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            Some(path) => {
                debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Read a playlist file: a JSON array of tracks.
pub fn load_playlist(path: &Path) -> Result<Vec<Track>> {
    let raw = std::fs::read_to_string(path)?;
    let tracks: Vec<Track> = serde_json::from_str(&raw)?;
    info!("Loaded {} tracks from {}", tracks.len(), path.display());
    Ok(tracks)
}
