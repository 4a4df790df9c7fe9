//! Configuration file support for chordlab
//!
//! Configuration is stored in TOML format at:
//! - Linux: `~/.config/chordlab/config.toml`
//! - macOS: `~/Library/Application Support/chordlab/config.toml`
//! - Windows: `%APPDATA%\chordlab\config.toml`

use anyhow::{anyhow, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default key and mode
    pub theory: TheorySettings,
    /// Playback defaults
    pub playback: PlaybackSettings,
    /// Render command defaults
    pub render: RenderSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theory: TheorySettings::default(),
            playback: PlaybackSettings::default(),
            render: RenderSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TheorySettings {
    /// Default tonic, e.g. "C" or "F#"
    pub key: String,
    /// Default mode, "major" or "minor"
    pub mode: String,
}

impl Default for TheorySettings {
    fn default() -> Self {
        Self {
            key: "C".to_string(),
            mode: "major".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Tempo in BPM, clamped to 60..=180 at use
    pub bpm: f64,
    /// Chord duration in eighth-note units
    pub chord_duration: f64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            chord_duration: 8.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub sample_rate: u32,
    /// Linear output gain applied after normalization
    pub gain: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            gain: 0.8,
        }
    }
}

impl Config {
    /// Load configuration from the default config file location
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Err(anyhow!("Config file not found at {:?}", path))
        }
    }

    /// Load configuration or return default if not found
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Save configuration to the default config file location
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "chordlab") {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            Err(anyhow!("Could not determine config directory"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.playback.bpm, 120.0);
        assert_eq!(parsed.render.sample_rate, 44_100);
        assert_eq!(parsed.theory.key, "C");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[playback]\nbpm = 90.0\n").unwrap();
        assert_eq!(parsed.playback.bpm, 90.0);
        assert_eq!(parsed.playback.chord_duration, 8.0);
        assert_eq!(parsed.theory.mode, "major");
    }
}
