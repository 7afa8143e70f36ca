//! Game settings and preferences
//!
//! Persisted separately from archives as a small JSON file. A scene gets a
//! reference at construction and again whenever the settings overlay closes.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Error type for settings, tuning and archive files
#[derive(Debug)]
pub enum ConfigError {
    /// File I/O error
    Io(String),
    /// JSON could not be parsed or written
    Parse(String),
    /// Parsed fine but the values are unusable
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "I/O error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Effects budget, picked on the command line or stored in the settings file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn name(self) -> &'static str {
        match self {
            QualityPreset::Low => "low",
            QualityPreset::Medium => "medium",
            QualityPreset::High => "high",
        }
    }

    /// Case-insensitive inverse of [`QualityPreset::name`]
    pub fn parse(name: &str) -> Option<Self> {
        [QualityPreset::Low, QualityPreset::Medium, QualityPreset::High]
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// Cap on live explosion and corpse particles
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 64,
            QualityPreset::Medium => 256,
            QualityPreset::High => 1024,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Explosion and corpse particles
    pub particles: bool,
    /// Flash the player sprite while invincible
    pub hit_flash: bool,

    /// Report the simulation rate in the runner's log
    pub show_fps: bool,

    // === Audio ===
    /// Sound effects volume (0.0 - 1.0)
    pub sound_volume: f32,
    /// Background music volume (0.0 - 1.0)
    pub bgm_volume: f32,

    // === Accessibility ===
    /// Reduced motion (no flashing, no fade)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            particles: true,
            hit_flash: true,

            show_fps: false,

            sound_volume: 0.5,
            bgm_volume: 0.5,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Switch preset; the low preset also turns hit flashing off
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        if preset == QualityPreset::Low {
            self.hit_flash = false;
        }
    }

    /// Effective hit flash (respects reduced_motion)
    pub fn effective_hit_flash(&self) -> bool {
        self.hit_flash && !self.reduced_motion
    }

    /// Effective fade-in (respects reduced_motion)
    pub fn effective_fade(&self) -> bool {
        !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Volumes clamped to the mixer's range
    pub fn clamped(mut self) -> Self {
        self.sound_volume = self.sound_volume.clamp(0.0, 1.0);
        self.bgm_volume = self.bgm_volume.clamp(0.0, 1.0);
        self
    }

    /// Load settings from disk, falling back to defaults on any problem
    pub fn load_from(path: &Path) -> Self {
        match read_json::<Settings>(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings.clamped()
            }
            Err(e) => {
                log::warn!("Using default settings ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        write_json(path, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
