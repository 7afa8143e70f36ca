//! Data-driven game balance
//!
//! Every gameplay constant a level designer might want to tweak lives here.
//! Defaults reproduce the shipped game; a JSON file can override any subset.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::settings::{ConfigError, read_json};

/// Inclusive speed range a knight tier rolls its patrol speed from, in whole pixels/second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedRange {
    pub min: u32,
    pub max: u32,
}

impl SpeedRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Patrol speeds per knight tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSpeeds {
    pub azure: SpeedRange,
    pub crimson: SpeedRange,
    pub obsidian: SpeedRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Scale applied to map objects and sprite rects
    pub size_multiplier: f32,
    /// Downward acceleration (pixels/second²)
    pub gravity: f32,
    /// Vertical velocity set on jump (negative is up)
    pub jump_impulse: f32,
    /// Player top horizontal speed
    pub player_speed: f32,
    pub player_max_health: u32,
    pub player_start_ammo: u32,
    /// Damage immunity after a hit
    pub invincibility_ms: u32,
    /// Time each animation frame is held
    pub anim_frame_ms: u32,
    /// Knight attacks when the player is closer than this horizontally...
    pub knight_attack_range: f32,
    /// ...and vertically within this distance
    pub knight_attack_alignment: f32,
    /// Fraction of velocity a fireball keeps after a bounce
    pub fireball_restitution: f32,
    /// Charged throw hold window
    pub throw_min_ms: u32,
    pub throw_max_ms: u32,
    /// Knight speeds in the fixed levels
    pub level_knights: TierSpeeds,
    /// Knight speeds in infinite mode (slower, there are more of them)
    pub infinite_knights: TierSpeeds,
    pub spawn_interval_ms: u32,
    pub round_banner_ms: u32,
    pub heal_every_rounds: u32,
    pub heal_amount: u32,
    pub explosion_particles: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            size_multiplier: 1.5,
            gravity: 1800.0,
            jump_impulse: -700.0,
            player_speed: 250.0,
            player_max_health: 5,
            player_start_ammo: 5,
            invincibility_ms: 500,
            anim_frame_ms: 50,
            knight_attack_range: 45.0,
            knight_attack_alignment: 20.0,
            fireball_restitution: 0.8,
            throw_min_ms: 200,
            throw_max_ms: 600,
            level_knights: TierSpeeds {
                azure: SpeedRange::new(60, 80),
                crimson: SpeedRange::new(80, 100),
                obsidian: SpeedRange::new(100, 120),
            },
            infinite_knights: TierSpeeds {
                azure: SpeedRange::new(30, 40),
                crimson: SpeedRange::new(40, 60),
                obsidian: SpeedRange::new(60, 80),
            },
            spawn_interval_ms: 500,
            round_banner_ms: 2000,
            heal_every_rounds: 5,
            heal_amount: 5,
            explosion_particles: 20,
        }
    }
}

impl Tuning {
    /// Load tuning overrides from a JSON file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let tuning: Tuning = read_json(path)?;
        tuning.validate()?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values that would break the simulation
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size_multiplier <= 0.0 {
            return Err(ConfigError::Invalid("size_multiplier must be positive".into()));
        }
        if self.throw_min_ms > self.throw_max_ms {
            return Err(ConfigError::Invalid(format!(
                "throw window is inverted: {}ms > {}ms",
                self.throw_min_ms, self.throw_max_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.fireball_restitution) {
            return Err(ConfigError::Invalid("fireball_restitution must be within 0..=1".into()));
        }
        if self.heal_every_rounds == 0 {
            return Err(ConfigError::Invalid("heal_every_rounds must be at least 1".into()));
        }
        for range in [
            self.level_knights.azure,
            self.level_knights.crimson,
            self.level_knights.obsidian,
            self.infinite_knights.azure,
            self.infinite_knights.crimson,
            self.infinite_knights.obsidian,
        ] {
            if range.min > range.max {
                return Err(ConfigError::Invalid(format!(
                    "knight speed range is inverted: {} > {}",
                    range.min, range.max
                )));
            }
        }
        Ok(())
    }
}
