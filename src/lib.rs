//! The Knight - a side-scrolling knight brawler
//!
//! Core modules:
//! - `sim`: Scene simulation (tile collision, entities, combat, waves, camera)
//! - `map`: Tile-map object list and collision geometry
//! - `render`: Camera-space draw handoff for an external renderer
//! - `audio`: Sound cues derived from scene events
//! - `archive`: Save slots with level unlocks
//! - `settings` / `tuning`: Player preferences and data-driven game balance

pub mod archive;
pub mod audio;
pub mod map;
pub mod render;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use archive::{ArchiveSlot, Archives};
pub use settings::{ConfigError, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Nominal frame rate of the scene loop
    pub const FPS: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / FPS as f32;
    /// Milliseconds per simulation tick
    pub const TICK_MS: f32 = 1000.0 / FPS as f32;
    /// Frames slower than this skip simulation and only render
    pub const STALL_DT: f32 = 0.1;

    /// Logical screen size (the view the camera clamps against)
    pub const SCREEN_WIDTH: f32 = 640.0;
    pub const SCREEN_HEIGHT: f32 = 360.0;
}

/// Convert a millisecond duration into whole simulation ticks (rounded, at least 1)
#[inline]
pub fn ms_to_ticks(ms: u32) -> u64 {
    ((ms as f32 / consts::TICK_MS).round() as u64).max(1)
}

/// Convert a tick count back into milliseconds
#[inline]
pub fn ticks_to_ms(ticks: u64) -> u32 {
    (ticks as f32 * consts::TICK_MS).round() as u32
}
