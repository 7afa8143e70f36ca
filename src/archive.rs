//! Save slots
//!
//! Three slots, each holding which scenes are unlocked and when it was last
//! written. Persisted as one JSON file.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::settings::{ConfigError, read_json, write_json};
use crate::sim::state::{SceneKind, SceneResult};

/// Number of save slots
pub const ARCHIVE_SLOTS: usize = 3;

/// Unix time in milliseconds
fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0)
}

/// One save slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveSlot {
    /// Indexed by `SceneKind::unlock_index`
    pub unlock: [bool; 3],
    /// Unix timestamp (ms) of the last write
    pub timestamp: f64,
}

impl Default for ArchiveSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveSlot {
    /// Fresh game: only the first level is open
    pub fn new() -> Self {
        Self {
            unlock: [true, false, false],
            timestamp: now_ms(),
        }
    }

    pub fn is_unlocked(&self, scene: SceneKind) -> bool {
        self.unlock[scene.unlock_index()]
    }

    /// Scenes the scene-select menu may offer
    pub fn available(&self) -> Vec<SceneKind> {
        SceneKind::ALL
            .into_iter()
            .filter(|k| self.is_unlocked(*k))
            .collect()
    }

    /// Apply a finished scene; returns the newly unlocked scene, if any
    pub fn record(&mut self, result: &SceneResult) -> Option<SceneKind> {
        if !result.objective_completed {
            return None;
        }
        let next = result.scene.unlocks()?;
        self.timestamp = now_ms();
        if self.is_unlocked(next) {
            return None;
        }
        self.unlock[next.unlock_index()] = true;
        log::info!("Unlocked {}", next.name());
        Some(next)
    }
}

/// All save slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Archives {
    pub slots: [Option<ArchiveSlot>; ARCHIVE_SLOTS],
}

impl Archives {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: usize) -> Option<&ArchiveSlot> {
        self.slots.get(slot).and_then(|s| s.as_ref())
    }

    /// Write a slot (new game or save); out-of-range slots are ignored
    pub fn store(&mut self, slot: usize, mut archive: ArchiveSlot) -> bool {
        let Some(entry) = self.slots.get_mut(slot) else {
            return false;
        };
        archive.timestamp = now_ms();
        *entry = Some(archive);
        true
    }

    pub fn delete(&mut self, slot: usize) -> Option<ArchiveSlot> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Load archives, starting fresh if there is no file yet
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No archives found, starting fresh");
            return Ok(Self::new());
        }
        let archives: Archives = read_json(path)?;
        log::info!(
            "Loaded {} archives",
            archives.slots.iter().filter(|s| s.is_some()).count()
        );
        Ok(archives)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        write_json(path, self)?;
        log::info!("Archives saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::NextScene;

    fn completed(scene: SceneKind) -> SceneResult {
        SceneResult {
            scene,
            next: NextScene::SceneSelect,
            objective_completed: true,
            round_reached: None,
        }
    }

    #[test]
    fn test_new_slot_unlocks_first_level_only() {
        let slot = ArchiveSlot::new();
        assert_eq!(slot.available(), vec![SceneKind::Cliff]);
    }

    #[test]
    fn test_completion_unlocks_in_order() {
        let mut slot = ArchiveSlot::new();
        assert_eq!(slot.record(&completed(SceneKind::Cliff)), Some(SceneKind::StringStar));
        assert_eq!(slot.record(&completed(SceneKind::Cliff)), None);
        assert_eq!(
            slot.record(&completed(SceneKind::StringStar)),
            Some(SceneKind::InfiniteCliff)
        );
        assert_eq!(slot.record(&completed(SceneKind::InfiniteCliff)), None);
        assert_eq!(slot.unlock, [true, true, true]);
    }

    #[test]
    fn test_failure_unlocks_nothing() {
        let mut slot = ArchiveSlot::new();
        let mut result = completed(SceneKind::Cliff);
        result.objective_completed = false;
        assert_eq!(slot.record(&result), None);
        assert!(!slot.is_unlocked(SceneKind::StringStar));
    }

    #[test]
    fn test_slots_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archives.json");

        let fresh = Archives::load_from(&path).unwrap();
        assert!(fresh.is_empty());

        let mut archives = Archives::new();
        assert!(archives.store(1, ArchiveSlot::new()));
        assert!(!archives.store(3, ArchiveSlot::new()));
        archives.save_to(&path).unwrap();

        let loaded = Archives::load_from(&path).unwrap();
        assert_eq!(loaded, archives);
        assert!(loaded.get(0).is_none());
        assert!(loaded.get(1).is_some());

        let mut loaded = loaded;
        assert!(loaded.delete(1).is_some());
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archives.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(Archives::load_from(&path), Err(ConfigError::Parse(_))));
    }
}
