//! Tile-map object lists and the collision geometry built from them
//!
//! The map editor exports every placed object with a type tag, a name tag and
//! a rectangle. Names decide what an object becomes: walls, invisible patrol
//! walls, trigger regions, or spawn markers.

use std::fmt;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::ConfigError;
use crate::sim::geometry::Rect;
use crate::sim::knight::KnightKind;

/// Errors found while turning a map into scene geometry
#[derive(Debug)]
pub enum MapError {
    /// The map file could not be read or parsed
    Parse(String),
    /// No `player` object carries the requested start name
    MissingPlayerStart(String),
    /// A trigger region the scene needs is absent
    MissingTrigger(&'static str),
    /// Infinite mode needs at least one `knight` spawn point
    NoEnemySpawns,
    /// An object with a negative or non-finite rectangle
    InvalidObject { name: String, reason: String },
    /// A `knight` typed object whose name is not a known tier
    UnknownKnightKind(String),
    /// The balance values handed to the scene are unusable
    InvalidTuning(ConfigError),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Parse(msg) => write!(f, "map parse error: {}", msg),
            MapError::MissingPlayerStart(name) => write!(f, "no player start named '{}'", name),
            MapError::MissingTrigger(name) => write!(f, "map has no '{}' region", name),
            MapError::NoEnemySpawns => write!(f, "map has no enemy spawn points"),
            MapError::InvalidObject { name, reason } => {
                write!(f, "invalid map object '{}': {}", name, reason)
            }
            MapError::UnknownKnightKind(name) => write!(f, "unknown knight kind '{}'", name),
            MapError::InvalidTuning(e) => write!(f, "invalid tuning: {}", e),
        }
    }
}

impl std::error::Error for MapError {}

impl From<ConfigError> for MapError {
    fn from(e: ConfigError) -> Self {
        MapError::InvalidTuning(e)
    }
}

impl From<std::io::Error> for MapError {
    fn from(e: std::io::Error) -> Self {
        MapError::Parse(e.to_string())
    }
}

impl From<serde_json::Error> for MapError {
    fn from(e: serde_json::Error) -> Self {
        MapError::Parse(e.to_string())
    }
}

/// One placed object from the map editor, in unscaled map pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapObject {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
}

impl MapObject {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// A parsed tile map: pixel size plus the object layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    /// Map width in unscaled pixels
    pub width: f32,
    /// Map height in unscaled pixels
    pub height: f32,
    #[serde(default)]
    pub tile_width: u32,
    #[serde(default)]
    pub tile_height: u32,
    #[serde(default)]
    pub objects: Vec<MapObject>,
}

impl MapData {
    pub fn from_json(json: &str) -> Result<Self, MapError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, MapError> {
        let json = std::fs::read_to_string(path)?;
        let map = Self::from_json(&json)?;
        log::info!(
            "Loaded map {} ({}x{}, {} objects)",
            path.display(),
            map.width,
            map.height,
            map.objects.len()
        );
        Ok(map)
    }
}

/// Named regions the player can walk into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// Shows the controls hint
    Tips,
    /// Interact here to finish the level
    Exit,
    /// Entering starts infinite-mode rounds
    GameBegin,
}

impl Trigger {
    pub fn name(self) -> &'static str {
        match self {
            Trigger::Tips => "tips",
            Trigger::Exit => "exit",
            Trigger::GameBegin => "game_begin",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "tips" => Some(Trigger::Tips),
            "exit" => Some(Trigger::Exit),
            "game_begin" => Some(Trigger::GameBegin),
            _ => None,
        }
    }
}

/// A knight placed by the level designer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KnightSpawn {
    pub kind: KnightKind,
    pub pos: Vec2,
}

/// Immutable per-scene collision and trigger data, in scaled world pixels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGeometry {
    pub width: f32,
    pub height: f32,
    pub walls: Vec<Rect>,
    /// Block knights only; never drawn
    pub invisible_walls: Vec<Rect>,
    pub triggers: Vec<(Trigger, Rect)>,
    pub player_start: Vec2,
    /// Fixed knights of a level
    pub knights: Vec<KnightSpawn>,
    /// Random spawn points used by infinite mode
    pub spawn_points: Vec<Vec2>,
}

impl TileGeometry {
    /// Scale every object and sort it by its tags
    pub fn from_map(map: &MapData, player_start: &str, scale: f32) -> Result<Self, MapError> {
        let mut start = None;
        let mut geometry = TileGeometry {
            width: map.width * scale,
            height: map.height * scale,
            walls: Vec::new(),
            invisible_walls: Vec::new(),
            triggers: Vec::new(),
            player_start: Vec2::ZERO,
            knights: Vec::new(),
            spawn_points: Vec::new(),
        };

        for obj in &map.objects {
            validate(obj)?;
            let rect = obj.rect().scale(scale);
            let pos = Vec2::new(rect.x, rect.y);

            match obj.kind.as_str() {
                "player" if obj.name == player_start => start = Some(pos),
                "knight" if obj.name != "knight" => {
                    let kind = KnightKind::from_name(&obj.name)
                        .ok_or_else(|| MapError::UnknownKnightKind(obj.name.clone()))?;
                    geometry.knights.push(KnightSpawn { kind, pos });
                }
                _ => {}
            }

            match obj.name.as_str() {
                "obstacle" => geometry.walls.push(rect),
                "invisible_obstacle" => geometry.invisible_walls.push(rect),
                "knight" => geometry.spawn_points.push(pos),
                name => {
                    if let Some(trigger) = Trigger::from_name(name) {
                        geometry.triggers.push((trigger, rect));
                    }
                }
            }
        }

        geometry.player_start =
            start.ok_or_else(|| MapError::MissingPlayerStart(player_start.to_string()))?;
        Ok(geometry)
    }

    pub fn trigger(&self, which: Trigger) -> Option<Rect> {
        self.triggers.iter().find(|(t, _)| *t == which).map(|(_, r)| *r)
    }

    /// Error unless every listed trigger is present
    pub fn require(&self, triggers: &[Trigger]) -> Result<(), MapError> {
        for t in triggers {
            if self.trigger(*t).is_none() {
                return Err(MapError::MissingTrigger(t.name()));
            }
        }
        Ok(())
    }
}

fn validate(obj: &MapObject) -> Result<(), MapError> {
    let values = [obj.x, obj.y, obj.width, obj.height];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(MapError::InvalidObject {
            name: obj.name.clone(),
            reason: "non-finite coordinate".into(),
        });
    }
    if obj.width < 0.0 || obj.height < 0.0 {
        return Err(MapError::InvalidObject {
            name: obj.name.clone(),
            reason: format!("negative size {}x{}", obj.width, obj.height),
        });
    }
    Ok(())
}
