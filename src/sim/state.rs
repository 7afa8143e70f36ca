//! Scene state: the aggregate every tick mutates
//!
//! A scene owns its geometry, the player and one collection per entity kind.
//! Entities never reference each other; combat looks them up by position each
//! tick and removals happen in a single deferred pass.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::camera::{Camera, CameraMode};
use super::fireball::FireBall;
use super::knight::{Knight, KnightKind};
use super::particle::Particle;
use super::player::Player;
use super::spawn::{SpawnScheduler, round_size};
use crate::audio::AudioMixer;
use crate::map::{MapData, MapError, TileGeometry, Trigger};
use crate::settings::Settings;
use crate::tuning::{TierSpeeds, Tuning};

/// Fade-in overlay alpha lost per tick
pub const FADE_STEP: u8 = 10;

/// The three playable scenes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneKind {
    Cliff,
    StringStar,
    InfiniteCliff,
}

impl SceneKind {
    pub const ALL: [SceneKind; 3] = [SceneKind::Cliff, SceneKind::StringStar, SceneKind::InfiniteCliff];

    pub fn name(self) -> &'static str {
        match self {
            SceneKind::Cliff => "cliff",
            SceneKind::StringStar => "string_star",
            SceneKind::InfiniteCliff => "infinite_mode_cliff",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        SceneKind::ALL.into_iter().find(|k| k.name() == s)
    }

    pub fn is_infinite(self) -> bool {
        self == SceneKind::InfiniteCliff
    }

    /// Index in the archive unlock bitmap that gates this scene
    pub fn unlock_index(self) -> usize {
        match self {
            SceneKind::Cliff => 0,
            SceneKind::StringStar => 1,
            SceneKind::InfiniteCliff => 2,
        }
    }

    /// Scene unlocked by completing this one
    pub fn unlocks(self) -> Option<SceneKind> {
        match self {
            SceneKind::Cliff => Some(SceneKind::StringStar),
            SceneKind::StringStar => Some(SceneKind::InfiniteCliff),
            SceneKind::InfiniteCliff => None,
        }
    }

    pub fn required_triggers(self) -> &'static [Trigger] {
        if self.is_infinite() {
            &[Trigger::Tips, Trigger::GameBegin]
        } else {
            &[Trigger::Tips, Trigger::Exit]
        }
    }

    pub fn knight_speeds(self, tuning: &Tuning) -> TierSpeeds {
        if self.is_infinite() {
            tuning.infinite_knights
        } else {
            tuning.level_knights
        }
    }
}

/// How a scene ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneExit {
    /// The player died in a level
    Failed,
    /// The player left a level through the exit
    Completed { slain: u32, total: u32 },
    /// The player died in infinite mode after reaching this round
    RunOver { round: u32 },
}

/// Where the host should go after a finished scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NextScene {
    SceneSelect,
    Restart,
    MainMenu,
}

/// Handed back to the scene-select state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneResult {
    pub scene: SceneKind,
    pub next: NextScene,
    pub objective_completed: bool,
    pub round_reached: Option<u32>,
}

/// Things that happened during one tick, for sound and visual cues
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    /// The player's swing reached its hit frame
    Slash,
    Jump,
    FireBallThrown,
    /// A knight's swing reached its hit frame
    EnemySlash { id: u32 },
    EnemyHit { id: u32 },
    EnemySlain { id: u32, kind: KnightKind },
    PlayerHit { health: u32 },
    Explosion { pos: Vec2 },
    Healed { amount: u32 },
    GameBegun,
    RoundBanner { round: u32 },
    RoundStarted { round: u32 },
    KnightSpawned { id: u32, kind: KnightKind },
    SceneEnded(SceneExit),
}

/// Numbers and flags the HUD draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hud {
    pub health: u32,
    pub ammo: u32,
    /// Knights gone this level (or this round in infinite mode)
    pub enemies_slain: u32,
    pub enemies_total: u32,
    pub round: Option<u32>,
    pub round_banner: Option<u32>,
    pub show_tips: bool,
    pub show_exit_hint: bool,
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub kind: SceneKind,
    pub geometry: TileGeometry,
    pub camera: Camera,
    pub player: Player,
    pub knights: Vec<Knight>,
    pub fireballs: Vec<FireBall>,
    /// Visual only, never part of combat
    pub particles: Vec<Particle>,
    /// Present in infinite mode only
    pub spawner: Option<SpawnScheduler>,
    /// Simulated ticks so far; stalled frames do not count
    pub time_ticks: u64,
    /// Knights a level started with
    pub total_enemies: u32,
    /// Knights removed after their death animation
    pub enemies_slain: u32,
    pub round_slain: u32,
    /// Events of the most recent tick
    pub events: Vec<SceneEvent>,
    pub show_tips: bool,
    pub show_exit_hint: bool,
    /// Black overlay drawn over the scene while it fades in
    pub fade_alpha: u8,
    /// Recorded this tick, takes effect at the top of the next one
    pub pending_exit: Option<SceneExit>,
    pub finished: Option<SceneExit>,
    pub audio: AudioMixer,
    pub(crate) settings: Settings,
    pub(crate) tuning: Tuning,
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl Scene {
    /// Build a scene with the player at the default start marker
    pub fn new(
        kind: SceneKind,
        map: &MapData,
        settings: &Settings,
        tuning: &Tuning,
        seed: u64,
    ) -> Result<Self, MapError> {
        Self::with_start(kind, map, "player01", settings, tuning, seed)
    }

    /// Build a scene with the player at a named start marker
    pub fn with_start(
        kind: SceneKind,
        map: &MapData,
        player_start: &str,
        settings: &Settings,
        tuning: &Tuning,
        seed: u64,
    ) -> Result<Self, MapError> {
        tuning.validate()?;
        let geometry = TileGeometry::from_map(map, player_start, tuning.size_multiplier)?;
        geometry.require(kind.required_triggers())?;
        if kind.is_infinite() && geometry.spawn_points.is_empty() {
            return Err(MapError::NoEnemySpawns);
        }

        let player = Player::new(geometry.player_start, tuning);
        let mut camera = Camera::new(geometry.width, geometry.height, CameraMode::Lagged);
        camera.snap_to(player.body.visual_rect());

        let mut scene = Self {
            kind,
            camera,
            player,
            knights: Vec::new(),
            fireballs: Vec::new(),
            particles: Vec::new(),
            spawner: kind.is_infinite().then(|| SpawnScheduler::new(tuning)),
            time_ticks: 0,
            total_enemies: 0,
            enemies_slain: 0,
            round_slain: 0,
            events: Vec::new(),
            show_tips: false,
            show_exit_hint: false,
            fade_alpha: if settings.effective_fade() { 255 } else { 0 },
            pending_exit: None,
            finished: None,
            audio: AudioMixer::new(settings),
            settings: settings.clone(),
            tuning: tuning.clone(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            geometry,
        };

        if !kind.is_infinite() {
            let placed = scene.geometry.knights.clone();
            for spawn in placed {
                scene.spawn_knight(spawn.kind, spawn.pos);
            }
            scene.total_enemies = scene.knights.len() as u32;
        }

        log::info!(
            "Scene {} ready: {} walls, {} knights, seed {}",
            kind.name(),
            scene.geometry.walls.len(),
            scene.knights.len(),
            seed
        );
        Ok(scene)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Place a knight with a speed rolled from its tier's range
    pub fn spawn_knight(&mut self, kind: KnightKind, pos: Vec2) -> u32 {
        let range = kind.speed_range(&self.kind.knight_speeds(&self.tuning));
        let speed = self.rng.random_range(range.min..=range.max) as f32;
        let id = self.next_entity_id();
        self.knights.push(Knight::new(id, kind, pos, speed, &self.tuning));
        log::debug!("Spawned {:?} knight {} at {:?} (speed {:.0})", kind, id, pos, speed);
        id
    }

    /// Launch a fireball from the player's position
    pub fn spawn_fireball(&mut self, vel: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.fireballs.push(FireBall::new(id, self.player.body.pos, vel, &self.tuning));
        id
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Pick up new settings after the settings overlay closes
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.settings = settings.clone();
        self.audio.refresh(settings);
        let cap = settings.max_particles();
        if self.particles.len() > cap {
            let excess = self.particles.len() - cap;
            self.particles.drain(..excess);
        }
        log::info!(
            "Settings applied: sound {:.2}, music {:.2}",
            settings.sound_volume,
            settings.bgm_volume
        );
    }

    pub fn round(&self) -> Option<u32> {
        self.spawner.as_ref().map(|s| s.round)
    }

    pub fn hud(&self) -> Hud {
        let (enemies_slain, enemies_total) = match &self.spawner {
            Some(spawner) if spawner.round > 0 => (self.round_slain, round_size(spawner.round)),
            Some(_) => (0, 0),
            None => (self.enemies_slain, self.total_enemies),
        };
        Hud {
            health: self.player.health,
            ammo: self.player.ammo,
            enemies_slain,
            enemies_total,
            round: self.round(),
            round_banner: self.spawner.as_ref().and_then(|s| s.banner()),
            show_tips: self.show_tips,
            show_exit_hint: self.show_exit_hint,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    /// Turn a finished scene into the result the host acts on
    pub fn conclude(&self, next: NextScene) -> Option<SceneResult> {
        let exit = self.finished?;
        Some(SceneResult {
            scene: self.kind,
            next,
            objective_completed: matches!(exit, SceneExit::Completed { .. }),
            round_reached: match exit {
                SceneExit::RunOver { round } => Some(round),
                _ => None,
            },
        })
    }
}
