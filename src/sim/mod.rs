//! Deterministic scene simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only, time measured in ticks
//! - Seeded RNG only
//! - Stable iteration order (entities in spawn order)
//! - No rendering or platform dependencies

pub mod actor;
pub mod anim;
pub mod body;
pub mod camera;
pub mod combat;
pub mod fireball;
pub mod geometry;
pub mod knight;
pub mod particle;
pub mod player;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod timer;

pub use actor::{Facing, Stance};
pub use anim::{AnimationSequencer, Clip};
pub use body::{BodyShape, Collide, KinematicBody, step_body};
pub use camera::{Camera, CameraMode};
pub use combat::resolve_combat;
pub use fireball::FireBall;
pub use geometry::{Axis, Rect};
pub use knight::{Knight, KnightKind};
pub use particle::Particle;
pub use player::Player;
pub use spawn::{RoundPhase, SpawnEvent, SpawnScheduler};
pub use state::{Hud, NextScene, Scene, SceneEvent, SceneExit, SceneKind, SceneResult};
pub use tick::{TickInput, TickOutcome, demo_input, tick};
pub use timer::TickTimer;
