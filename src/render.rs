//! Draw handoff for an external renderer
//!
//! `build_frame` flattens a scene into screen-space sprite instances (camera
//! already applied). Instances are plain-old-data so a GPU backend can upload
//! them as-is.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::sim::actor::Facing;
use crate::sim::anim::{AnimationSequencer, Clip};
use crate::sim::geometry::Rect;
use crate::sim::state::{Hud, Scene};

/// Which sprite sheet an instance samples from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SpriteKind {
    Wall = 0,
    Player = 1,
    Knight = 2,
    FireBall = 3,
    Particle = 4,
}

pub mod flags {
    /// Mirror horizontally (facing left)
    pub const FLIP_X: u32 = 1;
    /// Solid colored quad, no texture
    pub const SOLID: u32 = 1 << 1;
}

/// One quad
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// x, y, w, h in screen pixels
    pub rect: [f32; 4],
    pub color: [f32; 4],
    /// Frame index inside the clip
    pub frame: u32,
    /// `SpriteKind` in the low byte, clip in the next
    pub sprite: u32,
    pub flags: u32,
    pub _pad: u32,
}

impl SpriteInstance {
    fn new(kind: SpriteKind, rect: Rect, color: [f32; 4]) -> Self {
        Self {
            rect: [rect.x, rect.y, rect.w, rect.h],
            color,
            frame: 0,
            sprite: kind as u32,
            flags: 0,
            _pad: 0,
        }
    }

    fn animated(kind: SpriteKind, rect: Rect, anim: &AnimationSequencer, facing: Facing) -> Self {
        let mut instance = Self::new(kind, rect, colors::WHITE);
        instance.frame = anim.frame() as u32;
        instance.sprite |= clip_code(anim.clip()) << 8;
        if facing == Facing::Left {
            instance.flags |= flags::FLIP_X;
        }
        instance
    }

    pub fn kind(&self) -> u32 {
        self.sprite & 0xff
    }

    pub fn screen_rect(&self) -> Rect {
        Rect::new(self.rect[0], self.rect[1], self.rect[2], self.rect[3])
    }
}

fn clip_code(clip: Clip) -> u32 {
    match clip {
        Clip::Idle => 0,
        Clip::Run => 1,
        Clip::Attack => 2,
        Clip::Slain => 3,
        Clip::Spin => 4,
    }
}

/// Colors for untextured elements
pub mod colors {
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const WALL: [f32; 4] = [0.3, 0.3, 0.4, 1.0];

    /// 8-bit palette entry to a linear-ish float color
    pub fn from_rgb([r, g, b]: [u8; 3]) -> [f32; 4] {
        [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone)]
pub struct FrameDraw {
    pub camera_offset: Vec2,
    /// Back to front
    pub sprites: Vec<SpriteInstance>,
    /// Black overlay opacity, 0 once the fade-in is over
    pub fade_alpha: u8,
    pub hud: Hud,
}

fn on_screen(rect: Rect) -> bool {
    use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
    rect.right() >= 0.0 && rect.left() <= SCREEN_WIDTH && rect.bottom() >= 0.0 && rect.top() <= SCREEN_HEIGHT
}

/// Build the frame for the scene as it stands after the latest tick.
///
/// Draw order: walls, knights, player, fireballs, particles. Invisible walls
/// are never drawn. While invincible, the player (and knights) skip every
/// other tick if hit flashing is enabled.
pub fn build_frame(scene: &Scene) -> FrameDraw {
    let now = scene.time_ticks;
    let flash = scene.settings().effective_hit_flash();
    let cam = &scene.camera;
    let mut sprites = Vec::new();

    let mut push = |instance: SpriteInstance| {
        if on_screen(instance.screen_rect()) {
            sprites.push(instance);
        }
    };

    for wall in &scene.geometry.walls {
        let mut instance = SpriteInstance::new(SpriteKind::Wall, cam.apply(*wall), colors::WALL);
        instance.flags |= flags::SOLID;
        push(instance);
    }

    for knight in &scene.knights {
        if !knight.exists || (flash && knight.is_invincible(now) && now % 2 == 1) {
            continue;
        }
        let rect = cam.apply(knight.body.visual_rect());
        let mut instance = SpriteInstance::animated(SpriteKind::Knight, rect, knight.anim(), knight.facing);
        instance.color = colors::from_rgb(knight.kind.palette()[0]);
        push(instance);
    }

    let player = &scene.player;
    if !flash || player.visible(now) {
        let rect = cam.apply(player.body.visual_rect());
        push(SpriteInstance::animated(SpriteKind::Player, rect, player.anim(), player.facing));
    }

    for fb in scene.fireballs.iter().filter(|fb| fb.exists) {
        let rect = cam.apply(fb.body.visual_rect());
        push(SpriteInstance::animated(SpriteKind::FireBall, rect, fb.anim(), Facing::Right));
    }

    for particle in &scene.particles {
        let mut instance = SpriteInstance::new(
            SpriteKind::Particle,
            cam.apply(particle.body.body_rect()),
            colors::from_rgb(particle.color),
        );
        instance.flags |= flags::SOLID;
        push(instance);
    }

    FrameDraw {
        camera_offset: cam.offset,
        sprites,
        fade_alpha: scene.fade_alpha,
        hud: scene.hud(),
    }
}
