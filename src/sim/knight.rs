//! Enemy knights: patrol, detect, swing, die

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::{Facing, Stance, swing_hitbox};
use super::anim::{ATTACK_HIT_FRAME, AnimCue, AnimationSequencer, Clip, KNIGHT_FRAMES};
use super::body::{BodyShape, Collide, Contact, KinematicBody, step_body};
use super::geometry::{Axis, Rect};
use super::timer::TickTimer;
use crate::ms_to_ticks;
use crate::tuning::{SpeedRange, TierSpeeds, Tuning};

/// Knight tier; stronger tiers take more hits and walk faster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnightKind {
    Azure,
    Crimson,
    Obsidian,
}

impl KnightKind {
    /// Parse a map object name such as `knight02`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "knight01" => Some(KnightKind::Azure),
            "knight02" => Some(KnightKind::Crimson),
            "knight03" => Some(KnightKind::Obsidian),
            _ => None,
        }
    }

    pub fn max_health(self) -> u32 {
        match self {
            KnightKind::Azure => 1,
            KnightKind::Crimson => 2,
            KnightKind::Obsidian => 3,
        }
    }

    pub fn speed_range(self, speeds: &TierSpeeds) -> SpeedRange {
        match self {
            KnightKind::Azure => speeds.azure,
            KnightKind::Crimson => speeds.crimson,
            KnightKind::Obsidian => speeds.obsidian,
        }
    }

    /// Armor colors, also used for the knight's particles
    pub fn palette(self) -> [[u8; 3]; 4] {
        match self {
            KnightKind::Azure => [[58, 68, 102], [90, 105, 136], [192, 203, 220], [18, 78, 137]],
            KnightKind::Crimson => [[228, 59, 68], [24, 20, 37], [139, 155, 180], [63, 40, 50]],
            KnightKind::Obsidian => [[24, 20, 37], [38, 43, 68], [192, 203, 220], [158, 40, 53]],
        }
    }
}

/// Things a knight did this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KnightStep {
    pub slashed: bool,
    /// The death animation ran out and the knight should be reaped
    pub vanished: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Knight {
    pub id: u32,
    pub kind: KnightKind,
    pub body: KinematicBody,
    pub facing: Facing,
    pub stance: Stance,
    pub health: u32,
    /// Cleared once the slain animation completes
    pub exists: bool,
    pub speed: f32,
    anim: AnimationSequencer,
    invincible: TickTimer,
    attack_range: f32,
    attack_alignment: f32,
    jump_impulse: f32,
}

impl Knight {
    pub fn new(id: u32, kind: KnightKind, pos: Vec2, speed: f32, tuning: &Tuning) -> Self {
        Self {
            id,
            kind,
            body: KinematicBody::new(
                pos,
                BodyShape::humanoid(tuning.size_multiplier),
                tuning.gravity,
            ),
            facing: Facing::Right,
            stance: Stance::Moving,
            health: kind.max_health(),
            exists: true,
            speed,
            anim: AnimationSequencer::new(KNIGHT_FRAMES, Clip::Run, ms_to_ticks(tuning.anim_frame_ms)),
            invincible: TickTimer::new(ms_to_ticks(tuning.invincibility_ms)),
            attack_range: tuning.knight_attack_range,
            attack_alignment: tuning.knight_attack_alignment,
            jump_impulse: tuning.jump_impulse,
        }
    }

    pub fn is_slain(&self) -> bool {
        self.stance == Stance::Slain
    }

    pub fn is_invincible(&self, now: u64) -> bool {
        self.invincible.is_running(now)
    }

    pub fn jump_impulse(&self) -> f32 {
        self.jump_impulse
    }

    pub fn anim(&self) -> &AnimationSequencer {
        &self.anim
    }

    pub fn attack_hitbox(&self) -> Option<Rect> {
        match self.stance {
            Stance::Attacking { dir } if self.anim.frame() == ATTACK_HIT_FRAME => {
                Some(swing_hitbox(self.body.visual_rect(), dir))
            }
            _ => None,
        }
    }

    /// True when the target is close ahead and roughly level
    pub fn detects(&self, target: Vec2) -> bool {
        let center = self.body.body_rect().center();
        let ahead = (target.x - center.x) * self.facing.sign();
        ahead > 0.0 && ahead < self.attack_range && (target.y - center.y).abs() < self.attack_alignment
    }

    /// Advance one tick. `target` is the player's sprite center.
    pub fn update(&mut self, target: Vec2, dt: f32, walls: &[Rect], invisible: &[Rect]) -> KnightStep {
        let mut step = KnightStep::default();

        if let Some(cue) = self.anim.advance() {
            match (cue, self.stance) {
                (AnimCue::Finished, Stance::Slain) => {
                    self.exists = false;
                    step.vanished = true;
                }
                (AnimCue::Entered(ATTACK_HIT_FRAME), Stance::Attacking { .. }) => step.slashed = true,
                (AnimCue::Finished, Stance::Attacking { .. }) => {
                    self.stance = Stance::Moving;
                    self.anim.restart(Clip::Run);
                }
                _ => {}
            }
        }

        // Corpses stay put and only animate
        if self.is_slain() {
            return step;
        }

        self.body.apply_gravity(dt);
        if matches!(self.stance, Stance::Attacking { .. }) {
            self.body.vel.x = 0.0;
        } else if self.detects(target) {
            self.stance = Stance::Attacking { dir: self.facing };
            self.anim.restart(Clip::Attack);
            self.body.vel.x = 0.0;
        } else {
            self.body.vel.x = self.facing.sign() * self.speed;
        }

        step_body(self, &[walls, invisible], dt);
        step
    }

    /// One point of damage unless slain or invincible; returns whether it landed
    pub fn apply_hit(&mut self, now: u64) -> bool {
        if self.is_slain() || self.is_invincible(now) {
            return false;
        }
        self.health = self.health.saturating_sub(1);
        self.invincible.start(now);
        if self.health == 0 {
            self.slay();
        }
        true
    }

    /// Instant death (fireball)
    pub fn kill(&mut self) {
        self.health = 0;
        self.slay();
    }

    fn slay(&mut self) {
        if self.is_slain() {
            return;
        }
        self.stance = Stance::Slain;
        self.body.vel = Vec2::ZERO;
        self.anim.restart(Clip::Slain);
        log::debug!("{:?} knight {} slain", self.kind, self.id);
    }

    pub fn knock_back(&mut self, vel: Vec2) {
        self.body.vel = vel;
    }
}

impl Collide for Knight {
    fn body(&self) -> &KinematicBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut KinematicBody {
        &mut self.body
    }

    fn on_contact(&mut self, contact: &Contact) {
        match contact.axis {
            Axis::X => {
                self.body.vel.x = -self.body.vel.x;
                // Walked into something: patrol the other way
                self.facing = if contact.direction > 0.0 {
                    Facing::Left
                } else {
                    Facing::Right
                };
            }
            Axis::Y => self.body.vel.y = 0.0,
        }
    }
}
