//! The player knight

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::{Facing, Stance, swing_hitbox};
use super::anim::{ATTACK_HIT_FRAME, AnimCue, AnimationSequencer, Clip, PLAYER_FRAMES};
use super::body::{BodyShape, Collide, Contact, KinematicBody, step_body};
use super::geometry::{Axis, Rect};
use super::tick::TickInput;
use super::timer::TickTimer;
use crate::tuning::Tuning;
use crate::{ms_to_ticks, ticks_to_ms};

/// Things the player did this tick that the scene has to act on
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerStep {
    /// The swing reached its hit frame
    pub slashed: bool,
    /// Launch velocity of a fireball released this tick
    pub thrown: Option<Vec2>,
    pub jumped: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: KinematicBody,
    pub facing: Facing,
    pub stance: Stance,
    pub health: u32,
    pub max_health: u32,
    pub ammo: u32,
    anim: AnimationSequencer,
    invincible: TickTimer,
    /// Tick the throw key went down, while it is held
    throw_started: Option<u64>,
    speed: f32,
    jump_impulse: f32,
    throw_min_ms: u32,
    throw_max_ms: u32,
}

impl Player {
    pub fn new(pos: Vec2, tuning: &Tuning) -> Self {
        Self {
            body: KinematicBody::new(
                pos,
                BodyShape::humanoid(tuning.size_multiplier),
                tuning.gravity,
            ),
            facing: Facing::Right,
            stance: Stance::Idle,
            health: tuning.player_max_health,
            max_health: tuning.player_max_health,
            ammo: tuning.player_start_ammo,
            anim: AnimationSequencer::new(PLAYER_FRAMES, Clip::Idle, ms_to_ticks(tuning.anim_frame_ms)),
            invincible: TickTimer::new(ms_to_ticks(tuning.invincibility_ms)),
            throw_started: None,
            speed: tuning.player_speed,
            jump_impulse: tuning.jump_impulse,
            throw_min_ms: tuning.throw_min_ms,
            throw_max_ms: tuning.throw_max_ms,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn jump_impulse(&self) -> f32 {
        self.jump_impulse
    }

    pub fn is_slain(&self) -> bool {
        self.stance == Stance::Slain
    }

    pub fn is_attacking(&self) -> bool {
        matches!(self.stance, Stance::Attacking { .. })
    }

    pub fn is_invincible(&self, now: u64) -> bool {
        self.invincible.is_running(now)
    }

    pub fn anim(&self) -> &AnimationSequencer {
        &self.anim
    }

    /// Sprite alternates visibility every tick while invincible
    pub fn visible(&self, now: u64) -> bool {
        !self.is_invincible(now) || now % 2 == 0
    }

    /// Live sword hitbox; only exists on the swing's hit frame
    pub fn attack_hitbox(&self) -> Option<Rect> {
        match self.stance {
            Stance::Attacking { dir } if self.anim.frame() == ATTACK_HIT_FRAME => {
                Some(swing_hitbox(self.body.visual_rect(), dir))
            }
            _ => None,
        }
    }

    /// Advance one tick: animation, input, throw, gravity and wall collision
    pub fn update(&mut self, input: &TickInput, now: u64, dt: f32, walls: &[Rect]) -> PlayerStep {
        let mut step = PlayerStep::default();
        if self.is_slain() {
            return step;
        }

        if let Some(cue) = self.anim.advance() {
            match (cue, self.stance) {
                (AnimCue::Entered(ATTACK_HIT_FRAME), Stance::Attacking { .. }) => step.slashed = true,
                (AnimCue::Finished, Stance::Attacking { .. }) => self.stance = Stance::Idle,
                _ => {}
            }
        }

        let heading = match (input.left, input.right) {
            (true, false) => Some(Facing::Left),
            (false, true) => Some(Facing::Right),
            _ => None,
        };
        self.steer(heading);

        if input.jump && !self.body.airborne {
            self.body.vel.y = self.jump_impulse;
            self.body.airborne = true;
            step.jumped = true;
        }

        if input.attack && !self.is_attacking() && !self.is_invincible(now) {
            self.stance = Stance::Attacking { dir: self.facing };
            self.anim.restart(Clip::Attack);
        }

        step.thrown = self.update_throw(input.throw_held, now);

        self.body.apply_gravity(dt);
        step_body(self, &[walls], dt);

        self.anim.play(match self.stance {
            Stance::Idle => Clip::Idle,
            Stance::Moving => Clip::Run,
            Stance::Attacking { .. } => Clip::Attack,
            Stance::Slain => Clip::Slain,
        });
        step
    }

    /// Ease toward top speed while a direction is held, coast to a stop otherwise
    fn steer(&mut self, heading: Option<Facing>) {
        match heading {
            Some(facing) => {
                self.facing = facing;
                let target = facing.sign() * self.speed;
                self.body.vel.x += (target - self.body.vel.x) / 5.0;
                if self.stance == Stance::Idle {
                    self.stance = Stance::Moving;
                }
            }
            None => {
                self.body.vel.x -= self.body.vel.x / 10.0;
                if self.stance == Stance::Moving {
                    self.stance = Stance::Idle;
                }
            }
        }
    }

    /// Charged throw: hold to charge, release to launch
    fn update_throw(&mut self, held: bool, now: u64) -> Option<Vec2> {
        match (held, self.throw_started) {
            (true, None) => {
                self.throw_started = Some(now);
                None
            }
            (false, Some(start)) => {
                self.throw_started = None;
                if self.ammo == 0 {
                    return None;
                }
                self.ammo -= 1;
                let held_ms = ticks_to_ms(now.saturating_sub(start));
                Some(self.launch_velocity(held_ms))
            }
            _ => None,
        }
    }

    /// Hold time maps linearly onto launch speed, clamped to the charge window
    pub fn launch_velocity(&self, held_ms: u32) -> Vec2 {
        let power = held_ms.clamp(self.throw_min_ms, self.throw_max_ms) as f32;
        Vec2::new(self.facing.sign() * power, -power)
    }

    /// Lose one health unless invincible; returns whether the hit landed
    pub fn take_hit(&mut self, now: u64) -> bool {
        if self.is_slain() || self.is_invincible(now) {
            return false;
        }
        self.health = self.health.saturating_sub(1);
        self.invincible.start(now);
        if self.health == 0 {
            self.stance = Stance::Slain;
            log::info!("Player slain at tick {}", now);
        }
        true
    }

    pub fn knock_back(&mut self, vel: Vec2) {
        self.body.vel = vel;
    }

    pub fn gain_ammo(&mut self) {
        self.ammo += 1;
    }

    /// Restore health up to the maximum; returns the amount actually restored
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        self.health - before
    }
}

impl Collide for Player {
    fn body(&self) -> &KinematicBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut KinematicBody {
        &mut self.body
    }

    fn on_contact(&mut self, contact: &Contact) {
        match contact.axis {
            Axis::X => self.body.vel.x = 0.0,
            Axis::Y => self.body.vel.y = 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use proptest::prelude::*;

    fn floor() -> Vec<Rect> {
        vec![Rect::new(-1000.0, 300.0, 4000.0, 50.0)]
    }

    fn grounded_player() -> Player {
        Player::new(Vec2::new(100.0, 300.0 - 25.5), &Tuning::default())
    }

    fn right() -> TickInput {
        TickInput {
            right: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_throw_is_clamped_to_charge_window() {
        let player = grounded_player();
        assert_eq!(player.launch_velocity(150), player.launch_velocity(200));
        assert_eq!(player.launch_velocity(700), player.launch_velocity(600));
        assert_eq!(player.launch_velocity(400), Vec2::new(400.0, -400.0));
    }

    #[test]
    fn test_throw_on_release_consumes_ammo() {
        let mut player = grounded_player();
        let walls = floor();
        let hold = TickInput {
            throw_held: true,
            ..Default::default()
        };
        let idle = TickInput::default();

        // 9 ticks is 150 ms of charge
        for now in 1..=9 {
            assert_eq!(player.update(&hold, now, SIM_DT, &walls).thrown, None);
        }
        let step = player.update(&idle, 10, SIM_DT, &walls);
        assert_eq!(step.thrown, Some(Vec2::new(200.0, -200.0)));
        assert_eq!(player.ammo, 4);
    }

    #[test]
    fn test_throw_with_no_ammo_is_ignored() {
        let mut player = grounded_player();
        player.ammo = 0;
        let walls = floor();
        let hold = TickInput {
            throw_held: true,
            ..Default::default()
        };
        player.update(&hold, 1, SIM_DT, &walls);
        let step = player.update(&TickInput::default(), 40, SIM_DT, &walls);
        assert_eq!(step.thrown, None);
        assert_eq!(player.ammo, 0);
    }

    #[test]
    fn test_jump_only_from_ground() {
        let mut player = grounded_player();
        let walls = floor();
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        assert!(player.update(&jump, 1, SIM_DT, &walls).jumped);
        assert!(player.body.airborne);
        assert!(player.body.vel.y < 0.0);
        assert!(!player.update(&jump, 2, SIM_DT, &walls).jumped);
    }

    #[test]
    fn test_hit_grants_invincibility() {
        let mut player = grounded_player();
        assert!(player.take_hit(10));
        assert_eq!(player.health, 4);
        assert!(!player.take_hit(20));
        assert_eq!(player.health, 4);
        assert!(!player.visible(11));
        assert!(player.visible(12));
        // 500 ms is 30 ticks
        assert!(player.take_hit(40));
        assert_eq!(player.health, 3);
    }

    #[test]
    fn test_health_zero_is_slain() {
        let mut player = grounded_player();
        player.health = 1;
        assert!(player.take_hit(1));
        assert_eq!(player.health, 0);
        assert!(player.is_slain());
        assert!(!player.take_hit(100));
    }

    #[test]
    fn test_attack_hitbox_only_on_hit_frame() {
        let mut player = grounded_player();
        let walls = floor();
        let attack = TickInput {
            attack: true,
            ..Default::default()
        };
        player.update(&attack, 1, SIM_DT, &walls);
        assert!(player.is_attacking());

        let mut live_ticks = 0;
        let mut slashes = 0;
        for now in 2..=30 {
            let step = player.update(&TickInput::default(), now, SIM_DT, &walls);
            if step.slashed {
                slashes += 1;
            }
            if let Some(hitbox) = player.attack_hitbox() {
                live_ticks += 1;
                assert!(hitbox.left() >= player.body.visual_rect().center().x);
            }
        }
        assert_eq!(slashes, 1);
        assert_eq!(live_ticks, 3);
        assert!(!player.is_attacking());
        assert_eq!(player.attack_hitbox(), None);
    }

    #[test]
    fn test_no_attack_while_invincible() {
        let mut player = grounded_player();
        player.take_hit(1);
        let attack = TickInput {
            attack: true,
            ..Default::default()
        };
        player.update(&attack, 2, SIM_DT, &floor());
        assert!(!player.is_attacking());
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut player = grounded_player();
        player.health = 2;
        assert_eq!(player.heal(5), 3);
        assert_eq!(player.health, 5);
        assert_eq!(player.heal(5), 0);
    }

    proptest! {
        #[test]
        fn prop_velocity_eases_monotonically(start in -250.0f32..250.0, ticks in 1usize..120) {
            let walls = floor();
            let mut player = grounded_player();
            player.body.vel.x = start;
            let mut prev = start;
            for now in 1..=ticks as u64 {
                player.update(&right(), now, SIM_DT, &walls);
                let v = player.body.vel.x;
                prop_assert!(v >= prev);
                prop_assert!(v <= 250.0 + 1e-3);
                prev = v;
            }

            for now in 0..60u64 {
                player.update(&TickInput::default(), 1000 + now, SIM_DT, &walls);
                let v = player.body.vel.x;
                prop_assert!(v.abs() <= prev.abs());
                prop_assert!(v * prev >= 0.0);
                prev = v;
            }
        }
    }
}
